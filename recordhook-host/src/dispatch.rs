//! Routing from effective message names to executor callbacks.
//!
//! A [`Dispatcher`] owns its [`DispatchTable`]; the table is filled by the
//! builder and never changes afterwards, so one dispatcher can serve any
//! number of events.

use crate::config::PluginConfig;
use crate::context::EventContext;
use crate::decoder::{DecodedParameters, ParameterDecoder, RetrieveMultipleParameters};
use crate::error::{BoundaryFailure, PluginResult};
use crate::executor::MessageOperationExecutor;
use crate::plugin::PluginContext;
use crate::services::{RecordResolver, ServiceProvider};
use recordhook_model::Value;
use recordhook_types::EntityReferenceCollection;
use recordhook_types::messages::{category, params, platform, virtual_names};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// The operation kinds the decoder knows how to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Create,
    Update,
    Delete,
    SetState,
    Assign,
    Merge,
    AddMember,
    RemoveMember,
    RetrieveMultiple,
    ExportToExcel,
    Close,
    Cancel,
    GrantAccess,
    ModifyAccess,
    RevokeAccess,
    RetrieveFilteredForms,
    CustomOperation,
}

impl MessageKind {
    pub const ALL: [MessageKind; 17] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::SetState,
        Self::Assign,
        Self::Merge,
        Self::AddMember,
        Self::RemoveMember,
        Self::RetrieveMultiple,
        Self::ExportToExcel,
        Self::Close,
        Self::Cancel,
        Self::GrantAccess,
        Self::ModifyAccess,
        Self::RevokeAccess,
        Self::RetrieveFilteredForms,
        Self::CustomOperation,
    ];

    /// Canonical message name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => platform::CREATE,
            Self::Update => platform::UPDATE,
            Self::Delete => platform::DELETE,
            Self::SetState => platform::SET_STATE,
            Self::Assign => platform::ASSIGN,
            Self::Merge => platform::MERGE,
            Self::AddMember => platform::ADD_MEMBER,
            Self::RemoveMember => platform::REMOVE_MEMBER,
            Self::RetrieveMultiple => platform::RETRIEVE_MULTIPLE,
            Self::ExportToExcel => virtual_names::EXPORT_TO_EXCEL,
            Self::Close => platform::CLOSE,
            Self::Cancel => platform::CANCEL,
            Self::GrantAccess => platform::GRANT_ACCESS,
            Self::ModifyAccess => platform::MODIFY_ACCESS,
            Self::RevokeAccess => platform::REVOKE_ACCESS,
            Self::RetrieveFilteredForms => platform::RETRIEVE_FILTERED_FORMS,
            Self::CustomOperation => category::CUSTOM_OPERATION,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ================================================================
// Dispatch table
// ================================================================

/// Effective message name → operation kind.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    routes: HashMap<String, MessageKind>,
}

impl DispatchTable {
    /// An empty table; nothing is routed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every kind under its canonical name, plus the aliases that share a
    /// decoding (`SetStateDynamicEntity`, `ExportDynamicToExcel`).
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for kind in MessageKind::ALL {
            table.insert(kind.as_str(), kind);
        }
        table.insert(platform::SET_STATE_DYNAMIC_ENTITY, MessageKind::SetState);
        table.insert(virtual_names::EXPORT_DYNAMIC_TO_EXCEL, MessageKind::ExportToExcel);
        table
    }

    fn insert(&mut self, name: impl Into<String>, kind: MessageKind) {
        self.routes.insert(name.into(), kind);
    }

    /// Names match exactly, as the host sends them.
    pub fn lookup(&self, name: &str) -> Option<MessageKind> {
        self.routes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ================================================================
// Builder
// ================================================================

pub struct DispatcherBuilder<E> {
    executor: E,
    table: DispatchTable,
    config: PluginConfig,
    resolver: Option<RecordResolver>,
}

impl<E: MessageOperationExecutor> DispatcherBuilder<E> {
    /// Routes an additional effective name, e.g. a solution-specific
    /// message decoded as [`MessageKind::CustomOperation`].
    #[must_use]
    pub fn route(mut self, name: impl Into<String>, kind: MessageKind) -> Self {
        self.table.insert(name, kind);
        self
    }

    /// Replaces the standard table.
    #[must_use]
    pub fn table(mut self, table: DispatchTable) -> Self {
        self.table = table;
        self
    }

    #[must_use]
    pub fn config(mut self, config: PluginConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolver handed to every connection the dispatch creates. Defaults
    /// to one that knows the executor's entity shape.
    #[must_use]
    pub fn resolver(mut self, resolver: RecordResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Dispatcher<E> {
        Dispatcher {
            executor: self.executor,
            table: self.table,
            config: self.config,
            resolver: self
                .resolver
                .unwrap_or_else(RecordResolver::for_shape::<E::Entity>),
        }
    }
}

// ================================================================
// Dispatcher
// ================================================================

/// Resolves, decodes and routes events to one executor.
pub struct Dispatcher<E> {
    executor: E,
    table: DispatchTable,
    config: PluginConfig,
    resolver: RecordResolver,
}

impl<E: MessageOperationExecutor> Dispatcher<E> {
    /// Standard routes and default config.
    pub fn new(executor: E) -> Self {
        Self::builder(executor).build()
    }

    pub fn with_config(executor: E, config: PluginConfig) -> Self {
        Self::builder(executor).config(config).build()
    }

    pub fn builder(executor: E) -> DispatcherBuilder<E> {
        DispatcherBuilder {
            executor,
            table: DispatchTable::standard(),
            config: PluginConfig::default(),
            resolver: None,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn resolver(&self) -> &RecordResolver {
        &self.resolver
    }

    /// Handles one event with no host services registered.
    pub fn handle(&self, event: &mut EventContext) -> Result<(), BoundaryFailure> {
        self.handle_with(&ServiceProvider::new(), event)
    }

    /// Handles one event.
    ///
    /// Unrouted names complete as a no-op. Any decoding or callback failure
    /// is passed through [`MessageOperationExecutor::on_exception`] and
    /// returned as the boundary failure.
    pub fn handle_with(
        &self,
        services: &ServiceProvider,
        event: &mut EventContext,
    ) -> Result<(), BoundaryFailure> {
        let effective = event.effective_message_name().to_string();
        let Some(kind) = self.table.lookup(&effective) else {
            debug!(message_name = %event.message_name, effective = %effective, "No route for message, ignoring");
            return Ok(());
        };
        debug!(message_name = %event.message_name, effective = %effective, %kind, "Dispatching");

        let decoder = ParameterDecoder::new(event, &self.config.pre_image_name, &self.config.post_image_name);
        let (outcome, write_back) = match decoder.decode::<E::Entity>(kind) {
            Ok(decoded) => self.invoke(services, event, decoded),
            Err(e) => (Err(e.into()), None),
        };
        if let Some(write_back) = write_back {
            write_back.apply(event);
        }

        match outcome {
            Ok(()) => Ok(()),
            Err(error) => {
                if error.is_expected() {
                    info!(%kind, code = error.code(), "Operation rejected: {}", error);
                } else {
                    warn!(%kind, trace = %error.trace(), "Dispatch failed: {}", error);
                }
                Err(self.executor.on_exception(error))
            }
        }
    }

    fn invoke(
        &self,
        services: &ServiceProvider,
        event: &EventContext,
        decoded: DecodedParameters<E::Entity>,
    ) -> (PluginResult, Option<WriteBack>) {
        let ctx = PluginContext::new(event, services, &self.config, &self.resolver);
        let exec = &self.executor;
        match decoded {
            DecodedParameters::Create(p) => (exec.on_create_with_image(&ctx, p.target, p.id, p.post_image), None),
            DecodedParameters::Update(p) => (
                exec.on_update_with_images(&ctx, p.target, p.id, p.pre_image, p.post_image),
                None,
            ),
            DecodedParameters::Delete(p) => (
                exec.on_delete_with_image(&ctx, &p.entity_name, p.id, p.pre_image),
                None,
            ),
            DecodedParameters::SetState(p) => (
                exec.on_set_state(&ctx, &p.entity_name, p.id, p.state, p.status),
                None,
            ),
            DecodedParameters::Assign(p) => (
                exec.on_assign(
                    &ctx,
                    &p.target.logical_name,
                    p.target.id,
                    &p.assignee.logical_name,
                    p.assignee.id,
                ),
                None,
            ),
            DecodedParameters::Merge(p) => (
                exec.on_merge(
                    &ctx,
                    &p.target,
                    p.subordinate_id,
                    p.update_content,
                    p.perform_parenting_checks,
                ),
                None,
            ),
            DecodedParameters::AddMember(p) => (
                exec.on_add_member(&ctx, p.list_id, p.entity_id, p.member_id),
                None,
            ),
            DecodedParameters::RemoveMember(p) => (exec.on_remove_member(&ctx, p.list_id, p.entity_id), None),
            DecodedParameters::RetrieveMultiple(p) => {
                let original = p.clone();
                let RetrieveMultipleParameters { mut query, mut collection } = p;
                let result = exec.on_retrieve_multiple(&ctx, &mut query, &mut collection);
                (result, WriteBack::retrieve(original, RetrieveMultipleParameters { query, collection }))
            }
            DecodedParameters::ExportToExcel(p) => {
                let original = p.clone();
                let RetrieveMultipleParameters { mut query, mut collection } = p;
                let result = exec.on_export_to_excel(&ctx, &mut query, &mut collection);
                (result, WriteBack::retrieve(original, RetrieveMultipleParameters { query, collection }))
            }
            DecodedParameters::Close(p) => (exec.on_close(&ctx, p.closed_entity, p.status), None),
            DecodedParameters::Cancel(p) => (exec.on_cancel(&ctx, p.order_close, p.status), None),
            DecodedParameters::GrantAccess(p) => (
                exec.on_grant_access(
                    &ctx,
                    &p.target.logical_name,
                    p.target.id,
                    &p.principal.logical_name,
                    p.principal.id,
                    p.mask,
                ),
                None,
            ),
            DecodedParameters::ModifyAccess(p) => (
                exec.on_modify_access(
                    &ctx,
                    &p.target.logical_name,
                    p.target.id,
                    &p.principal.logical_name,
                    p.principal.id,
                    p.mask,
                ),
                None,
            ),
            DecodedParameters::RevokeAccess(p) => (
                exec.on_revoke_access(
                    &ctx,
                    &p.target.logical_name,
                    p.target.id,
                    &p.revokee.logical_name,
                    p.revokee.id,
                ),
                None,
            ),
            DecodedParameters::RetrieveFilteredForms(p) => {
                let original = p.system_forms.clone();
                let mut forms = p.system_forms;
                let result =
                    exec.on_retrieve_filtered_forms(&ctx, &p.entity_name, p.user_id, p.form_type, &mut forms);
                let write_back = (forms != original).then_some(WriteBack::SystemForms(forms));
                (result, write_back)
            }
            DecodedParameters::CustomOperation(p) => (
                exec.on_custom_operation(&ctx, &p.request, p.target.as_ref()),
                None,
            ),
        }
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish()
    }
}

/// Output slots a callback changed, applied to the event after it returns.
enum WriteBack {
    Retrieve(RetrieveMultipleParameters, RetrieveMultipleParameters),
    SystemForms(EntityReferenceCollection),
}

impl WriteBack {
    fn retrieve(original: RetrieveMultipleParameters, edited: RetrieveMultipleParameters) -> Option<Self> {
        (original != edited).then_some(Self::Retrieve(original, edited))
    }

    fn apply(self, event: &mut EventContext) {
        match self {
            Self::Retrieve(original, edited) => {
                if original.query != edited.query {
                    match edited.query {
                        Some(query) => {
                            event.input_parameters.insert(params::QUERY, query);
                        }
                        None => {
                            event.input_parameters.remove(params::QUERY);
                        }
                    }
                }
                if original.collection != edited.collection {
                    let key = params::BUSINESS_ENTITY_COLLECTION;
                    match edited.collection {
                        Some(collection) => {
                            event.output_parameters.insert(key, collection);
                        }
                        None => {
                            event.output_parameters.remove(key);
                        }
                    }
                }
            }
            Self::SystemForms(forms) => {
                event
                    .output_parameters
                    .insert(params::SYSTEM_FORMS, Value::EntityReferenceCollection(forms));
            }
        }
    }
}
