//! Message dispatcher for recordhook.
//!
//! Sits between a host that delivers record lifecycle events and the
//! business logic reacting to them. For each [`EventContext`] the
//! [`Dispatcher`] resolves the effective message name, looks it up in its
//! [`DispatchTable`], decodes the parameter bag with the
//! [`ParameterDecoder`] and calls the matching
//! [`MessageOperationExecutor`] method. Failures come back as a single
//! [`BoundaryFailure`].
//!
//! ```
//! use recordhook_host::{Dispatcher, EventContext, MessageOperationExecutor, PluginContext, PluginError, PluginResult};
//! use recordhook_model::Record;
//! use uuid::Uuid;
//!
//! struct NoDeletes;
//!
//! impl MessageOperationExecutor for NoDeletes {
//!     type Entity = Record;
//!
//!     fn on_delete(&self, _ctx: &PluginContext<'_>, entity_name: &str, _id: Uuid) -> PluginResult {
//!         Err(PluginError::rejected(format!("{entity_name} records cannot be deleted")))
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new(NoDeletes);
//! let mut event = EventContext::new("Delete")
//!     .with_input("Target", recordhook_types::EntityReference::new("account", Uuid::new_v4()));
//!
//! let failure = dispatcher.handle(&mut event).unwrap_err();
//! assert_eq!(failure.message, "Error occured:\naccount records cannot be deleted");
//! ```

mod config;
mod context;
mod decoder;
mod dispatch;
mod error;
mod executor;
mod memory;
mod plugin;
mod services;

pub use config::{ConfigError, DEFAULT_POST_IMAGE_NAME, DEFAULT_PRE_IMAGE_NAME, PluginConfig};
pub use context::{EventContext, Mode, Stage};
pub use decoder::{
    AccessParameters, AddMemberParameters, AssignParameters, CancelParameters, CloseParameters,
    CreateParameters, CustomOperationParameters, DecodedParameters, DeleteParameters,
    FilteredFormsParameters, MergeParameters, ParameterDecoder, RemoveMemberParameters,
    RetrieveMultipleParameters, RevokeAccessParameters, SetStateParameters, UpdateParameters,
};
pub use dispatch::{DispatchTable, Dispatcher, DispatcherBuilder, MessageKind};
pub use error::{BoundaryFailure, DEFAULT_ERROR_CODE, DecodeError, PluginError, PluginResult, ServiceError};
pub use executor::MessageOperationExecutor;
pub use memory::{InMemoryOrganizationService, InMemoryServiceFactory};
pub use plugin::PluginContext;
pub use services::{
    LogTracingService, MemoryTracingService, OrganizationService, OrganizationServiceExt,
    OrganizationServiceFactory, RecordResolver, ServiceOptions, ServiceProvider, TracingService,
};
