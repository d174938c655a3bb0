//! What a callback sees of the dispatch it runs in.

use crate::config::PluginConfig;
use crate::context::EventContext;
use crate::error::ServiceError;
use crate::services::{
    OrganizationService, OrganizationServiceFactory, RecordResolver, ServiceOptions, ServiceProvider,
    TracingService,
};
use std::cell::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Read-only event plus lazily-created connections for one dispatch.
///
/// Each connection is created at most once per dispatch, on first use,
/// from the [`OrganizationServiceFactory`] registered with the provider.
pub struct PluginContext<'a> {
    event: &'a EventContext,
    services: &'a ServiceProvider,
    config: &'a PluginConfig,
    resolver: &'a RecordResolver,
    system: OnceCell<Arc<dyn OrganizationService>>,
    user: OnceCell<Arc<dyn OrganizationService>>,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        event: &'a EventContext,
        services: &'a ServiceProvider,
        config: &'a PluginConfig,
        resolver: &'a RecordResolver,
    ) -> Self {
        Self {
            event,
            services,
            config,
            resolver,
            system: OnceCell::new(),
            user: OnceCell::new(),
        }
    }

    pub fn event(&self) -> &'a EventContext {
        self.event
    }

    pub fn services(&self) -> &'a ServiceProvider {
        self.services
    }

    pub fn config(&self) -> &'a PluginConfig {
        self.config
    }

    pub fn unsecure_config(&self) -> Option<&'a str> {
        self.config.unsecure.as_deref()
    }

    pub fn secure_config(&self) -> Option<&'a str> {
        self.config.secure.as_deref()
    }

    /// Connection acting without a caller override.
    pub fn system_service(&self) -> Result<Arc<dyn OrganizationService>, ServiceError> {
        self.connection(&self.system, None)
    }

    /// Connection acting as the event's initiating user.
    pub fn user_service(&self) -> Result<Arc<dyn OrganizationService>, ServiceError> {
        self.connection(&self.user, Some(self.event.initiating_user_id))
    }

    fn connection(
        &self,
        cell: &OnceCell<Arc<dyn OrganizationService>>,
        caller_id: Option<uuid::Uuid>,
    ) -> Result<Arc<dyn OrganizationService>, ServiceError> {
        if let Some(service) = cell.get() {
            return Ok(Arc::clone(service));
        }
        let factory = self.services.require::<dyn OrganizationServiceFactory>()?;
        debug!(?caller_id, "Creating organization service");
        let options = ServiceOptions {
            caller_id,
            resolver: self.resolver.clone(),
        };
        let service = factory.create_organization_service(options)?;
        Ok(Arc::clone(cell.get_or_init(|| service)))
    }

    pub fn tracing_service(&self) -> Option<Arc<dyn TracingService>> {
        self.services.get::<dyn TracingService>()
    }

    /// Writes to the host's diagnostics sink, or to `tracing` when the host
    /// registered none.
    pub fn trace(&self, message: &str) {
        match self.tracing_service() {
            Some(sink) => sink.trace(message),
            None => debug!(target: "recordhook::trace", "{message}"),
        }
    }
}
