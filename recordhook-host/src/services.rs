//! Collaborators a plugin reaches through the host: the service provider,
//! organization connections and the diagnostics sink.

use crate::error::ServiceError;
use recordhook_model::{
    EntityCollection, OrganizationRequest, OrganizationResponse, Record, TypedRecord,
};
use recordhook_types::{ColumnSet, FetchExpression, Query};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

// ================================================================
// Service provider
// ================================================================

/// Type-keyed service locator.
///
/// Services are stored as `Arc<T>` where `T` is usually a trait object,
/// so register `Arc<dyn OrganizationServiceFactory>`, not the concrete type.
#[derive(Default)]
pub struct ServiceProvider {
    services: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ServiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<Arc<T>>(), Box::new(service));
    }

    #[must_use]
    pub fn with<T: ?Sized + Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.insert(service);
        self
    }

    #[must_use]
    pub fn with_organization_factory(self, factory: Arc<dyn OrganizationServiceFactory>) -> Self {
        self.with(factory)
    }

    #[must_use]
    pub fn with_tracing(self, tracing: Arc<dyn TracingService>) -> Self {
        self.with(tracing)
    }

    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<Arc<T>>())
            .and_then(|service| service.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Like [`ServiceProvider::get`], failing when nothing is registered.
    pub fn require<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ServiceError> {
        self.get::<T>()
            .ok_or(ServiceError::NotRegistered(std::any::type_name::<T>()))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.services.len())
            .finish()
    }
}

// ================================================================
// Record resolver
// ================================================================

type ResolveFn = Arc<dyn Fn(Record) -> Record + Send + Sync>;

/// Maps logical names to the typed shape records of that name are
/// projected through when a connection returns them.
#[derive(Clone, Default)]
pub struct RecordResolver {
    shapes: BTreeMap<String, ResolveFn>,
}

impl RecordResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that knows a single shape.
    pub fn for_shape<T: TypedRecord + 'static>() -> Self {
        Self::new().register::<T>()
    }

    /// Registers `T` under its declared logical name. Shapes without one
    /// (such as `Record` itself) accept any record and are not registered.
    #[must_use]
    pub fn register<T: TypedRecord + 'static>(mut self) -> Self {
        if let Some(name) = T::LOGICAL_NAME {
            let project: ResolveFn = Arc::new(|record| T::from_record(record).into_record());
            self.shapes.insert(name.to_lowercase(), project);
        }
        self
    }

    pub fn knows(&self, logical_name: &str) -> bool {
        self.shapes.contains_key(&logical_name.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Passes `record` through its registered shape; unknown names are
    /// returned untouched.
    pub fn resolve(&self, record: Record) -> Record {
        match self.shapes.get(record.logical_name()) {
            Some(project) => project(record),
            None => record,
        }
    }
}

impl fmt::Debug for RecordResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordResolver")
            .field("shapes", &self.shapes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Construction parameters for an organization connection.
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    /// User the connection acts as; `None` runs without a caller override.
    pub caller_id: Option<Uuid>,
    pub resolver: RecordResolver,
}

impl ServiceOptions {
    pub fn system(resolver: RecordResolver) -> Self {
        Self {
            caller_id: None,
            resolver,
        }
    }

    pub fn for_user(caller_id: Uuid, resolver: RecordResolver) -> Self {
        Self {
            caller_id: Some(caller_id),
            resolver,
        }
    }
}

// ================================================================
// Organization service
// ================================================================

/// A connection used to read and write further records.
pub trait OrganizationService: Send + Sync {
    fn create(&self, record: Record) -> Result<Uuid, ServiceError>;

    fn retrieve(&self, logical_name: &str, id: Uuid, columns: &ColumnSet) -> Result<Record, ServiceError>;

    fn update(&self, record: Record) -> Result<(), ServiceError>;

    fn delete(&self, logical_name: &str, id: Uuid) -> Result<(), ServiceError>;

    fn retrieve_multiple(&self, query: &Query) -> Result<EntityCollection, ServiceError>;

    fn execute(&self, request: OrganizationRequest) -> Result<OrganizationResponse, ServiceError> {
        Err(ServiceError::Unsupported(request.request_name))
    }
}

/// Creates organization connections for a dispatch.
pub trait OrganizationServiceFactory: Send + Sync {
    fn create_organization_service(
        &self,
        options: ServiceOptions,
    ) -> Result<Arc<dyn OrganizationService>, ServiceError>;
}

/// Convenience reads layered over any [`OrganizationService`].
pub trait OrganizationServiceExt: OrganizationService {
    /// Runs a fetch query.
    fn fetch(&self, fetch_xml: &str) -> Result<EntityCollection, ServiceError> {
        self.retrieve_multiple(&Query::Fetch(FetchExpression::new(fetch_xml)))
    }

    fn fetch_typed<T: TypedRecord>(&self, fetch_xml: &str) -> Result<Vec<T>, ServiceError> {
        Ok(self.fetch(fetch_xml)?.typed())
    }

    fn retrieve_typed<T: TypedRecord>(
        &self,
        logical_name: &str,
        id: Uuid,
        columns: &ColumnSet,
    ) -> Result<T, ServiceError> {
        self.retrieve(logical_name, id, columns).map(T::from_record)
    }
}

impl<S: OrganizationService + ?Sized> OrganizationServiceExt for S {}

// ================================================================
// Diagnostics
// ================================================================

/// Host-provided diagnostics sink. Fire-and-forget.
pub trait TracingService: Send + Sync {
    fn trace(&self, message: &str);
}

/// Forwards trace lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracingService;

impl TracingService for LogTracingService {
    fn trace(&self, message: &str) {
        tracing::info!(target: "recordhook::trace", "{message}");
    }
}

/// Buffers trace lines in memory.
#[derive(Debug, Default)]
pub struct MemoryTracingService {
    lines: Mutex<Vec<String>>,
}

impl MemoryTracingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TracingService for MemoryTracingService {
    fn trace(&self, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_keys_by_trait_object_type() {
        let sink: Arc<dyn TracingService> = Arc::new(MemoryTracingService::new());
        let provider = ServiceProvider::new().with_tracing(sink);

        assert!(provider.get::<dyn TracingService>().is_some());
        assert!(provider.get::<dyn OrganizationServiceFactory>().is_none());
        assert!(provider.get::<MemoryTracingService>().is_none());
    }

    #[test]
    fn require_names_the_missing_service() {
        let err = ServiceProvider::new()
            .require::<dyn OrganizationServiceFactory>()
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("OrganizationServiceFactory"));
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemoryTracingService::new();
        sink.trace("one");
        sink.trace("two");
        assert_eq!(sink.lines(), vec!["one", "two"]);
    }
}
