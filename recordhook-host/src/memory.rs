//! In-process organization service backed by a shared record map.
//!
//! Serves tests and the replay harness. Query support covers what plugins
//! typically issue against it: single-entity expressions with conditions,
//! nested filters, ordering, column projection and a top count. Fetch XML
//! is only inspected for its entity name, so a fetch returns every record
//! of that entity.

use crate::error::ServiceError;
use crate::services::{OrganizationService, OrganizationServiceFactory, RecordResolver, ServiceOptions};
use recordhook_model::{EntityCollection, Record, Value};
use recordhook_types::{
    ColumnSet, ConditionExpression, ConditionOperator, FilterExpression, LogicalOperator, OrderType,
    Query, QueryExpression,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

type Store = BTreeMap<(String, Uuid), Record>;

/// Hands out connections that share one record store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryServiceFactory {
    store: Arc<Mutex<Store>>,
}

impl InMemoryServiceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, bypassing any connection.
    pub fn seed(&self, record: Record) {
        let key = (record.logical_name().to_string(), record.id());
        lock(&self.store).insert(key, record);
    }

    /// Every stored record, ordered by logical name then id.
    pub fn records(&self) -> Vec<Record> {
        lock(&self.store).values().cloned().collect()
    }

    pub fn records_of(&self, logical_name: &str) -> Vec<Record> {
        let logical_name = logical_name.to_lowercase();
        lock(&self.store)
            .values()
            .filter(|r| r.logical_name() == logical_name)
            .cloned()
            .collect()
    }

    /// A connection without the factory indirection.
    pub fn connect(&self, options: ServiceOptions) -> InMemoryOrganizationService {
        InMemoryOrganizationService {
            store: Arc::clone(&self.store),
            caller_id: options.caller_id,
            resolver: options.resolver,
        }
    }
}

impl OrganizationServiceFactory for InMemoryServiceFactory {
    fn create_organization_service(
        &self,
        options: ServiceOptions,
    ) -> Result<Arc<dyn OrganizationService>, ServiceError> {
        debug!(caller_id = ?options.caller_id, "Creating in-memory organization service");
        Ok(Arc::new(self.connect(options)))
    }
}

/// One connection onto an [`InMemoryServiceFactory`] store.
#[derive(Debug)]
pub struct InMemoryOrganizationService {
    store: Arc<Mutex<Store>>,
    caller_id: Option<Uuid>,
    resolver: RecordResolver,
}

impl InMemoryOrganizationService {
    pub fn caller_id(&self) -> Option<Uuid> {
        self.caller_id
    }

    pub fn resolver(&self) -> &RecordResolver {
        &self.resolver
    }
}

impl OrganizationService for InMemoryOrganizationService {
    fn create(&self, mut record: Record) -> Result<Uuid, ServiceError> {
        if !record.has_id() {
            record.set_id(Uuid::new_v4())?;
        }
        let id = record.id();
        let key = (record.logical_name().to_string(), id);
        let mut store = lock(&self.store);
        if store.contains_key(&key) {
            return Err(ServiceError::AlreadyExists {
                logical_name: key.0,
                id,
            });
        }
        if let Some(caller) = self.caller_id {
            record.set("createdby", recordhook_types::EntityReference::new("systemuser", caller));
        }
        store.insert(key, record);
        Ok(id)
    }

    fn retrieve(&self, logical_name: &str, id: Uuid, columns: &ColumnSet) -> Result<Record, ServiceError> {
        let key = (logical_name.to_lowercase(), id);
        let store = lock(&self.store);
        let record = store.get(&key).ok_or_else(|| ServiceError::NotFound {
            logical_name: key.0.clone(),
            id,
        })?;
        Ok(self.resolver.resolve(project(record, columns)))
    }

    fn update(&self, record: Record) -> Result<(), ServiceError> {
        let key = (record.logical_name().to_string(), record.id());
        let mut store = lock(&self.store);
        let stored = store.get_mut(&key).ok_or_else(|| ServiceError::NotFound {
            logical_name: key.0.clone(),
            id: key.1,
        })?;
        for (name, value) in record.attributes() {
            stored.set(name, value.clone());
        }
        Ok(())
    }

    fn delete(&self, logical_name: &str, id: Uuid) -> Result<(), ServiceError> {
        let key = (logical_name.to_lowercase(), id);
        match lock(&self.store).remove(&key) {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound {
                logical_name: key.0,
                id,
            }),
        }
    }

    fn retrieve_multiple(&self, query: &Query) -> Result<EntityCollection, ServiceError> {
        let store = lock(&self.store);
        let entities = match query {
            Query::Expression(expression) => evaluate(&store, expression),
            Query::Fetch(fetch) => {
                let entity_name = fetch
                    .entity_name()
                    .ok_or_else(|| ServiceError::InvalidQuery("fetch has no <entity name=...>".into()))?
                    .to_lowercase();
                store
                    .values()
                    .filter(|r| r.logical_name() == entity_name)
                    .cloned()
                    .collect()
            }
        };
        let entity_name = query.entity_name().unwrap_or_default();
        let entities = entities.into_iter().map(|r| self.resolver.resolve(r)).collect();
        Ok(EntityCollection::new(entity_name, entities))
    }
}

fn lock(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// ================================================================
// Query evaluation
// ================================================================

fn evaluate(store: &Store, query: &QueryExpression) -> Vec<Record> {
    let entity_name = query.entity_name.to_lowercase();
    let mut rows: Vec<&Record> = store
        .values()
        .filter(|r| r.logical_name() == entity_name && filter_matches(&query.criteria, r))
        .collect();

    if query.distinct {
        rows.dedup_by_key(|r| r.id());
    }

    for order in query.orders.iter().rev() {
        let attribute = order.attribute_name.to_lowercase();
        rows.sort_by(|a, b| {
            let ordering = compare(a.get(&attribute), b.get(&attribute));
            match order.order_type {
                OrderType::Ascending => ordering,
                OrderType::Descending => ordering.reverse(),
            }
        });
    }

    let limit = query.top_count.map_or(usize::MAX, |n| n as usize);
    rows.into_iter()
        .take(limit)
        .map(|r| project(r, &query.column_set))
        .collect()
}

fn filter_matches(filter: &FilterExpression, record: &Record) -> bool {
    let conditions = filter.conditions.iter().map(|c| condition_matches(c, record));
    let nested = filter.filters.iter().map(|f| filter_matches(f, record));
    let mut results = conditions.chain(nested).peekable();
    if results.peek().is_none() {
        return true;
    }
    match filter.filter_operator {
        LogicalOperator::And => results.all(|m| m),
        LogicalOperator::Or => results.any(|m| m),
    }
}

fn condition_matches(condition: &ConditionExpression, record: &Record) -> bool {
    let actual = record
        .get(&condition.attribute_name)
        .map(Value::to_json)
        .unwrap_or(serde_json::Value::Null);
    let first = condition.values.first();
    match condition.operator {
        ConditionOperator::Null => actual.is_null(),
        ConditionOperator::NotNull => !actual.is_null(),
        ConditionOperator::Equal => first.is_some_and(|v| json_eq(&actual, v)),
        ConditionOperator::NotEqual => first.is_some_and(|v| !json_eq(&actual, v)),
        ConditionOperator::In => condition.values.iter().any(|v| json_eq(&actual, v)),
        ConditionOperator::GreaterThan => {
            first.is_some_and(|v| json_cmp(&actual, v) == Some(Ordering::Greater))
        }
        ConditionOperator::LessThan => {
            first.is_some_and(|v| json_cmp(&actual, v) == Some(Ordering::Less))
        }
        ConditionOperator::Like => match (actual.as_str(), first.and_then(|v| v.as_str())) {
            (Some(text), Some(pattern)) => like(text, pattern),
            _ => false,
        },
    }
}

/// Numbers compare numerically, strings case-insensitively.
fn json_eq(actual: &serde_json::Value, expected: &serde_json::Value) -> bool {
    match (actual, expected) {
        (serde_json::Value::String(a), serde_json::Value::String(b)) => a.eq_ignore_ascii_case(b),
        _ => json_cmp(actual, expected) == Some(Ordering::Equal) || actual == expected,
    }
}

fn json_cmp(a: &serde_json::Value, b: &serde_json::Value) -> Option<Ordering> {
    match (a, b) {
        (serde_json::Value::Number(x), serde_json::Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (serde_json::Value::String(x), serde_json::Value::String(y)) => {
            Some(x.to_lowercase().cmp(&y.to_lowercase()))
        }
        _ => None,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.map(Value::to_json).unwrap_or(serde_json::Value::Null);
    let b = b.map(Value::to_json).unwrap_or(serde_json::Value::Null);
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => json_cmp(&a, &b).unwrap_or(Ordering::Equal),
    }
}

/// `%` matches any run of characters; matching ignores ASCII case.
fn like(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return text == pattern;
    }
    let mut rest = text.as_str();
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(tail) => rest = tail,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(at) => rest = &rest[at + part.len()..],
                None => return false,
            }
        }
    }
    true
}

fn project(record: &Record, columns: &ColumnSet) -> Record {
    if columns.all_columns {
        return record.clone();
    }
    let mut projected = Record::with_id(record.logical_name(), record.id());
    for (name, value) in record.attributes() {
        if columns.includes(name) {
            projected.set(name, value.clone());
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::like;

    #[test]
    fn like_patterns() {
        assert!(like("Contoso Ltd", "contoso%"));
        assert!(like("Contoso Ltd", "%ltd"));
        assert!(like("Contoso Ltd", "%so l%"));
        assert!(like("abc", "abc"));
        assert!(!like("abc", "b%"));
        assert!(!like("Contoso", "%ltd"));
    }
}
