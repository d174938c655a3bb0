use crate::{Record, TypedRecord};
use serde::{Deserialize, Serialize};

/// Result set of a bulk retrieve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCollection {
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub entities: Vec<Record>,
    #[serde(default)]
    pub more_records: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_cookie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_record_count: Option<i64>,
}

impl EntityCollection {
    #[must_use]
    pub fn new(entity_name: impl Into<String>, entities: Vec<Record>) -> Self {
        Self {
            entity_name: entity_name.into().to_lowercase(),
            entities,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.entities.iter()
    }

    /// Keeps only the records for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.entities.retain(keep);
    }

    /// Projects every record into `T`.
    pub fn typed<T: TypedRecord>(&self) -> Vec<T> {
        self.entities.iter().cloned().map(T::from_record).collect()
    }
}
