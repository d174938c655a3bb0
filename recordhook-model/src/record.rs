use crate::{ModelError, Value};
use recordhook_types::{EntityReference, OptionSetValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A business object instance: logical type name, id and attributes.
///
/// Attribute keys and the logical name are normalized to lower case, the
/// platform's native casing, so lookups never depend on how a caller spelled
/// them. The id is nil until assigned and cannot change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "lowercase")]
    logical_name: String,
    #[serde(default)]
    id: Uuid,
    #[serde(default, deserialize_with = "lowercase_keys")]
    attributes: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record without an id.
    #[must_use]
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into().to_lowercase(),
            id: Uuid::nil(),
            attributes: BTreeMap::new(),
        }
    }

    /// Creates an empty record with a known id.
    #[must_use]
    pub fn with_id(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            id,
            ..Self::new(logical_name)
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }

    /// Assigns the id. Re-assigning the same id is a no-op; a different id
    /// on a record that already has one is rejected.
    pub fn set_id(&mut self, id: Uuid) -> crate::Result<()> {
        if self.id.is_nil() || self.id == id {
            self.id = id;
            return Ok(());
        }
        Err(ModelError::IdAlreadyAssigned {
            logical_name: self.logical_name.clone(),
            current: self.id,
            attempted: id,
        })
    }

    /// Name of the primary-key attribute (`<logicalname>id`).
    pub fn primary_key_name(&self) -> String {
        format!("{}id", self.logical_name)
    }

    pub fn to_reference(&self) -> EntityReference {
        EntityReference::new(&self.logical_name, self.id)
    }

    // ── Attribute access ─────────────────────────────────────────

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(&name.to_lowercase())
    }

    /// Sets an attribute, returning the previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.to_lowercase(), value.into())
    }

    /// Builder-style [`Record::set`].
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(&name.to_lowercase())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_guid(&self, name: &str) -> Option<Uuid> {
        self.get(name).and_then(Value::as_guid)
    }

    pub fn get_option_set(&self, name: &str) -> Option<&OptionSetValue> {
        self.get(name).and_then(Value::as_option_set)
    }

    pub fn get_reference(&self, name: &str) -> Option<&EntityReference> {
        self.get(name).and_then(Value::as_reference)
    }

    // ── Derived records ──────────────────────────────────────────

    /// Copy of this record without its id and without the primary-key
    /// attribute, ready to be created as a new row.
    #[must_use]
    pub fn cloned_without_key(&self) -> Self {
        let key = self.primary_key_name();
        Self {
            logical_name: self.logical_name.clone(),
            id: Uuid::nil(),
            attributes: self
                .attributes
                .iter()
                .filter(|(name, _)| **name != key)
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    /// Combines two versions of a record: attributes of `self` win, missing
    /// ones are filled from `secondary`. The result keeps `self`'s id.
    ///
    /// `self`'s primary-key attribute is dropped first, so `secondary`'s
    /// key attribute fills that gap when present.
    #[must_use]
    pub fn merged_with(&self, secondary: &Record) -> Self {
        let mut merged = self.cloned_without_key();
        for (name, value) in &secondary.attributes {
            if !merged.attributes.contains_key(name) {
                merged.attributes.insert(name.clone(), value.clone());
            }
        }
        merged.id = self.id;
        merged
    }

    /// Drops the named attributes.
    #[must_use]
    pub fn without(mut self, names: &[&str]) -> Self {
        for name in names {
            self.remove(name);
        }
        self
    }
}

fn lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.to_lowercase())
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect())
}
