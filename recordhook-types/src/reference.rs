//! Entity references: a typed pointer to a record by logical name and id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Points at a record without carrying its attributes.
///
/// Immutable value type; used for targets, monikers, assignees,
/// principals and revokees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
    /// Primary-name attribute value, when the host supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    /// Creates a reference. The logical name is normalized to lower case.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into().to_lowercase(),
            id,
            name: None,
        }
    }

    /// Attaches the primary-name value.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parses a `logicalname:uuid` pair.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let (logical_name, id) = s.split_once(':').unwrap_or((s, ""));
        Ok(Self::new(logical_name, Uuid::parse_str(id)?))
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.logical_name, self.id)
    }
}

impl FromStr for EntityReference {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Ordered collection of references, e.g. the system forms of an entity.
///
/// Callbacks filter it in place, so it exposes the mutating helpers of a `Vec`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityReferenceCollection(Vec<EntityReference>);

impl EntityReferenceCollection {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, reference: EntityReference) {
        self.0.push(reference);
    }

    /// Keeps only the references for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&EntityReference) -> bool) {
        self.0.retain(keep);
    }

    pub fn contains_id(&self, id: Uuid) -> bool {
        self.0.iter().any(|r| r.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityReference> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<EntityReference> {
        self.0
    }
}

impl From<Vec<EntityReference>> for EntityReferenceCollection {
    fn from(references: Vec<EntityReference>) -> Self {
        Self(references)
    }
}

impl FromIterator<EntityReference> for EntityReferenceCollection {
    fn from_iter<I: IntoIterator<Item = EntityReference>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EntityReferenceCollection {
    type Item = &'a EntityReference;
    type IntoIter = std::slice::Iter<'a, EntityReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for EntityReferenceCollection {
    type Item = EntityReference;
    type IntoIter = std::vec::IntoIter<EntityReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
