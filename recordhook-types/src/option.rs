use serde::{Deserialize, Serialize};
use std::fmt;

/// A choice value: numeric code plus the label the host resolved for it.
///
/// A value synthesized from a bare number has an empty label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionSetValue {
    pub value: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl OptionSetValue {
    /// Label-less option wrapping a numeric code.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self {
            value,
            label: String::new(),
        }
    }

    #[must_use]
    pub fn labeled(value: i32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }

    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }
}

impl From<i32> for OptionSetValue {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for OptionSetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} ({})", self.value, self.label)
        }
    }
}
