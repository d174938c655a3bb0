use crate::{ParameterCollection, Value};
use recordhook_types::EntityReference;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named request with a free-form parameter bag.
///
/// Used for custom operations, whose shape the core does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRequest {
    pub request_name: String,
    #[serde(default)]
    pub parameters: ParameterCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

impl OrganizationRequest {
    #[must_use]
    pub fn new(request_name: impl Into<String>) -> Self {
        Self {
            request_name: request_name.into(),
            parameters: ParameterCollection::new(),
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterCollection) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// The `Target` parameter when it is a reference.
    pub fn target(&self) -> Option<&EntityReference> {
        self.get(recordhook_types::messages::params::TARGET)
            .and_then(Value::as_reference)
    }
}

/// Outcome of an [`OrganizationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationResponse {
    pub response_name: String,
    #[serde(default)]
    pub results: ParameterCollection,
}

impl OrganizationResponse {
    #[must_use]
    pub fn new(response_name: impl Into<String>) -> Self {
        Self {
            response_name: response_name.into(),
            results: ParameterCollection::new(),
        }
    }
}
