//! Record model for recordhook.
//!
//! Defines the loosely-typed shapes an event's parameter bag is made of:
//! - [`Value`]: the dynamically-typed value every parameter and attribute holds
//! - [`Record`]: a business object instance (logical name, id, attributes)
//! - [`EntityCollection`]: the result set of a bulk retrieve
//! - [`ParameterCollection`]: an insertion-ordered string → value map
//! - [`OrganizationRequest`] / [`OrganizationResponse`]: generic named requests
//! - [`TypedRecord`]: projection of a generic record into a caller-defined shape
//!
//! Leaf value types (references, option values, queries) come from
//! `recordhook-types` and are re-exported here for convenience.

mod collection;
mod parameters;
mod record;
mod request;
mod typed;
mod value;

pub use collection::EntityCollection;
pub use parameters::ParameterCollection;
pub use record::Record;
pub use request::{OrganizationRequest, OrganizationResponse};
pub use typed::{TypedRecord, coerce};
pub use value::Value;

pub use recordhook_types as types;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by record operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("record {logical_name} already has id {current}; refusing to reassign to {attempted}")]
    IdAlreadyAssigned {
        logical_name: String,
        current: uuid::Uuid,
        attempted: uuid::Uuid,
    },

    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
}
