//! Leaf value types for recordhook.
//!
//! These are the record-independent building blocks that appear inside an
//! event's parameter bag:
//! - [`EntityReference`] / [`EntityReferenceCollection`]: (logical name, id) pointers
//! - [`OptionSetValue`]: a numeric choice with an optional label
//! - [`AccessRights`] / [`PrincipalAccess`]: sharing masks
//! - [`Query`]: the query shapes a bulk retrieve can carry
//! - [`messages`]: platform message names, virtual names and categories
//!
//! Records and the dynamic value type live in `recordhook-model`.

mod access;
pub mod messages;
mod option;
mod query;
mod reference;

pub use access::{AccessRights, PrincipalAccess};
pub use option::OptionSetValue;
pub use query::{
    ColumnSet, ConditionExpression, ConditionOperator, FetchExpression, FilterExpression,
    LogicalOperator, OrderExpression, OrderType, Query, QueryExpression,
};
pub use reference::{EntityReference, EntityReferenceCollection};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown access right: {0}")]
    UnknownAccessRight(String),

    #[error("unknown condition operator: {0}")]
    UnknownOperator(String),
}
