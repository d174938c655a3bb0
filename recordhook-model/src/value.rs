use crate::{EntityCollection, ModelError, Record};
use chrono::{DateTime, Utc};
use recordhook_types::{
    AccessRights, EntityReference, EntityReferenceCollection, OptionSetValue, PrincipalAccess,
    Query,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dynamically-typed parameter or attribute value.
///
/// The host fills parameter bags with whatever shape the operation carries;
/// decoders inspect the variant rather than trusting the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Decimal(f64),
    String(String),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    OptionSet(OptionSetValue),
    EntityReference(EntityReference),
    Record(Record),
    EntityCollection(EntityCollection),
    EntityReferenceCollection(EntityReferenceCollection),
    Query(Query),
    PrincipalAccess(PrincipalAccess),
    AccessRights(AccessRights),
    /// Anything the model has no dedicated shape for; passed through untouched.
    Opaque(serde_json::Value),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::BigInt(_) => "big_int",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Guid(_) => "guid",
            Self::DateTime(_) => "date_time",
            Self::OptionSet(_) => "option_set",
            Self::EntityReference(_) => "entity_reference",
            Self::Record(_) => "record",
            Self::EntityCollection(_) => "entity_collection",
            Self::EntityReferenceCollection(_) => "entity_reference_collection",
            Self::Query(_) => "query",
            Self::PrincipalAccess(_) => "principal_access",
            Self::AccessRights(_) => "access_rights",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            Self::BigInt(n) => i32::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_option_set(&self) -> Option<&OptionSetValue> {
        match self {
            Self::OptionSet(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&EntityReference> {
        match self {
            Self::EntityReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_query(&self) -> Option<&Query> {
        match self {
            Self::Query(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_entity_collection(&self) -> Option<&EntityCollection> {
        match self {
            Self::EntityCollection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_reference_collection(&self) -> Option<&EntityReferenceCollection> {
        match self {
            Self::EntityReferenceCollection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_principal_access(&self) -> Option<&PrincipalAccess> {
        match self {
            Self::PrincipalAccess(p) => Some(p),
            _ => None,
        }
    }

    /// Normalizes a choice: labeled options pass through, bare numbers get
    /// an empty label.
    pub fn to_option_set(&self) -> Result<OptionSetValue, ModelError> {
        match self {
            Self::OptionSet(o) => Ok(o.clone()),
            Self::Int(n) => Ok(OptionSetValue::new(*n)),
            Self::BigInt(n) => i32::try_from(*n)
                .map(OptionSetValue::new)
                .map_err(|_| self.unexpected("option_set")),
            other => Err(other.unexpected("option_set")),
        }
    }

    /// Reads an id from either a GUID or its string form.
    pub fn to_guid(&self) -> Result<Uuid, ModelError> {
        match self {
            Self::Guid(id) => Ok(*id),
            Self::String(s) => Uuid::parse_str(s.trim()).map_err(|_| self.unexpected("guid")),
            Self::EntityReference(r) => Ok(r.id),
            other => Err(other.unexpected("guid")),
        }
    }

    /// Plain JSON view used for query evaluation and display.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => json!(b),
            Self::Int(n) => json!(n),
            Self::BigInt(n) => json!(n),
            Self::Decimal(d) => json!(d),
            Self::String(s) => json!(s),
            Self::Guid(id) => json!(id.to_string()),
            Self::DateTime(dt) => json!(dt.to_rfc3339()),
            Self::OptionSet(o) => json!(o.value),
            Self::EntityReference(r) => json!(r.id.to_string()),
            Self::AccessRights(a) => json!(a.bits()),
            Self::Opaque(v) => v.clone(),
            other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ModelError {
        ModelError::UnexpectedType {
            expected,
            found: self.type_name(),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    i64 => BigInt,
    f64 => Decimal,
    String => String,
    Uuid => Guid,
    DateTime<Utc> => DateTime,
    OptionSetValue => OptionSet,
    EntityReference => EntityReference,
    Record => Record,
    EntityCollection => EntityCollection,
    EntityReferenceCollection => EntityReferenceCollection,
    Query => Query,
    PrincipalAccess => PrincipalAccess,
    AccessRights => AccessRights,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
