use crate::{Record, Value};
use uuid::Uuid;

/// A caller-defined record shape that a generic [`Record`] can be projected into.
///
/// `Record` itself implements this trait as the identity projection, so a
/// plugin that does not care about typed shapes just uses `Record`.
///
/// Most shapes are newtypes over `Record`; [`typed_record!`](crate::typed_record)
/// generates them.
pub trait TypedRecord: Sized + Send + Sync {
    /// Logical name this shape represents; `None` means "any record".
    const LOGICAL_NAME: Option<&'static str> = None;

    /// Builds the typed shape from a generic record, keeping every attribute.
    fn from_record(record: Record) -> Self;

    fn as_record(&self) -> &Record;

    fn into_record(self) -> Record;

    fn id(&self) -> Uuid {
        self.as_record().id()
    }

    fn logical_name(&self) -> &str {
        self.as_record().logical_name()
    }
}

impl TypedRecord for Record {
    fn from_record(record: Record) -> Self {
        record
    }

    fn as_record(&self) -> &Record {
        self
    }

    fn into_record(self) -> Record {
        self
    }
}

/// Projects a raw parameter value into `T`.
///
/// A record (of any logical name) becomes `T` with its type name and all
/// attributes copied; every other value yields `None`. Never fails.
pub fn coerce<T: TypedRecord>(value: &Value) -> Option<T> {
    match value {
        Value::Record(record) => Some(T::from_record(record.clone())),
        _ => None,
    }
}

/// Declares a newtype record shape.
///
/// ```
/// recordhook_model::typed_record!(
///     /// A person.
///     Contact, "contact"
/// );
///
/// let c = Contact::new().with("fullname", "Ada");
/// assert_eq!(c.get_str("fullname"), Some("Ada"));
/// ```
#[macro_export]
macro_rules! typed_record {
    ($(#[$meta:meta])* $name:ident, $logical:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name($crate::Record);

        impl $name {
            pub const ENTITY_NAME: &'static str = $logical;

            #[must_use]
            pub fn new() -> Self {
                Self($crate::Record::new($logical))
            }

            #[must_use]
            pub fn with(self, name: &str, value: impl Into<$crate::Value>) -> Self {
                Self(self.0.with(name, value))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::TypedRecord for $name {
            const LOGICAL_NAME: Option<&'static str> = Some($logical);

            fn from_record(record: $crate::Record) -> Self {
                Self(record)
            }

            fn as_record(&self) -> &$crate::Record {
                &self.0
            }

            fn into_record(self) -> $crate::Record {
                self.0
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::Record;

            fn deref(&self) -> &$crate::Record {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $crate::Record {
                &mut self.0
            }
        }
    };
}
