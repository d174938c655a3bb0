//! Error types for the dispatcher and the failure shape raised to the host.

use std::fmt::Write as _;
use thiserror::Error;

/// Result type returned by executor callbacks.
pub type PluginResult<T = ()> = Result<T, PluginError>;

/// Code carried by a rejection that did not name one.
pub const DEFAULT_ERROR_CODE: i32 = -1;

const HEADER: &str = "Error occured:";

/// Anything a callback, the decoder or a service can fail with.
///
/// Only [`PluginError::Rejected`] is an expected failure; every other
/// variant is rendered to the host with its diagnostic trace.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A business rule rejected the operation.
    #[error("{message}")]
    Rejected { message: String, code: i32 },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PluginError {
    /// Expected rejection with the default code.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            code: DEFAULT_ERROR_CODE,
        }
    }

    pub fn rejected_with_code(message: impl Into<String>, code: i32) -> Self {
        Self::Rejected {
            message: message.into(),
            code,
        }
    }

    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Rejection code; unexpected failures report [`DEFAULT_ERROR_CODE`].
    pub fn code(&self) -> i32 {
        match self {
            Self::Rejected { code, .. } => *code,
            _ => DEFAULT_ERROR_CODE,
        }
    }

    /// Diagnostic trace: one line per `source()` link, then the captured
    /// backtrace when one exists.
    pub fn trace(&self) -> String {
        let mut out = String::new();
        let mut source = std::error::Error::source(self);
        if let Self::Other(err) = self {
            // anyhow keeps its chain behind `chain()`, not `source()`
            source = err
                .chain()
                .nth(1)
                .map(|e| e as &(dyn std::error::Error + 'static));
        }
        while let Some(cause) = source {
            let _ = writeln!(out, "caused by: {cause}");
            source = cause.source();
        }
        if let Self::Other(err) = self {
            let backtrace = err.backtrace();
            if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
                let _ = write!(out, "{backtrace}");
            }
        }
        if out.is_empty() {
            let _ = write!(out, "at {}", self.kind());
        }
        out.trim_end().to_string()
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejection",
            Self::Decode(_) => "parameter decoding",
            Self::Service(_) => "organization service",
            Self::Other(_) => "plugin callback",
        }
    }
}

/// A parameter could not be projected into the shape an operation needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("required parameter '{key}' is missing")]
    MissingParameter { key: &'static str },

    #[error("parameter '{key}' should be {expected}, found {found}")]
    UnexpectedType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failures of the organization-service collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service '{0}' is not registered with the provider")]
    NotRegistered(&'static str),

    #[error("{logical_name} with id {id} does not exist")]
    NotFound { logical_name: String, id: uuid::Uuid },

    #[error("{logical_name} with id {id} already exists")]
    AlreadyExists { logical_name: String, id: uuid::Uuid },

    #[error("request '{0}' is not supported by this service")]
    Unsupported(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Model(#[from] recordhook_model::ModelError),
}

/// The single failure shape raised across the dispatch boundary.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BoundaryFailure {
    pub message: String,
    pub expected: bool,
    #[source]
    pub cause: PluginError,
}

impl BoundaryFailure {
    /// Renders the host-visible message.
    ///
    /// ```
    /// use recordhook_host::BoundaryFailure;
    ///
    /// assert_eq!(BoundaryFailure::compose("X", None), "Error occured:\nX");
    /// assert_eq!(
    ///     BoundaryFailure::compose("Y", Some("T")),
    ///     "Error occured:\nY\nStackTrace:\nT"
    /// );
    /// ```
    pub fn compose(message: &str, trace: Option<&str>) -> String {
        match trace {
            Some(trace) => format!("{HEADER}\n{message}\nStackTrace:\n{trace}"),
            None => format!("{HEADER}\n{message}"),
        }
    }

    /// Classifies `cause` and renders it; the trace is attached only to
    /// unexpected failures.
    pub fn from_error(cause: PluginError) -> Self {
        let expected = cause.is_expected();
        let message = if expected {
            Self::compose(&cause.to_string(), None)
        } else {
            Self::compose(&cause.to_string(), Some(&cause.trace()))
        };
        Self {
            message,
            expected,
            cause,
        }
    }

    pub fn code(&self) -> i32 {
        self.cause.code()
    }
}
