use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Module-level errors convert into this at the controller boundary.
///

#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct the per-field error for a type tag with no registered handler.
    pub(crate) fn unknown_field_type(origin: ErrorOrigin, tag: &str) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            origin,
            format!("no handler registered for field type '{tag}'"),
        )
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorClass {
    /// Structurally unexpected caller input.
    BadInput,
    /// Invalid box/field configuration; fatal at construction time.
    Config,
    /// Unclassified runtime failure.
    Internal,
    /// Lookup misses (boxes, fields, editable set).
    NotFound,
    /// No capability registered for the requested type tag.
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadInput => "bad_input",
            Self::Config => "config",
            Self::Internal => "internal",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };

        write!(f, "{s}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorOrigin {
    Controller,
    Model,
    Reconcile,
    Registry,
    Render,
    Sanitize,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Controller => "controller",
            Self::Model => "model",
            Self::Reconcile => "reconcile",
            Self::Registry => "registry",
            Self::Render => "render",
            Self::Sanitize => "sanitize",
            Self::Store => "store",
        };

        write!(f, "{s}")
    }
}

///
/// TESTS
///
