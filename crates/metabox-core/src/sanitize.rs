use crate::{
    raw::{RawMap, RawValue},
    value::Value,
};

///
/// SanitizeNote
///
/// Non-fatal record that a raw value was coerced or degraded. Sanitization
/// is total: malformed input becomes an empty/default accepted value plus a
/// note, never an error.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SanitizeNote {
    /// Field id, or a `group::index::child` path for group sub-fields.
    pub field: String,
    pub message: String,
}

impl SanitizeNote {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

///
/// SanitizeOutcome
///
/// Accepted value plus optional side channels: a note when the input was
/// coerced, and a companion write when part of the value is stored under a
/// supporting field (file attachment ids).
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SanitizeOutcome {
    pub value: Value,
    pub companion: Option<(String, Value)>,
    pub note: Option<String>,
}

impl SanitizeOutcome {
    #[must_use]
    pub fn accepted(value: Value) -> Self {
        Self {
            value,
            companion: None,
            note: None,
        }
    }

    /// Empty accepted value with a degradation note.
    #[must_use]
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            value: Value::None,
            companion: None,
            note: Some(message.into()),
        }
    }

    #[must_use]
    pub fn with_companion(mut self, field_id: impl Into<String>, value: Value) -> Self {
        self.companion = Some((field_id.into(), value));
        self
    }

    #[must_use]
    pub fn with_note(mut self, message: impl Into<String>) -> Self {
        self.note = Some(message.into());
        self
    }
}

///
/// SanitizeCx
///
/// Read-only view of the sibling raw values submitted alongside the field
/// being sanitized. Lets cross-referencing routines (date + timezone field)
/// resolve their companion input from the same form or group row.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SanitizeCx<'a> {
    siblings: Option<&'a RawMap>,
}

impl<'a> SanitizeCx<'a> {
    #[must_use]
    pub const fn empty() -> Self {
        Self { siblings: None }
    }

    #[must_use]
    pub const fn with_siblings(siblings: &'a RawMap) -> Self {
        Self {
            siblings: Some(siblings),
        }
    }

    #[must_use]
    pub fn sibling(&self, field_id: &str) -> Option<&'a RawValue> {
        self.siblings.and_then(|map| map.get(field_id))
    }
}

///
/// TESTS
///
