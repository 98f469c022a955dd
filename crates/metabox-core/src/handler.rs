use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{FieldModel, FieldType},
    raw::RawValue,
    sanitize::{SanitizeCx, SanitizeOutcome},
    value::Value,
};
use derive_more::Deref;
use std::{collections::HashMap, fmt, sync::Arc};

///
/// Markup
///
/// Append-only HTML buffer handed to renderers. Handlers write through
/// `fmt::Write`, so `write!` composes naturally.
///

#[derive(Debug, Default, Deref)]
pub struct Markup(String);

impl Markup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn push(&mut self, s: &str) {
        self.0.push_str(s);
    }
}

impl fmt::Write for Markup {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.push_str(s);
        Ok(())
    }
}

impl From<fmt::Error> for InternalError {
    fn from(_: fmt::Error) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Render, "markup write failed")
    }
}

///
/// RenderCx
///
/// Per-pass render context: the dispatch registry plus the input-name
/// prefix nested group rows push onto their children.
///

pub struct RenderCx<'a> {
    registry: &'a HandlerRegistry,
    prefix: Option<String>,
}

impl<'a> RenderCx<'a> {
    #[must_use]
    pub const fn root(registry: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            prefix: None,
        }
    }

    /// Child context for one group row: children submit under
    /// `group[index][child]`.
    #[must_use]
    pub fn nested(&self, prefix: impl Into<String>) -> Self {
        Self {
            registry: self.registry,
            prefix: Some(prefix.into()),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &'a HandlerRegistry {
        self.registry
    }

    /// Form input name for a field in this context. Repeatable fields take
    /// the `[]` suffix so the decoder collects a sequence.
    #[must_use]
    pub fn input_name(&self, field: &FieldModel) -> String {
        let base = self.input_name_raw(field.id());

        if field.options().repeatable {
            format!("{base}[]")
        } else {
            base
        }
    }

    /// Prefix-aware name for an arbitrary id, without the repeatable
    /// suffix. Used for supporting inputs (row keys, file ids).
    #[must_use]
    pub fn input_name_raw(&self, id: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}[{id}]"),
            None => id.to_owned(),
        }
    }
}

///
/// TypeHandler
///
/// One capability entry: everything the pipeline needs to know about a
/// field type tag. Stateless; registered once at startup.
///

pub trait TypeHandler: Send + Sync {
    /// Tag this handler serves.
    fn field_type(&self) -> FieldType;

    /// Emit the form control for one resolved value.
    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError>;

    /// Normalize one raw submitted value. Total: degrades, never fails.
    fn sanitize(
        &self,
        cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome;

    /// Whether save/ledger processing applies; display-only types opt out.
    fn stores(&self) -> bool {
        true
    }
}

///
/// HandlerRegistry
///
/// Type tag → handler dispatch table, built at startup. `register`
/// replaces and hands back the displaced handler; unknown tags surface as
/// unsupported-type errors at the call site.
///

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<FieldType, Arc<dyn TypeHandler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn TypeHandler>) -> Option<Arc<dyn TypeHandler>> {
        self.handlers.insert(handler.field_type(), handler)
    }

    #[must_use]
    pub fn get(&self, tag: &FieldType) -> Option<&Arc<dyn TypeHandler>> {
        self.handlers.get(tag)
    }

    #[must_use]
    pub fn is_registered(&self, tag: &FieldType) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Dispatch a render; unknown tags are an error for this field only.
    pub fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        let handler = self.try_get(field, ErrorOrigin::Render)?;

        handler.render(cx, field, value, out)
    }

    /// Dispatch a sanitize, applying the per-field override when present.
    pub fn sanitize(
        &self,
        cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> Result<SanitizeOutcome, InternalError> {
        if let Some(ov) = &field.options().sanitize_override {
            return Ok(ov.apply(field, raw));
        }

        let handler = self.try_get(field, ErrorOrigin::Sanitize)?;

        Ok(handler.sanitize(cx, field, raw))
    }

    /// Whether the field participates in save/ledger processing. Unknown
    /// tags say yes so the save pass reports them instead of skipping.
    #[must_use]
    pub fn stores(&self, field: &FieldModel) -> bool {
        self.get(field.field_type()).is_none_or(|h| h.stores())
    }

    fn try_get(
        &self,
        field: &FieldModel,
        origin: ErrorOrigin,
    ) -> Result<&Arc<dyn TypeHandler>, InternalError> {
        self.get(field.field_type())
            .ok_or_else(|| InternalError::unknown_field_type(origin, field.field_type().as_str()))
    }
}

///
/// TESTS
///
