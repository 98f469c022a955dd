use crate::{
    base::{Sanitizer, sanitizer::web::UrlScheme},
    types::scalar_text,
};
use metabox_core::{
    error::InternalError,
    escape::esc_attr,
    handler::{Markup, RenderCx, TypeHandler},
    model::{FieldModel, FieldType},
    raw::RawValue,
    sanitize::{SanitizeCx, SanitizeOutcome},
    value::Value,
};
use std::fmt::Write as _;

///
/// Oembed
///
/// Stores a provider URL; the host resolves the embed markup at display
/// time. Only the allow-listed schemes survive sanitization.
///

pub struct Oembed;

impl TypeHandler for Oembed {
    fn field_type(&self) -> FieldType {
        FieldType::OEMBED
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        write!(
            out,
            "<input type=\"text\" class=\"mbx-oembed\" id=\"{}\" name=\"{}\" value=\"{}\"/>",
            esc_attr(field.id()),
            esc_attr(&cx.input_name(field)),
            esc_attr(&value.to_string())
        )?;
        out.push("<div class=\"mbx-oembed-preview\"></div>");

        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        let (text, note) = scalar_text(raw);
        let Some(text) = text.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()) else {
            let outcome = SanitizeOutcome::accepted(Value::None);
            return match note {
                Some(note) => outcome.with_note(note),
                None => outcome,
            };
        };

        let scheme = match &field.options().protocols {
            Some(protocols) => UrlScheme::new(protocols.iter().cloned()),
            None => UrlScheme::default_protocols(),
        };

        let mut url = text;
        match scheme.sanitize(&mut url) {
            Ok(()) => SanitizeOutcome::accepted(Value::Text(url)),
            Err(message) => SanitizeOutcome::degraded(message),
        }
    }
}

///
/// TESTS
///
