use crate::base::{Sanitizer, sanitizer::web::UrlScheme};
use metabox_core::{
    error::InternalError,
    escape::{esc_attr, esc_html},
    handler::{Markup, RenderCx, TypeHandler},
    model::{FieldModel, FieldType},
    raw::RawValue,
    sanitize::{SanitizeCx, SanitizeOutcome},
    value::Value,
};
use std::fmt::Write as _;

fn scheme_for(field: &FieldModel) -> UrlScheme {
    match &field.options().protocols {
        Some(protocols) => UrlScheme::new(protocols.iter().cloned()),
        None => UrlScheme::default_protocols(),
    }
}

///
/// File
///
/// Compound field: the visible value is the attachment URL; the numeric
/// attachment id travels either nested or as the `<id>_id` sibling input
/// and is stored under that supporting key, never under the field's own.
///

pub struct File;

impl File {
    fn raw_parts<'a>(
        field: &FieldModel,
        cx: &SanitizeCx<'a>,
        raw: &'a RawValue,
    ) -> (Option<&'a str>, Option<&'a str>) {
        match raw {
            RawValue::Map(map) => (
                map.get("url").and_then(RawValue::as_text),
                map.get("id").and_then(RawValue::as_text),
            ),
            other => (
                other.as_text(),
                cx.sibling(&field.companion_id()).and_then(RawValue::as_text),
            ),
        }
    }
}

impl TypeHandler for File {
    fn field_type(&self) -> FieldType {
        FieldType::FILE
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        let url = value.as_text().unwrap_or_default();

        write!(
            out,
            "<input type=\"text\" class=\"mbx-file-url\" id=\"{}\" name=\"{}\" value=\"{}\"/>",
            esc_attr(field.id()),
            esc_attr(&cx.input_name(field)),
            esc_attr(url)
        )?;
        write!(
            out,
            "<input type=\"hidden\" class=\"mbx-file-id\" name=\"{}\" value=\"\"/>",
            esc_attr(&cx.input_name_raw(&field.companion_id()))
        )?;
        out.push("<button type=\"button\" class=\"mbx-file-browse\">Browse</button>");

        if !url.is_empty() {
            write!(out, "<span class=\"mbx-file-preview\">{}</span>", esc_html(url))?;
        }

        Ok(())
    }

    fn sanitize(
        &self,
        cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        let (url, id) = Self::raw_parts(field, cx, raw);

        let Some(url) = url.map(str::trim).filter(|s| !s.is_empty()) else {
            return SanitizeOutcome::accepted(Value::None);
        };

        let mut url = url.to_owned();
        if let Err(message) = scheme_for(field).sanitize(&mut url) {
            return SanitizeOutcome::degraded(message);
        }

        let outcome = SanitizeOutcome::accepted(Value::Text(url));
        match id.and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(id) => outcome.with_companion(field.companion_id(), Value::Int(id)),
            None => outcome,
        }
    }
}

///
/// TESTS
///
