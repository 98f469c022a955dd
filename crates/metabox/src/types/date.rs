use crate::{
    base::{
        Sanitizer,
        sanitizer::time::{
            CANONICAL_DATE_FORMAT, CANONICAL_DATETIME_FORMAT, DateFormat, DatetimeFormat,
            canonical_offset,
        },
    },
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

fn render_dated_input(
    cx: &RenderCx<'_>,
    field: &FieldModel,
    value: &Value,
    class: &str,
    placeholder: &str,
    out: &mut Markup,
) -> Result<(), InternalError> {
    write!(
        out,
        "<input type=\"text\" class=\"{class}\" id=\"{}\" name=\"{}\" value=\"{}\" placeholder=\"{}\"/>",
        esc_attr(field.id()),
        esc_attr(&cx.input_name(field)),
        esc_attr(&value.to_string()),
        esc_attr(placeholder)
    )?;

    Ok(())
}

///
/// Date
/// Accepts the field's configured format, stores the canonical form.
///

pub struct Date;

impl TypeHandler for Date {
    fn field_type(&self) -> FieldType {
        FieldType::TEXT_DATE
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        render_dated_input(cx, field, value, "mbx-date", "YYYY-MM-DD", out)
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

        let format = field
            .options()
            .date_format
            .clone()
            .unwrap_or_else(|| CANONICAL_DATE_FORMAT.to_owned());

        let mut value = text;
        match DateFormat::new(format).sanitize(&mut value) {
            Ok(()) => SanitizeOutcome::accepted(Value::Text(value)),
            Err(message) => SanitizeOutcome::degraded(message),
        }
    }
}

///
/// Datetime
/// Like `Date`, with an optional timezone cross-reference: when the field
/// names a timezone sibling, its submitted UTC offset is appended to the
/// canonical form.
///

pub struct Datetime;

impl Datetime {
    fn split_offset(text: &str) -> (String, Option<String>) {
        // A previously canonicalized value carries a trailing " +HH:MM".
        if let Some((head, tail)) = text.rsplit_once(' ') {
            if canonical_offset(tail).is_ok() {
                return (head.to_owned(), Some(tail.to_owned()));
            }
        }

        (text.to_owned(), None)
    }
}

impl TypeHandler for Datetime {
    fn field_type(&self) -> FieldType {
        FieldType::TEXT_DATETIME
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        render_dated_input(cx, field, value, "mbx-datetime", "YYYY-MM-DD HH:MM", out)
    }

    fn sanitize(
        &self,
        cx: &SanitizeCx<'_>,
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

        let (datetime_part, embedded_offset) = Self::split_offset(&text);

        let format = field
            .options()
            .date_format
            .clone()
            .unwrap_or_else(|| CANONICAL_DATETIME_FORMAT.to_owned());

        let mut value = datetime_part;
        if let Err(message) = DatetimeFormat::new(format).sanitize(&mut value) {
            return SanitizeOutcome::degraded(message);
        }

        // Cross-reference: the sibling field's offset wins over one already
        // embedded in the value.
        let mut offset_note = None;
        let offset = match field.options().timezone_field.as_deref() {
            Some(tz_field) => match cx.sibling(tz_field).and_then(RawValue::as_text) {
                Some(raw_offset) if !raw_offset.trim().is_empty() => {
                    match canonical_offset(raw_offset) {
                        Ok(offset) => Some(offset),
                        Err(message) => {
                            offset_note = Some(message);
                            embedded_offset
                        }
                    }
                }
                _ => embedded_offset,
            },
            None => embedded_offset,
        };

        if let Some(offset) = offset {
            value = format!("{value} {offset}");
        }

        let outcome = SanitizeOutcome::accepted(Value::Text(value));
        match offset_note {
            Some(message) => outcome.with_note(message),
            None => outcome,
        }
    }
}

///
/// TESTS
///
