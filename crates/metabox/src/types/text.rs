use crate::{
    base::{
        Sanitizer,
        sanitizer::text::{SingleLine, Trim},
    },
    types::scalar_text,
};
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

fn clean_line(s: &str) -> String {
    let mut out = s.to_owned();

    // Flatten before trimming: control characters become spaces, and any
    // that land at the edges must not survive into storage.
    let _ = SingleLine.sanitize(&mut out);
    let _ = Trim.sanitize(&mut out);

    out
}

fn sanitize_line(field: &FieldModel, raw: &RawValue) -> SanitizeOutcome {
    if field.options().repeatable {
        let items: Vec<Value> = raw
            .as_sequence()
            .into_iter()
            .filter_map(RawValue::as_text)
            .map(clean_line)
            .filter(|s| !s.is_empty())
            .map(Value::Text)
            .collect();

        return SanitizeOutcome::accepted(Value::List(items));
    }

    let (text, note) = scalar_text(raw);
    let outcome = SanitizeOutcome::accepted(
        text.map(|s| Value::Text(clean_line(&s))).unwrap_or_default(),
    );

    match note {
        Some(note) => outcome.with_note(note),
        None => outcome,
    }
}

fn render_text_input(
    cx: &RenderCx<'_>,
    field: &FieldModel,
    value: &Value,
    kind: &str,
    out: &mut Markup,
) -> Result<(), InternalError> {
    let name = cx.input_name(field);

    if field.options().repeatable {
        let items = match value {
            Value::List(items) => items.as_slice(),
            _ => &[],
        };

        out.push("<div class=\"mbx-repeat\">");
        if items.is_empty() {
            write!(out, "<input type=\"{kind}\" name=\"{}\" value=\"\"/>", esc_attr(&name))?;
        }
        for item in items {
            write!(
                out,
                "<input type=\"{kind}\" name=\"{}\" value=\"{}\"/>",
                esc_attr(&name),
                esc_attr(&item.to_string())
            )?;
        }
        out.push("<button type=\"button\" class=\"mbx-add-item\">Add Another</button>");
        out.push("</div>");

        return Ok(());
    }

    write!(
        out,
        "<input type=\"{kind}\" id=\"{}\" name=\"{}\" value=\"{}\"/>",
        esc_attr(field.id()),
        esc_attr(&name),
        esc_attr(&value.to_string())
    )?;

    Ok(())
}

///
/// Text
///

pub struct Text;

impl TypeHandler for Text {
    fn field_type(&self) -> FieldType {
        FieldType::TEXT
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        render_text_input(cx, field, value, "text", out)
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        sanitize_line(field, raw)
    }
}

///
/// Textarea
/// Multi-line: trims the edges but keeps interior line structure.
///

pub struct Textarea;

impl TypeHandler for Textarea {
    fn field_type(&self) -> FieldType {
        FieldType::TEXTAREA
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
            "<textarea id=\"{}\" name=\"{}\" rows=\"6\">{}</textarea>",
            esc_attr(field.id()),
            esc_attr(&cx.input_name(field)),
            esc_html(&value.to_string())
        )?;

        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        _field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        let (text, note) = scalar_text(raw);
        let value = text
            .map(|mut s| {
                let _ = Trim.sanitize(&mut s);
                Value::Text(s)
            })
            .unwrap_or_default();

        let outcome = SanitizeOutcome::accepted(value);
        match note {
            Some(note) => outcome.with_note(note),
            None => outcome,
        }
    }
}

///
/// Hidden
/// Renders deferred by the controller, after all visible rows.
///

pub struct Hidden;

impl TypeHandler for Hidden {
    fn field_type(&self) -> FieldType {
        FieldType::HIDDEN
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
            "<input type=\"hidden\" name=\"{}\" value=\"{}\"/>",
            esc_attr(&cx.input_name(field)),
            esc_attr(&value.to_string())
        )?;

        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        sanitize_line(field, raw)
    }
}

///
/// Title
/// Heading/description block; renders but never stores.
///

pub struct Title;

impl TypeHandler for Title {
    fn field_type(&self) -> FieldType {
        FieldType::TITLE
    }

    fn render(
        &self,
        _cx: &RenderCx<'_>,
        field: &FieldModel,
        _value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        write!(out, "<h3 class=\"mbx-title\">{}</h3>", esc_html(&field.label()))?;

        if let Some(description) = &field.options().description {
            write!(out, "<p class=\"mbx-description\">{}</p>", esc_html(description))?;
        }

        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        _field: &FieldModel,
        _raw: &RawValue,
    ) -> SanitizeOutcome {
        SanitizeOutcome::default()
    }

    fn stores(&self) -> bool {
        false
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str) -> FieldModel {
        FieldModel::new(id, FieldType::TEXT).unwrap()
    }

    #[test]
    fn text_sanitize_trims_and_flattens() {
        let outcome = Text.sanitize(
            &SanitizeCx::empty(),
            &field("name"),
            &RawValue::from("  two\nlines  "),
        );

        assert_eq!(outcome.value, Value::from("two lines"));
        assert!(outcome.note.is_none());
    }

    #[test]
    fn text_sequence_input_degrades_to_first_with_note() {
        let raw = RawValue::List(vec![RawValue::from("a"), RawValue::from("b")]);
        let outcome = Text.sanitize(&SanitizeCx::empty(), &field("name"), &raw);

        assert_eq!(outcome.value, Value::from("a"));
        assert!(outcome.note.is_some());
    }

    #[test]
    fn repeatable_text_drops_empty_entries() {
        let raw = RawValue::List(vec![
            RawValue::from(" a "),
            RawValue::from("  "),
            RawValue::from("b"),
        ]);
        let outcome = Text.sanitize(&SanitizeCx::empty(), &field("tag").repeatable(), &raw);

        assert_eq!(
            outcome.value,
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn textarea_keeps_interior_newlines() {
        let outcome = Textarea.sanitize(
            &SanitizeCx::empty(),
            &FieldModel::new("bio", FieldType::TEXTAREA).unwrap(),
            &RawValue::from(" line one\nline two "),
        );

        assert_eq!(outcome.value, Value::from("line one\nline two"));
    }
}
