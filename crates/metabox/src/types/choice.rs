use crate::types::scalar_text;
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

/// Accept a scalar submission against the field's configured choice list.
pub(crate) fn sanitize_choice_scalar(field: &FieldModel, raw: &RawValue) -> SanitizeOutcome {
    let (text, note) = scalar_text(raw);
    let text = text.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());

    let choices = &field.options().choices;
    if let Some(text) = &text {
        let known = choices.is_empty() || choices.iter().any(|c| c.value == *text);
        if !known {
            return SanitizeOutcome::degraded(format!("'{text}' is not a configured choice"));
        }
    }

    let outcome = SanitizeOutcome::accepted(text.map(Value::Text).unwrap_or_default());
    match note {
        Some(note) => outcome.with_note(note),
        None => outcome,
    }
}

/// Accept a multi-value submission, filtered to configured choices, output
/// always at list cardinality.
pub(crate) fn sanitize_choice_list(field: &FieldModel, raw: &RawValue) -> SanitizeOutcome {
    let choices = &field.options().choices;
    let mut dropped = None;

    let items: Vec<Value> = raw
        .as_sequence()
        .into_iter()
        .filter_map(RawValue::as_text)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let known = choices.is_empty() || choices.iter().any(|c| c.value == *s);
            if !known && dropped.is_none() {
                dropped = Some(s.clone());
            }
            known
        })
        .map(Value::Text)
        .collect();

    let outcome = SanitizeOutcome::accepted(Value::List(items));
    match dropped {
        Some(value) => outcome.with_note(format!("'{value}' is not a configured choice")),
        None => outcome,
    }
}

fn is_selected(value: &Value, candidate: &str) -> bool {
    match value {
        Value::Text(s) => s == candidate,
        Value::List(items) => items.iter().any(|v| v.as_text() == Some(candidate)),
        _ => false,
    }
}

///
/// Select
///

pub struct Select;

impl TypeHandler for Select {
    fn field_type(&self) -> FieldType {
        FieldType::SELECT
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
            "<select id=\"{}\" name=\"{}\">",
            esc_attr(field.id()),
            esc_attr(&cx.input_name(field))
        )?;
        out.push("<option value=\"\"></option>");

        for choice in &field.options().choices {
            write!(
                out,
                "<option value=\"{}\"{}>{}</option>",
                esc_attr(&choice.value),
                if is_selected(value, &choice.value) { " selected" } else { "" },
                esc_html(&choice.label)
            )?;
        }

        out.push("</select>");
        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        sanitize_choice_scalar(field, raw)
    }
}

///
/// Radio
///

pub struct Radio;

impl TypeHandler for Radio {
    fn field_type(&self) -> FieldType {
        FieldType::RADIO
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        let name = cx.input_name(field);

        out.push("<ul class=\"mbx-radio\">");
        for choice in &field.options().choices {
            write!(
                out,
                "<li><label><input type=\"radio\" name=\"{}\" value=\"{}\"{}/> {}</label></li>",
                esc_attr(&name),
                esc_attr(&choice.value),
                if is_selected(value, &choice.value) { " checked" } else { "" },
                esc_html(&choice.label)
            )?;
        }
        out.push("</ul>");

        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        sanitize_choice_scalar(field, raw)
    }
}

///
/// Checkbox
/// Single on/off toggle; stores the literal `on` marker, unchecked clears.
///

pub struct Checkbox;

impl TypeHandler for Checkbox {
    fn field_type(&self) -> FieldType {
        FieldType::CHECKBOX
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
            "<input type=\"checkbox\" id=\"{}\" name=\"{}\" value=\"on\"{}/>",
            esc_attr(field.id()),
            esc_attr(&cx.input_name(field)),
            if value.is_empty() { "" } else { " checked" }
        )?;

        Ok(())
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        _field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        let checked = raw.as_text().is_some_and(|s| !s.trim().is_empty());

        SanitizeOutcome::accepted(if checked {
            Value::from("on")
        } else {
            Value::None
        })
    }
}

///
/// Multicheck
///

pub struct Multicheck;

impl TypeHandler for Multicheck {
    fn field_type(&self) -> FieldType {
        FieldType::MULTICHECK
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        render_check_list(cx, field, value, None, out)
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        sanitize_choice_list(field, raw)
    }
}

/// Checkbox list markup shared with the taxonomy variant.
pub(crate) fn render_check_list(
    cx: &RenderCx<'_>,
    field: &FieldModel,
    value: &Value,
    taxonomy: Option<&str>,
    out: &mut Markup,
) -> Result<(), InternalError> {
    let name = format!("{}[]", cx.input_name_raw(field.id()));

    match taxonomy {
        Some(taxonomy) => write!(
            out,
            "<ul class=\"mbx-multicheck\" data-taxonomy=\"{}\">",
            esc_attr(taxonomy)
        )?,
        None => out.push("<ul class=\"mbx-multicheck\">"),
    }

    for choice in &field.options().choices {
        write!(
            out,
            "<li><label><input type=\"checkbox\" name=\"{}\" value=\"{}\"{}/> {}</label></li>",
            esc_attr(&name),
            esc_attr(&choice.value),
            if is_selected(value, &choice.value) { " checked" } else { "" },
            esc_html(&choice.label)
        )?;
    }
    out.push("</ul>");

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn select_field() -> FieldModel {
        FieldModel::new("mood", FieldType::SELECT)
            .unwrap()
            .with_choices([("calm", "Calm"), ("storm", "Storm")])
    }

    #[test]
    fn unknown_choice_degrades_to_empty_with_note() {
        let outcome = Select.sanitize(
            &SanitizeCx::empty(),
            &select_field(),
            &RawValue::from("volcanic"),
        );

        assert!(outcome.value.is_empty());
        assert!(outcome.note.is_some());
    }

    #[test]
    fn known_choice_is_accepted() {
        let outcome = Select.sanitize(&SanitizeCx::empty(), &select_field(), &RawValue::from("calm"));

        assert_eq!(outcome.value, Value::from("calm"));
        assert!(outcome.note.is_none());
    }

    #[test]
    fn multicheck_flattens_scalar_and_sequence_to_list() {
        let field = FieldModel::new("tags", FieldType::MULTICHECK)
            .unwrap()
            .with_choices([("a", "A"), ("b", "B")]);

        let outcome = Multicheck.sanitize(&SanitizeCx::empty(), &field, &RawValue::from("a"));
        assert_eq!(outcome.value, Value::List(vec![Value::from("a")]));

        let raw = RawValue::List(vec![RawValue::from("a"), RawValue::from("b")]);
        let outcome = Multicheck.sanitize(&SanitizeCx::empty(), &field, &raw);
        assert_eq!(
            outcome.value,
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn multicheck_filters_unknown_values_with_note() {
        let field = FieldModel::new("tags", FieldType::MULTICHECK)
            .unwrap()
            .with_choices([("a", "A")]);

        let raw = RawValue::List(vec![RawValue::from("a"), RawValue::from("zzz")]);
        let outcome = Multicheck.sanitize(&SanitizeCx::empty(), &field, &raw);

        assert_eq!(outcome.value, Value::List(vec![Value::from("a")]));
        assert!(outcome.note.unwrap().contains("zzz"));
    }

    #[test]
    fn checkbox_stores_the_on_marker() {
        let field = FieldModel::new("flag", FieldType::CHECKBOX).unwrap();

        let outcome = Checkbox.sanitize(&SanitizeCx::empty(), &field, &RawValue::from("on"));
        assert_eq!(outcome.value, Value::from("on"));

        let outcome = Checkbox.sanitize(&SanitizeCx::empty(), &field, &RawValue::Absent);
        assert!(outcome.value.is_empty());
    }
}
