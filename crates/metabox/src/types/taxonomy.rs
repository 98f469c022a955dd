use crate::{
    base::{Sanitizer, sanitizer::text::Slug},
    types::choice::{render_check_list, sanitize_choice_list, sanitize_choice_scalar},
};
use metabox_core::{
    error::InternalError,
    escape::{esc_attr, esc_html},
    handler::{Markup, RenderCx, TypeHandler},
    model::{FieldModel, FieldType},
    raw::{RawMap, RawValue},
    sanitize::{SanitizeCx, SanitizeOutcome},
    value::Value,
};
use std::fmt::Write as _;

fn taxonomy_of(field: &FieldModel) -> &str {
    field.options().taxonomy.as_deref().unwrap_or_default()
}

/// Slug-normalize a raw submission before the shared choice routines see
/// it, so host-filled choice lists compare against canonical term slugs.
fn slugged(raw: &RawValue) -> RawValue {
    match raw {
        RawValue::Text(s) => {
            let mut slug = s.clone();
            let _ = Slug.sanitize(&mut slug);
            RawValue::Text(slug)
        }
        RawValue::List(items) => RawValue::List(items.iter().map(slugged).collect()),
        RawValue::Map(map) => RawValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), slugged(v)))
                .collect::<RawMap>(),
        ),
        RawValue::Absent => RawValue::Absent,
    }
}

///
/// TaxonomySelect
///

pub struct TaxonomySelect;

impl TypeHandler for TaxonomySelect {
    fn field_type(&self) -> FieldType {
        FieldType::TAXONOMY_SELECT
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
            "<select id=\"{}\" name=\"{}\" data-taxonomy=\"{}\">",
            esc_attr(field.id()),
            esc_attr(&cx.input_name(field)),
            esc_attr(taxonomy_of(field))
        )?;
        out.push("<option value=\"\"></option>");

        for choice in &field.options().choices {
            write!(
                out,
                "<option value=\"{}\"{}>{}</option>",
                esc_attr(&choice.value),
                if value.as_text() == Some(choice.value.as_str()) { " selected" } else { "" },
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
        sanitize_choice_scalar(field, &slugged(raw))
    }
}

///
/// TaxonomyRadio
///

pub struct TaxonomyRadio;

impl TypeHandler for TaxonomyRadio {
    fn field_type(&self) -> FieldType {
        FieldType::TAXONOMY_RADIO
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        let name = cx.input_name(field);

        write!(
            out,
            "<ul class=\"mbx-radio\" data-taxonomy=\"{}\">",
            esc_attr(taxonomy_of(field))
        )?;
        for choice in &field.options().choices {
            write!(
                out,
                "<li><label><input type=\"radio\" name=\"{}\" value=\"{}\"{}/> {}</label></li>",
                esc_attr(&name),
                esc_attr(&choice.value),
                if value.as_text() == Some(choice.value.as_str()) { " checked" } else { "" },
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
        sanitize_choice_scalar(field, &slugged(raw))
    }
}

///
/// TaxonomyMulticheck
///

pub struct TaxonomyMulticheck;

impl TypeHandler for TaxonomyMulticheck {
    fn field_type(&self) -> FieldType {
        FieldType::TAXONOMY_MULTICHECK
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        render_check_list(cx, field, value, Some(taxonomy_of(field)), out)
    }

    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        field: &FieldModel,
        raw: &RawValue,
    ) -> SanitizeOutcome {
        sanitize_choice_list(field, &slugged(raw))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_labels_normalize_to_term_slugs() {
        let field = FieldModel::new("genre", FieldType::TAXONOMY_SELECT)
            .unwrap()
            .with_taxonomy("genres")
            .with_choices([("board-games", "Board Games")]);

        let outcome =
            TaxonomySelect.sanitize(&SanitizeCx::empty(), &field, &RawValue::from("Board Games"));

        assert_eq!(outcome.value, Value::from("board-games"));
    }

    #[test]
    fn multicheck_filters_to_known_terms() {
        let field = FieldModel::new("genre", FieldType::TAXONOMY_MULTICHECK)
            .unwrap()
            .with_taxonomy("genres")
            .with_choices([("scifi", "SciFi"), ("fantasy", "Fantasy")]);

        let raw = RawValue::List(vec![RawValue::from("SciFi"), RawValue::from("western")]);
        let outcome = TaxonomyMulticheck.sanitize(&SanitizeCx::empty(), &field, &raw);

        assert_eq!(outcome.value, Value::List(vec![Value::from("scifi")]));
        assert!(outcome.note.is_some());
    }
}
