use metabox_core::{
    error::InternalError,
    escape::{esc_attr, esc_html},
    handler::{Markup, RenderCx, TypeHandler},
    model::{FieldModel, FieldType},
    raw::RawValue,
    reconcile::ROW_KEY_FIELD,
    sanitize::{SanitizeCx, SanitizeOutcome},
    value::{Row, Value},
};
use std::fmt::Write as _;

///
/// Group
///
/// Renders the repeatable row stack. At least one row is always shown —
/// a blank one when nothing is stored — and the per-row remove control is
/// disabled at a single row so the form can never lose its last row.
/// Save-side handling lives in the reconciler, not here.
///

pub struct Group;

impl Group {
    fn render_row(
        cx: &RenderCx<'_>,
        field: &FieldModel,
        group_name: &str,
        index: usize,
        row: Option<&Row>,
        removable: bool,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        out.push("<div class=\"mbx-group-row\">");

        if let Some(key) = row.and_then(Row::key) {
            write!(
                out,
                "<input type=\"hidden\" name=\"{}\" value=\"{key}\"/>",
                esc_attr(&format!("{group_name}[{index}][{ROW_KEY_FIELD}]"))
            )?;
        }

        let row_cx = cx.nested(format!("{group_name}[{index}]"));
        for child in field.fields() {
            let value = row
                .and_then(|r| r.get(child.id()))
                .cloned()
                .or_else(|| child.options().default.clone())
                .unwrap_or_default();

            write!(
                out,
                "<div class=\"mbx-row mbx-type-{}\">",
                esc_attr(child.field_type().as_str())
            )?;
            if !child.is_title() {
                write!(
                    out,
                    "<label class=\"mbx-label\">{}</label>",
                    esc_html(&child.label())
                )?;
            }

            // Containment mirrors the save side: a child with no renderer
            // is left out, the rest of the row still renders.
            let mut control = Markup::new();
            if cx.registry().render(&row_cx, child, &value, &mut control).is_ok() {
                out.push(control.as_str());
            }

            out.push("</div>");
        }

        write!(
            out,
            "<button type=\"button\" class=\"mbx-remove-row\"{}>Remove Row</button>",
            if removable { "" } else { " disabled" }
        )?;
        out.push("</div>");

        Ok(())
    }
}

impl TypeHandler for Group {
    fn field_type(&self) -> FieldType {
        FieldType::GROUP
    }

    fn render(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        let rows = value.as_rows().unwrap_or_default();
        let group_name = cx.input_name_raw(field.id());
        let shown = rows.len().max(1);
        let removable = shown > 1;

        write!(
            out,
            "<div class=\"mbx-group\" data-group=\"{}\">",
            esc_attr(field.id())
        )?;

        for index in 0..shown {
            Self::render_row(
                cx,
                field,
                &group_name,
                index,
                rows.get(index),
                removable,
                out,
            )?;
        }

        out.push("<button type=\"button\" class=\"mbx-add-row\">Add Row</button>");
        out.push("</div>");

        Ok(())
    }

    /// Group submissions are reconciled against stored rows by the save
    /// pass; a stray direct sanitize degrades rather than guessing.
    fn sanitize(
        &self,
        _cx: &SanitizeCx<'_>,
        _field: &FieldModel,
        _raw: &RawValue,
    ) -> SanitizeOutcome {
        SanitizeOutcome::degraded("group values are reconciled row-wise")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use metabox_core::value::RowKey;

    fn group() -> FieldModel {
        FieldModel::new("swatches", FieldType::GROUP)
            .unwrap()
            .with_fields(vec![
                FieldModel::new("color", FieldType::TEXT).unwrap(),
                FieldModel::new("note", FieldType::TEXTAREA).unwrap(),
            ])
            .unwrap()
    }

    #[test]
    fn empty_group_renders_one_blank_row_with_remove_disabled() {
        let registry = defaults();
        let cx = RenderCx::root(&registry);
        let mut out = Markup::new();

        registry
            .render(&cx, &group(), &Value::Rows(vec![]), &mut out)
            .unwrap();
        let html = out.as_str();

        assert_eq!(html.matches("mbx-group-row").count(), 1);
        assert!(html.contains("class=\"mbx-remove-row\" disabled"));
        assert!(html.contains("name=\"swatches[0][color]\""));
    }

    #[test]
    fn stored_rows_render_keys_and_enable_remove() {
        let registry = defaults();
        let cx = RenderCx::root(&registry);
        let mut out = Markup::new();

        let mut first = Row::new().with_key(RowKey::generate());
        first.set("color", Value::from("red"));
        let mut second = Row::new().with_key(RowKey::generate());
        second.set("color", Value::from("blue"));

        registry
            .render(&cx, &group(), &Value::Rows(vec![first, second]), &mut out)
            .unwrap();
        let html = out.as_str();

        assert_eq!(html.matches("mbx-group-row").count(), 2);
        assert!(!html.contains(" disabled"));
        assert_eq!(html.matches("[_key]").count(), 2);
        assert!(html.contains("value=\"red\""));
        assert!(html.contains("name=\"swatches[1][color]\""));
    }
}
