use crate::{
    handler::HandlerRegistry,
    ledger::ChangeKey,
    model::FieldModel,
    raw::{RawMap, RawValue},
    sanitize::{SanitizeCx, SanitizeNote},
    value::{Row, RowKey, Value},
};
use std::collections::HashMap;

/// Reserved sub-field name carrying a row's identity token on the wire.
pub const ROW_KEY_FIELD: &str = "_key";

///
/// ReconcileOutput
///

#[derive(Debug, Default)]
pub struct ReconcileOutput {
    /// Rows to persist, submission order, fully-empty rows elided.
    pub rows: Vec<Row>,
    /// Change keys against the submitted (pre-elision) row indices.
    pub changed: Vec<ChangeKey>,
    /// Non-fatal degradations encountered along the way.
    pub notes: Vec<SanitizeNote>,
}

///
/// reconcile
/// Diff a group's stored rows against a submission and produce the new row
/// sequence plus the changed-key set.
///
/// Row correspondence is by row key when the submission carries one,
/// positional otherwise. Sub-values sanitize through the registry; file
/// compounds stash their id portion under the sibling supporting field.
/// A row that retains no sub-values after sanitization is dropped.
///
pub fn reconcile(
    registry: &HandlerRegistry,
    group: &FieldModel,
    old_rows: &[Row],
    submitted: &[&RawMap],
) -> ReconcileOutput {
    let mut out = ReconcileOutput::default();

    let old_by_key: HashMap<RowKey, usize> = old_rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row.key().map(|key| (key, idx)))
        .collect();

    // Row skeletons up front: identity resolution is per-row, while value
    // processing below is per-child.
    let mut matched: Vec<Option<&Row>> = Vec::with_capacity(submitted.len());
    for (i, row) in submitted.iter().enumerate() {
        let submitted_key = row
            .get(ROW_KEY_FIELD)
            .and_then(RawValue::as_text)
            .and_then(RowKey::parse);

        let old = submitted_key
            .and_then(|key| old_by_key.get(&key).copied())
            .map(|idx| &old_rows[idx])
            .or_else(|| old_rows.get(i));

        matched.push(old);
        out.rows
            .push(Row::new().with_key(submitted_key.unwrap_or_else(RowKey::generate)));
    }

    let absent = RawValue::Absent;

    for child in group.fields() {
        if child.is_title() {
            continue;
        }

        let has_routine = child.options().sanitize_override.is_some()
            || registry.is_registered(child.field_type());
        if !has_routine {
            out.notes.push(SanitizeNote::new(
                child.id(),
                format!(
                    "no handler registered for field type '{}'",
                    child.field_type()
                ),
            ));
            continue;
        }

        for (i, row) in submitted.iter().enumerate() {
            let raw = row.get(child.id()).unwrap_or(&absent);
            let cx = SanitizeCx::with_siblings(row);

            // Routine presence was probed above; a miss here cannot happen.
            let Ok(outcome) = registry.sanitize(&cx, child, raw) else {
                continue;
            };

            if let Some((companion_id, companion_value)) = outcome.companion {
                out.rows[i].set(companion_id, companion_value);
            }

            if let Some(message) = outcome.note {
                out.notes.push(SanitizeNote::new(
                    ChangeKey::group_sub(group.id(), i, child.id()).to_string(),
                    message,
                ));
            }

            let old = matched[i]
                .and_then(|row| row.get(child.id()))
                .filter(|v| !v.is_empty());
            let new = outcome.value;

            let is_updated = !new.is_empty() && old != Some(&new);
            let is_removed = new.is_empty() && old.is_some();
            if is_updated || is_removed {
                out.changed
                    .push(ChangeKey::group_sub(group.id(), i, child.id()));
            }

            if !new.is_empty() {
                out.rows[i].set(child.id(), new);
            }
        }
    }

    // Fully-empty row elision; the key alone keeps nothing alive.
    out.rows.retain(|row| !row.is_empty());

    out
}

/// Shape a group submission's rows as one storable value, or `None` when
/// nothing remains (the caller then deletes the stored key).
#[must_use]
pub fn rows_value(rows: Vec<Row>) -> Option<Value> {
    if rows.is_empty() {
        None
    } else {
        Some(Value::Rows(rows))
    }
}

///
/// TESTS
///
