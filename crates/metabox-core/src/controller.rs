use crate::{
    context::ObjectContext,
    error::{ErrorClass, ErrorOrigin, InternalError},
    escape::{esc_attr, esc_html},
    handler::{HandlerRegistry, Markup, RenderCx},
    ledger::{ChangeKey, Ledger},
    model::{BoxModel, FieldModel},
    obs::{self, LifecycleEvent},
    raw::{RawMap, RawValue},
    reconcile::{self, rows_value},
    resolve::resolve,
    sanitize::{SanitizeCx, SanitizeNote},
    storage::Storage,
    value::{Row, Value},
};
use std::{collections::BTreeSet, fmt::Write as _, sync::Arc};

///
/// SaveOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaveOutcome {
    /// New value persisted.
    Written,
    /// Prior value deleted because the accepted value was empty.
    Removed,
    /// Accepted value equals the stored one; storage untouched.
    Unchanged,
    /// Field does not participate in saves (display-only types).
    Skipped,
    /// Per-field failure; the rest of the box continued.
    Failed(InternalError),
}

///
/// FieldStatus
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldStatus {
    pub field_id: String,
    pub outcome: SaveOutcome,
}

impl FieldStatus {
    fn new(field_id: &str, outcome: SaveOutcome) -> Self {
        Self {
            field_id: field_id.to_owned(),
            outcome,
        }
    }
}

///
/// SaveReport
///
/// Everything one save pass produced: per-field statuses in field order,
/// the ledger of successful changes, and any degradation notes.
///

#[derive(Debug, Default)]
pub struct SaveReport {
    pub statuses: Vec<FieldStatus>,
    pub ledger: Ledger,
    pub notes: Vec<SanitizeNote>,
}

impl SaveReport {
    #[must_use]
    pub fn status(&self, field_id: &str) -> Option<&SaveOutcome> {
        self.statuses
            .iter()
            .find(|s| s.field_id == field_id)
            .map(|s| &s.outcome)
    }
}

///
/// RenderReport
///

#[derive(Debug, Default)]
pub struct RenderReport {
    pub markup: Markup,
    /// Fields left out of the form, with the error that excluded each.
    pub skipped: Vec<(String, InternalError)>,
}

///
/// BoxController
///
/// Drives render and save passes over one box's descriptors. Holds the
/// dispatch registry and the editable-field set, both fixed at
/// construction; per-pass state lives on the stack.
///

pub struct BoxController {
    model: BoxModel,
    registry: Arc<HandlerRegistry>,
    editable: BTreeSet<String>,
}

impl std::fmt::Debug for BoxController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxController")
            .field("model", &self.model)
            .field("editable", &self.editable)
            .finish_non_exhaustive()
    }
}

impl BoxController {
    #[must_use]
    pub fn new(model: BoxModel, registry: Arc<HandlerRegistry>) -> Self {
        let editable = model
            .fields()
            .iter()
            .filter(|f| f.options().show_in_rest && !f.is_title())
            .map(|f| f.id().to_owned())
            .collect();

        Self {
            model,
            registry,
            editable,
        }
    }

    #[must_use]
    pub const fn model(&self) -> &BoxModel {
        &self.model
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.model.id()
    }

    #[must_use]
    pub const fn editable_fields(&self) -> &BTreeSet<String> {
        &self.editable
    }

    // ======================================================================
    // Render pass
    // ======================================================================

    /// Render the whole form. Hidden-type fields are collected during the
    /// pass and flushed after every visible field, in original order, so
    /// they never interrupt the visible row layout.
    pub fn render(&self, ctx: &ObjectContext, storage: &dyn Storage) -> RenderReport {
        obs::emit(&LifecycleEvent::BeforeRender {
            box_id: self.id().to_owned(),
            ctx: *ctx,
        });

        let mut report = RenderReport::default();
        let cx = RenderCx::root(&self.registry);
        let mut deferred: Vec<(&FieldModel, Value)> = Vec::new();

        let _ = write!(
            report.markup,
            "<div class=\"mbx-box\" id=\"mbx-{}\">",
            esc_attr(self.id())
        );

        for field in self.model.fields() {
            let value = match resolve(field, ctx, storage) {
                Ok(value) => value,
                Err(err) => {
                    report.skipped.push((field.id().to_owned(), err.into()));
                    continue;
                }
            };

            if field.is_hidden() {
                deferred.push((field, value));
                continue;
            }

            if let Err(err) = self.render_row(&cx, field, &value, &mut report.markup) {
                report.skipped.push((field.id().to_owned(), err));
            }
        }

        for (field, value) in deferred {
            if let Err(err) = self.registry.render(&cx, field, &value, &mut report.markup) {
                report.skipped.push((field.id().to_owned(), err));
            }
        }

        report.markup.push("</div>");

        obs::emit(&LifecycleEvent::AfterRender {
            box_id: self.id().to_owned(),
            ctx: *ctx,
        });

        report
    }

    fn render_row(
        &self,
        cx: &RenderCx<'_>,
        field: &FieldModel,
        value: &Value,
        out: &mut Markup,
    ) -> Result<(), InternalError> {
        // Render into a scratch buffer first so an unknown type leaves no
        // half-open wrapper behind.
        let mut control = Markup::new();
        self.registry.render(cx, field, value, &mut control)?;

        write!(
            out,
            "<div class=\"mbx-row mbx-type-{}\">",
            esc_attr(field.field_type().as_str())
        )?;

        if !field.is_title() {
            write!(
                out,
                "<label class=\"mbx-label\" for=\"{}\">{}</label>",
                esc_attr(field.id()),
                esc_html(&field.label())
            )?;
        }

        out.push(control.as_str());

        if let Some(description) = &field.options().description {
            write!(
                out,
                "<p class=\"mbx-description\">{}</p>",
                esc_html(description)
            )?;
        }

        out.push("</div>");
        Ok(())
    }

    // ======================================================================
    // Save pass
    // ======================================================================

    /// Save a full submission. Per-field containment: a field that fails
    /// (unknown type, storage error) is reported and the pass continues.
    pub fn save(
        &self,
        ctx: &ObjectContext,
        submission: &RawMap,
        storage: &mut dyn Storage,
    ) -> SaveReport {
        let mut report = SaveReport::default();
        let absent = RawValue::Absent;

        for field in self.model.fields() {
            if !self.registry.stores(field) {
                report
                    .statuses
                    .push(FieldStatus::new(field.id(), SaveOutcome::Skipped));
                continue;
            }

            let raw = submission.get(field.id()).unwrap_or(&absent);
            let status = self.save_one(ctx, field, raw, Some(submission), storage, &mut report);
            report.statuses.push(status);
        }

        obs::emit(&LifecycleEvent::FieldsSaved {
            box_id: self.id().to_owned(),
            ctx: *ctx,
            ledger: report.ledger.clone(),
        });

        report
    }

    fn save_one(
        &self,
        ctx: &ObjectContext,
        field: &FieldModel,
        raw: &RawValue,
        siblings: Option<&RawMap>,
        storage: &mut dyn Storage,
        report: &mut SaveReport,
    ) -> FieldStatus {
        if field.is_group() {
            return self.save_group(ctx, field, raw, storage, report);
        }

        let cx = siblings.map_or_else(SanitizeCx::empty, SanitizeCx::with_siblings);
        let outcome = match self.registry.sanitize(&cx, field, raw) {
            Ok(outcome) => outcome,
            Err(err) => return FieldStatus::new(field.id(), SaveOutcome::Failed(err)),
        };

        if let Some(message) = outcome.note {
            report.notes.push(SanitizeNote::new(field.id(), message));
        }

        if let Some((companion_id, companion_value)) = outcome.companion {
            self.write_value(ctx, &companion_id, companion_value, storage, report);
        }

        let status = self.write_value(ctx, field.id(), outcome.value, storage, report);
        FieldStatus::new(field.id(), status)
    }

    /// Diff-and-write one scalar key; records the ledger entry only after
    /// the storage call succeeded.
    fn write_value(
        &self,
        ctx: &ObjectContext,
        key: &str,
        new: Value,
        storage: &mut dyn Storage,
        report: &mut SaveReport,
    ) -> SaveOutcome {
        let old = match storage.get(ctx, key) {
            Ok(old) => old.filter(|v| !v.is_empty()),
            Err(err) => return SaveOutcome::Failed(err.into()),
        };

        if new.is_empty() {
            if old.is_none() {
                return SaveOutcome::Unchanged;
            }

            return match storage.delete(ctx, key) {
                Ok(()) => {
                    report.ledger.record(ChangeKey::field(key));
                    SaveOutcome::Removed
                }
                Err(err) => SaveOutcome::Failed(err.into()),
            };
        }

        if old.as_ref() == Some(&new) {
            return SaveOutcome::Unchanged;
        }

        match storage.set(ctx, key, new) {
            Ok(()) => {
                report.ledger.record(ChangeKey::field(key));
                SaveOutcome::Written
            }
            Err(err) => SaveOutcome::Failed(err.into()),
        }
    }

    fn save_group(
        &self,
        ctx: &ObjectContext,
        field: &FieldModel,
        raw: &RawValue,
        storage: &mut dyn Storage,
        report: &mut SaveReport,
    ) -> FieldStatus {
        if matches!(raw, RawValue::Text(_)) {
            report.notes.push(SanitizeNote::new(
                field.id(),
                "expected a row sequence, got a scalar",
            ));
        }

        let old_rows = match storage.get(ctx, field.id()) {
            Ok(stored) => stored.map(Value::into_rows).unwrap_or_default(),
            Err(err) => return FieldStatus::new(field.id(), SaveOutcome::Failed(err.into())),
        };

        let submitted = raw.as_rows();
        let out = reconcile::reconcile(&self.registry, field, &old_rows, &submitted);
        report.notes.extend(out.notes);

        let differ = rows_differ(&old_rows, &out.rows);
        if !differ && out.changed.is_empty() {
            return FieldStatus::new(field.id(), SaveOutcome::Unchanged);
        }

        let outcome = match rows_value(out.rows) {
            Some(value) => match storage.set(ctx, field.id(), value) {
                Ok(()) => SaveOutcome::Written,
                Err(err) => SaveOutcome::Failed(err.into()),
            },
            None if old_rows.is_empty() => SaveOutcome::Unchanged,
            None => match storage.delete(ctx, field.id()) {
                Ok(()) => SaveOutcome::Removed,
                Err(err) => SaveOutcome::Failed(err.into()),
            },
        };

        if !matches!(outcome, SaveOutcome::Failed(_)) {
            report.ledger.extend(out.changed);
        }

        FieldStatus::new(field.id(), outcome)
    }

    // ======================================================================
    // Single-field surface (consumed by an external REST layer)
    // ======================================================================

    /// Serializable schema of this box and its fields.
    pub fn schema(&self) -> Result<serde_json::Value, InternalError> {
        serde_json::to_value(&self.model).map_err(|err| {
            InternalError::new(ErrorClass::Internal, ErrorOrigin::Controller, err.to_string())
        })
    }

    pub fn read_field(
        &self,
        ctx: &ObjectContext,
        field_id: &str,
        storage: &dyn Storage,
    ) -> Result<Value, InternalError> {
        let field = self.editable_field(field_id)?;

        resolve(field, ctx, storage).map_err(Into::into)
    }

    /// Replace one field's value. Runs the same sanitize/diff path as the
    /// save pass and fires the fields-saved notification for the change.
    pub fn update_field(
        &self,
        ctx: &ObjectContext,
        field_id: &str,
        raw: &RawValue,
        storage: &mut dyn Storage,
    ) -> Result<SaveReport, InternalError> {
        let field = self.editable_field(field_id)?;

        let mut report = SaveReport::default();
        let status = self.save_one(ctx, field, raw, None, storage, &mut report);
        report.statuses.push(status);

        obs::emit(&LifecycleEvent::FieldsSaved {
            box_id: self.id().to_owned(),
            ctx: *ctx,
            ledger: report.ledger.clone(),
        });

        Ok(report)
    }

    /// Delete one field's stored value (and a file field's supporting id).
    pub fn delete_field(
        &self,
        ctx: &ObjectContext,
        field_id: &str,
        storage: &mut dyn Storage,
    ) -> Result<SaveReport, InternalError> {
        let field = self.editable_field(field_id)?;

        let mut report = SaveReport::default();
        let status = self.save_one(ctx, field, &RawValue::Absent, None, storage, &mut report);
        report.statuses.push(status);

        obs::emit(&LifecycleEvent::FieldsSaved {
            box_id: self.id().to_owned(),
            ctx: *ctx,
            ledger: report.ledger.clone(),
        });

        Ok(report)
    }

    fn editable_field(&self, field_id: &str) -> Result<&FieldModel, InternalError> {
        if !self.editable.contains(field_id) {
            return Err(InternalError::new(
                ErrorClass::NotFound,
                ErrorOrigin::Controller,
                format!("field '{field_id}' is not in box '{}' editable set", self.id()),
            ));
        }

        self.model.field(field_id).ok_or_else(|| {
            InternalError::new(
                ErrorClass::NotFound,
                ErrorOrigin::Controller,
                format!("field '{field_id}' not found in box '{}'", self.id()),
            )
        })
    }
}

/// Order-sensitive content comparison, ignoring row keys so a keyless
/// resubmission of identical content does not churn storage.
fn rows_differ(old: &[Row], new: &[Row]) -> bool {
    if old.len() != new.len() {
        return true;
    }

    old.iter()
        .zip(new)
        .any(|(a, b)| a.iter().ne(b.iter()))
}

///
/// TESTS
///
