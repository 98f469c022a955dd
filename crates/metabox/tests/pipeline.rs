//! End-to-end pipeline coverage: box controllers over the builtin type
//! catalog and an in-memory storage backend.

use metabox::defaults;
use metabox_core::{
    context::{ObjectContext, ObjectType},
    controller::{BoxController, SaveOutcome},
    model::{BoxModel, FieldModel, FieldType},
    obs::{self, EventSink, LifecycleEvent},
    raw::{RawMap, RawValue},
    registry,
    resolve::resolve,
    storage::{MemoryStorage, Storage},
    value::{Row, Value},
};
use std::{cell::RefCell, rc::Rc, sync::Arc};

fn ctx() -> ObjectContext {
    ObjectContext::new(42u64, ObjectType::Post)
}

fn controller(model: BoxModel) -> BoxController {
    BoxController::new(model, Arc::new(defaults()))
}

fn submission(entries: &[(&str, RawValue)]) -> RawMap {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

fn raw_row(entries: &[(&str, &str)]) -> RawValue {
    RawValue::Map(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), RawValue::from(*v)))
            .collect(),
    )
}

fn swatches_box() -> BoxModel {
    BoxModel::new("appearance", ObjectType::Post)
        .unwrap()
        .with_field(
            FieldModel::new("swatches", FieldType::GROUP)
                .unwrap()
                .with_fields(vec![
                    FieldModel::new("color", FieldType::TEXT).unwrap(),
                    FieldModel::new("note", FieldType::TEXT).unwrap(),
                ])
                .unwrap(),
        )
        .unwrap()
}

fn stored_rows(storage: &MemoryStorage, key: &str) -> Vec<Row> {
    storage
        .get(&ctx(), key)
        .unwrap()
        .map(Value::into_rows)
        .unwrap_or_default()
}

#[test]
fn scalar_round_trips_through_storage() {
    let controller = controller(
        BoxModel::new("profile", ObjectType::Post)
            .unwrap()
            .with_field(FieldModel::new("headline", FieldType::TEXT).unwrap())
            .unwrap(),
    );
    let mut storage = MemoryStorage::new();

    controller.save(
        &ctx(),
        &submission(&[("headline", RawValue::from("  Hello  World "))]),
        &mut storage,
    );

    let field = FieldModel::new("headline", FieldType::TEXT).unwrap();
    let resolved = resolve(&field, &ctx(), &storage).unwrap();
    assert_eq!(resolved, Value::from("Hello  World"));

    // Idempotence: feeding the stored form back through a save is a no-op.
    let report = controller.save(
        &ctx(),
        &submission(&[("headline", RawValue::from("Hello  World"))]),
        &mut storage,
    );
    assert_eq!(report.status("headline"), Some(&SaveOutcome::Unchanged));
    assert!(report.ledger.is_empty());
}

#[test]
fn fully_empty_group_rows_are_elided_from_storage() {
    let controller = controller(swatches_box());
    let mut storage = MemoryStorage::new();

    let rows = RawValue::List(vec![
        raw_row(&[("color", "1")]),
        raw_row(&[("color", ""), ("note", "")]),
        raw_row(&[("color", "2")]),
    ]);
    controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);

    let rows = stored_rows(&storage, "swatches");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("color"), Some(&Value::from("1")));
    assert_eq!(rows[1].get("color"), Some(&Value::from("2")));
}

#[test]
fn group_change_and_removal_are_recorded_per_sub_field() {
    let controller = controller(swatches_box());
    let mut storage = MemoryStorage::new();

    let rows = RawValue::List(vec![raw_row(&[("color", "red"), ("note", "warm")])]);
    controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);

    // Change: red → blue.
    let rows = RawValue::List(vec![raw_row(&[("color", "blue"), ("note", "warm")])]);
    let report = controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);
    assert_eq!(report.ledger.keys(), vec!["swatches::0::color"]);

    // Removal: blue → empty; the key disappears from the stored row.
    let rows = RawValue::List(vec![raw_row(&[("color", ""), ("note", "warm")])]);
    let report = controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);
    assert_eq!(report.ledger.keys(), vec!["swatches::0::color"]);

    let rows = stored_rows(&storage, "swatches");
    assert!(rows[0].get("color").is_none());
    assert_eq!(rows[0].get("note"), Some(&Value::from("warm")));
}

#[test]
fn keyed_reorder_is_not_reported_as_a_change() {
    let controller = controller(swatches_box());
    let mut storage = MemoryStorage::new();

    let rows = RawValue::List(vec![
        raw_row(&[("color", "red")]),
        raw_row(&[("color", "blue")]),
    ]);
    controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);

    let stored = stored_rows(&storage, "swatches");
    let key_of = |row: &Row| row.key().unwrap().to_string();

    // Resubmit swapped, carrying each row's key.
    let rows = RawValue::List(vec![
        raw_row(&[("color", "blue"), ("_key", &key_of(&stored[1]))]),
        raw_row(&[("color", "red"), ("_key", &key_of(&stored[0]))]),
    ]);
    let report = controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);

    assert!(report.ledger.is_empty(), "a pure reorder changes no content");

    let reordered = stored_rows(&storage, "swatches");
    assert_eq!(reordered[0].get("color"), Some(&Value::from("blue")));
    assert_eq!(reordered[1].get("color"), Some(&Value::from("red")));
}

#[test]
fn hidden_fields_render_after_all_visible_fields() {
    let controller = controller(
        BoxModel::new("layout", ObjectType::Post)
            .unwrap()
            .with_fields(vec![
                FieldModel::new("first", FieldType::TEXT).unwrap(),
                FieldModel::new("marker", FieldType::HIDDEN).unwrap(),
                FieldModel::new("second", FieldType::TEXT).unwrap(),
                FieldModel::new("tracer", FieldType::HIDDEN).unwrap(),
            ])
            .unwrap(),
    );

    let report = controller.render(&ctx(), &MemoryStorage::new());
    let html = report.markup.as_str();

    let positions: Vec<usize> = ["first", "second", "marker", "tracer"]
        .iter()
        .map(|id| html.find(&format!("name=\"{id}\"")).unwrap())
        .collect();

    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "hidden inputs must trail visible fields in original hidden order"
    );
}

#[test]
fn unknown_type_fails_in_isolation_on_save() {
    let controller = controller(
        BoxModel::new("mixed", ObjectType::Post)
            .unwrap()
            .with_fields(vec![
                FieldModel::new("before", FieldType::TEXT).unwrap(),
                FieldModel::new("exotic", FieldType::custom("wavelength")).unwrap(),
                FieldModel::new("after", FieldType::TEXT).unwrap(),
            ])
            .unwrap(),
    );
    let mut storage = MemoryStorage::new();

    let report = controller.save(
        &ctx(),
        &submission(&[
            ("before", RawValue::from("a")),
            ("exotic", RawValue::from("700nm")),
            ("after", RawValue::from("b")),
        ]),
        &mut storage,
    );

    assert!(matches!(
        report.status("exotic"),
        Some(SaveOutcome::Failed(err)) if err.is_unsupported()
    ));
    assert_eq!(storage.get(&ctx(), "before").unwrap(), Some(Value::from("a")));
    assert_eq!(storage.get(&ctx(), "after").unwrap(), Some(Value::from("b")));
    assert_eq!(storage.get(&ctx(), "exotic").unwrap(), None);
}

#[test]
fn group_renders_a_single_blank_row_floor() {
    let controller = controller(swatches_box());
    let mut storage = MemoryStorage::new();

    let report = controller.render(&ctx(), &storage);
    let html = report.markup.as_str();
    assert_eq!(html.matches("mbx-group-row").count(), 1);
    assert!(html.contains("class=\"mbx-remove-row\" disabled"));

    let rows = RawValue::List(vec![
        raw_row(&[("color", "red")]),
        raw_row(&[("color", "blue")]),
    ]);
    controller.save(&ctx(), &submission(&[("swatches", rows)]), &mut storage);

    let report = controller.render(&ctx(), &storage);
    let html = report.markup.as_str();
    assert_eq!(html.matches("mbx-group-row").count(), 2);
    assert!(!html.contains("mbx-remove-row\" disabled"));
}

#[test]
fn file_field_splits_url_and_attachment_id() {
    let controller = controller(
        BoxModel::new("media", ObjectType::Post)
            .unwrap()
            .with_field(FieldModel::new("shot", FieldType::FILE).unwrap())
            .unwrap(),
    );
    let mut storage = MemoryStorage::new();

    let report = controller.save(
        &ctx(),
        &submission(&[
            ("shot", RawValue::from("https://cdn.example/a.png")),
            ("shot_id", RawValue::from("41")),
        ]),
        &mut storage,
    );

    assert_eq!(report.status("shot"), Some(&SaveOutcome::Written));
    assert_eq!(
        storage.get(&ctx(), "shot").unwrap(),
        Some(Value::from("https://cdn.example/a.png"))
    );
    assert_eq!(storage.get(&ctx(), "shot_id").unwrap(), Some(Value::Int(41)));
    assert!(report.ledger.keys().contains(&"shot_id".to_owned()));
}

#[test]
fn rest_surface_honors_the_editable_set() {
    let controller = controller(
        BoxModel::new("profile", ObjectType::User)
            .unwrap()
            .with_fields(vec![
                FieldModel::new("open", FieldType::TEXT).unwrap(),
                FieldModel::new("sealed", FieldType::TEXT).unwrap().hide_from_rest(),
            ])
            .unwrap(),
    );
    let user = ObjectContext::new(7u64, ObjectType::User);
    let mut storage = MemoryStorage::new();

    controller
        .update_field(&user, "open", &RawValue::from("hi"), &mut storage)
        .unwrap();
    assert_eq!(
        controller.read_field(&user, "open", &storage).unwrap(),
        Value::from("hi")
    );

    assert!(
        controller
            .update_field(&user, "sealed", &RawValue::from("x"), &mut storage)
            .is_err()
    );
    assert!(controller.read_field(&user, "sealed", &storage).is_err());
}

#[test]
fn schema_exposes_group_children_in_declaration_order() {
    let controller = controller(swatches_box());

    let schema = controller.schema().unwrap();
    assert_eq!(schema["id"], serde_json::json!("appearance"));
    assert_eq!(schema["object_type"], serde_json::json!("post"));

    let group = &schema["fields"][0];
    assert_eq!(group["field_type"], serde_json::json!("group"));

    let children: Vec<&str> = group["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(children, vec!["color", "note"]);
}

#[test]
fn fields_saved_notification_carries_the_ledger() {
    #[derive(Default)]
    struct Capture(RefCell<Vec<Vec<String>>>);

    impl EventSink for Capture {
        fn emit(&self, event: &LifecycleEvent) {
            if let LifecycleEvent::FieldsSaved { ledger, .. } = event {
                self.0.borrow_mut().push(ledger.keys());
            }
        }
    }

    let sink = Rc::new(Capture::default());
    obs::set_sink(sink.clone());

    let controller = controller(
        BoxModel::new("noisy", ObjectType::Post)
            .unwrap()
            .with_field(FieldModel::new("color", FieldType::TEXT).unwrap())
            .unwrap(),
    );
    let mut storage = MemoryStorage::new();
    controller.save(
        &ctx(),
        &submission(&[("color", RawValue::from("red"))]),
        &mut storage,
    );

    obs::clear_sink();

    assert_eq!(*sink.0.borrow(), vec![vec!["color".to_owned()]]);
}

#[test]
fn registered_boxes_resolve_from_the_global_registry() {
    registry::register(controller(swatches_box()));

    let id = registry::with_box("appearance", |c| c.id().to_owned()).unwrap();
    assert_eq!(id, "appearance");

    let displaced = registry::register(controller(swatches_box()));
    assert!(displaced.is_some(), "re-registration displaces the previous box");
}
