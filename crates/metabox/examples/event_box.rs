//! Wire up an "event details" box, render it, push one submission through
//! the save pipeline, and dump what landed in storage.

use metabox::prelude::*;
use metabox_core::{registry, storage::MemoryStorage};
use std::sync::Arc;

fn main() {
    let registry_handlers = Arc::new(defaults());

    let model = BoxModel::new("event_details", ObjectType::Post)
        .expect("box id is non-empty")
        .with_fields(vec![
            FieldModel::new("headline", FieldType::TEXT)
                .expect("field id is non-empty")
                .with_description("Shown above the fold."),
            FieldModel::new("event_date", FieldType::TEXT_DATE)
                .expect("field id is non-empty")
                .with_date_format("[month]/[day]/[year]"),
            FieldModel::new("speakers", FieldType::GROUP)
                .expect("field id is non-empty")
                .with_fields(vec![
                    FieldModel::new("name", FieldType::TEXT).expect("field id is non-empty"),
                    FieldModel::new("photo", FieldType::FILE).expect("field id is non-empty"),
                ])
                .expect("group children are valid"),
        ])
        .expect("field ids are unique");

    registry::register(BoxController::new(model, registry_handlers));

    let ctx = ObjectContext::new(1001u64, ObjectType::Post);
    let mut storage = MemoryStorage::new();

    let mut submission = RawMap::new();
    submission.insert("headline".into(), RawValue::from("  RustConf Warmup  "));
    submission.insert("event_date".into(), RawValue::from("09/14/2026"));
    submission.insert(
        "speakers".into(),
        RawValue::List(vec![
            RawValue::from([
                ("name", RawValue::from("Ada")),
                ("photo", RawValue::from("https://cdn.example/ada.png")),
            ]),
            RawValue::from([("name", RawValue::from(""))]),
        ]),
    );

    registry::with_box("event_details", |controller| {
        let report = controller.save(&ctx, &submission, &mut storage);
        println!("changed: {:?}", report.ledger.keys());

        let form = controller.render(&ctx, &storage);
        println!("form bytes: {}", form.markup.as_str().len());
    })
    .expect("box was registered above");

    for (key, value) in storage.iter() {
        println!("{key} = {value}");
    }
}
