//! Property coverage for the sanitize pipeline: idempotence, declared
//! cardinality, and storage round-trips.

use metabox::defaults;
use metabox_core::{
    context::{ObjectContext, ObjectType},
    controller::BoxController,
    model::{BoxModel, FieldModel, FieldType},
    raw::{RawMap, RawValue},
    resolve::resolve,
    sanitize::SanitizeCx,
    storage::MemoryStorage,
    value::Value,
};
use proptest::prelude::*;
use std::sync::Arc;

fn sanitize_text(raw: &str) -> Value {
    let registry = defaults();
    let field = FieldModel::new("probe", FieldType::TEXT).unwrap();

    registry
        .sanitize(&SanitizeCx::empty(), &field, &RawValue::from(raw))
        .unwrap()
        .value
}

proptest! {
    #[test]
    fn text_sanitize_is_idempotent(s in ".*") {
        let once = sanitize_text(&s);
        let twice = sanitize_text(&once.to_string());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn multicheck_output_is_always_list_cardinality(
        items in proptest::collection::vec("[a-z]{1,8}", 0..5),
        scalar in "[a-z]{1,8}",
    ) {
        let registry = defaults();
        let field = FieldModel::new("tags", FieldType::MULTICHECK).unwrap();

        let raw = RawValue::List(items.iter().map(|s| RawValue::from(s.as_str())).collect());
        let from_seq = registry.sanitize(&SanitizeCx::empty(), &field, &raw).unwrap();
        prop_assert!(matches!(from_seq.value, Value::List(_)));

        let from_scalar = registry
            .sanitize(&SanitizeCx::empty(), &field, &RawValue::from(scalar.as_str()))
            .unwrap();
        prop_assert!(matches!(from_scalar.value, Value::List(_)));
    }

    #[test]
    fn canonical_dates_pass_through_unchanged(
        year in 1970i32..2100,
        month in 1u8..=12,
        day in 1u8..=28,
    ) {
        let registry = defaults();
        let field = FieldModel::new("when", FieldType::TEXT_DATE).unwrap();
        let canonical = format!("{year:04}-{month:02}-{day:02}");

        let outcome = registry
            .sanitize(&SanitizeCx::empty(), &field, &RawValue::from(canonical.as_str()))
            .unwrap();

        prop_assert_eq!(outcome.value, Value::Text(canonical));
    }

    #[test]
    fn scalar_save_then_resolve_yields_the_sanitized_form(s in "[ -~]{0,40}") {
        let controller = BoxController::new(
            BoxModel::new("probe", ObjectType::Post)
                .unwrap()
                .with_field(FieldModel::new("headline", FieldType::TEXT).unwrap())
                .unwrap(),
            Arc::new(defaults()),
        );
        let ctx = ObjectContext::new(1u64, ObjectType::Post);
        let mut storage = MemoryStorage::new();

        let field = FieldModel::new("headline", FieldType::TEXT).unwrap();
        let accepted = defaults()
            .sanitize(&SanitizeCx::empty(), &field, &RawValue::from(s.as_str()))
            .unwrap()
            .value;

        let mut submission = RawMap::new();
        submission.insert("headline".to_owned(), RawValue::from(s.as_str()));
        controller.save(&ctx, &submission, &mut storage);

        let resolved = resolve(&field, &ctx, &storage).unwrap();

        if accepted.is_empty() {
            prop_assert!(resolved.is_empty(), "empty accepted values are never stored");
        } else {
            prop_assert_eq!(resolved, accepted);
        }
    }
}
