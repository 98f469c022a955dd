use crate::{
    context::ObjectContext,
    model::FieldModel,
    storage::{Storage, StorageError},
    value::Value,
};

///
/// resolve
/// Pure read-through with defaulting: fetch the stored value for one field
/// and shape it for its descriptor. No validation, no writes.
///
/// - group fields always yield `Rows` (absent ⇒ empty sequence);
/// - repeatable fields always yield `List`, each element independently
///   defaulted; a stray stored scalar is lifted into a one-element list;
/// - scalars fall back to the configured default, then to `None`.
///
pub fn resolve(
    field: &FieldModel,
    ctx: &ObjectContext,
    storage: &dyn Storage,
) -> Result<Value, StorageError> {
    let stored = storage.get(ctx, field.id())?;

    if field.is_group() {
        let rows = stored.map(Value::into_rows).unwrap_or_default();
        return Ok(Value::Rows(rows));
    }

    if field.options().repeatable {
        let items = match stored {
            Some(Value::List(items)) => items,
            Some(v) if !v.is_empty() => vec![v],
            _ => Vec::new(),
        };

        let items = items
            .into_iter()
            .map(|item| apply_default(field, item))
            .collect();

        return Ok(Value::List(items));
    }

    Ok(apply_default(field, stored.unwrap_or_default()))
}

fn apply_default(field: &FieldModel, value: Value) -> Value {
    if value.is_empty() {
        if let Some(default) = &field.options().default {
            return default.clone();
        }
    }

    value
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::ObjectType,
        model::FieldType,
        storage::MemoryStorage,
        value::Row,
    };

    fn ctx() -> ObjectContext {
        ObjectContext::new(3u64, ObjectType::Post)
    }

    #[test]
    fn absent_scalar_falls_back_to_default_then_none() {
        let storage = MemoryStorage::new();

        let plain = FieldModel::new("color", FieldType::TEXT).unwrap();
        assert_eq!(resolve(&plain, &ctx(), &storage).unwrap(), Value::None);

        let defaulted = plain.clone().with_default("red");
        assert_eq!(
            resolve(&defaulted, &ctx(), &storage).unwrap(),
            Value::from("red")
        );
    }

    #[test]
    fn stored_value_wins_over_default() {
        let mut storage = MemoryStorage::new();
        storage.set(&ctx(), "color", Value::from("blue")).unwrap();

        let field = FieldModel::new("color", FieldType::TEXT)
            .unwrap()
            .with_default("red");

        assert_eq!(resolve(&field, &ctx(), &storage).unwrap(), Value::from("blue"));
    }

    #[test]
    fn absent_group_yields_an_empty_row_sequence() {
        let storage = MemoryStorage::new();
        let group = FieldModel::new("swatches", FieldType::GROUP).unwrap();

        assert_eq!(resolve(&group, &ctx(), &storage).unwrap(), Value::Rows(vec![]));
    }

    #[test]
    fn malformed_stored_group_value_degrades_to_empty_rows() {
        let mut storage = MemoryStorage::new();
        storage.set(&ctx(), "swatches", Value::from("oops")).unwrap();

        let group = FieldModel::new("swatches", FieldType::GROUP).unwrap();
        assert_eq!(resolve(&group, &ctx(), &storage).unwrap(), Value::Rows(vec![]));
    }

    #[test]
    fn repeatable_lifts_a_stray_scalar_and_defaults_empty_elements() {
        let mut storage = MemoryStorage::new();
        storage.set(&ctx(), "tag", Value::from("solo")).unwrap();

        let field = FieldModel::new("tag", FieldType::TEXT).unwrap().repeatable();
        assert_eq!(
            resolve(&field, &ctx(), &storage).unwrap(),
            Value::List(vec![Value::from("solo")])
        );

        storage
            .set(
                &ctx(),
                "tag",
                Value::List(vec![Value::from("a"), Value::None]),
            )
            .unwrap();
        let field = field.with_default("fallback");
        assert_eq!(
            resolve(&field, &ctx(), &storage).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("fallback")])
        );
    }

    #[test]
    fn stored_rows_pass_through_untouched() {
        let mut storage = MemoryStorage::new();
        let mut row = Row::new();
        row.set("color", Value::from("red"));
        storage
            .set(&ctx(), "swatches", Value::Rows(vec![row.clone()]))
            .unwrap();

        let group = FieldModel::new("swatches", FieldType::GROUP).unwrap();
        assert_eq!(
            resolve(&group, &ctx(), &storage).unwrap(),
            Value::Rows(vec![row])
        );
    }
}
