pub mod choice;
pub mod date;
pub mod file;
pub mod group;
pub mod oembed;
pub mod taxonomy;
pub mod text;

use metabox_core::{handler::HandlerRegistry, raw::RawValue};
use std::sync::Arc;

/// Register every builtin type handler into a registry.
pub fn register_defaults(registry: &mut HandlerRegistry) {
    registry.register(Arc::new(text::Text));
    registry.register(Arc::new(text::Textarea));
    registry.register(Arc::new(text::Hidden));
    registry.register(Arc::new(text::Title));
    registry.register(Arc::new(choice::Select));
    registry.register(Arc::new(choice::Radio));
    registry.register(Arc::new(choice::Checkbox));
    registry.register(Arc::new(choice::Multicheck));
    registry.register(Arc::new(date::Date));
    registry.register(Arc::new(date::Datetime));
    registry.register(Arc::new(file::File));
    registry.register(Arc::new(oembed::Oembed));
    registry.register(Arc::new(taxonomy::TaxonomySelect));
    registry.register(Arc::new(taxonomy::TaxonomyRadio));
    registry.register(Arc::new(taxonomy::TaxonomyMulticheck));
    registry.register(Arc::new(group::Group));
}

/// Scalar view of a raw value for single-cardinality routines: a sequence
/// degrades to its first element with a note, a map to nothing.
pub(crate) fn scalar_text(raw: &RawValue) -> (Option<String>, Option<String>) {
    match raw {
        RawValue::Absent => (None, None),
        RawValue::Text(s) => (Some(s.clone()), None),
        RawValue::List(items) => {
            let first = items.iter().find_map(RawValue::as_text).map(ToOwned::to_owned);
            (first, Some("expected a single value, got a sequence".to_owned()))
        }
        RawValue::Map(_) => (None, Some("expected a scalar, got a map".to_owned())),
    }
}
