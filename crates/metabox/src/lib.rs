//! Metabox design layer: the builtin field type catalog and the base
//! sanitizer routines they compose, over the `metabox-core` runtime.

pub mod base;
pub mod types;

use metabox_core::handler::HandlerRegistry;

/// A handler registry with every builtin field type registered.
#[must_use]
pub fn defaults() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    types::register_defaults(&mut registry);

    registry
}

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use crate::defaults;
    pub use metabox_core::prelude::*;
}
