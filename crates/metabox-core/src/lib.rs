//! Core runtime for Metabox: the value and descriptor models, the handler
//! dispatch registry, the group reconciler, box controllers, and the
//! ergonomics exported via the `prelude`.

// public exports are one module level down
pub mod context;
pub mod controller;
pub mod error;
pub mod escape;
pub mod handler;
pub mod ledger;
pub mod model;
pub mod obs;
pub mod raw;
pub mod reconcile;
pub mod registry;
pub mod resolve;
pub mod sanitize;
pub mod storage;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, registries, storage backends, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        context::{ObjectContext, ObjectId, ObjectType},
        controller::BoxController,
        model::{BoxModel, FieldModel, FieldType},
        raw::{RawMap, RawValue},
        value::{Row, RowKey, Value},
    };
}
