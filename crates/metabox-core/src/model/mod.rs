pub mod field;
pub mod metabox;

pub use field::*;
pub use metabox::*;

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// ModelError
///
/// Invalid box/field configuration. Fatal at construction time; a box that
/// fails here is never registered.
///

#[derive(Debug, ThisError, Eq, PartialEq)]
#[remain::sorted]
pub enum ModelError {
    #[error("group '{group}' declares duplicate child id '{child}'")]
    DuplicateChildId { group: String, child: String },

    #[error("box declares duplicate field id '{0}'")]
    DuplicateFieldId(String),

    #[error("box id must be non-empty")]
    EmptyBoxId,

    #[error("field id must be non-empty")]
    EmptyFieldId,

    #[error("field '{0}' declares children but is not a group")]
    FieldsOnNonGroup(String),

    #[error("group '{group}' nests group child '{child}'")]
    NestedGroup { group: String, child: String },
}

impl ModelError {
    #[must_use]
    pub(crate) const fn class() -> ErrorClass {
        ErrorClass::Config
    }
}

impl From<ModelError> for InternalError {
    fn from(err: ModelError) -> Self {
        Self::new(ModelError::class(), ErrorOrigin::Model, err.to_string())
    }
}
