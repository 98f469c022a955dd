use crate::{
    context::{ObjectContext, ObjectId, ObjectType},
    error::{ErrorClass, ErrorOrigin, InternalError},
    value::Value,
};
use derive_more::{Deref, DerefMut};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// StorageOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageOp {
    Get,
    Set,
    Delete,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "delete",
        };

        write!(f, "{s}")
    }
}

///
/// StorageError
///
/// Failure signaled by the host storage collaborator. Surfaced per-field by
/// the save pass; never aborts the remaining fields of a box.
///

#[derive(Clone, Debug, ThisError, Eq, PartialEq)]
#[error("storage {op} failed for '{key}': {message}")]
pub struct StorageError {
    pub op: StorageOp,
    pub key: String,
    pub message: String,
}

impl StorageError {
    pub fn new(op: StorageOp, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            op,
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<StorageError> for InternalError {
    fn from(err: StorageError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, err.to_string())
    }
}

///
/// Storage
///
/// The host object-storage boundary: keyed values on an (object, type)
/// pair. Values are structured (`Value` trees) so a group's row sequence
/// persists as one compound write.
///

pub trait Storage {
    fn get(&self, ctx: &ObjectContext, key: &str) -> Result<Option<Value>, StorageError>;

    fn set(&mut self, ctx: &ObjectContext, key: &str, value: Value) -> Result<(), StorageError>;

    fn delete(&mut self, ctx: &ObjectContext, key: &str) -> Result<(), StorageError>;
}

///
/// StorageKey
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StorageKey {
    object_type: ObjectType,
    object_id: ObjectId,
    field: String,
}

impl StorageKey {
    #[must_use]
    pub fn new(ctx: &ObjectContext, field: impl Into<String>) -> Self {
        Self {
            object_type: ctx.object_type,
            object_id: ctx.object_id,
            field: field.into(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.object_type, self.object_id, self.field)
    }
}

///
/// MemoryStorage
///
/// BTreeMap-backed storage for tests and demos. Keys order by
/// (object type, object id, field id) so dumps read grouped per object.
///

#[derive(Debug, Default, Deref, DerefMut)]
pub struct MemoryStorage(BTreeMap<StorageKey, Value>);

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, ctx: &ObjectContext, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.0.get(&StorageKey::new(ctx, key)).cloned())
    }

    fn set(&mut self, ctx: &ObjectContext, key: &str, value: Value) -> Result<(), StorageError> {
        self.0.insert(StorageKey::new(ctx, key), value);
        Ok(())
    }

    fn delete(&mut self, ctx: &ObjectContext, key: &str) -> Result<(), StorageError> {
        self.0.remove(&StorageKey::new(ctx, key));
        Ok(())
    }
}

///
/// TESTS
///
