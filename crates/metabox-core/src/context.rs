use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ObjectType
///
/// Storage namespace tag. Selects which host storage table a box's values
/// land in; the host adapter maps each tag to its own metadata API.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Comment,
    Options,
    Post,
    Term,
    User,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Comment => "comment",
            Self::Options => "options",
            Self::Post => "post",
            Self::Term => "term",
            Self::User => "user",
        };

        write!(f, "{s}")
    }
}

///
/// ObjectId
///
/// Host-side identity of one object instance. Options pages get a synthetic
/// id from the host adapter.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

///
/// ObjectContext
///
/// The (id, type) pair a render or save pass is bound to. Callers always
/// pass this explicitly; the core never reads ambient request state.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ObjectContext {
    pub object_id: ObjectId,
    pub object_type: ObjectType,
}

impl ObjectContext {
    #[must_use]
    pub fn new(object_id: impl Into<ObjectId>, object_type: ObjectType) -> Self {
        Self {
            object_id: object_id.into(),
            object_type,
        }
    }
}

impl fmt::Display for ObjectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)
    }
}
