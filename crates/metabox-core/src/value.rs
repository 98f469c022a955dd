use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    sync::{LazyLock, Mutex},
};
use thiserror::Error as ThisError;
use ulid::Ulid;

///
/// Value
///
/// The storable value shape accepted by the storage collaborator.
/// Group values are `Rows`; everything else is scalar or a flat list.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Rows(Vec<Row>),
}

impl Value {
    /// Emptiness drives ledger removal entries and empty-row elision.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Rows(rows) => rows.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Consume into a row sequence; non-row values yield an empty sequence.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            _ => Vec::new(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::None
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                    first = false;
                }
                Ok(())
            }
            Self::Rows(rows) => write!(f, "[{} rows]", rows.len()),
        }
    }
}

///
/// Row
///
/// One instance of a group's repeated sub-field set. The key is assigned at
/// first persistence and identifies the row across later submissions.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<RowKey>,
    values: BTreeMap<String, Value>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key(mut self, key: RowKey) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub const fn key(&self) -> Option<RowKey> {
        self.key
    }

    pub fn set_key(&mut self, key: RowKey) {
        self.key = Some(key);
    }

    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    pub fn set(&mut self, field_id: impl Into<String>, value: Value) {
        self.values.insert(field_id.into(), value);
    }

    pub fn remove(&mut self, field_id: &str) -> Option<Value> {
        self.values.remove(field_id)
    }

    /// A row is empty when it retains no sub-values; the key alone does not count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            key: None,
            values: iter.into_iter().collect(),
        }
    }
}

///
/// RowKeyError
///

#[derive(Debug, ThisError)]
pub enum RowKeyError {
    #[error("monotonic error - overflow")]
    GeneratorOverflow,
}

///
/// RowKey
///
/// Stable per-row identity token. Generated monotonically so that keys
/// minted within one save pass preserve creation order.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct RowKey(Ulid);

static GENERATOR: LazyLock<Mutex<ulid::Generator>> =
    LazyLock::new(|| Mutex::new(ulid::Generator::new()));

impl RowKey {
    #[must_use]
    pub const fn nil() -> Self {
        Self(Ulid::nil())
    }

    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Generate a key from the global monotonic generator.
    /// Falls back to nil on generator overflow.
    #[must_use]
    pub fn generate() -> Self {
        Self::try_generate().unwrap_or_else(|_| Self::nil())
    }

    pub fn try_generate() -> Result<Self, RowKeyError> {
        let mut generator = GENERATOR.lock().expect("row key generator mutex poisoned");

        generator
            .generate()
            .map(Self)
            .map_err(|_| RowKeyError::GeneratorOverflow)
    }

    /// Parse a key from its canonical string form; nil and malformed input
    /// both yield `None` (a blank hidden input is not an identity claim).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match Ulid::from_string(s) {
            Ok(ulid) if !ulid.is_nil() => Some(Self(ulid)),
            _ => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// TESTS
///
