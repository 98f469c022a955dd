use std::collections::BTreeMap;

/// Field-id keyed raw submission payload (one form, or one group row).
pub type RawMap = BTreeMap<String, RawValue>;

///
/// RawValue
///
/// The liberal input shape handed over by the form layer. Anything the
/// decoder produced is representable; sanitizers normalize from here and
/// degrade on structural surprises instead of failing.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Absent,
    Text(String),
    List(Vec<RawValue>),
    Map(RawMap),
}

impl RawValue {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Scalar view: text passes through, everything else is `None`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Sequence view used by multi-value sanitizers: a scalar is treated as
    /// a one-element sequence, `Absent` as an empty one.
    #[must_use]
    pub fn as_sequence(&self) -> Vec<&RawValue> {
        match self {
            Self::Absent => Vec::new(),
            Self::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Row view for group submissions: a list of maps. A bare map is one
    /// row; any other shape is no rows.
    #[must_use]
    pub fn as_rows(&self) -> Vec<&RawMap> {
        match self {
            Self::List(items) => items.iter().filter_map(Self::as_map).collect(),
            Self::Map(map) => vec![map],
            _ => Vec::new(),
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        Self::Absent
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<const N: usize> From<[(&str, RawValue); N]> for RawValue {
    fn from(entries: [(&str, RawValue); N]) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        )
    }
}

///
/// TESTS
///
