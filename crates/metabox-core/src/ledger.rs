use derive_more::{Deref, DerefMut};
use std::fmt;

///
/// ChangeKey
///
/// Identity of one changed value inside a save pass: a plain field, or a
/// `group::rowIndex::child` tuple for group sub-fields. Row index is the
/// submitted position, matching the wire layout the client sent.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChangeKey {
    Field(String),
    GroupSub {
        group: String,
        row: usize,
        child: String,
    },
}

impl ChangeKey {
    #[must_use]
    pub fn field(id: impl Into<String>) -> Self {
        Self::Field(id.into())
    }

    #[must_use]
    pub fn group_sub(group: impl Into<String>, row: usize, child: impl Into<String>) -> Self {
        Self::GroupSub {
            group: group.into(),
            row,
            child: child.into(),
        }
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(id) => write!(f, "{id}"),
            Self::GroupSub { group, row, child } => write!(f, "{group}::{row}::{child}"),
        }
    }
}

///
/// Ledger
///
/// Per-save-pass record of changed field identities. Records successes
/// only: a value that failed to persist never lands here. Reset at the
/// start of every save pass; carried on the fields-saved notification.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq)]
pub struct Ledger(Vec<ChangeKey>);

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: ChangeKey) {
        self.0.push(key);
    }

    pub fn extend(&mut self, keys: impl IntoIterator<Item = ChangeKey>) {
        self.0.extend(keys);
    }

    /// Rendered keys in recorded order, for notification payloads.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_sub_keys_render_the_wire_form() {
        let key = ChangeKey::group_sub("swatches", 0, "color");
        assert_eq!(key.to_string(), "swatches::0::color");
    }

    #[test]
    fn ledger_preserves_record_order() {
        let mut ledger = Ledger::new();
        ledger.record(ChangeKey::field("b"));
        ledger.record(ChangeKey::field("a"));

        assert_eq!(ledger.keys(), vec!["b", "a"]);
    }
}
