//! Case-insensitive labels for states and conditions.
//!
//! Labels compare and hash on their lowercase folding, so `Running`,
//! `running` and `RUNNING` are the same label. The text a label was
//! created with is kept for display and serialization.

use crate::error::CoreError;
use crate::key::SEPARATOR;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A state or condition name.
///
/// Folding lowercases each character on its own (`char::to_lowercase`), so
/// `Ärger` matches `ÄRGER` but `Straße` does not match `STRASSE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a label, rejecting names that cannot appear in a transition key.
    pub fn checked(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidLabel {
                label: name,
                reason: "label must not be empty".to_string(),
            });
        }
        if name.contains(SEPARATOR) {
            return Err(CoreError::InvalidLabel {
                label: name,
                reason: format!("label must not contain the separator '{}'", SEPARATOR),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns true if `other` names the same label, ignoring case.
    pub fn matches(&self, other: &str) -> bool {
        folded(&self.0).eq(folded(other))
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in folded(&self.0) {
            c.hash(state);
        }
        // Terminator keeps ("ab", "c") and ("a", "bc") apart inside composite keys.
        state.write_u8(0xff);
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        folded(&self.0).cmp(folded(&other.0))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.matches(other)
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self.matches(other)
    }
}

/// Insertion-ordered set of labels with case-insensitive membership.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    order: Vec<Label>,
    members: HashSet<Label>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a label. Returns false (and keeps the stored casing) if an
    /// equal label is already present.
    pub fn insert(&mut self, label: Label) -> bool {
        if self.members.insert(label.clone()) {
            self.order.push(label);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(&Label::from(name))
    }

    /// Returns the stored label equal to `name`.
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.members.get(&Label::from(name))
    }

    /// Returns the stored labels that match any of `names`, without repeats.
    pub fn intersection<'a, I>(&self, names: I) -> Vec<Label>
    where
        I: IntoIterator<Item = &'a Label>,
    {
        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter_map(|name| self.members.get(name))
            .filter(|stored| seen.insert((*stored).clone()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Returns the labels as plain strings, in insertion order.
    pub fn to_strings(&self) -> Vec<String> {
        self.order.iter().map(|l| l.as_str().to_string()).collect()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}
