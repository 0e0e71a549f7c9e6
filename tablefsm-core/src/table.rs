//! Transition table storage.

use crate::description::TableDescription;
use crate::key::TransitionKey;
use crate::label::Label;
use std::collections::HashMap;

/// Mapping of `(state, condition)` to target state.
///
/// Entries iterate in insertion order. Overwriting an existing key keeps the
/// entry at its original position, so a table built by the same sequence of
/// calls always serializes identically.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: Vec<(TransitionKey, Label)>,
    index: HashMap<TransitionKey, usize>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TransitionKey) -> Option<&Label> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &TransitionKey) -> bool {
        self.index.contains_key(key)
    }

    /// Sets the target for `key`, returning the previous target if the key
    /// was already present.
    pub fn insert(&mut self, key: TransitionKey, target: Label) -> Option<Label> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, target));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, target));
        None
    }

    /// Conditions with a transition out of `state`.
    pub fn conditions_from(&self, state: &str) -> Vec<Label> {
        self.entries
            .iter()
            .filter(|(key, _)| key.state.matches(state))
            .map(|(key, _)| key.condition.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &Label)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Converts the table to its textual description.
    pub fn to_description(&self) -> TableDescription {
        self.iter()
            .map(|(key, target)| (key.to_string(), target.as_str().to_string()))
            .collect()
    }
}
