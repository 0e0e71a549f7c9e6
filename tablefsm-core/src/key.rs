//! Transition keys.

use crate::error::CoreError;
use crate::label::Label;
use std::fmt;

/// Separator between source state and condition in key text.
pub const SEPARATOR: char = '-';

/// Lookup key of the transition table: a source state and a condition.
///
/// Equality and hashing ignore case on both parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionKey {
    pub state: Label,
    pub condition: Label,
}

impl TransitionKey {
    pub fn new(state: impl Into<Label>, condition: impl Into<Label>) -> Self {
        Self {
            state: state.into(),
            condition: condition.into(),
        }
    }

    /// Parses `"{state}-{condition}"` key text.
    ///
    /// The text must contain exactly one separator with a non-empty label on
    /// each side. Anything else is rejected rather than guessed at.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidKey {
            key: text.to_string(),
            reason: reason.to_string(),
        };

        let (state, condition) = text
            .split_once(SEPARATOR)
            .ok_or_else(|| invalid("missing separator"))?;
        if condition.contains(SEPARATOR) {
            return Err(invalid("more than one separator"));
        }

        let state = Label::checked(state).map_err(|_| invalid("empty source state"))?;
        let condition = Label::checked(condition).map_err(|_| invalid("empty condition"))?;
        Ok(Self { state, condition })
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.state, SEPARATOR, self.condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_joins_with_separator() {
        let key = TransitionKey::new("Created", "Run");
        assert_eq!(key.to_string(), "Created-Run");
    }

    #[test]
    fn test_equality() {
        let a = TransitionKey::new("Created", "Run");
        assert_eq!(a, TransitionKey::new("Created", "Run"));
        assert_eq!(a, TransitionKey::new("CREATED", "run"));
        assert_ne!(a, TransitionKey::new("Created", "Continue"));
        assert_ne!(
            TransitionKey::new("InternalErrorState", "Continue"),
            TransitionKey::new("Created", "Continue")
        );
    }

    #[test]
    fn test_case_variants_collapse_in_hash_set() {
        let keys: HashSet<_> = [
            TransitionKey::new("Running", "Cancel"),
            TransitionKey::new("running", "cancel"),
            TransitionKey::new("RUNNING", "CANCEL"),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_parse() {
        let key = TransitionKey::parse("Stopped-Run").unwrap();
        assert_eq!(key.state.as_str(), "Stopped");
        assert_eq!(key.condition.as_str(), "Run");
    }

    #[test]
    fn test_parse_rejects_ambiguous_keys() {
        for text in ["A-B-C", "NoSeparator", "-Run", "Stopped-", "  -Run"] {
            assert!(
                matches!(TransitionKey::parse(text), Err(CoreError::InvalidKey { .. })),
                "{} should be rejected",
                text
            );
        }
    }
}
