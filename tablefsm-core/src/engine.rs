//! Transition engine - owns the table and the current/previous state.
//!
//! Every public operation takes the engine's single mutex for its whole
//! duration. Reads and writes are serialized the same way, so a `setup`
//! that rebuilds the table is never observed half done. There is no
//! ordering between independent callers beyond that: two concurrent
//! `change_state` calls race for the current state. Use
//! [`TransitionEngine::change_state_from`] to advance only from a known state.

use crate::defaults::{
    CANCEL_CONDITION, CONDITIONS, CONTINUE_CONDITION, FINAL_STATE, INITIAL_STATE, STATES,
    TRANSITIONS,
};
use crate::description::{JsonCodec, TableCodec, TableDescription};
use crate::error::{CoreError, EntryKind, StateRole};
use crate::key::TransitionKey;
use crate::label::{Label, LabelSet};
use crate::snapshot::EngineSnapshot;
use crate::table::TransitionTable;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Identity of the entity an engine tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOwner {
    pub tenant_id: String,
    pub user_id: String,
}

impl EngineOwner {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Table and tracked states. Only ever touched with the engine lock held.
#[derive(Debug, Clone)]
struct Inner {
    states: LabelSet,
    conditions: LabelSet,
    transitions: TransitionTable,
    current: Label,
    previous: Label,
}

impl Inner {
    fn empty() -> Self {
        Self {
            states: LabelSet::new(),
            conditions: LabelSet::new(),
            transitions: TransitionTable::new(),
            current: Label::from(INITIAL_STATE),
            previous: Label::from(INITIAL_STATE),
        }
    }

    fn with_defaults() -> Self {
        let mut inner = Self::empty();
        inner.states = STATES.into_iter().map(Label::from).collect();
        inner.conditions = CONDITIONS.into_iter().map(Label::from).collect();
        for (source, condition, target) in TRANSITIONS {
            let key = TransitionKey::new(source, condition);
            inner.transitions.insert(key, Label::from(target));
        }
        inner
    }

    fn add_labels(
        set: &mut LabelSet,
        kind: EntryKind,
        names: Vec<Label>,
        ignore_existing: bool,
    ) -> Result<(), CoreError> {
        let existing = set.intersection(&names);
        if !existing.is_empty() && !ignore_existing {
            return Err(CoreError::DuplicateEntry {
                kind,
                names: existing.into_iter().map(Label::into_string).collect(),
            });
        }
        for name in names {
            set.insert(name);
        }
        Ok(())
    }

    /// Checks the parts of a transition in source, target, condition order.
    /// Returns the stored labels so table entries use the registered casing.
    fn validate(
        &mut self,
        source: &str,
        condition: &str,
        target: &str,
        create_target: bool,
    ) -> Result<(Label, Label, Label), CoreError> {
        let source = self
            .states
            .get(source)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                kind: EntryKind::State,
                name: source.to_string(),
            })?;

        let target = match self.states.get(target) {
            Some(label) => label.clone(),
            None if create_target => {
                let label = Label::checked(target)?;
                self.states.insert(label.clone());
                label
            }
            None => {
                return Err(CoreError::NotFound {
                    kind: EntryKind::State,
                    name: target.to_string(),
                })
            }
        };

        let condition = self
            .conditions
            .get(condition)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                kind: EntryKind::Condition,
                name: condition.to_string(),
            })?;

        Ok((source, condition, target))
    }

    fn set_transition(
        &mut self,
        source: &str,
        condition: &str,
        target: &str,
        replace: bool,
        create_target: bool,
    ) -> Result<(), CoreError> {
        let (source, condition, target) = self.validate(source, condition, target, create_target)?;
        let key = TransitionKey { state: source, condition };

        if self.transitions.contains_key(&key) && !replace {
            return Err(CoreError::DuplicateEntry {
                kind: EntryKind::Transition,
                names: vec![key.to_string()],
            });
        }
        self.transitions.insert(key, target);
        Ok(())
    }

    fn next_state(&self, condition: &str) -> Result<Label, CoreError> {
        let key = TransitionKey::new(self.current.clone(), condition);
        let next = self
            .transitions
            .get(&key)
            .cloned()
            .ok_or_else(|| CoreError::NoTransition {
                state: self.current.to_string(),
                condition: condition.to_string(),
            })?;
        tracing::trace!("lookup {} -> {}", key, next);
        Ok(next)
    }

    fn change_state(&mut self, condition: &str) -> Result<Label, CoreError> {
        let next = self.next_state(condition)?;
        self.previous = std::mem::replace(&mut self.current, next);
        tracing::debug!(
            "state changed: {} -> {} on '{}'",
            self.previous,
            self.current,
            condition
        );
        Ok(self.current.clone())
    }

    /// Stored label for `name` if registered, otherwise `name` itself.
    fn tracked_label(&self, name: &str) -> Result<Label, CoreError> {
        match self.states.get(name) {
            Some(label) => Ok(label.clone()),
            None => Label::checked(name),
        }
    }

    fn resolve_override(&self, role: StateRole, name: Option<&str>) -> Result<Option<Label>, CoreError> {
        let Some(name) = name else {
            return Ok(None);
        };
        self.states
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| CoreError::UnknownState {
                role,
                state: name.to_string(),
            })
    }
}

/// A finite state machine over a runtime transition table.
///
/// States and conditions are case-insensitive labels. A new engine carries
/// the default lifecycle from [`crate::defaults`] and starts in `Created`.
#[derive(Debug)]
pub struct TransitionEngine {
    inner: Mutex<Inner>,
    owner: Option<EngineOwner>,
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionEngine {
    /// Creates an engine with the default lifecycle.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::with_defaults()),
            owner: None,
        }
    }

    /// Creates an engine whose table is built from `description`.
    pub fn from_description(description: &TableDescription) -> Result<Self, CoreError> {
        let engine = Self::new();
        engine.setup(description, None, None)?;
        Ok(engine)
    }

    /// Rebuilds an engine from a snapshot taken with [`TransitionEngine::snapshot`].
    ///
    /// Unlike `setup`, no labels are created implicitly: every transition must
    /// refer to the snapshot's own states and conditions. The tracked states
    /// are taken as recorded, even when they are not registered.
    pub fn restore(snapshot: &EngineSnapshot) -> Result<Self, CoreError> {
        let mut inner = Inner::empty();
        let states = checked_labels(&snapshot.states)?;
        Inner::add_labels(&mut inner.states, EntryKind::State, states, false)?;
        let conditions = checked_labels(&snapshot.conditions)?;
        Inner::add_labels(&mut inner.conditions, EntryKind::Condition, conditions, false)?;

        for (key_text, target) in snapshot.transitions.iter() {
            let key = TransitionKey::parse(key_text)?;
            inner.set_transition(key.state.as_str(), key.condition.as_str(), target, false, false)?;
        }

        // Tracked states may be unregistered after `clear` or an unrelated
        // `setup`; those are kept as recorded.
        inner.current = inner.tracked_label(&snapshot.current_state)?;
        inner.previous = inner.tracked_label(&snapshot.previous_state)?;

        let engine = Self {
            inner: Mutex::new(inner),
            owner: snapshot.owner.clone(),
        };

        if !snapshot.checksum.is_empty() {
            let actual = engine.checksum()?;
            if actual != snapshot.checksum {
                return Err(CoreError::ChecksumMismatch {
                    expected: snapshot.checksum.clone(),
                    actual,
                });
            }
        }

        Ok(engine)
    }

    /// Attaches the identity of the tracked entity.
    pub fn with_owner(mut self, owner: EngineOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn owner(&self) -> Option<&EngineOwner> {
        self.owner.as_ref()
    }

    // =========================================================================
    // States and conditions
    // =========================================================================

    pub fn has_state(&self, name: &str) -> bool {
        self.inner.lock().states.contains(name)
    }

    pub fn has_condition(&self, name: &str) -> bool {
        self.inner.lock().conditions.contains(name)
    }

    /// Registers a state. Fails if a state with the same name (ignoring case)
    /// already exists.
    pub fn add_state(&self, name: &str) -> Result<(), CoreError> {
        self.add_states([name], false)
    }

    /// Registers several states.
    ///
    /// If any name is already registered and `ignore_existing` is false,
    /// nothing is inserted and the error lists the existing names.
    pub fn add_states<I>(&self, names: I, ignore_existing: bool) -> Result<(), CoreError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let names = checked_labels(names)?;
        let mut inner = self.inner.lock();
        Inner::add_labels(&mut inner.states, EntryKind::State, names, ignore_existing)
    }

    /// Registers a condition. Fails if it already exists (ignoring case).
    pub fn add_condition(&self, name: &str) -> Result<(), CoreError> {
        self.add_conditions([name], false)
    }

    /// Registers several conditions, with the same rules as [`Self::add_states`].
    pub fn add_conditions<I>(&self, names: I, ignore_existing: bool) -> Result<(), CoreError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let names = checked_labels(names)?;
        let mut inner = self.inner.lock();
        Inner::add_labels(&mut inner.conditions, EntryKind::Condition, names, ignore_existing)
    }

    /// Registered states, in insertion order.
    pub fn states(&self) -> Vec<String> {
        self.inner.lock().states.to_strings()
    }

    /// Registered conditions, in insertion order.
    pub fn conditions(&self) -> Vec<String> {
        self.inner.lock().conditions.to_strings()
    }

    // =========================================================================
    // Transition table
    // =========================================================================

    /// Defines the transition `source --condition--> target`.
    ///
    /// All three labels must already be registered. An existing transition for
    /// `(source, condition)` is overwritten only when `replace` is true.
    pub fn set_transition(
        &self,
        source: &str,
        condition: &str,
        target: &str,
        replace: bool,
    ) -> Result<(), CoreError> {
        self.inner
            .lock()
            .set_transition(source, condition, target, replace, false)
    }

    pub fn transition_count(&self) -> usize {
        self.inner.lock().transitions.len()
    }

    /// Replaces the whole table with `description`.
    ///
    /// States and conditions are taken from the description; target states
    /// are created as needed and repeated keys overwrite earlier ones. If the
    /// description is malformed nothing changes. Once the new table is in
    /// place, `current` and `previous` overrides must name states from it: an
    /// unknown override fails with [`CoreError::UnknownState`], keeps the new
    /// table and leaves the tracked states untouched.
    pub fn setup(
        &self,
        description: &TableDescription,
        current: Option<&str>,
        previous: Option<&str>,
    ) -> Result<bool, CoreError> {
        let mut inner = self.inner.lock();

        let mut staged = Inner::empty();
        for (key_text, target) in description.iter() {
            let key = TransitionKey::parse(key_text)?;
            let target = Label::checked(target)?;
            staged.states.insert(key.state.clone());
            staged.states.insert(target.clone());
            staged.conditions.insert(key.condition.clone());
            staged.set_transition(
                key.state.as_str(),
                key.condition.as_str(),
                target.as_str(),
                true,
                true,
            )?;
        }

        inner.states = staged.states;
        inner.conditions = staged.conditions;
        inner.transitions = staged.transitions;
        tracing::debug!(
            "table rebuilt: {} states, {} conditions, {} transitions",
            inner.states.len(),
            inner.conditions.len(),
            inner.transitions.len()
        );

        let current = inner.resolve_override(StateRole::Current, current)?;
        let previous = inner.resolve_override(StateRole::Previous, previous)?;
        if let Some(current) = current {
            inner.current = current;
        }
        if let Some(previous) = previous {
            inner.previous = previous;
        }
        Ok(true)
    }

    /// Decodes `text` with `codec` and calls [`Self::setup`].
    pub fn setup_from_str(
        &self,
        text: &str,
        codec: &dyn TableCodec,
        current: Option<&str>,
        previous: Option<&str>,
    ) -> Result<bool, CoreError> {
        let description = codec.decode(text)?;
        self.setup(&description, current, previous)
    }

    /// Empties states, conditions and transitions. The tracked current and
    /// previous states are left as they are.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.states.clear();
        inner.conditions.clear();
        inner.transitions.clear();
        tracing::debug!("table cleared");
    }

    // =========================================================================
    // Advancing
    // =========================================================================

    pub fn current_state(&self) -> String {
        self.inner.lock().current.to_string()
    }

    pub fn previous_state(&self) -> String {
        self.inner.lock().previous.to_string()
    }

    pub fn is_initial_state(&self) -> bool {
        self.inner.lock().current.matches(INITIAL_STATE)
    }

    pub fn is_final_state(&self) -> bool {
        self.inner.lock().current.matches(FINAL_STATE)
    }

    /// Returns the state `condition` leads to from the current state, without
    /// moving.
    pub fn next_state(&self, condition: &str) -> Result<String, CoreError> {
        self.inner.lock().next_state(condition).map(Label::into_string)
    }

    /// Moves along the `condition` transition and returns the new current
    /// state. On failure the tracked states are unchanged.
    pub fn change_state(&self, condition: &str) -> Result<String, CoreError> {
        self.inner.lock().change_state(condition).map(Label::into_string)
    }

    /// Like [`Self::change_state`], but only if the engine is currently in
    /// `expected`. The check and the move happen under one lock.
    pub fn change_state_from(&self, expected: &str, condition: &str) -> Result<String, CoreError> {
        let mut inner = self.inner.lock();
        if !inner.current.matches(expected) {
            return Err(CoreError::StateConflict {
                expected: expected.to_string(),
                actual: inner.current.to_string(),
            });
        }
        inner.change_state(condition).map(Label::into_string)
    }

    pub fn next(&self) -> Result<String, CoreError> {
        self.continue_transition()
    }

    pub fn continue_transition(&self) -> Result<String, CoreError> {
        self.change_state(CONTINUE_CONDITION)
    }

    pub fn cancel(&self) -> Result<String, CoreError> {
        self.change_state(CANCEL_CONDITION)
    }

    /// Conditions that have a transition out of `state`. Unknown and terminal
    /// states yield an empty list.
    pub fn conditions_from_state(&self, state: &str) -> Vec<String> {
        self.inner
            .lock()
            .transitions
            .conditions_from(state)
            .into_iter()
            .map(Label::into_string)
            .collect()
    }

    pub fn conditions_from_current(&self) -> Vec<String> {
        let inner = self.inner.lock();
        inner
            .transitions
            .conditions_from(inner.current.as_str())
            .into_iter()
            .map(Label::into_string)
            .collect()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// The table as a description, in table order.
    pub fn description(&self) -> TableDescription {
        self.inner.lock().transitions.to_description()
    }

    /// Canonical compact JSON form of the table.
    pub fn serialize(&self) -> Result<String, CoreError> {
        self.serialize_with(&JsonCodec::default())
    }

    pub fn serialize_with(&self, codec: &dyn TableCodec) -> Result<String, CoreError> {
        codec.encode(&self.description())
    }

    /// CRC32C of the canonical serialization, as 8 hex digits.
    pub fn checksum(&self) -> Result<String, CoreError> {
        let json = self.serialize()?;
        Ok(format!("{:08x}", crc32c::crc32c(json.as_bytes())))
    }

    /// Copies the full engine state.
    pub fn snapshot(&self) -> Result<EngineSnapshot, CoreError> {
        let inner = self.inner.lock().clone();
        let transitions = inner.transitions.to_description();
        let checksum = format!(
            "{:08x}",
            crc32c::crc32c(JsonCodec::default().encode(&transitions)?.as_bytes())
        );
        Ok(EngineSnapshot {
            current_state: inner.current.into_string(),
            previous_state: inner.previous.into_string(),
            states: inner.states.to_strings(),
            conditions: inner.conditions.to_strings(),
            transitions,
            owner: self.owner.clone(),
            checksum,
        })
    }
}

fn checked_labels<I>(names: I) -> Result<Vec<Label>, CoreError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| Label::checked(name.as_ref()))
        .collect()
}
