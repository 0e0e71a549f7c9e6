//! # tablefsm-core
//!
//! Embeddable finite state machine over a runtime transition table.
//!
//! This crate provides:
//! - Case-insensitive state and condition labels
//! - The transition table and its textual description
//! - A thread-safe engine tracking one entity's current and previous state
//! - The default Created/Running/Completed/Cancelled/Disposed lifecycle

pub mod defaults;
pub mod description;
pub mod engine;
pub mod error;
pub mod key;
pub mod label;
pub mod snapshot;
pub mod table;

pub use description::{JsonCodec, TableCodec, TableDescription};
pub use engine::{EngineOwner, TransitionEngine};
pub use error::{CoreError, EntryKind, StateRole};
pub use key::{TransitionKey, SEPARATOR};
pub use label::{Label, LabelSet};
pub use snapshot::EngineSnapshot;
pub use table::TransitionTable;
