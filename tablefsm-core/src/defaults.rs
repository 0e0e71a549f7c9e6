//! Canonical lifecycle installed on every new engine.
//!
//! `Continue` walks Created, Running, Completed, Disposed. `Cancel` from
//! Running leads to Cancelled; from Created, Completed and Cancelled it leads
//! to InternalErrorState. InternalErrorState can only continue to Disposed,
//! and Disposed has no outgoing transitions.

pub const INITIAL_STATE: &str = "Created";
pub const RUNNING_STATE: &str = "Running";
pub const COMPLETED_STATE: &str = "Completed";
pub const CANCELLED_STATE: &str = "Cancelled";
pub const ERROR_STATE: &str = "InternalErrorState";
pub const FINAL_STATE: &str = "Disposed";

pub const CONTINUE_CONDITION: &str = "Continue";
pub const CANCEL_CONDITION: &str = "Cancel";

/// Default states, in installation order.
pub const STATES: [&str; 6] = [
    INITIAL_STATE,
    RUNNING_STATE,
    COMPLETED_STATE,
    CANCELLED_STATE,
    ERROR_STATE,
    FINAL_STATE,
];

/// Default conditions, in installation order.
pub const CONDITIONS: [&str; 2] = [CONTINUE_CONDITION, CANCEL_CONDITION];

/// Default `(source, condition, target)` transitions, in installation order.
pub const TRANSITIONS: [(&str, &str, &str); 9] = [
    (INITIAL_STATE, CONTINUE_CONDITION, RUNNING_STATE),
    (INITIAL_STATE, CANCEL_CONDITION, ERROR_STATE),
    (RUNNING_STATE, CONTINUE_CONDITION, COMPLETED_STATE),
    (RUNNING_STATE, CANCEL_CONDITION, CANCELLED_STATE),
    (COMPLETED_STATE, CONTINUE_CONDITION, FINAL_STATE),
    (COMPLETED_STATE, CANCEL_CONDITION, ERROR_STATE),
    (CANCELLED_STATE, CONTINUE_CONDITION, FINAL_STATE),
    (CANCELLED_STATE, CANCEL_CONDITION, ERROR_STATE),
    (ERROR_STATE, CONTINUE_CONDITION, FINAL_STATE),
];
