//! Checked transitions for lifecycle enums such as the consultation `Stage`.

use super::ValidationError;

/// A lifecycle enum whose moves are validated against a transition table.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// True if `target` is reachable from `self` in one step.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Moves to `target`, or fails with an `invalid_format` error naming both ends.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }
}
