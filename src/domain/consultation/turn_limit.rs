//! Maximum-turn policy.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Cap on genuine interview turns before the report is forced.
///
/// "No cap" is the unreachable sentinel `u32::MAX`, so the controller always
/// runs the same comparison whatever the policy is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnLimit(u32);

impl TurnLimit {
    /// The model decides when to stop; the counter can never reach this.
    pub const UNLIMITED: TurnLimit = TurnLimit(u32::MAX);

    /// Creates a finite cap.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if `max` is zero or collides with the sentinel
    pub fn capped(max: u32) -> Result<Self, ValidationError> {
        if max == 0 || max == u32::MAX {
            return Err(ValidationError::invalid_format(
                "max_turns",
                format!("must be between 1 and {}", u32::MAX - 1),
            ));
        }
        Ok(Self(max))
    }

    /// Builds a limit from an optional configured value.
    pub fn from_config(max: Option<u32>) -> Result<Self, ValidationError> {
        match max {
            Some(max) => Self::capped(max),
            None => Ok(Self::UNLIMITED),
        }
    }

    /// Returns true once `turn_count` has reached the cap.
    pub fn is_reached(&self, turn_count: u32) -> bool {
        turn_count >= self.0
    }

    /// Returns the finite cap, if any.
    pub fn as_option(&self) -> Option<u32> {
        (!self.is_unlimited()).then_some(self.0)
    }

    /// Returns true for the sentinel.
    pub fn is_unlimited(&self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for TurnLimit {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_limit_is_reached_at_max() {
        let limit = TurnLimit::capped(5).unwrap();
        assert!(!limit.is_reached(4));
        assert!(limit.is_reached(5));
        assert!(limit.is_reached(6));
    }

    #[test]
    fn unlimited_is_never_reached_by_a_saturating_counter() {
        let limit = TurnLimit::UNLIMITED;
        assert!(!limit.is_reached(0));
        assert!(!limit.is_reached(10_000));
        assert!(!limit.is_reached(u32::MAX - 1));
    }

    #[test]
    fn zero_cap_is_rejected() {
        assert!(TurnLimit::capped(0).is_err());
    }

    #[test]
    fn sentinel_cap_is_rejected() {
        assert!(TurnLimit::capped(u32::MAX).is_err());
    }

    #[test]
    fn from_config_maps_none_to_unlimited() {
        assert_eq!(TurnLimit::from_config(None).unwrap(), TurnLimit::UNLIMITED);
        assert_eq!(TurnLimit::from_config(Some(8)).unwrap().as_option(), Some(8));
    }

    #[test]
    fn unlimited_has_no_finite_value() {
        assert_eq!(TurnLimit::UNLIMITED.as_option(), None);
        assert!(TurnLimit::default().is_unlimited());
    }
}
