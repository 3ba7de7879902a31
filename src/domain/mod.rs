//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `consultation` - Session aggregate, transcript and interview rules
//! - `tips` - Wellness tip topics and fallbacks

pub mod consultation;
pub mod foundation;
pub mod tips;
