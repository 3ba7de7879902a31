//! HTTP adapter for the health-tip board.

mod handlers;

pub use handlers::{current_tip, refresh_tip, tips_routes};
