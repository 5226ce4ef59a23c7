//! State module for tracking a crawl session
//!
//! # Components
//!
//! - `SessionState`: lifecycle of a session (idle, running, paused, completed, ...)
//! - `CrawlControl`: cooperative pause and cancel flags shared with the traversal

mod control;
mod session_state;

// Re-export main types
pub use control::{CrawlControl, Gate};
pub use session_state::SessionState;
