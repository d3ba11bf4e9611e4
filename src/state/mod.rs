//! State management module.
//!
//! - `GameSession` - a live, recorded play session
//!
//! States implement common traits for snapshots, updates, and action handling.

pub mod game;
pub mod traits;

pub use game::GameSession;
pub use traits::{EndReason, HandleAction, Snapshot, Transition, Update};
