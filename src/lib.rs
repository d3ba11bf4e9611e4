//! Falling-note rhythm game core: difficulty curves, pattern generation,
//! spawn scheduling, judgement and event-sourced replays.

pub mod database;
pub mod difficulty;
pub mod input;
pub mod logic;
pub mod models;
pub mod shared;
pub mod state;
