//! Simulation building blocks driven by `state::GameSession`, plus replay
//! playback.

pub mod autoplay;
pub mod pattern;
pub mod recorder;
pub mod replay_engine;
pub mod spawner;
