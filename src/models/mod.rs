//! Plain data types shared across the simulation, recorder and replays.

pub mod engine;
pub mod replay;
pub mod settings;
pub mod stats;
