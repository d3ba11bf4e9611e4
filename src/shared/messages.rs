//! Notifications published by the replay engine.

use crate::models::replay::GameEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayNotification {
    /// The playback clock moved to a new frame.
    UpdateFrame { frame: u64, time_ms: f64 },
    /// A recorded event was applied during playback.
    EventApplied(GameEvent),
    /// State was rebuilt at `frame` by a seek.
    Seeked { frame: u64 },
    Paused,
    /// Playback reached the last recorded frame.
    Finished,
}
