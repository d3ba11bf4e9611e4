//! Playfield geometry and clock constants shared by the simulation and replays.

/// Number of lanes (one per input key).
pub const NUM_COLUMNS: usize = 5;

/// X coordinate of each lane's center.
pub const LANE_X: [f32; NUM_COLUMNS] = [-2.0, -1.0, 0.0, 1.0, 2.0];

/// Fixed height of the note plane.
pub const NOTE_Y: f32 = 0.0;

/// Notes are judged against this depth.
pub const HIT_LINE_Z: f64 = 0.0;
/// Depth at which new notes appear.
pub const SPAWN_Z: f64 = -30.0;
/// Notes past this depth are off-screen and collected.
pub const DESPAWN_Z: f64 = 6.0;

/// Base travel speed in z units per second before the speed multiplier.
pub const BASE_SPEED: f64 = 12.0;
/// Per-second base speed ramp, scaled by the speed multiplier.
pub const SPEED_RAMP_PER_SEC: f64 = 0.05;

/// Tempo before the curve's BPM multiplier.
pub const BASE_BPM: f64 = 120.0;

/// Fixed replay frame rate.
pub const FRAMES_PER_SECOND: f64 = 60.0;
/// A keyframe is captured every this many frames while recording.
pub const KEYFRAME_INTERVAL: u64 = 300;

/// Holds longer than this (in z units) are held rather than tapped.
pub const HOLD_THRESHOLD: f64 = 0.5;

/// Health bounds.
pub const MAX_HEALTH: f64 = 100.0;

/// Seconds a hit note takes to fade out.
pub const HIT_FADE_SECS: f64 = 0.3;
/// Seconds a missed note takes to fade out.
pub const MISS_FADE_SECS: f64 = 0.8;
/// Upward drift of a hit note while fading (units per second).
pub const HIT_DRIFT_PER_SEC: f32 = 1.5;

/// Transient feedback labels are cleared after this many seconds.
pub const FEEDBACK_DURATION: f64 = 0.4;

/// Converts a frame index to milliseconds on the fixed replay clock.
#[inline]
pub fn frame_to_ms(frame: u64) -> f64 {
    frame as f64 * 1000.0 / FRAMES_PER_SECOND
}

/// Converts milliseconds to the frame that contains them.
#[inline]
pub fn ms_to_frame(ms: f64) -> u64 {
    if ms <= 0.0 {
        0
    } else {
        (ms * FRAMES_PER_SECOND / 1000.0).floor() as u64
    }
}
