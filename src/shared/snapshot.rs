//! Render snapshots.
//!
//! Snapshots are owned captures of session or replay state handed to a
//! presentation layer. Nothing in them points back into the simulation.

use crate::models::engine::{NUM_COLUMNS, Note, NoteState, PatternType};
use crate::models::stats::{Color, HitStats};

/// One note as the renderer should draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteView {
    pub id: u64,
    pub lane: usize,
    pub x: f32,
    pub y: f32,
    pub z: f64,
    pub duration: f64,
    pub opacity: f32,
    pub state: NoteState,
    pub kind: PatternType,
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            lane: note.lane,
            x: note.x,
            y: note.y,
            z: note.z,
            duration: note.duration,
            opacity: note.opacity,
            state: note.state,
            kind: note.kind,
        }
    }
}

/// Transient judgement text shown near the hit line.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub label: &'static str,
    pub color: Color,
    pub lane: usize,
}

/// Snapshot of gameplay state for rendering.
#[derive(Clone, Debug)]
pub struct GameplaySnapshot {
    /// Session time in seconds.
    pub elapsed: f64,
    pub complexity: u32,
    /// Current note speed in z units per second.
    pub move_speed: f64,

    pub visible_notes: Vec<NoteView>,
    pub keys_held: [bool; NUM_COLUMNS],

    pub score: u32,
    pub accuracy: f64,
    pub combo: u32,
    pub max_combo: u32,
    pub health: f64,
    pub hit_stats: HitStats,

    /// Last judgement label, cleared shortly after it was shown.
    pub feedback: Option<Feedback>,
}
