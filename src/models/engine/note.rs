//! Note types: generated pattern entries and live falling notes.

use super::constants::{LANE_X, NOTE_Y};
use crate::models::stats::Judgement;
use serde::{Deserialize, Serialize};

/// Shape of a generated or spawned note group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// Single lane, single tap.
    Normal,
    /// Several lanes at once.
    Chord,
    /// Quick repeated taps on one lane.
    Rapid,
    /// Lanes from opposite hands.
    Cross,
    /// Notes staggered against the beat grid in thirds.
    Polyrhythm,
    /// Pushed off the beat.
    Syncopated,
    /// Must be held down.
    Hold,
}

/// One entry of a generated pattern block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternNote {
    /// Lanes that receive a note (sorted, unique, each < `NUM_COLUMNS`).
    pub channels: Vec<usize>,
    /// Beat offset inside the generated block.
    pub timing: f64,
    pub kind: PatternType,
    /// Hold length, if any.
    pub duration: Option<f64>,
}

impl PatternNote {
    /// Builds a note whose type follows from its lane count.
    pub fn new(mut channels: Vec<usize>, timing: f64) -> Self {
        channels.sort_unstable();
        channels.dedup();
        let kind = if channels.len() > 1 {
            PatternType::Chord
        } else {
            PatternType::Normal
        };
        Self {
            channels,
            timing,
            kind,
            duration: None,
        }
    }
}

/// Lifecycle state of a live note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    /// Moving toward the hit line (also used after an early hold release).
    Falling,
    /// Judged; fading out.
    Hit,
    /// Passed or failed; fading out.
    Missed,
    /// Hold in progress.
    Held,
}

/// A note currently on the playfield.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: u64,
    pub lane: usize,
    pub x: f32,
    pub y: f32,
    /// Depth of the note head; advances toward the viewer.
    pub z: f64,
    /// 0 for taps, remaining hold length otherwise.
    pub duration: f64,
    /// Session time (seconds) at which the note appeared.
    pub spawn_time: f64,
    pub opacity: f32,
    pub state: NoteState,
    /// Set once the note has been scored (hit, held or missed).
    pub was_processed: bool,
    /// Tier assigned on the first successful press; a hold keeps it to the end.
    pub judgement: Option<Judgement>,
    /// Head position and full length when a hold began.
    pub hold_start: Option<NoteSnapshot>,
    pub kind: PatternType,
}

impl Note {
    /// Creates a falling note on `lane` at depth `z`.
    pub fn new(id: u64, lane: usize, z: f64, duration: f64, spawn_time: f64, kind: PatternType) -> Self {
        Self {
            id,
            lane,
            x: LANE_X[lane],
            y: NOTE_Y,
            z,
            duration: duration.max(0.0),
            spawn_time,
            opacity: 1.0,
            state: NoteState::Falling,
            was_processed: false,
            judgement: None,
            hold_start: None,
            kind,
        }
    }

    /// Depth of the trailing edge (equal to `z` for taps).
    #[inline]
    pub fn tail_z(&self) -> f64 {
        self.z - self.duration
    }

    /// Returns true if this note carries a hold body.
    #[inline]
    pub fn is_hold(&self) -> bool {
        self.duration > 0.0
    }

    /// Still waiting to be judged.
    #[inline]
    pub fn is_judgeable(&self) -> bool {
        self.state == NoteState::Falling && !self.was_processed
    }

    /// True if the note spans any part of `[lo, hi]`.
    pub fn overlaps(&self, lo: f64, hi: f64) -> bool {
        self.z >= lo && self.tail_z() <= hi
    }

    /// Captures the note's kinematic identity at `at_ms`.
    pub fn snapshot(&self, at_ms: f64) -> NoteSnapshot {
        NoteSnapshot {
            id: self.id,
            lane: self.lane,
            z: self.z,
            duration: self.duration,
            at_ms,
            kind: self.kind,
        }
    }
}

/// Value copy of a note, used in recorded events and keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSnapshot {
    pub id: u64,
    pub lane: usize,
    /// Head depth at `at_ms`.
    pub z: f64,
    pub duration: f64,
    /// Session time in milliseconds at which `z` was measured.
    pub at_ms: f64,
    pub kind: PatternType,
}
