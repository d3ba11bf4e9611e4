//! Serializable replay structures.
//!
//! A replay is an event log plus periodic keyframes. Events are the source
//! of truth for past outcomes; keyframes only exist to make seeking cheap.
//!
//! All timestamps are session-relative **milliseconds (f64)**.

use crate::models::engine::{NUM_COLUMNS, NoteSnapshot};
use crate::models::settings::GameConfig;
use crate::models::stats::{HitStats, Judgement};
use serde::{Deserialize, Serialize};

/// Current replay format version for compatibility.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// Discriminant of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Keydown,
    Keyup,
    NoteHit,
    NoteMiss,
    NoteSpawn,
    ScoreChange,
    ComboChange,
    HealthChange,
}

/// Which part of a note's life a `NoteHit` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPhase {
    Tap,
    HoldStart,
    HoldComplete,
}

/// Typed payload, one variant per event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventData {
    Keydown {
        lane: usize,
    },
    Keyup {
        lane: usize,
        /// Hold released early by this key-up, if any.
        released_note: Option<u64>,
    },
    NoteHit {
        note_id: u64,
        lane: usize,
        judgement: Judgement,
        offset: f64,
        score_delta: u32,
        phase: HitPhase,
    },
    NoteMiss {
        /// `None` for a press on a lane with nothing to hit.
        note_id: Option<u64>,
        lane: usize,
    },
    NoteSpawn {
        note: NoteSnapshot,
    },
    ScoreChange {
        score: u32,
        delta: u32,
    },
    ComboChange {
        combo: u32,
        max_combo: u32,
    },
    HealthChange {
        health: f64,
        delta: f64,
    },
}

impl EventData {
    pub fn event_type(&self) -> EventType {
        match self {
            EventData::Keydown { .. } => EventType::Keydown,
            EventData::Keyup { .. } => EventType::Keyup,
            EventData::NoteHit { .. } => EventType::NoteHit,
            EventData::NoteMiss { .. } => EventType::NoteMiss,
            EventData::NoteSpawn { .. } => EventType::NoteSpawn,
            EventData::ScoreChange { .. } => EventType::ScoreChange,
            EventData::ComboChange { .. } => EventType::ComboChange,
            EventData::HealthChange { .. } => EventType::HealthChange,
        }
    }
}

/// A single recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Session time in milliseconds.
    pub timestamp: f64,
    pub frame: u64,
    pub data: EventData,
}

impl GameEvent {
    #[inline]
    pub fn event_type(&self) -> EventType {
        self.data.event_type()
    }
}

/// Full state snapshot used for fast seeking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateKeyframe {
    pub frame: u64,
    pub elapsed_ms: f64,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub health: f64,
    pub hit_stats: HitStats,
    /// Notes still waiting to be judged, sorted by id.
    pub falling_letters: Vec<NoteSnapshot>,
    /// Holds in progress as they were when pressed, sorted by id.
    #[serde(default)]
    pub active_holds: Vec<NoteSnapshot>,
    pub held_keys: [bool; NUM_COLUMNS],
    pub move_speed: f64,
    pub complexity: u32,
}

/// Aggregate numbers stored alongside the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetadata {
    pub final_score: u32,
    pub max_combo: u32,
    pub total_notes: u32,
    pub accuracy: f64,
}

/// A complete recorded session. Immutable once recording stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    /// Format version for future compatibility.
    pub version: u8,
    pub game_config: GameConfig,
    /// Unix time (ms) when recording started.
    pub start_time: i64,
    /// Unix time (ms) when recording stopped.
    pub end_time: i64,
    /// Session length in milliseconds.
    pub duration: f64,
    /// Ordered by non-decreasing frame.
    pub events: Vec<GameEvent>,
    /// Ordered by frame.
    pub keyframes: Vec<GameStateKeyframe>,
    pub metadata: ReplayMetadata,
}

impl ReplayData {
    /// An empty log for `config`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            game_config: config,
            start_time: 0,
            end_time: 0,
            duration: 0.0,
            events: Vec::new(),
            keyframes: Vec::new(),
            metadata: ReplayMetadata::default(),
        }
    }

    /// Largest frame referenced by any event or keyframe.
    pub fn max_frame(&self) -> u64 {
        let events = self.events.last().map_or(0, |e| e.frame);
        let keyframes = self.keyframes.last().map_or(0, |k| k.frame);
        events.max(keyframes)
    }

    /// Latest keyframe captured at or before `frame`.
    pub fn keyframe_at_or_before(&self, frame: u64) -> Option<&GameStateKeyframe> {
        let idx = self.keyframes.partition_point(|k| k.frame <= frame);
        idx.checked_sub(1).map(|i| &self.keyframes[i])
    }

    /// Index of the first event whose frame is greater than `frame`.
    pub fn first_event_after(&self, frame: u64) -> usize {
        self.events.partition_point(|e| e.frame <= frame)
    }

    /// Iterates events of one kind, in log order.
    pub fn events_of(&self, kind: EventType) -> impl Iterator<Item = &GameEvent> + '_ {
        self.events.iter().filter(move |e| e.event_type() == kind)
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(frame: u64, data: EventData) -> GameEvent {
        GameEvent {
            timestamp: frame as f64 * 16.0,
            frame,
            data,
        }
    }

    fn sample() -> ReplayData {
        ReplayData {
            version: REPLAY_FORMAT_VERSION,
            game_config: GameConfig::default(),
            start_time: 0,
            end_time: 1_000,
            duration: 1_000.0,
            events: vec![
                event(0, EventData::Keydown { lane: 0 }),
                event(4, EventData::ScoreChange { score: 25, delta: 25 }),
                event(4, EventData::ComboChange { combo: 1, max_combo: 1 }),
                event(9, EventData::Keyup { lane: 0, released_note: None }),
            ],
            keyframes: Vec::new(),
            metadata: ReplayMetadata::default(),
        }
    }

    #[test]
    fn payload_serializes_with_type_tag() {
        let json = serde_json::to_string(&EventData::Keydown { lane: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"keydown","lane":3}"#);
    }

    #[test]
    fn json_preserves_events() {
        let data = sample();
        let back = ReplayData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn frame_lookups() {
        let data = sample();
        assert_eq!(data.max_frame(), 9);
        assert_eq!(data.first_event_after(0), 1);
        assert_eq!(data.first_event_after(4), 3);
        assert_eq!(data.first_event_after(100), 4);
        assert!(data.keyframe_at_or_before(5).is_none());
        assert_eq!(data.events_of(EventType::ScoreChange).count(), 1);
    }
}
