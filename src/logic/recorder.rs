//! Append-only session recording.
//!
//! Payloads are copied at the record boundary, so nothing the caller does to
//! its own values afterwards can reach the log.

use crate::models::replay::{
    EventData, GameEvent, GameStateKeyframe, REPLAY_FORMAT_VERSION, ReplayData, ReplayMetadata,
};
use crate::models::settings::GameConfig;
use chrono::Utc;

#[derive(Debug, Default)]
pub struct SessionRecorder {
    recording: bool,
    config: GameConfig,
    start_time: i64,
    frame: u64,
    elapsed_ms: f64,
    events: Vec<GameEvent>,
    keyframes: Vec<GameStateKeyframe>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears any previous log and starts a new one at frame 0.
    pub fn start_recording(&mut self, config: &GameConfig) {
        self.recording = true;
        self.config = config.clone();
        self.start_time = Utc::now().timestamp_millis();
        self.frame = 0;
        self.elapsed_ms = 0.0;
        self.events.clear();
        self.keyframes.clear();
        log::info!(
            "REPLAY: Recording started (difficulty {}, mode {:?})",
            config.difficulty,
            config.mode
        );
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Current frame index.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances the frame counter; called once per tick.
    pub fn update_frame(&mut self) {
        if self.recording {
            self.frame += 1;
        }
    }

    /// Sets the session time stamped on subsequent events (ms).
    pub fn set_elapsed(&mut self, elapsed_ms: f64) {
        self.elapsed_ms = self.elapsed_ms.max(elapsed_ms);
    }

    /// Appends a copy of `data` at the current frame.
    pub fn record_event(&mut self, data: &EventData) {
        if !self.recording {
            return;
        }
        self.events.push(GameEvent {
            timestamp: self.elapsed_ms,
            frame: self.frame,
            data: data.clone(),
        });
    }

    /// Appends a copy of `state`, stamped with the current frame.
    pub fn record_keyframe(&mut self, state: &GameStateKeyframe) {
        if !self.recording {
            return;
        }
        let mut keyframe = state.clone();
        keyframe.frame = self.frame;
        self.keyframes.push(keyframe);
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn keyframes(&self) -> &[GameStateKeyframe] {
        &self.keyframes
    }

    /// Freezes the log into a `ReplayData`. Returns `None` if not recording.
    pub fn stop_recording(&mut self, metadata: ReplayMetadata) -> Option<ReplayData> {
        if !self.recording {
            return None;
        }
        self.recording = false;
        let data = ReplayData {
            version: REPLAY_FORMAT_VERSION,
            game_config: self.config.clone(),
            start_time: self.start_time,
            end_time: Utc::now().timestamp_millis(),
            duration: self.elapsed_ms,
            events: std::mem::take(&mut self.events),
            keyframes: std::mem::take(&mut self.keyframes),
            metadata,
        };
        log::info!(
            "REPLAY: Recording stopped ({} events, {} keyframes, {} frames)",
            data.events.len(),
            data.keyframes.len(),
            self.frame
        );
        Some(data)
    }
}
