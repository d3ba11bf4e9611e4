//! Replay playback for recorded sessions.
//!
//! The engine never re-simulates: outcomes come from the event log, and state
//! at any frame is a keyframe plus every later event up to that frame. Note
//! motion between events is recomputed from the shared kinematics.

use crate::difficulty::{ComplexityConfig, get_config};
use crate::models::engine::{
    DESPAWN_Z, FRAMES_PER_SECOND, HIT_LINE_Z, LANE_X, MAX_HEALTH, NOTE_Y, NUM_COLUMNS, NoteSnapshot,
    NoteState, frame_to_ms, kinematics, ms_to_frame,
};
use crate::models::replay::{EventData, GameEvent, GameStateKeyframe, HitPhase, ReplayData};
use crate::models::stats::{HitStats, Judgement};
use crate::shared::messages::ReplayNotification;
use crate::shared::snapshot::{GameplaySnapshot, NoteView};
use crate::state::traits::Snapshot;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::BTreeMap;

pub const MIN_PLAYBACK_SPEED: f64 = 0.1;
pub const MAX_PLAYBACK_SPEED: f64 = 5.0;

/// State reconstructed from the log at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayState {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub health: f64,
    pub hit_stats: HitStats,
    /// Spawned notes not yet judged, keyed by id.
    pub falling: BTreeMap<u64, NoteSnapshot>,
    /// Holds in progress, as placed on the press.
    pub holding: BTreeMap<u64, NoteSnapshot>,
    pub held_keys: [bool; NUM_COLUMNS],
    pub move_speed: f64,
    pub complexity: u32,
}

impl ReplayState {
    /// State at the start of a session.
    pub fn initial(config: &ComplexityConfig) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            health: MAX_HEALTH,
            hit_stats: HitStats::new(),
            falling: BTreeMap::new(),
            holding: BTreeMap::new(),
            held_keys: [false; NUM_COLUMNS],
            move_speed: kinematics::move_speed_at(0.0, config),
            complexity: config.complexity,
        }
    }

    pub fn from_keyframe(keyframe: &GameStateKeyframe) -> Self {
        Self {
            score: keyframe.score,
            combo: keyframe.combo,
            max_combo: keyframe.max_combo,
            health: keyframe.health,
            hit_stats: keyframe.hit_stats.clone(),
            falling: keyframe
                .falling_letters
                .iter()
                .map(|n| (n.id, n.clone()))
                .collect(),
            holding: keyframe
                .active_holds
                .iter()
                .map(|n| (n.id, n.clone()))
                .collect(),
            held_keys: keyframe.held_keys,
            move_speed: keyframe.move_speed,
            complexity: keyframe.complexity,
        }
    }

    /// Applies one recorded event.
    pub fn apply(&mut self, event: &GameEvent) {
        match &event.data {
            EventData::Keydown { lane } => {
                if let Some(held) = self.held_keys.get_mut(*lane) {
                    *held = true;
                }
            }
            EventData::Keyup { lane, released_note } => {
                if let Some(held) = self.held_keys.get_mut(*lane) {
                    *held = false;
                }
                if let Some(id) = released_note {
                    self.holding.remove(id);
                }
            }
            EventData::NoteHit {
                note_id,
                judgement,
                offset,
                phase,
                ..
            } => {
                let note = self.falling.remove(note_id);
                match phase {
                    HitPhase::Tap => self.hit_stats.record(*judgement),
                    HitPhase::HoldStart => {
                        self.hit_stats.record(*judgement);
                        if let Some(mut note) = note {
                            note.z = HIT_LINE_Z + offset;
                            note.at_ms = event.timestamp;
                            self.holding.insert(note.id, note);
                        }
                    }
                    HitPhase::HoldComplete => {
                        self.holding.remove(note_id);
                    }
                }
            }
            EventData::NoteMiss { note_id, .. } => {
                if let Some(id) = note_id {
                    self.falling.remove(id);
                }
                self.hit_stats.record(Judgement::Miss);
            }
            EventData::NoteSpawn { note } => {
                self.falling.insert(note.id, note.clone());
            }
            EventData::ScoreChange { score, .. } => self.score = *score,
            EventData::ComboChange { combo, max_combo } => {
                self.combo = *combo;
                self.max_combo = *max_combo;
            }
            EventData::HealthChange { health, .. } => self.health = *health,
        }
    }
}

/// Plays back a fixed `ReplayData` on the 60 fps frame clock.
pub struct ReplayEngine {
    data: ReplayData,
    config: &'static ComplexityConfig,
    state: ReplayState,

    frame: u64,
    /// Index of the next event to apply.
    event_index: usize,

    playing: bool,
    playback_speed: f64,
    /// Fractional frames carried between updates.
    frame_accumulator: f64,

    subscribers: Vec<Sender<ReplayNotification>>,
}

impl ReplayEngine {
    pub fn new(data: ReplayData) -> Self {
        let config = get_config(data.game_config.difficulty);
        let mut engine = Self {
            state: ReplayState::initial(config),
            config,
            data,
            frame: 0,
            event_index: 0,
            playing: false,
            playback_speed: 1.0,
            frame_accumulator: 0.0,
            subscribers: Vec::new(),
        };
        engine.rebuild(0);
        engine
    }

    /// Registers a listener for playback notifications.
    pub fn subscribe(&mut self) -> Receiver<ReplayNotification> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, notification: ReplayNotification) {
        // Drop listeners whose receiver is gone.
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }

    pub fn data(&self) -> &ReplayData {
        &self.data
    }

    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Playback position in milliseconds.
    pub fn current_time_ms(&self) -> f64 {
        frame_to_ms(self.frame)
    }

    pub fn get_max_frame(&self) -> u64 {
        self.data.max_frame()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn playback_speed(&self) -> f64 {
        self.playback_speed
    }

    /// Sets the clock multiplier, clamped to the supported range.
    /// Non-finite values are ignored.
    pub fn set_playback_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            log::warn!("REPLAY: Ignoring playback speed {}", speed);
            return;
        }
        self.playback_speed = speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED);
    }

    /// Starts playback, rewinding first if the end was reached.
    pub fn play(&mut self) {
        if self.frame >= self.get_max_frame() {
            self.seek_to_frame(0);
        }
        self.playing = true;
        self.frame_accumulator = 0.0;
        log::info!(
            "REPLAY: Playing from frame {} at {:.1}x",
            self.frame,
            self.playback_speed
        );
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        log::info!("REPLAY: Paused at frame {}", self.frame);
        self.publish(ReplayNotification::Paused);
    }

    /// Halts playback and rewinds to frame 0.
    pub fn stop(&mut self) {
        self.pause();
        self.rebuild(0);
        log::info!("REPLAY: Stopped");
    }

    /// Feeds host frame time into the playback clock.
    ///
    /// Returns every event applied during this call.
    pub fn update(&mut self, dt: f64) -> Vec<GameEvent> {
        let mut applied = Vec::new();
        if !self.playing {
            return applied;
        }
        self.frame_accumulator += dt.max(0.0) * self.playback_speed * FRAMES_PER_SECOND;
        while self.playing && self.frame_accumulator >= 1.0 {
            self.frame_accumulator -= 1.0;
            applied.extend(self.advance_frame());
        }
        applied
    }

    /// Steps one frame forward, applying the events recorded at it.
    ///
    /// Pauses and publishes `Finished` once the last frame is reached.
    pub fn advance_frame(&mut self) -> Vec<GameEvent> {
        let max_frame = self.get_max_frame();
        if self.frame >= max_frame {
            self.finish();
            return Vec::new();
        }

        self.frame += 1;
        let mut applied = Vec::new();
        while let Some(event) = self.data.events.get(self.event_index) {
            if event.frame > self.frame {
                break;
            }
            let event = event.clone();
            self.state.apply(&event);
            self.event_index += 1;
            self.publish(ReplayNotification::EventApplied(event.clone()));
            applied.push(event);
        }
        self.refresh_speed();

        let time_ms = self.current_time_ms();
        self.publish(ReplayNotification::UpdateFrame {
            frame: self.frame,
            time_ms,
        });

        if self.frame >= max_frame {
            self.finish();
        }
        applied
    }

    fn finish(&mut self) {
        let was_playing = self.playing;
        self.playing = false;
        if was_playing {
            log::info!("REPLAY: Reached final frame {}", self.frame);
            self.publish(ReplayNotification::Finished);
        }
    }

    /// Reconstructs state at `frame` (clamped to the recording).
    pub fn seek_to_frame(&mut self, frame: u64) {
        let target = frame.min(self.get_max_frame());
        self.rebuild(target);
        self.frame_accumulator = 0.0;
        log::debug!("REPLAY: Seeked to frame {}", target);
        self.publish(ReplayNotification::Seeked { frame: target });
    }

    /// Seeks to a session time in milliseconds on the fixed frame clock.
    pub fn seek_to_time(&mut self, time_ms: f64) {
        self.seek_to_frame(ms_to_frame(time_ms));
    }

    /// Nearest keyframe at or before `target`, then the events after it.
    fn rebuild(&mut self, target: u64) {
        match self.data.keyframe_at_or_before(target) {
            Some(keyframe) => {
                self.state = ReplayState::from_keyframe(keyframe);
                self.event_index = self.data.first_event_after(keyframe.frame);
            }
            None => {
                self.state = ReplayState::initial(self.config);
                self.event_index = 0;
            }
        }
        while let Some(event) = self.data.events.get(self.event_index) {
            if event.frame > target {
                break;
            }
            self.state.apply(event);
            self.event_index += 1;
        }
        self.frame = target;
        self.refresh_speed();
    }

    fn refresh_speed(&mut self) {
        let seconds = self.current_time_ms() / 1000.0;
        self.state.move_speed = kinematics::move_speed_at(seconds, self.config);
    }

    /// Unjudged notes and holds in progress, placed at the current frame.
    ///
    /// A held head stays where it was pressed while its body drains at the
    /// scroll speed.
    pub fn visible_notes(&self) -> Vec<NoteView> {
        let now = self.current_time_ms() / 1000.0;
        let view = |n: &NoteSnapshot, z: f64, duration: f64, state: NoteState| NoteView {
            id: n.id,
            lane: n.lane,
            x: LANE_X.get(n.lane).copied().unwrap_or_default(),
            y: NOTE_Y,
            z,
            duration,
            opacity: 1.0,
            state,
            kind: n.kind,
        };

        let falling = self
            .state
            .falling
            .values()
            .map(|n| {
                let z = kinematics::position_at(n.z, n.at_ms / 1000.0, now, self.config);
                view(n, z, n.duration, NoteState::Falling)
            })
            .filter(|n| n.z - n.duration <= DESPAWN_Z);
        let holding = self.state.holding.values().map(|n| {
            let drained = kinematics::travel(n.at_ms / 1000.0, now, self.config);
            view(n, n.z, (n.duration - drained).max(0.0), NoteState::Held)
        });
        falling.chain(holding).collect()
    }
}

impl Snapshot for ReplayEngine {
    type Output = GameplaySnapshot;

    fn create_snapshot(&self) -> Self::Output {
        GameplaySnapshot {
            elapsed: self.current_time_ms() / 1000.0,
            complexity: self.state.complexity,
            move_speed: self.state.move_speed,
            visible_notes: self.visible_notes(),
            keys_held: self.state.held_keys,
            score: self.state.score,
            accuracy: self.state.hit_stats.calculate_accuracy(),
            combo: self.state.combo,
            max_combo: self.state.max_combo,
            health: self.state.health,
            hit_stats: self.state.hit_stats.clone(),
            feedback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::PatternType;
    use crate::models::replay::ReplayMetadata;
    use crate::models::settings::GameConfig;
    use approx::assert_relative_eq;

    fn event(frame: u64, data: EventData) -> GameEvent {
        GameEvent {
            timestamp: frame_to_ms(frame),
            frame,
            data,
        }
    }

    fn spawn(frame: u64, id: u64) -> GameEvent {
        event(
            frame,
            EventData::NoteSpawn {
                note: NoteSnapshot {
                    id,
                    lane: 0,
                    z: -30.0,
                    duration: 0.0,
                    at_ms: frame_to_ms(frame),
                    kind: PatternType::Normal,
                },
            },
        )
    }

    fn sample() -> ReplayData {
        let mut data = ReplayData::new(GameConfig::default());
        data.events = vec![
            spawn(1, 1),
            spawn(2, 2),
            event(3, EventData::Keydown { lane: 0 }),
            event(
                3,
                EventData::NoteHit {
                    note_id: 1,
                    lane: 0,
                    judgement: Judgement::Good,
                    offset: 0.4,
                    score_delta: 17,
                    phase: HitPhase::Tap,
                },
            ),
            event(3, EventData::ScoreChange { score: 17, delta: 17 }),
            event(3, EventData::ComboChange { combo: 1, max_combo: 1 }),
            event(5, EventData::NoteMiss { note_id: Some(2), lane: 0 }),
            event(5, EventData::ComboChange { combo: 0, max_combo: 1 }),
            event(5, EventData::HealthChange { health: 96.5, delta: -3.5 }),
            event(8, EventData::Keyup { lane: 0, released_note: None }),
        ];
        data.metadata = ReplayMetadata {
            final_score: 17,
            max_combo: 1,
            total_notes: 2,
            accuracy: 50.0,
        };
        data
    }

    #[test]
    fn advance_applies_events_of_each_frame() {
        let mut engine = ReplayEngine::new(sample());
        engine.play();
        let mut per_frame = Vec::new();
        while engine.is_playing() {
            per_frame.push(engine.advance_frame().len());
        }
        assert_eq!(per_frame, vec![1, 1, 4, 0, 3, 0, 0, 1]);
        assert_eq!(engine.current_frame(), 8);

        let state = engine.state();
        assert_eq!(state.score, 17);
        assert_eq!(state.combo, 0);
        assert_eq!(state.max_combo, 1);
        assert_eq!(state.health, 96.5);
        assert_eq!(state.hit_stats.good, 1);
        assert_eq!(state.hit_stats.miss, 1);
        assert!(state.falling.is_empty());
        assert_eq!(state.held_keys, [false; NUM_COLUMNS]);
    }

    #[test]
    fn seek_clamps_and_matches_linear_playback() {
        let mut linear = ReplayEngine::new(sample());
        for _ in 0..4 {
            linear.advance_frame();
        }
        let mut seeked = ReplayEngine::new(sample());
        seeked.seek_to_frame(4);
        assert_eq!(seeked.state(), linear.state());
        assert!(seeked.state().held_keys[0]);
        assert_eq!(seeked.state().falling.keys().copied().collect::<Vec<_>>(), vec![2]);

        seeked.seek_to_frame(1_000);
        assert_eq!(seeked.current_frame(), 8);
    }

    #[test]
    fn seek_to_time_uses_the_frame_clock() {
        let mut engine = ReplayEngine::new(sample());
        engine.seek_to_time(100.0);
        assert_eq!(engine.current_frame(), 6);
        engine.seek_to_time(-50.0);
        assert_eq!(engine.current_frame(), 0);
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn playback_speed_is_clamped_and_scales_the_clock() {
        let mut engine = ReplayEngine::new(sample());
        engine.set_playback_speed(50.0);
        assert_eq!(engine.playback_speed(), MAX_PLAYBACK_SPEED);
        engine.set_playback_speed(0.0);
        assert_eq!(engine.playback_speed(), MIN_PLAYBACK_SPEED);

        engine.set_playback_speed(0.5);
        engine.play();
        engine.update(0.25);
        assert_eq!(engine.current_frame(), 7);
    }

    #[test]
    fn non_finite_playback_speed_is_ignored() {
        let mut engine = ReplayEngine::new(sample());
        engine.set_playback_speed(2.0);
        engine.set_playback_speed(f64::NAN);
        engine.set_playback_speed(f64::INFINITY);
        assert_eq!(engine.playback_speed(), 2.0);

        engine.play();
        engine.update(1.0);
        assert_eq!(engine.current_frame(), 8);
        assert!(!engine.is_playing());
    }

    fn hold_sample() -> ReplayData {
        let mut data = ReplayData::new(GameConfig::default());
        data.events = vec![
            event(
                1,
                EventData::NoteSpawn {
                    note: NoteSnapshot {
                        id: 3,
                        lane: 2,
                        z: -0.5,
                        duration: 40.0,
                        at_ms: frame_to_ms(1),
                        kind: PatternType::Hold,
                    },
                },
            ),
            event(2, EventData::Keydown { lane: 2 }),
            event(
                2,
                EventData::NoteHit {
                    note_id: 3,
                    lane: 2,
                    judgement: Judgement::Perfect,
                    offset: -0.3,
                    score_delta: 37,
                    phase: HitPhase::HoldStart,
                },
            ),
            event(10, EventData::Keyup { lane: 2, released_note: Some(3) }),
        ];
        data
    }

    #[test]
    fn holds_stay_visible_until_released() {
        let mut engine = ReplayEngine::new(hold_sample());
        engine.seek_to_frame(2);
        let at_press = engine.visible_notes();
        assert_eq!(at_press.len(), 1);
        assert_eq!(at_press[0].state, NoteState::Held);
        assert_relative_eq!(at_press[0].z, -0.3);
        assert_relative_eq!(at_press[0].duration, 40.0);

        engine.seek_to_frame(6);
        let draining = engine.visible_notes();
        assert_eq!(draining.len(), 1);
        assert_relative_eq!(draining[0].z, -0.3);
        assert!(draining[0].duration < 40.0 && draining[0].duration > 0.0);
        assert!(engine.state().falling.is_empty());
        assert_eq!(engine.state().hit_stats.perfect, 1);

        engine.seek_to_frame(10);
        assert!(engine.visible_notes().is_empty());
        assert!(engine.state().holding.is_empty());
    }

    #[test]
    fn keyframe_carries_holds_in_progress() {
        let mut linear = ReplayEngine::new(hold_sample());
        for _ in 0..5 {
            linear.advance_frame();
        }

        let mut data = hold_sample();
        let state = linear.state();
        data.keyframes.push(GameStateKeyframe {
            frame: 5,
            elapsed_ms: frame_to_ms(5),
            score: state.score,
            combo: state.combo,
            max_combo: state.max_combo,
            health: state.health,
            hit_stats: state.hit_stats.clone(),
            falling_letters: Vec::new(),
            active_holds: state.holding.values().cloned().collect(),
            held_keys: state.held_keys,
            move_speed: state.move_speed,
            complexity: state.complexity,
        });
        let mut seeked = ReplayEngine::new(data);
        seeked.seek_to_frame(7);
        for _ in 0..2 {
            linear.advance_frame();
        }
        assert_eq!(seeked.state(), linear.state());
        assert_eq!(seeked.visible_notes(), linear.visible_notes());
    }

    #[test]
    fn reaching_the_end_pauses_and_notifies() {
        let mut engine = ReplayEngine::new(sample());
        let rx = engine.subscribe();
        engine.play();
        engine.update(1.0);
        assert!(!engine.is_playing());
        assert_eq!(engine.current_frame(), 8);

        let notifications: Vec<ReplayNotification> = rx.try_iter().collect();
        assert_eq!(notifications.last(), Some(&ReplayNotification::Finished));
        let frames = notifications
            .iter()
            .filter(|n| matches!(n, ReplayNotification::UpdateFrame { .. }))
            .count();
        assert_eq!(frames, 8);
    }

    #[test]
    fn stop_rewinds() {
        let mut engine = ReplayEngine::new(sample());
        engine.play();
        engine.update(0.1);
        engine.stop();
        assert!(!engine.is_playing());
        assert_eq!(engine.current_frame(), 0);
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn visible_notes_follow_kinematics() {
        let mut engine = ReplayEngine::new(sample());
        engine.seek_to_frame(2);
        let notes = engine.visible_notes();
        assert_eq!(notes.len(), 2);
        let first = notes.iter().find(|n| n.id == 1).unwrap();
        let second = notes.iter().find(|n| n.id == 2).unwrap();
        assert!(first.z > second.z);
        assert!(second.z == -30.0);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut engine = ReplayEngine::new(sample());
        let rx = engine.subscribe();
        drop(rx);
        engine.advance_frame();
        assert!(engine.subscribers.is_empty());
    }
}
