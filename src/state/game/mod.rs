//! Live play session.
//!
//! `GameSession` owns everything one run mutates: the note collection, the
//! score/combo/health scalars and the recorder that mirrors them. The host
//! drives it from two places only, the frame tick and the key handlers:
//! - `tick` runs spawn, then movement and aging, then completion checks
//! - `handle_key_down` / `handle_key_up` judge against current geometry

mod input;
mod notes;
mod snapshot;

pub mod actions;

use crate::difficulty::ComplexityConfig;
use crate::logic::recorder::SessionRecorder;
use crate::logic::spawner::SpawnScheduler;
use crate::models::engine::{HitWindow, KEYFRAME_INTERVAL, MAX_HEALTH, NUM_COLUMNS, Note};
use crate::models::replay::{EventData, ReplayData, ReplayMetadata};
use crate::models::settings::GameConfig;
use crate::models::stats::{HitStats, SessionSummary};
use crate::shared::snapshot::Feedback;
use crate::state::traits::EndReason;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct GameSession {
    pub config: GameConfig,
    pub(crate) complexity: &'static ComplexityConfig,
    pub(crate) hit_window: HitWindow,
    pub(crate) scheduler: SpawnScheduler<StdRng>,

    /// Live notes in spawn order.
    pub notes: Vec<Note>,
    /// Session time in seconds.
    pub elapsed: f64,

    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub health: f64,
    pub hit_stats: HitStats,
    pub keys_held: [bool; NUM_COLUMNS],

    /// Fractional hold score not yet credited.
    pub(crate) hold_carry: f64,
    /// Current feedback and the session time it was shown at.
    pub(crate) feedback: Option<(Feedback, f64)>,

    pub(crate) recorder: SessionRecorder,
    pub(crate) end_reason: Option<EndReason>,
}

impl GameSession {
    /// Starts a recorded session with an injected random source.
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        let complexity = crate::difficulty::get_config(config.difficulty);
        let mut recorder = SessionRecorder::new();
        recorder.start_recording(&config);

        log::info!(
            "SESSION: Started at complexity {} ({}), mode {:?}",
            complexity.complexity,
            complexity.visual.band.label(),
            config.mode
        );

        Self {
            complexity,
            hit_window: HitWindow::from_config(complexity),
            scheduler: SpawnScheduler::new(rng),
            config,
            notes: Vec::new(),
            elapsed: 0.0,
            score: 0,
            combo: 0,
            max_combo: 0,
            health: MAX_HEALTH,
            hit_stats: HitStats::new(),
            keys_held: [false; NUM_COLUMNS],
            hold_carry: 0.0,
            feedback: None,
            recorder,
            end_reason: None,
        }
    }

    /// Starts a session seeded from `config.seed`, or from the thread RNG.
    /// The seed is written back into the config so the recorded replay carries it.
    pub fn from_config(mut config: GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        config.seed = Some(seed);
        log::debug!("SESSION: Seed {}", seed);
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn complexity(&self) -> &'static ComplexityConfig {
        self.complexity
    }

    pub fn hit_window(&self) -> HitWindow {
        self.hit_window
    }

    /// Frame index of the recording clock.
    pub fn frame(&self) -> u64 {
        self.recorder.frame()
    }

    /// Notes spawned since the session began.
    pub fn total_spawned(&self) -> u32 {
        self.scheduler.total_spawned()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn is_complete(&self) -> bool {
        self.end_reason.is_some()
    }

    /// Key input is ignored once health runs out or the session ended.
    pub(crate) fn accepts_input(&self) -> bool {
        self.end_reason.is_none() && self.health > 0.0
    }

    /// Advances the session by one frame of `dt` seconds.
    ///
    /// Returns the end reason once the session is complete.
    pub fn tick(&mut self, dt: f64) -> Option<EndReason> {
        if self.end_reason.is_some() {
            return self.end_reason;
        }

        // Keyframes precede the frame bump so they include every event
        // stamped with the frame they carry.
        if self.recorder.frame() % KEYFRAME_INTERVAL == 0 {
            let keyframe = self.capture_keyframe();
            self.recorder.record_keyframe(&keyframe);
        }

        let previous = self.elapsed;
        self.elapsed += dt.max(0.0);
        self.recorder.update_frame();
        self.recorder.set_elapsed(self.elapsed * 1000.0);

        let first_new = self.notes.len();
        self.scheduler
            .update(self.elapsed, self.complexity, &mut self.notes);
        let at_ms = self.elapsed * 1000.0;
        for idx in first_new..self.notes.len() {
            let note = self.notes[idx].snapshot(at_ms);
            self.recorder.record_event(&EventData::NoteSpawn { note });
        }

        self.update_notes(previous, self.elapsed);
        self.expire_feedback();
        self.check_completion()
    }

    fn check_completion(&mut self) -> Option<EndReason> {
        if self.end_reason.is_some() {
            return self.end_reason;
        }
        let reason = if self.health <= 0.0 {
            Some(EndReason::GameOver)
        } else if self
            .config
            .time_limit_secs()
            .is_some_and(|limit| self.elapsed >= limit)
        {
            Some(EndReason::TimeUp)
        } else if self
            .config
            .score_goal()
            .is_some_and(|goal| self.score >= goal)
        {
            Some(EndReason::TargetReached)
        } else {
            None
        };
        if let Some(reason) = reason {
            self.end(reason);
        }
        reason
    }

    pub(crate) fn end(&mut self, reason: EndReason) {
        if self.end_reason.is_none() {
            log::info!(
                "SESSION: Ended ({:?}) at {:.2}s, score {}, max combo {}",
                reason,
                self.elapsed,
                self.score,
                self.max_combo
            );
            self.end_reason = Some(reason);
        }
    }

    /// Stops recording and returns the summary with the frozen replay.
    pub fn finish(mut self) -> (SessionSummary, ReplayData) {
        let summary = self.summary();
        let metadata = ReplayMetadata {
            final_score: summary.final_score,
            max_combo: summary.max_combo,
            total_notes: summary.total_notes,
            accuracy: summary.accuracy,
        };
        let replay = self
            .recorder
            .stop_recording(metadata)
            .unwrap_or_else(|| ReplayData::new(self.config.clone()));
        log::info!(
            "SESSION: Finished with {} notes, accuracy {:.2}%",
            summary.total_notes,
            summary.accuracy
        );
        (summary, replay)
    }
}
