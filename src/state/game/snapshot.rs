//! Keyframes, summaries and render snapshots for GameSession.

use super::GameSession;
use crate::models::engine::{FEEDBACK_DURATION, NoteSnapshot, NoteState, kinematics};
use crate::models::replay::GameStateKeyframe;
use crate::models::stats::{Color, SessionSummary};
use crate::shared::snapshot::{Feedback, GameplaySnapshot, NoteView};

impl GameSession {
    /// Full state capture for replay seeking.
    ///
    /// `falling_letters` holds only notes still waiting to be judged.
    pub fn capture_keyframe(&self) -> GameStateKeyframe {
        let at_ms = self.elapsed * 1000.0;
        let mut falling_letters: Vec<NoteSnapshot> = self
            .notes
            .iter()
            .filter(|n| n.is_judgeable())
            .map(|n| n.snapshot(at_ms))
            .collect();
        falling_letters.sort_by_key(|n| n.id);
        let mut active_holds: Vec<NoteSnapshot> = self
            .notes
            .iter()
            .filter(|n| n.state == NoteState::Held)
            .filter_map(|n| n.hold_start.clone())
            .collect();
        active_holds.sort_by_key(|n| n.id);

        GameStateKeyframe {
            frame: self.recorder.frame(),
            elapsed_ms: at_ms,
            score: self.score,
            combo: self.combo,
            max_combo: self.max_combo,
            health: self.health,
            hit_stats: self.hit_stats.clone(),
            falling_letters,
            active_holds,
            held_keys: self.keys_held,
            move_speed: kinematics::move_speed_at(self.elapsed, self.complexity),
            complexity: self.complexity.complexity,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_stats(
            self.score,
            self.max_combo,
            self.scheduler.total_spawned(),
            &self.hit_stats,
        )
    }

    /// Creates a snapshot of the current game state for rendering.
    pub fn get_snapshot(&self) -> GameplaySnapshot {
        GameplaySnapshot {
            elapsed: self.elapsed,
            complexity: self.complexity.complexity,
            move_speed: kinematics::move_speed_at(self.elapsed, self.complexity),
            visible_notes: self.notes.iter().map(NoteView::from).collect(),
            keys_held: self.keys_held,
            score: self.score,
            accuracy: self.hit_stats.calculate_accuracy(),
            combo: self.combo,
            max_combo: self.max_combo,
            health: self.health,
            hit_stats: self.hit_stats.clone(),
            feedback: self.feedback.as_ref().map(|(f, _)| f.clone()),
        }
    }

    pub(crate) fn show_feedback(&mut self, label: &'static str, color: Color, lane: usize) {
        self.feedback = Some((Feedback { label, color, lane }, self.elapsed));
    }

    /// Clears feedback once it has been visible long enough.
    pub(crate) fn expire_feedback(&mut self) {
        if self
            .feedback
            .as_ref()
            .is_some_and(|(_, shown_at)| self.elapsed - shown_at >= FEEDBACK_DURATION)
        {
            self.feedback = None;
        }
    }
}
