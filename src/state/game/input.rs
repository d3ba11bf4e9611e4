//! Input handling for GameSession - key down/up and hit judgement
//!
//! Hittability is re-derived from current note geometry on every press.

use super::GameSession;
use crate::models::engine::{HIT_LINE_Z, HOLD_THRESHOLD, HitResult, NUM_COLUMNS, NoteState};
use crate::models::replay::{EventData, HitPhase};
use crate::models::stats::{Judgement, JudgementColors};

/// A press counts as early when the next note is within this many
/// max-windows beyond the outer edge.
const EARLY_MARGIN: f64 = 2.0;

impl GameSession {
    /// Handles a key-down on `lane`. Repeats (lane already held) are ignored.
    pub fn handle_key_down(&mut self, lane: usize) {
        if lane >= NUM_COLUMNS || !self.accepts_input() || self.keys_held[lane] {
            return;
        }
        self.keys_held[lane] = true;
        self.recorder.record_event(&EventData::Keydown { lane });
        self.process_hit(lane);
    }

    /// Handles a key-up on `lane`, releasing any hold in progress there.
    pub fn handle_key_up(&mut self, lane: usize) {
        if lane >= NUM_COLUMNS || !self.accepts_input() || !self.keys_held[lane] {
            return;
        }
        self.keys_held[lane] = false;

        let released_note = self
            .notes
            .iter_mut()
            .find(|n| n.lane == lane && n.state == NoteState::Held)
            .map(|note| {
                note.state = NoteState::Falling;
                note.id
            });
        if let Some(id) = released_note {
            log::debug!("SESSION: Hold {} released early on lane {}", id, lane);
        }
        self.recorder
            .record_event(&EventData::Keyup { lane, released_note });
    }

    /// Judges a press on `lane` against the closest candidate note.
    pub(crate) fn process_hit(&mut self, lane: usize) {
        let max = self.hit_window.max_window();
        let (lo, hi) = (HIT_LINE_Z - max, HIT_LINE_Z + max);

        let best = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.lane == lane && n.is_judgeable() && n.overlaps(lo, hi))
            .min_by(|(_, a), (_, b)| {
                let da = (a.z - HIT_LINE_Z).abs();
                let db = (b.z - HIT_LINE_Z).abs();
                da.total_cmp(&db).then(a.id.cmp(&b.id))
            })
            .map(|(idx, _)| idx);

        match best {
            Some(idx) => {
                let offset = self.notes[idx].z - HIT_LINE_Z;
                let result = self.hit_window.judge(offset, self.complexity.base_score());
                if result.judgement.is_hit() {
                    self.apply_hit(idx, &result);
                } else {
                    self.apply_failed_press(idx, &result);
                }
            }
            None => self.apply_empty_press(lane, lo),
        }
    }

    fn apply_hit(&mut self, idx: usize, result: &HitResult) {
        let at_ms = self.elapsed * 1000.0;
        let note = &mut self.notes[idx];
        note.was_processed = true;
        note.judgement = Some(result.judgement);
        let phase = if note.duration > HOLD_THRESHOLD {
            note.state = NoteState::Held;
            note.hold_start = Some(note.snapshot(at_ms));
            log::debug!("SESSION: Hold {} started on lane {}", note.id, note.lane);
            HitPhase::HoldStart
        } else {
            note.state = NoteState::Hit;
            HitPhase::Tap
        };
        let (note_id, lane) = (note.id, note.lane);

        self.hit_stats.record(result.judgement);
        self.recorder.record_event(&EventData::NoteHit {
            note_id,
            lane,
            judgement: result.judgement,
            offset: result.offset,
            score_delta: result.score_delta,
            phase,
        });
        self.add_score(result.score_delta);
        self.extend_combo();
        self.apply_health_bonus(result.judgement);
        self.show_feedback(result.label, result.color, lane);
    }

    /// A candidate existed but the press landed outside every tier.
    fn apply_failed_press(&mut self, idx: usize, result: &HitResult) {
        let note = &mut self.notes[idx];
        note.state = NoteState::Missed;
        note.was_processed = true;
        note.judgement = Some(Judgement::Miss);
        let (note_id, lane) = (note.id, note.lane);

        self.hit_stats.record(Judgement::Miss);
        self.recorder.record_event(&EventData::NoteMiss {
            note_id: Some(note_id),
            lane,
        });
        self.break_combo();
        self.apply_health_penalty();
        self.show_feedback(result.label, result.color, lane);
    }

    /// No candidate in the window. Counted as a miss only when the lane has
    /// nothing upcoming at all.
    fn apply_empty_press(&mut self, lane: usize, window_start: f64) {
        let upcoming_gap = self
            .notes
            .iter()
            .filter(|n| n.lane == lane && n.is_judgeable() && n.z < window_start)
            .map(|n| window_start - n.z)
            .min_by(f64::total_cmp);

        let colors = JudgementColors::new();
        let early = upcoming_gap
            .is_some_and(|gap| gap <= self.hit_window.max_window() * EARLY_MARGIN);
        if upcoming_gap.is_none() {
            self.hit_stats.record(Judgement::Miss);
            self.recorder
                .record_event(&EventData::NoteMiss { note_id: None, lane });
        }
        self.break_combo();
        self.apply_health_penalty();

        if early {
            self.show_feedback("EARLY", colors.early, lane);
        } else {
            self.show_feedback("MISS", colors.miss, lane);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{DT, place, session};
    use super::*;
    use crate::models::engine::MAX_HEALTH;
    use crate::models::replay::EventType;

    #[test]
    fn closest_candidate_wins() {
        let mut session = session(50);
        place(&mut session, 1, 2, -0.20, 0.0);
        place(&mut session, 2, 2, -0.05, 0.0);
        session.handle_key_down(2);

        let hit = session.notes.iter().find(|n| n.id == 2).unwrap();
        assert_eq!(hit.state, NoteState::Hit);
        let other = session.notes.iter().find(|n| n.id == 1).unwrap();
        assert!(other.is_judgeable());
    }

    #[test]
    fn exact_ties_go_to_the_lowest_id() {
        let mut session = session(50);
        place(&mut session, 8, 0, 0.1, 0.0);
        place(&mut session, 4, 0, -0.1, 0.0);
        session.handle_key_down(0);
        let winner = session.notes.iter().find(|n| !n.is_judgeable()).unwrap();
        assert_eq!(winner.id, 4);
    }

    #[test]
    fn hit_updates_score_combo_and_log() {
        let mut session = session(50);
        session.health = 50.0;
        place(&mut session, 1, 4, 0.0, 0.0);
        session.handle_key_down(4);

        assert_eq!(session.combo, 1);
        assert_eq!(session.hit_stats.perfect, 1);
        assert_eq!(session.score, (session.complexity.base_score() * 2.5).floor() as u32);
        assert!(session.health > 50.0);

        let kinds: Vec<EventType> = session
            .recorder
            .events()
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventType::Keydown,
                EventType::NoteHit,
                EventType::ScoreChange,
                EventType::ComboChange,
                EventType::HealthChange,
            ]
        );
        assert_eq!(session.feedback.as_ref().unwrap().0.label, "PERFECT!");
    }

    #[test]
    fn key_repeat_is_ignored() {
        let mut session = session(50);
        place(&mut session, 1, 1, 0.0, 0.0);
        place(&mut session, 2, 1, -0.1, 0.0);
        session.handle_key_down(1);
        session.handle_key_down(1);
        assert_eq!(session.hit_stats.hits(), 1);
        assert_eq!(session.combo, 1);
    }

    #[test]
    fn empty_lane_press_counts_as_miss() {
        let mut session = session(50);
        session.combo = 3;
        session.handle_key_down(0);
        assert_eq!(session.combo, 0);
        assert_eq!(session.hit_stats.miss, 1);
        assert!(session.health < MAX_HEALTH);
        assert_eq!(session.feedback.as_ref().unwrap().0.label, "MISS");
    }

    #[test]
    fn early_press_shows_early_without_counting() {
        let mut session = session(50);
        let window = session.hit_window.max_window();
        place(&mut session, 1, 3, -window - 0.5 * window, 0.0);
        session.handle_key_down(3);
        assert_eq!(session.hit_stats.total_processed(), 0);
        assert!(session.notes[0].is_judgeable());
        assert_eq!(session.feedback.as_ref().unwrap().0.label, "EARLY");
        assert!(session.health < MAX_HEALTH);
    }

    #[test]
    fn far_upcoming_note_is_a_plain_miss_without_counting() {
        let mut session = session(50);
        place(&mut session, 1, 3, -20.0, 0.0);
        session.handle_key_down(3);
        assert_eq!(session.hit_stats.total_processed(), 0);
        assert_eq!(session.feedback.as_ref().unwrap().0.label, "MISS");
    }

    #[test]
    fn late_press_on_hold_marks_it_missed() {
        let mut session = session(90);
        let window = session.hit_window.max_window();
        // head well past the line, tail still inside the window
        place(&mut session, 5, 2, window * 3.0, window * 3.0);
        session.handle_key_down(2);
        assert_eq!(session.notes[0].state, NoteState::Missed);
        assert!(session.notes[0].was_processed);
        assert_eq!(session.hit_stats.miss, 1);
    }

    #[test]
    fn key_up_releases_hold_without_penalty() {
        let mut session = session(50);
        place(&mut session, 6, 1, 0.0, 2.0);
        session.handle_key_down(1);
        let health = session.health;
        session.handle_key_up(1);

        let note = &session.notes[0];
        assert_eq!(note.state, NoteState::Falling);
        assert!(note.was_processed);
        assert!(!note.is_judgeable());
        assert_eq!(session.health, health);
        let last = session.recorder.events().last().unwrap();
        assert_eq!(
            last.data,
            EventData::Keyup {
                lane: 1,
                released_note: Some(6)
            }
        );
    }

    #[test]
    fn released_hold_is_not_missed_again() {
        let mut session = session(50);
        place(&mut session, 6, 1, 0.0, 6.0);
        session.handle_key_down(1);
        session.tick(DT);
        session.handle_key_up(1);

        let miss_line = HIT_LINE_Z + session.hit_window.max_window();
        for _ in 0..300 {
            let passed = session
                .notes
                .iter()
                .find(|n| n.id == 6)
                .is_none_or(|n| n.tail_z() > miss_line);
            if passed {
                break;
            }
            session.tick(DT);
        }
        for _ in 0..5 {
            session.tick(DT);
        }

        assert_eq!(session.hit_stats.miss, 0);
        assert_eq!(session.hit_stats.hits(), 1);
        let missed_six = session
            .recorder
            .events()
            .iter()
            .any(|e| matches!(e.data, EventData::NoteMiss { note_id: Some(6), .. }));
        assert!(!missed_six);
    }

    #[test]
    fn input_is_ignored_after_game_over() {
        let mut session = session(50);
        session.health = 0.5;
        session.handle_key_down(0);
        assert_eq!(session.health, 0.0);
        assert!(session.is_complete());
        let logged = session.recorder.events().len();
        session.handle_key_up(0);
        session.handle_key_down(1);
        assert_eq!(session.recorder.events().len(), logged);
    }
}
