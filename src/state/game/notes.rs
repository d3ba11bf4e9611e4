//! Note processing - update_notes and the score/combo/health mutations

use super::GameSession;
use crate::models::engine::{
    DESPAWN_Z, HIT_DRIFT_PER_SEC, HIT_FADE_SECS, HIT_LINE_Z, MAX_HEALTH, MISS_FADE_SECS,
    NoteState, kinematics,
};
use crate::models::replay::{EventData, HitPhase};
use crate::models::stats::Judgement;
use crate::state::traits::EndReason;

/// Hold score per second, as a multiple of the base score.
pub(crate) const HOLD_SCORE_RATE: f64 = 2.0;

/// Health gained for a successful judgement at the given combo (after the hit).
pub(crate) fn health_bonus(judgement: Judgement, combo: u32) -> f64 {
    let base = match judgement {
        Judgement::Perfect => 1.5,
        Judgement::Good => 1.0,
        Judgement::Almost => 0.5,
        Judgement::Miss => 0.0,
    };
    base * (1.0 + combo.min(50) as f64 / 50.0)
}

/// Health lost on a miss; heavier at higher complexity.
pub(crate) fn miss_penalty(complexity: u32) -> f64 {
    3.0 + complexity as f64 * 0.07
}

impl GameSession {
    /// Moves, ages and collects notes between two session times.
    pub(crate) fn update_notes(&mut self, from: f64, to: f64) {
        let dt = (to - from) as f32;
        let distance = kinematics::travel(from, to, self.complexity);
        let miss_line = HIT_LINE_Z + self.hit_window.max_window();
        let hold_rate = self.complexity.base_score() * HOLD_SCORE_RATE;

        let mut missed = Vec::new();
        let mut completed = Vec::new();
        let mut hold_gain = 0.0;

        for note in &mut self.notes {
            match note.state {
                NoteState::Hit => {
                    note.opacity = (note.opacity - dt / HIT_FADE_SECS as f32).max(0.0);
                    note.y += HIT_DRIFT_PER_SEC * dt;
                }
                NoteState::Missed => {
                    note.z += distance;
                    note.opacity = (note.opacity - dt / MISS_FADE_SECS as f32).max(0.0);
                }
                NoteState::Held => {
                    hold_gain += hold_rate * (to - from);
                    note.duration = (note.duration - distance).max(0.0);
                    if note.duration <= 0.0 {
                        note.state = NoteState::Hit;
                        completed.push((note.id, note.lane, note.judgement));
                    }
                }
                NoteState::Falling => {
                    note.z += distance;
                    if note.is_judgeable() && note.tail_z() > miss_line {
                        note.state = NoteState::Missed;
                        note.was_processed = true;
                        missed.push((note.id, note.lane));
                    }
                }
            }
        }

        self.notes
            .retain(|n| n.opacity > 0.0 && n.tail_z() <= DESPAWN_Z);

        if hold_gain > 0.0 {
            self.credit_hold_score(hold_gain);
        }
        for (note_id, lane, judgement) in completed {
            log::debug!("SESSION: Hold {} completed on lane {}", note_id, lane);
            self.recorder.record_event(&EventData::NoteHit {
                note_id,
                lane,
                judgement: judgement.unwrap_or(Judgement::Perfect),
                offset: 0.0,
                score_delta: 0,
                phase: HitPhase::HoldComplete,
            });
        }
        for (note_id, lane) in missed {
            self.hit_stats.record(Judgement::Miss);
            self.recorder.record_event(&EventData::NoteMiss {
                note_id: Some(note_id),
                lane,
            });
            self.break_combo();
            self.apply_health_penalty();
        }
    }

    /// Credits whole points of accrued hold score, carrying the fraction.
    fn credit_hold_score(&mut self, gain: f64) {
        self.hold_carry += gain;
        let whole = self.hold_carry.floor();
        if whole < 1.0 {
            return;
        }
        self.hold_carry -= whole;
        self.add_score(whole as u32);
    }

    pub(crate) fn add_score(&mut self, delta: u32) {
        if delta == 0 {
            return;
        }
        self.score = self.score.saturating_add(delta);
        self.recorder.record_event(&EventData::ScoreChange {
            score: self.score,
            delta,
        });
    }

    pub(crate) fn extend_combo(&mut self) {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.recorder.record_event(&EventData::ComboChange {
            combo: self.combo,
            max_combo: self.max_combo,
        });
    }

    pub(crate) fn break_combo(&mut self) {
        if self.combo == 0 {
            return;
        }
        self.combo = 0;
        self.recorder.record_event(&EventData::ComboChange {
            combo: 0,
            max_combo: self.max_combo,
        });
    }

    pub(crate) fn apply_health_bonus(&mut self, judgement: Judgement) {
        let gained = health_bonus(judgement, self.combo);
        self.change_health(gained);
    }

    pub(crate) fn apply_health_penalty(&mut self) {
        let lost = miss_penalty(self.complexity.complexity);
        self.change_health(-lost);
        if self.health <= 0.0 {
            self.end(EndReason::GameOver);
        }
    }

    fn change_health(&mut self, delta: f64) {
        let before = self.health;
        self.health = (self.health + delta).clamp(0.0, MAX_HEALTH);
        let applied = self.health - before;
        if applied != 0.0 {
            self.recorder.record_event(&EventData::HealthChange {
                health: self.health,
                delta: applied,
            });
        }
    }
}
