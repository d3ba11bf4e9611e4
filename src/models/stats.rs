//! Hit statistics and judgement types.
//!
//! This module defines the accuracy tiers used for scoring, the running
//! counters a session keeps, and the summary handed to result screens.

use serde::{Deserialize, Serialize};

/// RGBA color.
pub type Color = [f32; 4];

/// RGBA colors for each judgement type.
#[derive(Debug, Clone)]
pub struct JudgementColors {
    pub perfect: Color,
    pub good: Color,
    pub almost: Color,
    pub miss: Color,
    pub early: Color,
}

impl JudgementColors {
    /// Creates default judgement colors.
    pub fn new() -> Self {
        Self {
            perfect: [0.0, 1.0, 1.0, 1.0], // Cyan
            good: [0.0, 1.0, 0.0, 1.0],    // Green
            almost: [1.0, 1.0, 0.0, 1.0],  // Yellow
            miss: [1.0, 0.0, 0.0, 1.0],    // Red
            early: [0.5, 0.5, 0.5, 1.0],   // Gray
        }
    }

    pub fn for_judgement(&self, judgement: Judgement) -> Color {
        match judgement {
            Judgement::Perfect => self.perfect,
            Judgement::Good => self.good,
            Judgement::Almost => self.almost,
            Judgement::Miss => self.miss,
        }
    }
}

impl Default for JudgementColors {
    fn default() -> Self {
        Self::new()
    }
}

/// Accuracy tiers from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgement {
    Perfect,
    Good,
    Almost,
    Miss,
}

impl Judgement {
    /// Returns true for every tier that keeps the combo alive.
    #[inline]
    pub fn is_hit(self) -> bool {
        !matches!(self, Judgement::Miss)
    }
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub good: u32,
    pub almost: u32,
    pub miss: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => self.perfect += 1,
            Judgement::Good => self.good += 1,
            Judgement::Almost => self.almost += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    /// Number of successful judgements.
    pub fn hits(&self) -> u32 {
        self.perfect + self.good + self.almost
    }

    /// Every judgement counted so far, misses included.
    pub fn total_processed(&self) -> u32 {
        self.hits() + self.miss
    }

    /// Calculates accuracy percentage (0-100).
    ///
    /// `(perfect + good + almost) / total_processed × 100`; 0 when nothing
    /// has been processed yet.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            return 0.0;
        }
        self.hits() as f64 / total as f64 * 100.0
    }
}

/// Final numbers handed to the scoring/UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub final_score: u32,
    pub max_combo: u32,
    pub total_notes: u32,
    pub perfect_notes: u32,
    pub good_notes: u32,
    pub almost_notes: u32,
    pub missed_notes: u32,
    pub accuracy: f64,
}

impl SessionSummary {
    pub fn from_stats(final_score: u32, max_combo: u32, total_notes: u32, stats: &HitStats) -> Self {
        Self {
            final_score,
            max_combo,
            total_notes,
            perfect_notes: stats.perfect,
            good_notes: stats.good,
            almost_notes: stats.almost,
            missed_notes: stats.miss,
            accuracy: stats.calculate_accuracy(),
        }
    }
}
