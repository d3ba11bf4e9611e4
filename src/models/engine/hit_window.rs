//! Hit window thresholds and accuracy classification.

use crate::difficulty::ComplexityConfig;
use crate::models::stats::{Color, Judgement, JudgementColors};

/// Effective judgement windows (z distance from the hit line).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    pub perfect: f64,
    pub good: f64,
    pub almost: f64,
}

/// Outcome of classifying one press. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub judgement: Judgement,
    /// Signed distance from the hit line (negative = early).
    pub offset: f64,
    pub score_delta: u32,
    pub label: &'static str,
    pub color: Color,
    /// Position inside the tier's sub-band, 1.0 at its inner edge.
    pub quality: f64,
}

impl HitWindow {
    /// Widening factor applied at low complexity.
    pub fn scale_for(complexity: u32) -> f64 {
        match complexity {
            0..=20 => 1.5,
            21..=40 => 1.25,
            41..=60 => 1.1,
            _ => 1.0,
        }
    }

    /// Builds the effective windows for a complexity config.
    pub fn from_config(config: &ComplexityConfig) -> Self {
        let scale = Self::scale_for(config.complexity);
        let w = config.timing_windows;
        Self {
            perfect: w.perfect * scale,
            good: w.good * scale,
            almost: w.almost * scale,
        }
    }

    /// Utility constructor for fully custom values.
    pub fn from_custom(perfect: f64, good: f64, almost: f64) -> Self {
        Self {
            perfect,
            good,
            almost,
        }
    }

    /// Outermost window; anything beyond it is not a candidate.
    #[inline]
    pub fn max_window(&self) -> f64 {
        self.almost
    }

    /// Classifies a signed distance from the hit line.
    pub fn judge(&self, offset: f64, base_score: f64) -> HitResult {
        let colors = JudgementColors::new();
        let d = offset.abs();

        let (judgement, score, label, quality) = if d <= self.perfect {
            let label = if d <= self.perfect * 0.3 {
                "PERFECT!"
            } else {
                "EXCELLENT!"
            };
            (Judgement::Perfect, base_score * 2.5, label, 1.0)
        } else if d <= self.good {
            let goodness = sub_band_position(d, self.perfect, self.good);
            let label = if goodness >= 0.5 { "GREAT!" } else { "GOOD" };
            (Judgement::Good, base_score * (1.5 + 0.5 * goodness), label, goodness)
        } else if d <= self.almost {
            let okness = sub_band_position(d, self.good, self.almost);
            let label = if okness >= 0.5 { "NICE" } else { "ALMOST" };
            (Judgement::Almost, base_score * (0.8 + 0.4 * okness), label, okness)
        } else {
            let label = if d <= self.almost * 1.5 { "CLOSE" } else { "MISS" };
            (Judgement::Miss, 0.0, label, 0.0)
        };

        HitResult {
            judgement,
            offset,
            score_delta: score.floor() as u32,
            label,
            color: colors.for_judgement(judgement),
            quality,
        }
    }
}

/// 1.0 at `inner`, 0.0 at `outer`.
fn sub_band_position(d: f64, inner: f64, outer: f64) -> f64 {
    let span = (outer - inner).max(f64::EPSILON);
    (1.0 - (d - inner) / span).clamp(0.0, 1.0)
}
