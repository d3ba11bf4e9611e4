//! Difficulty curve: one complexity scalar drives every gameplay parameter.
//!
//! ## Usage
//!
//! `get_config(complexity)` clamps its input to 1-100 and returns a shared,
//! lazily-built `ComplexityConfig`. Every parameter is a piecewise function of
//! complexity (see [`curves`]) so the early bands can stay much gentler than
//! the late ones.

pub mod curves;

use serde::Serialize;
use std::sync::OnceLock;

pub const MIN_COMPLEXITY: u32 = 1;
pub const MAX_COMPLEXITY: u32 = 100;

/// Subdivision thresholds; each one adds a note-length fraction.
const SUBDIVISION_STEPS: [(u32, f64); 5] = [
    (15, 1.0 / 2.0),
    (30, 1.0 / 4.0),
    (50, 1.0 / 3.0),
    (70, 1.0 / 8.0),
    (85, 1.0 / 6.0),
];

/// Named difficulty bands, used for labels and coarse decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DifficultyBand {
    Tutorial,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl DifficultyBand {
    pub fn from_complexity(complexity: u32) -> Self {
        match complexity {
            0..=10 => DifficultyBand::Tutorial,
            11..=25 => DifficultyBand::Beginner,
            26..=45 => DifficultyBand::Intermediate,
            46..=65 => DifficultyBand::Advanced,
            66..=85 => DifficultyBand::Expert,
            _ => DifficultyBand::Master,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DifficultyBand::Tutorial => "Tutorial",
            DifficultyBand::Beginner => "Beginner",
            DifficultyBand::Intermediate => "Intermediate",
            DifficultyBand::Advanced => "Advanced",
            DifficultyBand::Expert => "Expert",
            DifficultyBand::Master => "Master",
        }
    }
}

/// Judgement distance thresholds in z units, before the low-complexity widening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingWindows {
    pub perfect: f64,
    pub good: f64,
    pub almost: f64,
}

/// Parameters that only affect presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualConfig {
    pub glow_intensity: f64,
    pub camera_shake: f64,
    pub band: DifficultyBand,
}

/// Every gameplay parameter derived from one complexity value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityConfig {
    pub complexity: u32,
    pub spawn_probability: f64,
    pub max_simultaneous_notes: usize,
    pub off_beat_probability: f64,
    /// Allowed note-length fractions; grows with complexity, never shrinks.
    pub subdivisions: Vec<f64>,
    pub pattern_complexity: u32,
    pub speed_multiplier: f64,
    pub bpm_multiplier: f64,
    pub timing_windows: TimingWindows,
    pub polyrhythm_chance: f64,
    pub cross_hand_patterns: bool,
    pub rapid_fire_chance: f64,
    pub hold_note_complexity: f64,
    pub visual: VisualConfig,
}

impl ComplexityConfig {
    fn derive(complexity: u32) -> Self {
        let c = complexity;
        let subdivisions = std::iter::once(1.0)
            .chain(
                SUBDIVISION_STEPS
                    .iter()
                    .filter(|(threshold, _)| c >= *threshold)
                    .map(|(_, fraction)| *fraction),
            )
            .collect();

        Self {
            complexity: c,
            spawn_probability: curves::SPAWN_PROBABILITY.eval(c).clamp(0.0, 1.0),
            max_simultaneous_notes: max_simultaneous_notes(c),
            off_beat_probability: curves::OFF_BEAT_PROBABILITY.eval(c).clamp(0.0, 1.0),
            subdivisions,
            pattern_complexity: c.div_ceil(10).clamp(1, 10),
            speed_multiplier: curves::SPEED_MULTIPLIER.eval(c),
            bpm_multiplier: curves::BPM_MULTIPLIER.eval(c),
            timing_windows: TimingWindows {
                perfect: curves::PERFECT_WINDOW.eval(c),
                good: curves::GOOD_WINDOW.eval(c),
                almost: curves::ALMOST_WINDOW.eval(c),
            },
            polyrhythm_chance: curves::POLYRHYTHM_CHANCE.eval(c).clamp(0.0, 1.0),
            cross_hand_patterns: c >= 60,
            rapid_fire_chance: curves::RAPID_FIRE_CHANCE.eval(c).clamp(0.0, 1.0),
            hold_note_complexity: curves::HOLD_NOTE_COMPLEXITY.eval(c).clamp(0.0, 1.0),
            visual: VisualConfig {
                glow_intensity: curves::GLOW_INTENSITY.eval(c),
                camera_shake: curves::CAMERA_SHAKE.eval(c),
                band: DifficultyBand::from_complexity(c),
            },
        }
    }

    /// Score awarded before tier multipliers: `10 + complexity / 10`.
    #[inline]
    pub fn base_score(&self) -> f64 {
        10.0 + self.complexity as f64 / 10.0
    }

    /// Seconds per beat at this complexity's tempo.
    #[inline]
    pub fn beat_interval(&self) -> f64 {
        60.0 / (crate::models::engine::BASE_BPM * self.bpm_multiplier)
    }
}

fn max_simultaneous_notes(complexity: u32) -> usize {
    match complexity {
        0..=39 => 1,
        40..=59 => 2,
        60..=79 => 3,
        80..=89 => 4,
        _ => 5,
    }
}

/// Clamps any integer into the supported complexity range.
#[inline]
pub fn clamp_complexity(complexity: i64) -> u32 {
    complexity.clamp(MIN_COMPLEXITY as i64, MAX_COMPLEXITY as i64) as u32
}

static CONFIG_CACHE: [OnceLock<ComplexityConfig>; MAX_COMPLEXITY as usize] =
    [const { OnceLock::new() }; MAX_COMPLEXITY as usize];

/// Returns the memoized config for `complexity` (clamped to 1-100).
///
/// Repeated calls with the same clamped value return the same instance.
pub fn get_config(complexity: i64) -> &'static ComplexityConfig {
    let c = clamp_complexity(complexity);
    CONFIG_CACHE[(c - MIN_COMPLEXITY) as usize].get_or_init(|| ComplexityConfig::derive(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_ordered_and_probabilities_bounded() {
        for c in 1..=100 {
            let cfg = get_config(c);
            let w = cfg.timing_windows;
            assert!(w.perfect <= w.good && w.good <= w.almost, "complexity {c}: {w:?}");
            for p in [
                cfg.spawn_probability,
                cfg.off_beat_probability,
                cfg.polyrhythm_chance,
                cfg.rapid_fire_chance,
                cfg.hold_note_complexity,
            ] {
                assert!((0.0..=1.0).contains(&p), "complexity {c}: probability {p}");
            }
            assert!((1..=5).contains(&cfg.max_simultaneous_notes));
        }
    }

    #[test]
    fn config_is_memoized() {
        let a = get_config(42);
        let b = get_config(42);
        assert!(std::ptr::eq(a, b));
        assert_eq!(a, &ComplexityConfig::derive(42));
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert!(std::ptr::eq(get_config(-7), get_config(1)));
        assert!(std::ptr::eq(get_config(1_000), get_config(100)));
    }

    #[test]
    fn subdivisions_never_shrink() {
        let mut previous = 0;
        for c in 1..=100 {
            let len = get_config(c).subdivisions.len();
            assert!(len >= previous, "subdivisions shrank at {c}");
            previous = len;
        }
        assert_eq!(get_config(1).subdivisions, vec![1.0]);
        assert_eq!(get_config(100).subdivisions.len(), 6);
    }

    #[test]
    fn early_bands_are_gentle() {
        for c in 1..=25 {
            let speed = get_config(c).speed_multiplier;
            assert!((0.3..=0.6).contains(&speed), "complexity {c}: speed {speed}");
        }
        for c in 61..=100 {
            let speed = get_config(c).speed_multiplier;
            assert!((1.0..=2.0).contains(&speed), "complexity {c}: speed {speed}");
        }
    }

    #[test]
    fn tutorial_and_master_extremes() {
        let tutorial = get_config(3);
        assert_eq!(tutorial.visual.band, DifficultyBand::Tutorial);
        assert_eq!(tutorial.max_simultaneous_notes, 1);
        assert_eq!(tutorial.off_beat_probability, 0.0);
        assert_eq!(tutorial.polyrhythm_chance, 0.0);

        let master = get_config(95);
        assert!(master.cross_hand_patterns);
        assert!(master.polyrhythm_chance > 0.0);
    }
}
