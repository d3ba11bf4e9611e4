//! Procedural pattern blocks.
//!
//! A block is a list of `PatternNote`s in beat time, consumed by the spawn
//! scheduler in ascending `timing` order. Only `normal` and `chord` notes come
//! out of here; richer types are the spawner overlay's job.

use crate::difficulty::get_config;
use crate::models::engine::{NUM_COLUMNS, PatternNote};
use rand::Rng;

/// Beats in a full measure.
pub const BEATS_PER_MEASURE: usize = 4;

/// Complexity below which measures only carry two beats.
const SPARSE_MEASURE_BELOW: u32 = 10;
/// Complexity from which a beat may span several lanes.
const CHORDS_FROM: u32 = 40;
/// Bounded retries when drawing distinct lanes.
const MAX_LANE_DRAWS: usize = 64;

/// Minimum per-beat spawn probability for the gentle bands.
fn spawn_floor(complexity: u32, curve_probability: f64) -> f64 {
    match complexity {
        0..=14 => curve_probability.max(0.3),
        15..=24 => curve_probability.max(0.4),
        25..=39 => curve_probability.max(0.5),
        _ => curve_probability,
    }
}

/// Generates pattern blocks from an injected random source.
pub struct PatternGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> PatternGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Emits `measure_count` measures of notes for `complexity`, sorted by timing.
    pub fn generate_pattern(&mut self, complexity: i64, measure_count: usize) -> Vec<PatternNote> {
        let config = get_config(complexity);
        let c = config.complexity;
        let beats = if c < SPARSE_MEASURE_BELOW {
            BEATS_PER_MEASURE / 2
        } else {
            BEATS_PER_MEASURE
        };
        let beat_spacing = BEATS_PER_MEASURE as f64 / beats as f64;
        let probability = spawn_floor(c, config.spawn_probability);

        let mut notes = Vec::new();
        for measure in 0..measure_count {
            for beat in 0..beats {
                if self.rng.random::<f64>() >= probability {
                    continue;
                }
                let timing = (measure * BEATS_PER_MEASURE) as f64 + beat as f64 * beat_spacing;
                let channels = if c < CHORDS_FROM {
                    vec![self.rng.random_range(0..NUM_COLUMNS)]
                } else {
                    let count = self
                        .rng
                        .random_range(1..=config.max_simultaneous_notes.min(NUM_COLUMNS));
                    self.distinct_lanes(count)
                };
                notes.push(PatternNote::new(channels, timing));
            }
        }
        notes
    }

    /// Draws `count` lanes, rejecting collisions with lanes already chosen.
    fn distinct_lanes(&mut self, count: usize) -> Vec<usize> {
        let mut lanes = vec![self.rng.random_range(0..NUM_COLUMNS)];
        let mut draws = 0;
        while lanes.len() < count && draws < MAX_LANE_DRAWS {
            let lane = self.rng.random_range(0..NUM_COLUMNS);
            if !lanes.contains(&lane) {
                lanes.push(lane);
            }
            draws += 1;
        }
        lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::PatternType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator(seed: u64) -> PatternGenerator<StdRng> {
        PatternGenerator::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn zero_measures_is_empty() {
        assert!(generator(1).generate_pattern(50, 0).is_empty());
    }

    #[test]
    fn timings_are_non_decreasing() {
        for seed in 0..8 {
            for c in [1, 9, 10, 39, 40, 75, 100] {
                let notes = generator(seed).generate_pattern(c, 8);
                assert!(notes.windows(2).all(|w| w[0].timing <= w[1].timing));
            }
        }
    }

    #[test]
    fn sparse_measures_below_ten() {
        for seed in 0..8 {
            for note in generator(seed).generate_pattern(5, 16) {
                assert_eq!(note.timing % 2.0, 0.0, "off-grid timing {}", note.timing);
                assert_eq!(note.channels.len(), 1);
            }
        }
    }

    #[test]
    fn low_complexity_is_never_silent() {
        let total: usize = (0..8).map(|s| generator(s).generate_pattern(1, 8).len()).sum();
        assert!(total > 0);
    }

    #[test]
    fn chords_respect_lane_budget() {
        let max = get_config(95).max_simultaneous_notes;
        let mut saw_chord = false;
        for seed in 0..16 {
            for note in generator(seed).generate_pattern(95, 8) {
                assert!(!note.channels.is_empty() && note.channels.len() <= max);
                assert!(note.channels.iter().all(|&l| l < NUM_COLUMNS));
                let mut unique = note.channels.clone();
                unique.dedup();
                assert_eq!(unique, note.channels);
                match note.kind {
                    PatternType::Chord => {
                        saw_chord = true;
                        assert!(note.channels.len() > 1);
                    }
                    PatternType::Normal => assert_eq!(note.channels.len(), 1),
                    other => panic!("unexpected type {other:?}"),
                }
            }
        }
        assert!(saw_chord);
    }

    #[test]
    fn same_seed_same_block() {
        assert_eq!(generator(7).generate_pattern(60, 4), generator(7).generate_pattern(60, 4));
    }
}
