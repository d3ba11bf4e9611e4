//! Per-frame spawn scheduling.
//!
//! Three independent sources feed the same note list each frame:
//! 1. pattern playback from generated blocks,
//! 2. a randomized overlay that also assigns the richer note types,
//! 3. a gap filler that prevents long stretches of silence.

use crate::difficulty::ComplexityConfig;
use crate::logic::pattern::{BEATS_PER_MEASURE, PatternGenerator};
use crate::models::engine::{HOLD_THRESHOLD, NUM_COLUMNS, Note, PatternNote, PatternType, SPAWN_Z, kinematics};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Measures per generated block.
pub const BLOCK_MEASURES: usize = 4;

/// Share of overlay rolls that try a cross-hand pair when allowed.
const CROSS_SHARE: f64 = 0.25;

const LEFT_HAND: [usize; 2] = [0, 1];
const RIGHT_HAND: [usize; 2] = [3, 4];

/// Seconds without any spawn before the gap filler fires.
pub fn gap_threshold(complexity: u32) -> f64 {
    match complexity {
        0..=20 => 3.0,
        21..=40 => 2.5,
        41..=60 => 2.0,
        _ => 1.5,
    }
}

/// Minimum time between two pattern notes on the same lane.
pub fn lane_respawn_interval(config: &ComplexityConfig) -> f64 {
    let divisor = if config.complexity > 70 { 8.0 } else { 4.0 };
    config.beat_interval() / divisor
}

pub struct SpawnScheduler<R: Rng + SeedableRng> {
    generator: PatternGenerator<R>,
    rng: R,

    block: Vec<PatternNote>,
    cursor: usize,
    /// Session time at which the current block's beat 0 falls.
    block_start: Option<f64>,

    lane_last_spawn: [f64; NUM_COLUMNS],
    last_spawn_time: f64,
    last_overlay_roll: f64,

    next_id: u64,
    total_spawned: u32,
}

impl<R: Rng + SeedableRng> SpawnScheduler<R> {
    pub fn new(mut rng: R) -> Self {
        let generator = PatternGenerator::new(R::seed_from_u64(rng.random()));
        Self {
            generator,
            rng,
            block: Vec::new(),
            cursor: 0,
            block_start: None,
            lane_last_spawn: [f64::NEG_INFINITY; NUM_COLUMNS],
            last_spawn_time: 0.0,
            last_overlay_roll: 0.0,
            next_id: 1,
            total_spawned: 0,
        }
    }

    /// Notes spawned since the session began.
    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }

    /// Runs all three sources for one frame, appending to `notes`.
    ///
    /// Returns the number of notes spawned.
    pub fn update(&mut self, elapsed: f64, config: &ComplexityConfig, notes: &mut Vec<Note>) -> usize {
        let before = notes.len();
        self.play_pattern(elapsed, config, notes);
        self.roll_overlay(elapsed, config, notes);
        self.fill_gap(elapsed, config, notes);
        notes.len() - before
    }

    fn play_pattern(&mut self, elapsed: f64, config: &ComplexityConfig, notes: &mut Vec<Note>) {
        let beat = config.beat_interval();
        let block_beats = (BLOCK_MEASURES * BEATS_PER_MEASURE) as f64;

        let current = self.block_start;
        let start = match current {
            Some(start) if self.cursor < self.block.len() => start,
            Some(start) if elapsed < start + block_beats * beat => return,
            previous => {
                // Keep the beat grid unless playback fell a whole block behind.
                let start = previous
                    .map(|s| s + block_beats * beat)
                    .filter(|s| elapsed - s < block_beats * beat)
                    .unwrap_or(elapsed);
                self.block = self
                    .generator
                    .generate_pattern(config.complexity as i64, BLOCK_MEASURES);
                self.cursor = 0;
                self.block_start = Some(start);
                log::debug!(
                    "SPAWN: New block of {} notes at {:.2}s",
                    self.block.len(),
                    start
                );
                start
            }
        };

        let elapsed_beats = (elapsed - start) / beat;
        let min_interval = lane_respawn_interval(config);
        while let Some(entry) = self.block.get(self.cursor) {
            if elapsed_beats < entry.timing {
                break;
            }
            let (channels, kind) = (entry.channels.clone(), entry.kind);
            for lane in channels {
                if elapsed - self.lane_last_spawn[lane] >= min_interval {
                    self.spawn(lane, SPAWN_Z, 0.0, kind, elapsed, notes);
                }
            }
            self.cursor += 1;
        }
    }

    fn roll_overlay(&mut self, elapsed: f64, config: &ComplexityConfig, notes: &mut Vec<Note>) {
        let interval = config.beat_interval() * (2.0 - config.spawn_probability);
        if elapsed - self.last_overlay_roll < interval {
            return;
        }
        self.last_overlay_roll = elapsed;
        if self.rng.random::<f64>() >= config.spawn_probability {
            return;
        }

        let quarter_beat = config.beat_interval() / 4.0;
        let mut idle: Vec<usize> = (0..NUM_COLUMNS)
            .filter(|&lane| elapsed - self.lane_last_spawn[lane] >= quarter_beat)
            .collect();
        if idle.is_empty() {
            return;
        }

        let beat_distance = kinematics::move_speed_at(elapsed, config) * config.beat_interval();
        let max_notes = config.max_simultaneous_notes.min(NUM_COLUMNS);

        if config.cross_hand_patterns && max_notes >= 2 && self.rng.random::<f64>() < CROSS_SHARE {
            let left = LEFT_HAND.iter().copied().find(|l| idle.contains(l));
            let right = RIGHT_HAND.iter().copied().find(|l| idle.contains(l));
            if let (Some(left), Some(right)) = (left, right) {
                self.spawn(left, SPAWN_Z, 0.0, PatternType::Cross, elapsed, notes);
                self.spawn(right, SPAWN_Z, 0.0, PatternType::Cross, elapsed, notes);
                return;
            }
        }

        if self.rng.random::<f64>() < config.rapid_fire_chance {
            let lane = idle[self.rng.random_range(0..idle.len())];
            self.spawn(lane, SPAWN_Z, 0.0, PatternType::Rapid, elapsed, notes);
            self.spawn(lane, SPAWN_Z - beat_distance / 4.0, 0.0, PatternType::Rapid, elapsed, notes);
            return;
        }

        idle.shuffle(&mut self.rng);

        if self.rng.random::<f64>() < config.polyrhythm_chance {
            let count = idle.len().min(max_notes).min(3);
            for (i, &lane) in idle.iter().take(count).enumerate() {
                let z = SPAWN_Z - beat_distance * i as f64 / 3.0;
                self.spawn(lane, z, 0.0, PatternType::Polyrhythm, elapsed, notes);
            }
            return;
        }

        let count = self.rng.random_range(1..=max_notes).min(idle.len());
        let base_kind = if count > 1 {
            PatternType::Chord
        } else {
            PatternType::Normal
        };
        for &lane in idle.iter().take(count) {
            let mut z = SPAWN_Z;
            let mut kind = base_kind;
            let mut duration = 0.0;
            if self.rng.random::<f64>() < config.off_beat_probability {
                z -= beat_distance * self.off_beat_fraction(config);
                kind = PatternType::Syncopated;
            }
            if self.rng.random::<f64>() < config.hold_note_complexity {
                let spread = 1.0 - self.rng.random::<f64>();
                duration = HOLD_THRESHOLD + spread * 3.0 * config.hold_note_complexity;
                kind = PatternType::Hold;
            }
            self.spawn(lane, z, duration, kind, elapsed, notes);
        }
    }

    /// Picks a sub-beat offset from the allowed subdivisions.
    fn off_beat_fraction(&mut self, config: &ComplexityConfig) -> f64 {
        let fractions: Vec<f64> = config
            .subdivisions
            .iter()
            .copied()
            .filter(|&f| f < 1.0)
            .collect();
        if fractions.is_empty() {
            0.5
        } else {
            fractions[self.rng.random_range(0..fractions.len())]
        }
    }

    fn fill_gap(&mut self, elapsed: f64, config: &ComplexityConfig, notes: &mut Vec<Note>) {
        if elapsed - self.last_spawn_time <= gap_threshold(config.complexity) {
            return;
        }
        let lane = (0..NUM_COLUMNS)
            .min_by(|&a, &b| self.lane_last_spawn[a].total_cmp(&self.lane_last_spawn[b]))
            .unwrap_or(0);
        log::debug!("SPAWN: Gap filler on lane {} at {:.2}s", lane, elapsed);
        self.spawn(lane, SPAWN_Z, 0.0, PatternType::Normal, elapsed, notes);
    }

    fn spawn(
        &mut self,
        lane: usize,
        z: f64,
        duration: f64,
        kind: PatternType,
        elapsed: f64,
        notes: &mut Vec<Note>,
    ) {
        notes.push(Note::new(self.next_id, lane, z, duration, elapsed, kind));
        self.next_id += 1;
        self.total_spawned += 1;
        self.lane_last_spawn[lane] = elapsed;
        self.last_spawn_time = elapsed;
    }
}
