//! Named interpolation curves and complexity-banded piecewise functions.

/// Shape applied to the normalized position inside a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    Quadratic,
    Cubic,
    /// `t^1.5`
    Power,
}

impl Curve {
    /// Maps `t` in `[0, 1]` onto `[0, 1]`; input outside that range is clamped.
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::Quadratic => t * t,
            Curve::Cubic => t * t * t,
            Curve::Power => t.powf(1.5),
        }
    }
}

/// One segment of a piecewise parameter: complexity `lo..=hi` maps from
/// `from` to `to` through `curve`.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub lo: u32,
    pub hi: u32,
    pub from: f64,
    pub to: f64,
    pub curve: Curve,
}

impl Band {
    pub const fn new(lo: u32, hi: u32, from: f64, to: f64, curve: Curve) -> Self {
        Self {
            lo,
            hi,
            from,
            to,
            curve,
        }
    }

    fn eval(&self, complexity: f64) -> f64 {
        let span = (self.hi - self.lo) as f64;
        let t = if span > 0.0 {
            (complexity - self.lo as f64) / span
        } else {
            1.0
        };
        self.from + (self.to - self.from) * self.curve.apply(t)
    }
}

/// Ordered, contiguous bands covering the whole complexity range.
///
/// Adjacent bands share their boundary value (`bands[i].to == bands[i + 1].from`)
/// so the function is continuous.
#[derive(Debug, Clone, Copy)]
pub struct Piecewise {
    pub bands: &'static [Band],
}

impl Piecewise {
    pub const fn new(bands: &'static [Band]) -> Self {
        Self { bands }
    }

    /// Evaluates the function, clamping to the first/last band outside the range.
    pub fn eval(&self, complexity: u32) -> f64 {
        let Some(first) = self.bands.first() else {
            return 0.0;
        };
        if complexity <= first.lo {
            return first.from;
        }
        for band in self.bands {
            if complexity <= band.hi {
                return band.eval(complexity as f64);
            }
        }
        self.bands.last().map_or(0.0, |band| band.to)
    }

    /// Complexity values where one band hands over to the next.
    pub fn boundaries(&self) -> impl Iterator<Item = u32> + '_ {
        self.bands.windows(2).map(|pair| pair[0].hi)
    }
}

use Curve::{Cubic, Linear, Power, Quadratic};

const SPAWN_PROBABILITY_BANDS: [Band; 4] = [
    Band::new(0, 10, 0.30, 0.35, Linear),
    Band::new(10, 30, 0.35, 0.50, Quadratic),
    Band::new(30, 60, 0.50, 0.70, Linear),
    Band::new(60, 100, 0.70, 0.90, Power),
];
pub const SPAWN_PROBABILITY: Piecewise = Piecewise::new(&SPAWN_PROBABILITY_BANDS);

const OFF_BEAT_PROBABILITY_BANDS: [Band; 4] = [
    Band::new(0, 20, 0.0, 0.0, Linear),
    Band::new(20, 50, 0.0, 0.20, Quadratic),
    Band::new(50, 80, 0.20, 0.40, Linear),
    Band::new(80, 100, 0.40, 0.55, Linear),
];
pub const OFF_BEAT_PROBABILITY: Piecewise = Piecewise::new(&OFF_BEAT_PROBABILITY_BANDS);

const SPEED_MULTIPLIER_BANDS: [Band; 4] = [
    Band::new(0, 20, 0.30, 0.45, Linear),
    Band::new(20, 30, 0.45, 0.60, Linear),
    Band::new(30, 60, 0.60, 1.00, Quadratic),
    Band::new(60, 100, 1.00, 2.00, Power),
];
pub const SPEED_MULTIPLIER: Piecewise = Piecewise::new(&SPEED_MULTIPLIER_BANDS);

const BPM_MULTIPLIER_BANDS: [Band; 3] = [
    Band::new(0, 30, 0.60, 0.80, Linear),
    Band::new(30, 60, 0.80, 1.00, Linear),
    Band::new(60, 100, 1.00, 1.50, Quadratic),
];
pub const BPM_MULTIPLIER: Piecewise = Piecewise::new(&BPM_MULTIPLIER_BANDS);

const PERFECT_WINDOW_BANDS: [Band; 3] = [
    Band::new(0, 30, 0.60, 0.50, Linear),
    Band::new(30, 70, 0.50, 0.40, Linear),
    Band::new(70, 100, 0.40, 0.32, Cubic),
];
pub const PERFECT_WINDOW: Piecewise = Piecewise::new(&PERFECT_WINDOW_BANDS);

const GOOD_WINDOW_BANDS: [Band; 3] = [
    Band::new(0, 30, 1.20, 1.00, Linear),
    Band::new(30, 70, 1.00, 0.80, Linear),
    Band::new(70, 100, 0.80, 0.65, Cubic),
];
pub const GOOD_WINDOW: Piecewise = Piecewise::new(&GOOD_WINDOW_BANDS);

const ALMOST_WINDOW_BANDS: [Band; 3] = [
    Band::new(0, 30, 1.80, 1.50, Linear),
    Band::new(30, 70, 1.50, 1.20, Linear),
    Band::new(70, 100, 1.20, 1.00, Cubic),
];
pub const ALMOST_WINDOW: Piecewise = Piecewise::new(&ALMOST_WINDOW_BANDS);

const POLYRHYTHM_CHANCE_BANDS: [Band; 4] = [
    Band::new(0, 20, 0.0, 0.0, Linear),
    Band::new(20, 50, 0.0, 0.0, Linear),
    Band::new(50, 80, 0.0, 0.15, Quadratic),
    Band::new(80, 100, 0.15, 0.30, Linear),
];
pub const POLYRHYTHM_CHANCE: Piecewise = Piecewise::new(&POLYRHYTHM_CHANCE_BANDS);

const RAPID_FIRE_CHANCE_BANDS: [Band; 3] = [
    Band::new(0, 40, 0.0, 0.0, Linear),
    Band::new(40, 70, 0.0, 0.10, Linear),
    Band::new(70, 100, 0.10, 0.25, Power),
];
pub const RAPID_FIRE_CHANCE: Piecewise = Piecewise::new(&RAPID_FIRE_CHANCE_BANDS);

const HOLD_NOTE_COMPLEXITY_BANDS: [Band; 4] = [
    Band::new(0, 20, 0.0, 0.05, Linear),
    Band::new(20, 50, 0.05, 0.15, Linear),
    Band::new(50, 80, 0.15, 0.25, Quadratic),
    Band::new(80, 100, 0.25, 0.35, Linear),
];
pub const HOLD_NOTE_COMPLEXITY: Piecewise = Piecewise::new(&HOLD_NOTE_COMPLEXITY_BANDS);

const GLOW_INTENSITY_BANDS: [Band; 3] = [
    Band::new(0, 40, 0.20, 0.50, Linear),
    Band::new(40, 70, 0.50, 0.75, Linear),
    Band::new(70, 100, 0.75, 1.00, Power),
];
pub const GLOW_INTENSITY: Piecewise = Piecewise::new(&GLOW_INTENSITY_BANDS);

const CAMERA_SHAKE_BANDS: [Band; 3] = [
    Band::new(0, 30, 0.0, 0.0, Linear),
    Band::new(30, 60, 0.0, 0.0, Linear),
    Band::new(60, 100, 0.0, 0.30, Quadratic),
];
pub const CAMERA_SHAKE: Piecewise = Piecewise::new(&CAMERA_SHAKE_BANDS);

/// Every continuous parameter, for exhaustive checks.
pub const ALL: [(&str, Piecewise); 12] = [
    ("spawn_probability", SPAWN_PROBABILITY),
    ("off_beat_probability", OFF_BEAT_PROBABILITY),
    ("speed_multiplier", SPEED_MULTIPLIER),
    ("bpm_multiplier", BPM_MULTIPLIER),
    ("perfect_window", PERFECT_WINDOW),
    ("good_window", GOOD_WINDOW),
    ("almost_window", ALMOST_WINDOW),
    ("polyrhythm_chance", POLYRHYTHM_CHANCE),
    ("rapid_fire_chance", RAPID_FIRE_CHANCE),
    ("hold_note_complexity", HOLD_NOTE_COMPLEXITY),
    ("glow_intensity", GLOW_INTENSITY),
    ("camera_shake", CAMERA_SHAKE),
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curves_fix_endpoints() {
        for curve in [Linear, Quadratic, Cubic, Power] {
            assert_eq!(curve.apply(0.0), 0.0);
            assert_eq!(curve.apply(1.0), 1.0);
            assert_eq!(curve.apply(2.0), 1.0);
        }
        assert_relative_eq!(Power.apply(0.25), 0.125);
    }

    #[test]
    fn bands_are_contiguous() {
        for (name, func) in ALL {
            for pair in func.bands.windows(2) {
                assert_eq!(pair[0].hi, pair[1].lo, "{name}: gap between bands");
                assert_relative_eq!(pair[0].to, pair[1].from);
            }
            for band in func.bands {
                let width = band.hi - band.lo;
                assert!((10..=40).contains(&width), "{name}: band width {width}");
            }
        }
    }

    #[test]
    fn boundary_steps_stay_within_adjacent_band_steps() {
        for (name, func) in ALL {
            for boundary in func.boundaries() {
                let jump = (func.eval(boundary + 1) - func.eval(boundary)).abs();
                let band_step = |lo: u32, hi: u32| {
                    (lo..hi)
                        .map(|c| (func.eval(c + 1) - func.eval(c)).abs())
                        .fold(0.0_f64, f64::max)
                };
                let band = func.bands.iter().find(|b| b.lo == boundary);
                let prev = func.bands.iter().find(|b| b.hi == boundary);
                let (Some(band), Some(prev)) = (band, prev) else {
                    continue;
                };
                let allowed = band_step(band.lo, band.hi).max(band_step(prev.lo, prev.hi));
                assert!(
                    jump <= allowed + 1e-9,
                    "{name}: jump {jump} at {boundary} exceeds {allowed}"
                );
            }
        }
    }

    #[test]
    fn out_of_range_clamps() {
        assert_relative_eq!(SPEED_MULTIPLIER.eval(0), 0.30);
        assert_relative_eq!(SPEED_MULTIPLIER.eval(250), 2.00);
    }
}
