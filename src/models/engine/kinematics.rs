//! Note motion shared by the live simulation and replay viewers.
//!
//! Base speed ramps linearly with session time, so positions have a closed
//! form and a viewer can place a note from its last known depth alone.

use super::constants::{BASE_SPEED, SPEED_RAMP_PER_SEC};
use crate::difficulty::ComplexityConfig;

/// Base speed after `elapsed` seconds.
#[inline]
pub fn base_speed_at(elapsed: f64, config: &ComplexityConfig) -> f64 {
    BASE_SPEED + SPEED_RAMP_PER_SEC * config.speed_multiplier * elapsed.max(0.0)
}

/// Effective note speed (z units per second) after `elapsed` seconds.
#[inline]
pub fn move_speed_at(elapsed: f64, config: &ComplexityConfig) -> f64 {
    base_speed_at(elapsed, config) * config.speed_multiplier
}

/// Distance travelled between two session times.
pub fn travel(from: f64, to: f64, config: &ComplexityConfig) -> f64 {
    let (from, to) = (from.max(0.0), to.max(0.0));
    if to <= from {
        return 0.0;
    }
    let m = config.speed_multiplier;
    m * (BASE_SPEED * (to - from) + 0.5 * SPEED_RAMP_PER_SEC * m * (to * to - from * from))
}

/// Depth at `now` of a note that was at `z` at time `at` (seconds).
#[inline]
pub fn position_at(z: f64, at: f64, now: f64, config: &ComplexityConfig) -> f64 {
    z + travel(at, now, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::get_config;
    use approx::assert_relative_eq;

    #[test]
    fn stepped_travel_matches_closed_form() {
        let cfg = get_config(70);
        let dt = 1.0 / 60.0;
        let mut z = -30.0;
        for frame in 0..600 {
            let t = frame as f64 * dt;
            z += travel(t, t + dt, cfg);
        }
        assert_relative_eq!(z, position_at(-30.0, 0.0, 10.0, cfg), epsilon = 1e-9);
    }

    #[test]
    fn speed_ramps_with_time() {
        let cfg = get_config(50);
        assert!(move_speed_at(30.0, cfg) > move_speed_at(0.0, cfg));
        assert_relative_eq!(move_speed_at(0.0, cfg), BASE_SPEED * cfg.speed_multiplier);
    }
}
