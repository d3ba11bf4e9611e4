use super::events::{GameAction, KeyState, RawKeyEvent};
use crate::models::engine::constants::NUM_COLUMNS;
use std::collections::HashMap;

const DEFAULT_KEYS: [&str; NUM_COLUMNS] = ["1", "2", "3", "4", "5"];

/// Maps key strings to lanes.
pub struct InputManager {
    bindings: HashMap<String, usize>,
}

impl InputManager {
    pub fn new() -> Self {
        let mut manager = Self {
            bindings: HashMap::new(),
        };
        manager.load_default_bindings();
        manager
    }

    /// Builds a manager with the configured keys applied over the defaults.
    pub fn with_keybinds(keybinds: &[String]) -> Self {
        let mut manager = Self::new();
        manager.reload_keybinds(keybinds);
        manager
    }

    pub fn process(&self, event: &RawKeyEvent) -> Option<GameAction> {
        if event.repeat {
            return None;
        }
        let column = *self.bindings.get(&event.key)?;
        match event.state {
            KeyState::Pressed => Some(GameAction::Hit { column }),
            KeyState::Released => Some(GameAction::Release { column }),
        }
    }

    /// Lane bound to `key`, if any.
    pub fn lane_for(&self, key: &str) -> Option<usize> {
        self.bindings.get(key).copied()
    }

    /// Key currently bound to `lane`.
    pub fn key_for(&self, lane: usize) -> Option<&str> {
        self.bindings
            .iter()
            .find(|&(_, &bound)| bound == lane)
            .map(|(key, _)| key.as_str())
    }

    /// Replaces lane bindings with one key per lane. Blank or
    /// multi-character entries are skipped and keep their default.
    pub fn reload_keybinds(&mut self, keybinds: &[String]) {
        let mut parsed = Vec::new();
        for (idx, label) in keybinds.iter().enumerate() {
            if idx >= NUM_COLUMNS {
                log::warn!("INPUT: Ignoring extra keybind {:?}", label);
                continue;
            }
            let label = label.trim();
            if label.chars().count() != 1 {
                log::warn!("INPUT: Unusable keybind {:?} for lane {}", label, idx);
                continue;
            }
            parsed.push((idx, label.to_string()));
        }

        if parsed.is_empty() {
            return;
        }

        for (idx, key) in parsed {
            self.bindings.retain(|_, lane| *lane != idx);
            self.bindings.insert(key, idx);
        }
    }

    fn load_default_bindings(&mut self) {
        for (lane, key) in DEFAULT_KEYS.iter().enumerate() {
            self.bindings.insert((*key).to_string(), lane);
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_map_to_lanes() {
        let manager = InputManager::new();
        assert_eq!(
            manager.process(&RawKeyEvent::pressed("1")),
            Some(GameAction::Hit { column: 0 })
        );
        assert_eq!(
            manager.process(&RawKeyEvent::released("5")),
            Some(GameAction::Release { column: 4 })
        );
        assert_eq!(manager.process(&RawKeyEvent::pressed("q")), None);
    }

    #[test]
    fn repeats_are_dropped() {
        let manager = InputManager::new();
        let mut event = RawKeyEvent::pressed("3");
        event.repeat = true;
        assert_eq!(manager.process(&event), None);
    }

    #[test]
    fn custom_binds_replace_lane_keys() {
        let binds = ["a", "", "dd", "f"].map(String::from);
        let manager = InputManager::with_keybinds(&binds);
        assert_eq!(manager.lane_for("a"), Some(0));
        assert_eq!(manager.lane_for("1"), None);
        assert_eq!(manager.lane_for("2"), Some(1));
        assert_eq!(manager.lane_for("3"), Some(2));
        assert_eq!(manager.lane_for("f"), Some(3));
        assert_eq!(manager.lane_for("4"), None);
    }
}
