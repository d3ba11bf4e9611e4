//! Raw key events from the host and the gameplay actions they map to.

/// Whether a key went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A keyboard event as delivered by the host, with a single-character key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key: String,
    pub state: KeyState,
    /// Auto-repeat events are dropped before they reach gameplay.
    pub repeat: bool,
}

impl RawKeyEvent {
    pub fn pressed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Pressed,
            repeat: false,
        }
    }

    pub fn released(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: KeyState::Released,
            repeat: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Hit { column: usize },
    Release { column: usize },
}
