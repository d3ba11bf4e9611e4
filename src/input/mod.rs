//! Keyboard input: lane bindings and repeat filtering.

pub mod events;
pub mod manager;

pub use events::{GameAction, KeyState, RawKeyEvent};
pub use manager::InputManager;
