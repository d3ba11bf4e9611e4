//! Traits shared by the live session and the replay viewer.

use crate::input::events::GameAction;

/// Why a session stopped accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Health reached 0.
    GameOver,
    /// The configured time limit elapsed.
    TimeUp,
    /// The score-attack target was reached.
    TargetReached,
}

/// Transition result from an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session is over and results can be collected.
    ToResult(EndReason),
}

/// Trait for creating render-ready snapshots.
///
/// Snapshots are owned captures handed to a presentation layer.
pub trait Snapshot {
    /// The snapshot type produced.
    type Output;

    fn create_snapshot(&self) -> Self::Output;
}

/// Trait for per-frame updates.
pub trait Update {
    /// Advances the state by `dt` seconds.
    ///
    /// Returns a transition once the state is finished.
    fn update(&mut self, dt: f64) -> Option<Transition>;
}

/// Trait for handling game actions.
pub trait HandleAction {
    fn handle_action(&mut self, action: &GameAction);
}
