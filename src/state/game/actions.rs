//! Trait implementations for GameSession.

use super::GameSession;
use crate::input::events::GameAction;
use crate::shared::snapshot::GameplaySnapshot;
use crate::state::traits::{HandleAction, Snapshot, Transition, Update};

impl Snapshot for GameSession {
    type Output = GameplaySnapshot;

    fn create_snapshot(&self) -> Self::Output {
        self.get_snapshot()
    }
}

// Sessions need per-frame updates; a finished session asks for the results.
impl Update for GameSession {
    fn update(&mut self, dt: f64) -> Option<Transition> {
        self.tick(dt).map(Transition::ToResult)
    }
}

impl HandleAction for GameSession {
    fn handle_action(&mut self, action: &GameAction) {
        match *action {
            GameAction::Hit { column } => self.handle_key_down(column),
            GameAction::Release { column } => self.handle_key_up(column),
        }
    }
}
