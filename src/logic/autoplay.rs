//! Deterministic bot that plays a session through the normal input path.

use crate::input::InputManager;
use crate::input::events::{GameAction, RawKeyEvent};
use crate::models::engine::{FRAMES_PER_SECOND, HIT_LINE_Z, NUM_COLUMNS, NoteState, kinematics};
use crate::state::GameSession;

/// Presses on the frame where a note head is closest to the hit line and
/// lets go once nothing on the lane is being held.
#[derive(Debug, Default)]
pub struct Autoplay;

impl Autoplay {
    pub fn new() -> Self {
        Self
    }

    /// Actions to feed into the session before its next tick.
    pub fn actions(&self, session: &GameSession) -> Vec<GameAction> {
        let window = session.hit_window().max_window();
        let now = session.elapsed;
        let step = kinematics::travel(now, now + 1.0 / FRAMES_PER_SECOND, session.complexity());
        let mut actions = Vec::new();

        for column in 0..NUM_COLUMNS {
            if session.keys_held[column] {
                let holding = session
                    .notes
                    .iter()
                    .any(|n| n.lane == column && n.state == NoteState::Held);
                if !holding {
                    actions.push(GameAction::Release { column });
                }
                continue;
            }

            let due = session.notes.iter().any(|n| {
                let offset = n.z - HIT_LINE_Z;
                n.lane == column
                    && n.is_judgeable()
                    && offset.abs() <= window
                    && offset.abs() <= (offset + step).abs()
            });
            if due {
                actions.push(GameAction::Hit { column });
            }
        }
        actions
    }

    /// The same decisions typed on the keys `input` binds to each lane.
    pub fn key_events(&self, session: &GameSession, input: &InputManager) -> Vec<RawKeyEvent> {
        self.actions(session)
            .into_iter()
            .filter_map(|action| match action {
                GameAction::Hit { column } => input.key_for(column).map(RawKeyEvent::pressed),
                GameAction::Release { column } => input.key_for(column).map(RawKeyEvent::released),
            })
            .collect()
    }
}
