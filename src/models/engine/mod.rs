pub mod constants;
pub mod hit_window;
pub mod kinematics;
pub mod note;

pub use constants::*;
pub use hit_window::{HitResult, HitWindow};
pub use note::{Note, NoteSnapshot, NoteState, PatternNote, PatternType};
