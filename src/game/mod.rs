//! Pure tic-tac-toe game logic: grid types, rules, and the minimax opponent.

pub mod minimax;
mod rules;
mod types;

pub use rules::{MoveError, WIN_LINES, apply_move, detect_outcome};
pub use types::{Cell, Grid, Mark, Outcome};
