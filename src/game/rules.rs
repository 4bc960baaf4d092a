//! Pure move application and outcome detection.
//!
//! These functions never touch I/O and never mutate their inputs, so the
//! coordinator can evaluate a move before committing it to the room.

use super::types::{Cell, Grid, Mark, Outcome};
use derive_more::{Display, Error};
use tracing::instrument;

/// The eight fixed winning triples: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Reasons a move can be rejected by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Index is not in 0..9.
    #[display("index out of range (must be 0-8)")]
    OutOfRange,
    /// Target cell already carries a mark.
    #[display("cell is already occupied")]
    Occupied,
}

/// Applies `mark` at `index`, returning the updated grid.
///
/// The input grid is left untouched; a rejected move returns the reason
/// and nothing else changes.
#[instrument]
pub fn apply_move(grid: &Grid, index: usize, mark: Mark) -> Result<Grid, MoveError> {
    match grid.get(index) {
        None => Err(MoveError::OutOfRange),
        Some(Cell::Taken(_)) => Err(MoveError::Occupied),
        Some(Cell::Empty) => {
            let mut next = *grid;
            next.set(index, Cell::Taken(mark));
            Ok(next)
        }
    }
}

/// Evaluates the grid: first matching line in fixed order wins, a full
/// grid with no winner is a draw, anything else is ongoing.
#[instrument]
pub fn detect_outcome(grid: &Grid) -> Outcome {
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(Cell::Taken(mark)) = grid.get(a) {
            if grid.get(b) == Some(Cell::Taken(mark)) && grid.get(c) == Some(Cell::Taken(mark)) {
                return Outcome::Win { mark, line };
            }
        }
    }

    if grid.is_full() {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}
