//! Exhaustive minimax opponent for single-player games.
//!
//! Stateless and deterministic: the full game tree is at most 9 plies deep,
//! so no pruning or caching is needed. Used by the single-player client
//! mode; the room coordinator never calls into this module.

use super::rules::{apply_move, detect_outcome};
use super::types::{Grid, Mark, Outcome};
use tracing::instrument;

/// Picks the strongest move for `computer` on the given grid.
///
/// Returns `None` when the grid has no open cell or is already terminal.
/// Terminal positions score `10 - depth` for a computer win and
/// `depth - 10` for an opponent win, so faster wins and slower losses are
/// preferred. Ties keep the first candidate in index order, which makes the
/// choice deterministic.
#[instrument]
pub fn best_move(grid: &Grid, computer: Mark) -> Option<usize> {
    if detect_outcome(grid) != Outcome::Ongoing {
        return None;
    }

    let mut best: Option<(usize, i32)> = None;
    for index in grid.open_indices() {
        let next = apply_move(grid, index, computer).expect("open cell accepts a move");
        let score = minimax(&next, computer, computer.opponent(), 1);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

fn minimax(grid: &Grid, computer: Mark, to_move: Mark, depth: i32) -> i32 {
    match detect_outcome(grid) {
        Outcome::Win { mark, .. } if mark == computer => 10 - depth,
        Outcome::Win { .. } => depth - 10,
        Outcome::Draw => 0,
        Outcome::Ongoing => {
            let scores = grid.open_indices().into_iter().map(|index| {
                let next = apply_move(grid, index, to_move).expect("open cell accepts a move");
                minimax(&next, computer, to_move.opponent(), depth + 1)
            });
            if to_move == computer {
                scores.max().expect("ongoing grid has open cells")
            } else {
                scores.min().expect("ongoing grid has open cells")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::apply_move;

    fn grid_from(moves: &[(usize, Mark)]) -> Grid {
        let mut grid = Grid::empty();
        for &(index, mark) in moves {
            grid = apply_move(&grid, index, mark).unwrap();
        }
        grid
    }

    #[test]
    fn test_takes_immediate_win() {
        // O to move with O at 0 and 1.
        let grid = grid_from(&[(4, Mark::X), (0, Mark::O), (8, Mark::X), (1, Mark::O), (5, Mark::X)]);
        assert_eq!(best_move(&grid, Mark::O), Some(2));
    }

    #[test]
    fn test_blocks_immediate_threat() {
        // X threatens 0-1-2; O must block at 2.
        let grid = grid_from(&[(0, Mark::X), (4, Mark::O), (1, Mark::X)]);
        assert_eq!(best_move(&grid, Mark::O), Some(2));
    }

    #[test]
    fn test_terminal_grid_has_no_move() {
        let grid = grid_from(&[
            (0, Mark::X),
            (3, Mark::O),
            (1, Mark::X),
            (4, Mark::O),
            (2, Mark::X),
        ]);
        assert_eq!(best_move(&grid, Mark::X), None);
    }

    #[test]
    fn test_deterministic() {
        let grid = grid_from(&[(4, Mark::X)]);
        let first = best_move(&grid, Mark::O);
        for _ in 0..5 {
            assert_eq!(best_move(&grid, Mark::O), first);
        }
    }
}
