//! Core domain types for the tic-tac-toe grid.

use serde::{Deserialize, Serialize};

/// One of the two symbols a participant plays with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Mark X (assigned to the first participant, moves first).
    X,
    /// Mark O (assigned to the second participant).
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A single cell on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    /// No mark placed yet.
    Empty,
    /// Cell taken by a mark. Cells never transition back to empty.
    Taken(Mark),
}

/// 3x3 grid in row-major order (indices 0-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [Cell; 9],
}

impl Grid {
    /// Creates an empty grid.
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at the given index, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks whether the cell at `index` is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Checks whether every cell carries a mark.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Indices of all empty cells, in ascending order.
    pub fn open_indices(&self) -> Vec<usize> {
        (0..9).filter(|&i| self.is_empty(i)).collect()
    }

    pub(crate) fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of evaluating a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Game continues.
    Ongoing,
    /// A mark completed one of the eight lines.
    Win {
        /// The winning mark.
        mark: Mark,
        /// The completed index triple.
        line: [usize; 3],
    },
    /// Grid full with no winning line.
    Draw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_flips() {
        assert_eq!(Mark::X.opponent(), Mark::O);
        assert_eq!(Mark::O.opponent(), Mark::X);
    }

    #[test]
    fn test_empty_grid_open_everywhere() {
        let grid = Grid::empty();
        assert_eq!(grid.open_indices().len(), 9);
        assert!(!grid.is_full());
    }

    #[test]
    fn test_get_out_of_range() {
        let grid = Grid::empty();
        assert_eq!(grid.get(9), None);
    }
}
