//! Missing-value block triples.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A contiguous run of missing values inside one column.
///
/// Scenario templates use [`MissingBlock::UNSET`] for the column (one block
/// per column, computed later) or for the start/length (filled in by the
/// per-test-case update rule). Blocks handed to data generation are always
/// concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MissingBlock {
    /// Column index, or `UNSET`.
    pub column: i64,
    /// First missing row, or `UNSET`.
    pub start: i64,
    /// Number of missing rows, or `UNSET`.
    pub length: i64,
}

impl MissingBlock {
    /// Sentinel for a field the scenario logic computes per test case.
    pub const UNSET: i64 = -1;

    /// Creates a block from its raw triple.
    pub const fn new(column: i64, start: i64, length: i64) -> Self {
        Self {
            column,
            start,
            length,
        }
    }

    /// Creates a concrete block from unsigned coordinates.
    pub fn at(column: usize, start: usize, length: usize) -> Self {
        Self::new(column as i64, start as i64, length as i64)
    }

    /// A template block with every field left to the scenario logic.
    pub const fn unset() -> Self {
        Self::new(Self::UNSET, Self::UNSET, Self::UNSET)
    }

    /// Whether every field holds a real coordinate.
    pub fn is_concrete(&self) -> bool {
        self.column >= 0 && self.start >= 0 && self.length >= 1
    }

    /// One past the last missing row.
    pub fn end(&self) -> i64 {
        self.start + self.length
    }

    /// Whether the cell `(column, row)` falls inside this block.
    pub fn covers(&self, column: usize, row: usize) -> bool {
        if !self.is_concrete() {
            return false;
        }
        let (column, row) = (column as i64, row as i64);
        self.column == column && row >= self.start && row < self.end()
    }

    /// Total number of cells this block covers (zero for templates).
    pub fn cell_count(&self) -> usize {
        if self.is_concrete() {
            self.length as usize
        } else {
            0
        }
    }
}

impl fmt::Display for MissingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.column, self.start, self.length)
    }
}

/// Whether any block in `blocks` covers `(column, row)`.
pub fn is_missing(blocks: &[MissingBlock], column: usize, row: usize) -> bool {
    blocks.iter().any(|block| block.covers(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_is_half_open() {
        let block = MissingBlock::at(1, 5, 3);
        assert!(!block.covers(1, 4));
        assert!(block.covers(1, 5));
        assert!(block.covers(1, 7));
        assert!(!block.covers(1, 8));
        assert!(!block.covers(0, 6));
    }

    #[test]
    fn templates_cover_nothing() {
        let template = MissingBlock::new(0, MissingBlock::UNSET, 100);
        assert!(!template.is_concrete());
        assert!(!template.covers(0, 0));
        assert_eq!(template.cell_count(), 0);
    }
}
