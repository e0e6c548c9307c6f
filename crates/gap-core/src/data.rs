//! Immutable description of one synthetic test case.

use serde::{Deserialize, Serialize};

use crate::block::MissingBlock;

/// Complete description of one test case's synthetic ground truth.
///
/// Built once per `(scenario, test case)` and handed to the algorithm
/// invocation step; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDescription {
    /// Number of rows in the data window.
    pub rows: usize,
    /// Number of columns in the data window.
    pub columns: usize,
    /// Missing regions, relative to the data window.
    pub missing_blocks: Vec<MissingBlock>,
    /// Dataset code the window was cut from.
    pub dataset: String,
}

impl DataDescription {
    /// Creates a new description.
    pub fn new(
        rows: usize,
        columns: usize,
        missing_blocks: Vec<MissingBlock>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            rows,
            columns,
            missing_blocks,
            dataset: dataset.into(),
        }
    }

    /// Number of cells covered by the missing blocks.
    pub fn missing_cells(&self) -> usize {
        self.missing_blocks.iter().map(MissingBlock::cell_count).sum()
    }
}
