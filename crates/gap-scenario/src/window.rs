use std::ops::Range;

use gap_core::{DataDescription, ExperimentKind, MissingBlock, Scenario};
use serde::{Deserialize, Serialize};

/// Row and column window of the source matrix handed to an algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataWindow {
    /// Rows copied from the source.
    pub rows: Range<usize>,
    /// Columns copied from the source.
    pub columns: Range<usize>,
}

impl DataWindow {
    /// Number of rows in the window.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the window.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// Window for `test_case`: length scenarios cut rows, column scenarios cut
/// columns, everything else sees the whole `rows x columns` matrix.
pub fn data_window(scenario: Scenario, rows: usize, columns: usize, test_case: usize) -> DataWindow {
    let row_end = if scenario.varies_length() { test_case } else { rows };
    let column_end = if scenario.varies_columns() {
        test_case
    } else {
        columns
    };
    DataWindow {
        rows: 0..row_end,
        columns: 0..column_end,
    }
}

/// Builds the description passed to the algorithm invocation step.
pub fn describe(
    scenario: Scenario,
    dataset: &str,
    rows: usize,
    columns: usize,
    test_case: usize,
    blocks: Vec<MissingBlock>,
) -> DataDescription {
    let window = data_window(scenario, rows, columns, test_case);
    DataDescription::new(window.height(), window.width(), blocks, dataset)
}

/// Whether each test case reads a truncated copy holding the last
/// `test_case` rows of the dataset instead of the dataset itself.
pub fn uses_truncated_source(kind: ExperimentKind, scenario: Scenario) -> bool {
    kind == ExperimentKind::Continuous && scenario == Scenario::Length
}

/// Index of the first plotted row relative to the full dataset.
pub fn series_offset(kind: ExperimentKind, scenario: Scenario, rows: usize, test_case: usize) -> usize {
    if kind.is_tail_anchored() && scenario == Scenario::Length {
        rows.saturating_sub(test_case)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_scenarios_cut_rows() {
        let window = data_window(Scenario::McarLength, 1000, 6, 400);
        assert_eq!(window.rows, 0..400);
        assert_eq!(window.columns, 0..6);
    }

    #[test]
    fn column_scenarios_cut_columns() {
        let description = describe(Scenario::Columns, "airq", 1000, 10, 7, Vec::new());
        assert_eq!((description.rows, description.columns), (1000, 7));
        assert_eq!(description.dataset, "airq");
    }

    #[test]
    fn offset_only_for_tail_length() {
        assert_eq!(
            series_offset(ExperimentKind::Continuous, Scenario::Length, 1000, 400),
            600
        );
        assert_eq!(
            series_offset(ExperimentKind::Recovery, Scenario::Length, 1000, 400),
            0
        );
    }
}
