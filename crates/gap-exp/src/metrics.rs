//! Error metrics over the missing cells and runtime series.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gap_core::{ErrorInfo, GapError, MissingBlock};
use serde::{Deserialize, Serialize};

/// Mean squared error and its root over the missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Root of `mse`.
    pub rmse: f64,
    /// Number of cells compared.
    pub cells: usize,
}

fn shape_error(column: usize, row: usize) -> GapError {
    GapError::Serde(
        ErrorInfo::new("gap_exp.recovered_shape", "matrix does not cover a missing cell")
            .with_context("column", column.to_string())
            .with_context("row", row.to_string()),
    )
}

fn cell(matrix: &[Vec<f64>], column: usize, row: usize) -> Result<f64, GapError> {
    matrix
        .get(row)
        .and_then(|values| values.get(column))
        .copied()
        .ok_or_else(|| shape_error(column, row))
}

/// Compares `recovered` against `reference` on exactly the cells covered by
/// `blocks`. Both matrices are indexed in window coordinates.
pub fn error_metrics(
    reference: &[Vec<f64>],
    recovered: &[Vec<f64>],
    blocks: &[MissingBlock],
) -> Result<ErrorMetrics, GapError> {
    let mut sum = 0.0;
    let mut cells = 0usize;
    for (column, row) in gap_scenario::expand(blocks) {
        let diff = cell(reference, column, row)? - cell(recovered, column, row)?;
        sum += diff * diff;
        cells += 1;
    }
    let mse = if cells == 0 { 0.0 } else { sum / cells as f64 };
    Ok(ErrorMetrics {
        mse,
        rmse: mse.sqrt(),
        cells,
    })
}

/// Writes `test_case value` lines.
pub fn write_series(path: &Path, points: &[(usize, f64)]) -> Result<(), GapError> {
    let file = File::create(path).map_err(|err| GapError::io("gap_exp.series_io", path, err))?;
    let mut writer = BufWriter::new(file);
    for (test_case, value) in points {
        writeln!(writer, "{test_case} {value}")
            .map_err(|err| GapError::io("gap_exp.series_io", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| GapError::io("gap_exp.series_io", path, err))
}

/// Lists every missing cell with the reference value and each series' value.
pub fn write_recovered_cells(
    path: &Path,
    blocks: &[MissingBlock],
    reference: &[Vec<f64>],
    series: &[(String, Vec<Vec<f64>>)],
) -> Result<(), GapError> {
    let file = File::create(path).map_err(|err| GapError::io("gap_exp.series_io", path, err))?;
    let mut writer = BufWriter::new(file);
    let header: Vec<&str> = ["column", "row", "reference"]
        .into_iter()
        .chain(series.iter().map(|(name, _)| name.as_str()))
        .collect();
    writeln!(writer, "{}", header.join(" "))
        .map_err(|err| GapError::io("gap_exp.series_io", path, err))?;
    for (column, row) in gap_scenario::expand(blocks) {
        let mut line = vec![
            column.to_string(),
            row.to_string(),
            cell(reference, column, row)?.to_string(),
        ];
        for (_, matrix) in series {
            line.push(
                cell(matrix, column, row)
                    .map(|value| value.to_string())
                    .unwrap_or_else(|_| "NaN".to_string()),
            );
        }
        writeln!(writer, "{}", line.join(" "))
            .map_err(|err| GapError::io("gap_exp.series_io", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| GapError::io("gap_exp.series_io", path, err))
}
