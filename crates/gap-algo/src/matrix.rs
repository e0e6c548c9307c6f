//! Whitespace-delimited numeric matrices, one row per line.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use gap_core::{is_missing, ErrorInfo, GapError, MissingBlock};

/// Token written for a missing value.
pub const MISSING_TOKEN: &str = "NaN";

fn parse_error(path: &Path, line: usize, token: &str) -> GapError {
    GapError::Serde(
        ErrorInfo::new("gap_algo.matrix_parse", format!("invalid number {token:?}"))
            .with_context("path", path.display().to_string())
            .with_context("line", (line + 1).to_string()),
    )
}

fn parse_row(path: &Path, index: usize, line: &str) -> Result<Vec<f64>, GapError> {
    line.split_whitespace()
        .map(|token| token.parse::<f64>().map_err(|_| parse_error(path, index, token)))
        .collect()
}

fn open(path: &Path) -> Result<BufReader<File>, GapError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| GapError::io("gap_algo.matrix_io", path, err))
}

/// Reads at most `limit` non-empty rows.
pub fn read_matrix(path: &Path, limit: Option<usize>) -> Result<Vec<Vec<f64>>, GapError> {
    let reader = open(path)?;
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
        let line = line.map_err(|err| GapError::io("gap_algo.matrix_io", path, err))?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(path, index, &line)?);
    }
    Ok(rows)
}

/// Returns `(rows, columns)` of a matrix file, columns taken from the first row.
pub fn dimensions(path: &Path) -> Result<(usize, usize), GapError> {
    let reader = open(path)?;
    let mut rows = 0;
    let mut columns = 0;
    for line in reader.lines() {
        let line = line.map_err(|err| GapError::io("gap_algo.matrix_io", path, err))?;
        if line.trim().is_empty() {
            continue;
        }
        if rows == 0 {
            columns = line.split_whitespace().count();
        }
        rows += 1;
    }
    Ok((rows, columns))
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        MISSING_TOKEN.to_string()
    } else {
        value.to_string()
    }
}

/// Writes `rows` to `path`, replacing any existing file.
pub fn write_matrix(path: &Path, rows: &[Vec<f64>]) -> Result<(), GapError> {
    let file = File::create(path).map_err(|err| GapError::io("gap_algo.matrix_io", path, err))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        let line: Vec<String> = row.iter().copied().map(format_value).collect();
        writeln!(writer, "{}", line.join(" "))
            .map_err(|err| GapError::io("gap_algo.matrix_io", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| GapError::io("gap_algo.matrix_io", path, err))
}

/// Copies the `rows x columns` window of `source` into `destination`,
/// writing [`MISSING_TOKEN`] for every cell covered by `blocks`.
///
/// Block coordinates are relative to the window. A window reaching past
/// the source is clipped to what the source holds.
pub fn write_window(
    source: &Path,
    destination: &Path,
    rows: Range<usize>,
    columns: Range<usize>,
    blocks: &[MissingBlock],
) -> Result<usize, GapError> {
    let data = read_matrix(source, Some(rows.end))?;
    if data.is_empty() {
        return Err(GapError::Config(
            ErrorInfo::new("gap_algo.empty_source", "dataset file holds no rows")
                .with_context("path", source.display().to_string()),
        ));
    }
    let row_end = rows.end.min(data.len());
    let column_end = columns.end.min(data[0].len());

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| GapError::io("gap_algo.matrix_io", parent, err))?;
    }
    let file = File::create(destination)
        .map_err(|err| GapError::io("gap_algo.matrix_io", destination, err))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;
    for (i, row) in data.iter().enumerate().take(row_end).skip(rows.start) {
        let line: Vec<String> = (columns.start..column_end)
            .map(|j| {
                if is_missing(blocks, j - columns.start, i - rows.start) {
                    MISSING_TOKEN.to_string()
                } else {
                    row.get(j).copied().map(format_value).unwrap_or_else(|| MISSING_TOKEN.to_string())
                }
            })
            .collect();
        writeln!(writer, "{}", line.join(" "))
            .map_err(|err| GapError::io("gap_algo.matrix_io", destination, err))?;
        written += 1;
    }
    writer
        .flush()
        .map_err(|err| GapError::io("gap_algo.matrix_io", destination, err))?;
    Ok(written)
}

/// Copies rows `from..to` of `source` verbatim into `destination`.
pub fn write_row_range(source: &Path, destination: &Path, from: usize, to: usize) -> Result<(), GapError> {
    let data = read_matrix(source, Some(to))?;
    let slice = data.get(from.min(data.len())..).unwrap_or_default();
    write_matrix(destination, slice)
}

/// First numeric token of a runtime output file.
pub fn read_runtime(path: &Path) -> Result<f64, GapError> {
    let contents =
        fs::read_to_string(path).map_err(|err| GapError::io("gap_algo.runtime_io", path, err))?;
    contents
        .split_whitespace()
        .find_map(|token| token.parse::<f64>().ok())
        .ok_or_else(|| {
            GapError::Serde(
                ErrorInfo::new("gap_algo.runtime_parse", "runtime file holds no number")
                    .with_context("path", path.display().to_string()),
            )
        })
}
