//! Append-only result ledger backed by CSV or SQLite.

use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use gap_core::{ErrorInfo, GapError};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// Supported ledger backends.
#[derive(Debug, Clone, PartialEq)]
pub enum Ledger {
    /// Comma-separated file with a header row.
    Csv(PathBuf),
    /// SQLite database with a `results` table.
    Sqlite(PathBuf),
}

impl Ledger {
    /// Picks the backend from the file extension; anything else is CSV.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("sqlite") | Some("db") => Ledger::Sqlite(path),
            _ => Ledger::Csv(path),
        }
    }

    /// Appends `rows`, creating the ledger on first use.
    pub fn append(&self, rows: &[LedgerRow]) -> Result<(), GapError> {
        if rows.is_empty() {
            return Ok(());
        }
        match self {
            Ledger::Csv(path) => append_csv(path, rows),
            Ledger::Sqlite(path) => append_sqlite(path, rows),
        }
    }

    /// Rows matching `query`, in insertion order.
    pub fn query(&self, query: &Query) -> Result<Vec<LedgerRow>, GapError> {
        match self {
            Ledger::Csv(path) => query_csv(path, query),
            Ledger::Sqlite(path) => query_sqlite(path, query),
        }
    }
}

/// One measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Report id of the combination.
    pub run_id: String,
    /// Dataset code.
    pub dataset: String,
    /// Experiment long name.
    pub experiment: String,
    /// Kind long name.
    pub kind: String,
    /// Scenario long name.
    pub scenario: String,
    /// Sub-algorithm code.
    pub series: String,
    /// Test case value.
    pub test_case: usize,
    /// `mse`, `rmse` or `runtime`.
    pub metric: String,
    /// Measured value.
    pub value: f64,
}

/// Ledger lookup filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Query {
    /// Only rows of this dataset.
    #[serde(default)]
    pub dataset: Option<String>,
    /// At most this many rows.
    #[serde(default)]
    pub limit: Option<usize>,
}

const COLUMNS: [&str; 9] = [
    "run_id",
    "dataset",
    "experiment",
    "kind",
    "scenario",
    "series",
    "test_case",
    "metric",
    "value",
];

fn append_csv(path: &Path, rows: &[LedgerRow]) -> Result<(), GapError> {
    ensure_parent(path)?;
    let file_exists = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            GapError::Io(
                ErrorInfo::new("gap_exp.ledger_open", "failed to open CSV ledger")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    if !file_exists {
        writer
            .write_record(COLUMNS)
            .map_err(|err| wrap_csv("gap_exp.ledger_header", err))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| wrap_csv("gap_exp.ledger_row", err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("gap_exp.ledger_flush", err.into()))?;
    Ok(())
}

fn open_sqlite(path: &Path) -> Result<Connection, GapError> {
    let conn = Connection::open(path).map_err(|err| {
        GapError::Io(
            ErrorInfo::new("gap_exp.ledger_sqlite_open", "failed to open sqlite ledger")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    conn.execute_batch(
        r#"CREATE TABLE IF NOT EXISTS results (
            run_id TEXT NOT NULL,
            dataset TEXT NOT NULL,
            experiment TEXT NOT NULL,
            kind TEXT NOT NULL,
            scenario TEXT NOT NULL,
            series TEXT NOT NULL,
            test_case INTEGER NOT NULL,
            metric TEXT NOT NULL,
            value REAL NOT NULL
        );"#,
    )
    .map_err(|err| sqlite_error("gap_exp.ledger_sqlite_schema", "failed to ensure ledger schema", err))?;
    Ok(conn)
}

fn append_sqlite(path: &Path, rows: &[LedgerRow]) -> Result<(), GapError> {
    ensure_parent(path)?;
    let mut conn = open_sqlite(path)?;
    let tx = conn.transaction().map_err(|err| {
        sqlite_error("gap_exp.ledger_sqlite_transaction", "failed to start transaction", err)
    })?;
    for row in rows {
        tx.execute(
            "INSERT INTO results (run_id, dataset, experiment, kind, scenario, series, test_case, metric, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &row.run_id,
                &row.dataset,
                &row.experiment,
                &row.kind,
                &row.scenario,
                &row.series,
                row.test_case as i64,
                &row.metric,
                row.value,
            ],
        )
        .map_err(|err| sqlite_error("gap_exp.ledger_sqlite_insert", "failed to append ledger row", err))?;
    }
    tx.commit()
        .map_err(|err| sqlite_error("gap_exp.ledger_sqlite_commit", "failed to commit ledger rows", err))?;
    Ok(())
}

fn query_csv(path: &Path, query: &Query) -> Result<Vec<LedgerRow>, GapError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("gap_exp.ledger_read", err))?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: LedgerRow = result.map_err(|err| wrap_csv("gap_exp.ledger_record", err))?;
        if query.dataset.as_ref().is_some_and(|dataset| *dataset != row.dataset) {
            continue;
        }
        rows.push(row);
        if query.limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
    }
    Ok(rows)
}

fn query_sqlite(path: &Path, query: &Query) -> Result<Vec<LedgerRow>, GapError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let conn = open_sqlite(path)?;
    let mut sql = format!("SELECT {} FROM results", COLUMNS.join(", "));
    if query.dataset.is_some() {
        sql.push_str(" WHERE dataset = ?1");
    }
    sql.push_str(" ORDER BY rowid");
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|err| sqlite_error("gap_exp.ledger_sqlite_prepare", "failed to prepare ledger query", err))?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<LedgerRow> {
        let test_case: i64 = row.get(6)?;
        Ok(LedgerRow {
            run_id: row.get(0)?,
            dataset: row.get(1)?,
            experiment: row.get(2)?,
            kind: row.get(3)?,
            scenario: row.get(4)?,
            series: row.get(5)?,
            test_case: test_case.max(0) as usize,
            metric: row.get(7)?,
            value: row.get(8)?,
        })
    };
    let mapped = match &query.dataset {
        Some(dataset) => stmt.query_map([dataset], map_row),
        None => stmt.query_map([], map_row),
    }
    .map_err(|err| sqlite_error("gap_exp.ledger_sqlite_query", "failed to execute ledger query", err))?;
    mapped
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|err| sqlite_error("gap_exp.ledger_sqlite_row", "failed to fetch ledger row", err))
}

fn ensure_parent(path: &Path) -> Result<(), GapError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            GapError::Io(
                ErrorInfo::new("gap_exp.ledger_create", "failed to create ledger directory")
                    .with_context("path", parent.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?
    }
    Ok(())
}

fn sqlite_error(code: &str, message: &str, err: rusqlite::Error) -> GapError {
    GapError::Io(ErrorInfo::new(code, message).with_hint(err.to_string()))
}

fn wrap_csv(code: &str, err: csv::Error) -> GapError {
    GapError::Io(ErrorInfo::new(code, "CSV ledger failure").with_hint(err.to_string()))
}
