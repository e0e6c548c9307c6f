//! Per-combination `run_report.json`.

use std::fs;
use std::path::Path;

use gap_core::{Experiment, ExperimentKind, GapError, Scenario};
use serde::{Deserialize, Serialize};

use crate::hash::{stable_hash_string, to_canonical_json_bytes};

/// Identity of one benchmark combination; hashed into the report id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationKey {
    /// Dataset code.
    pub dataset: String,
    /// Measured quantity.
    pub experiment: Experiment,
    /// Experiment kind.
    pub kind: ExperimentKind,
    /// Missing-value scenario.
    pub scenario: Scenario,
    /// Rows after the row limit.
    pub rows: usize,
    /// Dataset columns.
    pub columns: usize,
    /// Test case values, in run order.
    pub test_cases: Vec<usize>,
    /// Codes of the algorithms that ran.
    pub algorithms: Vec<String>,
}

/// Persisted summary of one combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationReport {
    /// Sha256 of the canonical key.
    pub id: String,
    /// What was run.
    #[serde(flatten)]
    pub key: CombinationKey,
    /// Plotted series, `<code>` or `<code>_k<k>`.
    pub series: Vec<String>,
    /// Warnings queued while the combination ran.
    pub warnings: Vec<String>,
}

impl CombinationReport {
    /// Hashes `key` into the report id.
    pub fn build(key: CombinationKey, series: Vec<String>, warnings: Vec<String>) -> Result<Self, GapError> {
        let id = stable_hash_string(&key)?;
        Ok(Self {
            id,
            key,
            series,
            warnings,
        })
    }

    /// Writes the report as canonical JSON.
    pub fn write(&self, path: &Path) -> Result<(), GapError> {
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| GapError::io("gap_exp.report_io", path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CombinationKey {
        CombinationKey {
            dataset: "airq".into(),
            experiment: Experiment::Precision,
            kind: ExperimentKind::Recovery,
            scenario: Scenario::Missing,
            rows: 1000,
            columns: 10,
            test_cases: vec![100, 200],
            algorithms: vec!["cdrec".into()],
        }
    }

    #[test]
    fn id_depends_only_on_key() {
        let a = CombinationReport::build(key(), vec!["cdrec_k3".into()], Vec::new()).expect("report");
        let b = CombinationReport::build(key(), Vec::new(), vec!["warned".into()]).expect("report");
        assert_eq!(a.id, b.id);
        let mut other = key();
        other.rows = 999;
        let c = CombinationReport::build(other, Vec::new(), Vec::new()).expect("report");
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn report_roundtrips_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run_report.json");
        let report = CombinationReport::build(key(), vec!["cdrec_k3".into()], Vec::new()).expect("report");
        report.write(&path).expect("write");
        let parsed: CombinationReport =
            serde_json::from_slice(&fs::read(&path).expect("read")).expect("parse");
        assert_eq!(parsed, report);
    }
}
