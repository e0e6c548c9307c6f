//! Names of the truncated dataset copies in the scratch folder.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use gap_core::{ExperimentKind, Scenario};

/// Folds `dataset + kind + scenario` into the token naming scratch files.
///
/// Each UTF-16 unit contributes `index * |PI * unit|`, truncated, and the
/// contributions are combined with XOR.
pub fn scratch_token(dataset: &str, kind: ExperimentKind, scenario: Scenario) -> u64 {
    let key = format!("{dataset}{}{}", kind.long_name(), scenario.long_name());
    key.encode_utf16()
        .enumerate()
        .map(|(index, unit)| (index as f64 * (PI * f64::from(unit)).abs()) as u64)
        .fold(0, |acc, value| acc ^ value)
}

/// `<scratch_dir>/<token>_<dataset>_<test_case>.txt`.
pub fn scratch_path(scratch_dir: &Path, token: u64, dataset: &str, test_case: usize) -> PathBuf {
    scratch_dir.join(format!("{token}_{dataset}_{test_case}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_character_contributes_nothing() {
        // index 0 multiplies to zero, so only the tail matters
        let a = scratch_token("a", ExperimentKind::Recovery, Scenario::Length);
        let b = scratch_token("b", ExperimentKind::Recovery, Scenario::Length);
        assert_eq!(a, b);
    }

    #[test]
    fn tokens_separate_scenarios() {
        let length = scratch_token("airq", ExperimentKind::Continuous, Scenario::Length);
        let missing = scratch_token("airq", ExperimentKind::Continuous, Scenario::Missing);
        assert_ne!(length, missing);
        assert_eq!(
            length,
            scratch_token("airq", ExperimentKind::Continuous, Scenario::Length)
        );
    }

    #[test]
    fn scratch_path_layout() {
        let path = scratch_path(Path::new("data/_.temp"), 307, "airq", 400);
        assert_eq!(path, PathBuf::from("data/_.temp/307_airq_400.txt"));
    }
}
