//! Result tree of one benchmark combination.

use std::fs;
use std::path::{Path, PathBuf};

use gap_core::{Experiment, ExperimentKind, GapError, Scenario};

const PRECISION_DIRS: [&str; 8] = [
    "data",
    "error/figs",
    "error/misc",
    "error/results/values/mse",
    "error/results/values/rmse",
    "error/results/recovered_matrices",
    "recovery/figs",
    "recovery/scripts",
];

const RUNTIME_DIRS: [&str; 2] = ["results", "figs"];

/// Folder name holding per-run staging copies under the output root.
pub const STAGING_DIR: &str = ".staging";

/// Result folders of one `(experiment, kind, scenario, dataset)` combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLayout {
    root: PathBuf,
    staging: PathBuf,
    experiment: Experiment,
}

impl ResultLayout {
    /// Layout of one combination under `output_root`.
    pub fn new(
        output_root: &Path,
        experiment: Experiment,
        kind: ExperimentKind,
        scenario: Scenario,
        dataset: &str,
    ) -> Self {
        let relative = PathBuf::from(experiment.long_name())
            .join(kind.long_name())
            .join(scenario.long_name())
            .join(dataset);
        Self {
            root: output_root.join(&relative),
            staging: output_root.join(STAGING_DIR).join(relative),
            experiment,
        }
    }

    /// `<output_root>/<experiment>/<kind>/<scenario>/<dataset>`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the combination root exists.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Creates every folder of the experiment's tree.
    pub fn ensure(&self) -> Result<(), GapError> {
        let dirs: &[&str] = match self.experiment {
            Experiment::Precision => &PRECISION_DIRS,
            Experiment::Runtime => &RUNTIME_DIRS,
        };
        for dir in dirs {
            let path = self.root.join(dir);
            fs::create_dir_all(&path).map_err(|err| GapError::io("gap_exp.layout_io", &path, err))?;
        }
        Ok(())
    }

    /// Where collected outputs of `test_case` wait for aggregation.
    pub fn staging_case(&self, test_case: usize) -> PathBuf {
        self.staging.join(test_case.to_string())
    }

    /// Staging folder of the combination.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Recovered outputs of one test case (precision).
    pub fn data_case(&self, test_case: usize) -> PathBuf {
        self.root.join("data").join(test_case.to_string())
    }

    /// Ground truth copied next to the recovered data.
    pub fn reference_file(&self) -> PathBuf {
        self.root.join("data").join("reference.txt")
    }

    /// MSE series of one sub-algorithm.
    pub fn mse_file(&self, series: &str) -> PathBuf {
        self.root
            .join("error/results/values/mse")
            .join(format!("MSE_{series}.dat"))
    }

    /// RMSE series of one sub-algorithm.
    pub fn rmse_file(&self, series: &str) -> PathBuf {
        self.root
            .join("error/results/values/rmse")
            .join(format!("RMSE_{series}.dat"))
    }

    /// Recovered cells of every series for one test case.
    pub fn recovered_matrix(&self, test_case: usize) -> PathBuf {
        self.root
            .join("error/results/recovered_matrices")
            .join(format!("recoveredMat{test_case}.txt"))
    }

    /// Recovery plot of one test case.
    pub fn recovery_script(&self, dataset: &str, test_case: usize) -> PathBuf {
        self.root
            .join("recovery/scripts")
            .join(format!("{dataset}_m{test_case}.plt"))
    }

    /// MSE plot script.
    pub fn mse_script(&self, dataset: &str) -> PathBuf {
        self.root.join("error/results").join(format!("{dataset}_mse.plt"))
    }

    /// R script summarizing the MSE series.
    pub fn error_calculation_script(&self) -> PathBuf {
        self.root.join("error/results/error_calculation.r")
    }

    /// Python driver of the precision plots, run from the root.
    pub fn plot_all_script(&self) -> PathBuf {
        self.root.join("plotall.py")
    }

    /// Plot of the reference series.
    pub fn reference_plot_script(&self) -> PathBuf {
        self.root.join("recovery/scripts/reference_plot.plt")
    }

    /// Aggregated runtime series of one sub-algorithm.
    pub fn runtime_series(&self, series: &str) -> PathBuf {
        self.root.join("results").join(format!("{series}.txt"))
    }

    /// Runtime plot script.
    pub fn runtime_script(&self, dataset: &str) -> PathBuf {
        self.root.join(format!("{dataset}_rt.plt"))
    }

    /// `run_report.json` of the combination.
    pub fn report_file(&self) -> PathBuf {
        self.root.join("run_report.json")
    }

    /// Removes the staging copies of this combination.
    pub fn clear_staging(&self) -> Result<(), GapError> {
        remove_dir(&self.staging)
    }
}

/// Removes every staging folder under `output_root`.
pub fn clean_uncollected(output_root: &Path) -> Result<(), GapError> {
    remove_dir(&output_root.join(STAGING_DIR))
}

fn remove_dir(path: &Path) -> Result<(), GapError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|err| GapError::io("gap_exp.layout_io", path, err))?;
    }
    Ok(())
}
