//! Gnuplot scripts with `{placeholder}` substitution, and the tool runner.

use std::fs;
use std::path::Path;
use std::process::Command;

use gap_algo::SubAlgorithm;
use gap_core::{ErrorInfo, ExperimentKind, GapError, Scenario};
use tracing::debug;

const RUNTIME_TEMPLATE: &str = "\
# algorithms: {allAlgos}
set terminal postscript eps enhanced color font 'Helvetica,20'
set output 'figs/{code}_rt.eps'
set title '{title}'
set xlabel '{axis}'
set ylabel 'running time (microseconds)'
set xrange [{start}:{end}]
set xtics {tick}
set logscale y
set key outside
plot {series}
";

const MSE_TEMPLATE: &str = "\
# algorithms: {allAlgos}
set terminal postscript eps enhanced color font 'Helvetica,20'
set output '../figs/{code}_mse.eps'
set title '{title}'
set xlabel '{axis}'
set ylabel 'MSE'
set xrange [{start}:{end}]
set xtics {tick}
set key outside
plot {series}
";

const RECOVERY_TEMPLATE: &str = "\
set terminal postscript eps enhanced color font 'Helvetica,20'
set output '../figs/{code}_m{case}.eps'
set title '{title}'
set xlabel 'row'
set xrange [{offset}:{nlimit}]
set key outside
plot '../../data/reference.txt' using 1:{column} title 'reference' with lines lc rgbcolor 'gray', \\
     {series}
";

const ERROR_CALCULATION_TEMPLATE: &str = r#"algos <- c({allAlgos})
cases <- seq({start}, {end}, by = {tick})
means <- sapply(algos, function(algo) {
  values <- read.table(paste0("values/mse/MSE_", algo, ".dat"))
  mean(values[values[, 1] %in% cases, 2])
})
write.table(means, file = "../misc/mse_mean.txt", col.names = FALSE, quote = FALSE)
"#;

const PLOT_ALL_TEMPLATE: &str = r#"# {code}: test cases {start}..{end} step {tick}
import glob
import os
import subprocess

subprocess.call(["{gnuplot}", "{code}_mse.plt"], cwd="error/results")
for script in sorted(glob.glob("recovery/scripts/*.plt")):
    subprocess.call(["{gnuplot}", os.path.basename(script)], cwd="recovery/scripts")
"#;

const REFERENCE_PLOT_6_TEMPLATE: &str = "\
set terminal postscript eps enhanced color font 'Helvetica,14'
set output '../figs/reference.eps'
set multiplot layout 3,2
set xrange [0:{nlimit}]
plot '../../data/reference.txt' using 0:1 title 'column 1' with lines
plot '../../data/reference.txt' using 0:2 title 'column 2' with lines
plot '../../data/reference.txt' using 0:3 title 'column 3' with lines
plot '../../data/reference.txt' using 0:4 title 'column 4' with lines
plot '../../data/reference.txt' using 0:5 title 'column 5' with lines
plot '../../data/reference.txt' using 0:6 title 'column 6' with lines
unset multiplot
";

const REFERENCE_PLOT_4_TEMPLATE: &str = "\
set terminal postscript eps enhanced color font 'Helvetica,14'
set output '../figs/reference.eps'
set multiplot layout 2,2
set xrange [0:{nlimit}]
plot '../../data/reference.txt' using 0:1 title 'column 1' with lines
plot '../../data/reference.txt' using 0:2 title 'column 2' with lines
plot '../../data/reference.txt' using 0:3 title 'column 3' with lines
plot '../../data/reference.txt' using 0:4 title 'column 4' with lines
unset multiplot
";

/// Hand-off file rendered from a template: a file of the configured
/// templates folder when present, the built-in text otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// File name looked up in the templates folder.
    pub name: &'static str,
    builtin: &'static str,
}

/// R script averaging the MSE series, rendered to `error/results`.
pub const ERROR_CALCULATION: Template = Template {
    name: "template_err.r",
    builtin: ERROR_CALCULATION_TEMPLATE,
};

/// Python driver running every precision plot script.
pub const PLOT_ALL: Template = Template {
    name: "template_plotall.py",
    builtin: PLOT_ALL_TEMPLATE,
};

impl Template {
    /// Reference-series plot; datasets wider than four columns get the
    /// six-panel layout.
    pub fn reference_plot(columns: usize) -> Self {
        if columns > 4 {
            Template {
                name: "reference_plot_6.plt",
                builtin: REFERENCE_PLOT_6_TEMPLATE,
            }
        } else {
            Template {
                name: "reference_plot_4.plt",
                builtin: REFERENCE_PLOT_4_TEMPLATE,
            }
        }
    }

    /// Writes the substituted template to `destination`.
    pub fn render(
        &self,
        templates_dir: Option<&Path>,
        destination: &Path,
        values: &[(&str, String)],
    ) -> Result<(), GapError> {
        match templates_dir.map(|dir| dir.join(self.name)).filter(|path| path.is_file()) {
            Some(template) => render_file(&template, destination, values),
            None => write_script(destination, &substitute(self.builtin, values)),
        }
    }
}

/// Replaces every `{key}` in `template` by its value.
pub fn substitute(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

/// Copies `template` to `destination`, substituting `values`.
pub fn render_file(template: &Path, destination: &Path, values: &[(&str, String)]) -> Result<(), GapError> {
    let text =
        fs::read_to_string(template).map_err(|err| GapError::io("gap_exp.plot_io", template, err))?;
    write_script(destination, &substitute(&text, values))
}

/// Writes a script, creating its folder.
pub fn write_script(destination: &Path, text: &str) -> Result<(), GapError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| GapError::io("gap_exp.plot_io", parent, err))?;
    }
    fs::write(destination, text).map_err(|err| GapError::io("gap_exp.plot_io", destination, err))
}

/// Range values shared by the series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    /// First test case.
    pub start: usize,
    /// Last test case.
    pub end: usize,
    /// Distance between the first two test cases.
    pub tick: usize,
}

impl Axis {
    /// Derives the axis from an ordered test case list.
    pub fn from_cases(cases: &[usize]) -> Option<Self> {
        let start = *cases.first()?;
        let end = *cases.last()?;
        let tick = cases.get(1).map_or(1, |second| second.saturating_sub(start).max(1));
        Some(Self { start, end, tick })
    }
}

/// `"a","b"` list of series codes.
pub fn all_algos(series: &[SubAlgorithm]) -> String {
    series
        .iter()
        .map(|sub| format!("\"{}\"", sub.code))
        .collect::<Vec<_>>()
        .join(",")
}

fn plot_lines<F>(series: &[SubAlgorithm], file_of: F, using: &str) -> String
where
    F: Fn(&SubAlgorithm) -> String,
{
    series
        .iter()
        .map(|sub| {
            format!(
                "'{}' using {using} title '{}' with {}",
                file_of(sub),
                sub.code,
                sub.style
            )
        })
        .collect::<Vec<_>>()
        .join(", \\\n     ")
}

fn title(dataset: &str, kind: ExperimentKind, scenario: Scenario) -> String {
    format!("{dataset} {} {}", kind.long_name(), scenario.long_name())
}

/// Runtime plot, run from the combination root.
pub fn runtime_script(
    dataset: &str,
    kind: ExperimentKind,
    scenario: Scenario,
    series: &[SubAlgorithm],
    axis: Axis,
) -> String {
    substitute(
        RUNTIME_TEMPLATE,
        &[
            ("allAlgos", all_algos(series)),
            ("code", dataset.to_string()),
            ("title", title(dataset, kind, scenario)),
            ("axis", scenario.description().to_string()),
            ("start", axis.start.to_string()),
            ("end", axis.end.to_string()),
            ("tick", axis.tick.to_string()),
            (
                "series",
                plot_lines(series, |sub| format!("results/{}.txt", sub.code), "1:2"),
            ),
        ],
    )
}

/// MSE plot, run from `error/results`.
pub fn mse_script(
    dataset: &str,
    kind: ExperimentKind,
    scenario: Scenario,
    series: &[SubAlgorithm],
    axis: Axis,
) -> String {
    substitute(
        MSE_TEMPLATE,
        &[
            ("allAlgos", all_algos(series)),
            ("code", dataset.to_string()),
            ("title", title(dataset, kind, scenario)),
            ("axis", scenario.description().to_string()),
            ("start", axis.start.to_string()),
            ("end", axis.end.to_string()),
            ("tick", axis.tick.to_string()),
            (
                "series",
                plot_lines(series, |sub| format!("values/mse/MSE_{}.dat", sub.code), "1:2"),
            ),
        ],
    )
}

/// Recovered first column of one test case, run from `recovery/scripts`.
///
/// `offset` shifts the recovered rows onto the reference's row numbering.
pub fn recovery_script(
    dataset: &str,
    test_case: usize,
    series: &[SubAlgorithm],
    offset: usize,
    nlimit: usize,
) -> String {
    let using = format!("($0+{offset}):1");
    substitute(
        RECOVERY_TEMPLATE,
        &[
            ("code", dataset.to_string()),
            ("case", test_case.to_string()),
            ("title", format!("{dataset} recovery, case {test_case}")),
            ("offset", offset.to_string()),
            ("nlimit", nlimit.to_string()),
            ("column", "1".to_string()),
            (
                "series",
                plot_lines(
                    series,
                    |sub| {
                        let file = sub.case_file.clone().unwrap_or_else(|| format!("{}.txt", sub.code));
                        format!("../../data/{test_case}/{file}")
                    },
                    &using,
                ),
            ),
        ],
    )
}

/// Runs `program script` inside `dir`, waiting for it to exit.
pub fn run_tool(program: &str, dir: &Path, script: &str) -> Result<(), GapError> {
    debug!(program, script, dir = %dir.display(), "running plot tool");
    let status = Command::new(program)
        .arg(script)
        .current_dir(dir)
        .status()
        .map_err(|err| {
            GapError::Execution(
                ErrorInfo::new("gap_exp.plot_spawn", format!("{program} could not be started: {err}"))
                    .with_context("dir", dir.display().to_string()),
            )
        })?;
    if status.success() {
        return Ok(());
    }
    Err(GapError::Execution(
        ErrorInfo::new(
            "gap_exp.plot_failed",
            format!(
                "{program} returned code {} on exit.\nCLI args: {script}",
                status.code().map_or_else(|| "a signal".to_string(), |code| code.to_string())
            ),
        )
        .with_context("dir", dir.display().to_string()),
    ))
}
