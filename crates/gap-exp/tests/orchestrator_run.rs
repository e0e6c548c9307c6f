#![cfg(unix)]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use gap_algo::{AlgorithmManifest, AlgorithmRegistry, RunnerSpec};
use gap_core::{DeferredWarnings, Experiment, ExperimentKind, Scenario};
use gap_exp::{BenchConfig, CombinationOutcome, Ledger, Orchestrator, Query};

const FAKE_SCRIPT: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -test) TEST="$2"; shift ;;
    -in) IN="$2"; shift ;;
    -out) OUT="$2"; shift ;;
  esac
  shift
done
if [ "$TEST" = "rt" ]; then
  echo 42 > "$OUT"
else
  sed 's/NaN/0/g' "$IN" > "$OUT"
fi
"#;

fn install(root: &Path, code: &str, script: &str, capabilities: &[&str]) -> AlgorithmManifest {
    let env = root.join(code);
    fs::create_dir_all(&env).expect("env");
    let binary = env.join("run.sh");
    fs::write(&binary, script).expect("script");
    fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).expect("chmod");
    AlgorithmManifest {
        code: code.into(),
        env_path: format!("{code}/"),
        input_dir: "in/".into(),
        output_dir: "out/".into(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        min_rows: None,
        max_rows: None,
        style: None,
        rank_styles: BTreeMap::new(),
        runner: RunnerSpec::Native {
            binary: "run.sh".into(),
            name: code.into(),
            ranks: vec![],
        },
    }
}

struct Bench {
    _dir: tempfile::TempDir,
    root: std::path::PathBuf,
    orchestrator: Orchestrator,
}

fn bench(extra: &str) -> Bench {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let datasets = root.join("data");
    fs::create_dir_all(datasets.join("airq")).expect("dataset dir");
    let rows: String = (0..200).map(|_| "2 2 2 2\n").collect();
    fs::write(datasets.join("airq/airq_normal.txt"), rows).expect("dataset");

    let algorithms = root.join("algos");
    let manifests = vec![
        install(&algorithms, "fake", FAKE_SCRIPT, &["multicolumn", "plottable"]),
        install(&algorithms, "broken", "#!/bin/sh\nexit 1\n", &["multicolumn"]),
    ];
    let text = format!(
        "datasets_root = \"{}\"\nalgorithms_root = \"{}\"\noutput_root = \"{}\"\nledger = \"{}\"\ndatasets = [\"airq\"]\nscenarios = [\"missingpercentage\"]\n{extra}",
        datasets.display(),
        algorithms.display(),
        root.join("results").display(),
        root.join("ledger.csv").display(),
    );
    let warnings = DeferredWarnings::new();
    let config = BenchConfig::parse(&text, &warnings).expect("config");
    let registry = AlgorithmRegistry::from_manifests(&algorithms, manifests).expect("registry");
    Bench {
        _dir: dir,
        root,
        orchestrator: Orchestrator::new(config, registry, warnings),
    }
}

#[test]
fn recovery_run_writes_metrics_runtime_and_reports() {
    let bench = bench("enable_streaming = true\n");
    let outcomes = bench.orchestrator.run_all().expect("run");
    assert_eq!(outcomes.len(), 4);

    let completed: Vec<_> = outcomes
        .iter()
        .filter_map(|(combination, outcome)| match outcome {
            CombinationOutcome::Completed(report) => Some((combination, report)),
            CombinationOutcome::Skipped { .. } => None,
        })
        .collect();
    assert_eq!(completed.len(), 2);
    assert!(completed
        .iter()
        .all(|(c, _)| c.kind == ExperimentKind::Recovery && c.scenario == Scenario::Missing));

    let precision = bench.root.join("results/precision/recovery/missingpercentage/airq");
    let mse = fs::read_to_string(precision.join("error/results/values/mse/MSE_fake.dat")).expect("mse");
    let lines: Vec<&str> = mse.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "20 4");
    assert_eq!(lines[7], "160 4");
    assert!(precision.join("data/reference.txt").is_file());
    assert!(precision.join("data/20/fake20.txt").is_file());
    assert!(precision.join("error/results/airq_mse.plt").is_file());
    assert!(precision.join("run_report.json").is_file());

    let runtime = bench.root.join("results/runtime/recovery/missingpercentage/airq");
    let series = fs::read_to_string(runtime.join("results/fake.txt")).expect("runtime");
    assert_eq!(series.lines().next(), Some("20 42"));
    assert!(runtime.join("airq_rt.plt").is_file());

    let (_, report) = completed[0];
    assert_eq!(report.series, vec!["fake".to_string()]);
    assert_eq!(report.key.test_cases.len(), 8);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.starts_with("[WARNING] broken returned code 1 on exit.")));

    assert!(!bench.root.join("results/.staging").exists());
    assert_eq!(
        fs::read_dir(bench.root.join("algos/fake/out")).expect("out").count(),
        0
    );

    let ledger = Ledger::from_path(bench.root.join("ledger.csv"));
    let rows = ledger
        .query(&Query {
            dataset: Some("airq".into()),
            limit: None,
        })
        .expect("ledger");
    assert_eq!(rows.len(), 8 * 2 + 8);
    assert!(rows.iter().any(|row| row.metric == "runtime" && row.value == 42.0));
}

#[test]
fn inapplicable_combinations_are_skipped() {
    let bench = bench("enable_streaming = true\nenable_recovery = false\n");
    let outcomes = bench.orchestrator.run_all().expect("run");
    assert_eq!(outcomes.len(), 2);
    for (combination, outcome) in &outcomes {
        assert_eq!(combination.kind, ExperimentKind::Streaming);
        assert!(matches!(outcome, CombinationOutcome::Skipped { .. }));
    }
    assert_eq!(outcomes[0].0.experiment, Experiment::Precision);
}

#[test]
fn missing_dataset_aborts_the_run() {
    let bench = bench("");
    fs::remove_file(bench.root.join("data/airq/airq_normal.txt")).expect("remove");
    let err = bench.orchestrator.run_all().expect_err("missing dataset");
    assert!(err.is_fatal());
    assert_eq!(err.info().code, "gap_exp.missing_dataset");
}

#[test]
fn replot_requires_existing_results() {
    let bench = bench("disable_precision = true\n");
    let err = bench
        .orchestrator
        .replot_runtime(ExperimentKind::Recovery, Scenario::Missing, "airq")
        .expect_err("nothing to replot");
    assert_eq!(err.info().code, "gap_exp.missing_results");

    bench.orchestrator.run_all().expect("run");
    let script = bench
        .orchestrator
        .replot_runtime(ExperimentKind::Recovery, Scenario::Missing, "airq")
        .expect("replot");
    let text = fs::read_to_string(script).expect("script");
    assert!(text.contains("results/fake.txt"));
}

#[test]
fn precision_run_renders_hand_off_files() {
    let bench = bench("disable_runtime = true\n");
    bench.orchestrator.run_all().expect("run");
    let precision = bench.root.join("results/precision/recovery/missingpercentage/airq");

    let r = fs::read_to_string(precision.join("error/results/error_calculation.r")).expect("r script");
    assert!(r.starts_with("algos <- c(\"fake\")"));
    assert!(r.contains("seq(20, 160, by = 20)"));
    let driver = fs::read_to_string(precision.join("plotall.py")).expect("plotall");
    assert!(driver.contains("\"gnuplot\", \"airq_mse.plt\""));
    let reference =
        fs::read_to_string(precision.join("recovery/scripts/reference_plot.plt")).expect("reference");
    assert!(reference.contains("set xrange [0:200]"));
    assert!(reference.contains("layout 2,2"));
}

#[test]
fn templates_dir_replaces_builtin_hand_off() {
    let dir = tempfile::tempdir().expect("templates");
    fs::write(dir.path().join("template_plotall.py"), "print('{code} {end}')\n").expect("template");
    let bench = bench(&format!(
        "disable_runtime = true\ntemplates_dir = \"{}\"\n",
        dir.path().display()
    ));
    bench.orchestrator.run_all().expect("run");
    let precision = bench.root.join("results/precision/recovery/missingpercentage/airq");
    assert_eq!(
        fs::read_to_string(precision.join("plotall.py")).expect("plotall"),
        "print('airq 160')\n"
    );
    assert!(precision.join("error/results/error_calculation.r").is_file());
}

#[test]
fn deferred_warnings_stay_queued_until_the_end() {
    let bench = bench("");
    let outcomes = bench.orchestrator.run_all().expect("run");
    let reports: Vec<_> = outcomes
        .iter()
        .filter_map(|(_, outcome)| match outcome {
            CombinationOutcome::Completed(report) => Some(report),
            CombinationOutcome::Skipped { .. } => None,
        })
        .collect();
    assert_eq!(reports.len(), 2);
    let per_report: usize = reports.iter().map(|report| report.warnings.len()).sum();
    assert!(per_report > 0);
    assert_eq!(bench.orchestrator.warnings().len(), per_report);
    assert_eq!(bench.orchestrator.warnings().snapshot()[0], reports[0].warnings[0]);
}

#[test]
fn interrupt_handle_shares_the_run_registry() {
    let bench = bench("");
    let handle = bench.orchestrator.shared_registry();
    assert!(std::ptr::eq(bench.orchestrator.registry(), &*handle));
    assert!(std::ptr::eq(
        bench.orchestrator.registry().get("fake").expect("fake"),
        handle.get("fake").expect("fake")
    ));
    handle.purge_all().expect("purge");
}
