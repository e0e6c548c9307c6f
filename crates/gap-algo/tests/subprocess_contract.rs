#![cfg(unix)]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use gap_algo::{AlgorithmManifest, AlgorithmRegistry, RunnerSpec};
use gap_core::{DataDescription, Experiment, ExperimentKind, MissingBlock};

const COPY_SCRIPT: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -in) IN="$2"; shift ;;
    -out) OUT="$2"; shift ;;
  esac
  shift
done
sed 's/NaN/0/g' "$IN" > "$OUT"
"#;

fn install(root: &Path, script: &str) -> AlgorithmRegistry {
    let env = root.join("fake");
    fs::create_dir_all(env.join("in")).expect("in");
    fs::create_dir_all(env.join("out")).expect("out");
    let binary = env.join("run.sh");
    fs::write(&binary, script).expect("script");
    fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).expect("chmod");
    let manifest = AlgorithmManifest {
        code: "fake".into(),
        env_path: "fake/".into(),
        input_dir: "in/".into(),
        output_dir: "out/".into(),
        capabilities: vec!["multicolumn".into(), "plottable".into()],
        min_rows: None,
        max_rows: None,
        style: None,
        rank_styles: BTreeMap::new(),
        runner: RunnerSpec::Native {
            binary: "run.sh".into(),
            name: "fake".into(),
            ranks: vec![],
        },
    };
    AlgorithmRegistry::from_manifests(root, [manifest]).expect("registry")
}

#[test]
fn generate_run_collect_cleanup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("airq_normal.txt");
    fs::write(&source, "1 2\n3 4\n5 6\n").expect("dataset");
    let registry = install(dir.path(), COPY_SCRIPT);
    let algo = registry.get("fake").expect("fake");
    fs::write(algo.input_dir().join(".gitkeep"), "").expect("gitkeep");

    let blocks = [MissingBlock::at(0, 1, 1)];
    let input = algo
        .generate_data(&source, "airq", 2, &blocks, 0..3, 0..2)
        .expect("generate");
    assert_eq!(fs::read_to_string(&input).expect("input"), "1 2\nNaN 4\n5 6\n");

    let data = DataDescription::new(3, 2, blocks.to_vec(), "airq");
    let failures = algo.run_experiment(Experiment::Precision, ExperimentKind::Recovery, &data, 2);
    assert!(failures.is_empty(), "{failures:?}");

    let results = dir.path().join("results");
    let collected = algo.collect_results(2, &results).expect("collect");
    assert!(collected.missing.is_empty());
    assert_eq!(collected.files[0].0, "fake");
    assert_eq!(
        fs::read_to_string(results.join("fake2.txt")).expect("result"),
        "1 2\n0 4\n5 6\n"
    );

    algo.cleanup().expect("cleanup");
    assert!(algo.input_dir().join(".gitkeep").exists());
    assert!(!input.exists());
    assert_eq!(fs::read_dir(algo.output_dir()).expect("out").count(), 0);
}

#[test]
fn nonzero_exit_is_a_recoverable_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = install(dir.path(), "#!/bin/sh\nexit 3\n");
    let algo = registry.get("fake").expect("fake");
    let data = DataDescription::new(10, 1, Vec::new(), "airq");
    let failures = algo.run_experiment(Experiment::Runtime, ExperimentKind::Streaming, &data, 10);
    assert_eq!(failures.len(), 1);
    let err = &failures[0];
    assert!(!err.is_fatal());
    assert_eq!(err.info().code, "gap_algo.nonzero_exit");
    assert!(err.info().message.starts_with("fake returned code 3 on exit."));
    assert!(err.info().message.ends_with("-xtra stream"));

    let collected = algo.collect_results(10, &dir.path().join("r")).expect("collect");
    assert_eq!(collected.missing, vec!["fake10.txt".to_string()]);
}
