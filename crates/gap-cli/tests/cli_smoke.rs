use std::fs;
use std::process::Command;

fn gapbench() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gapbench"));
    command.env("RUST_LOG", "off");
    command
}

#[test]
fn plan_prints_layouts_as_json() {
    let output = gapbench()
        .args(["plan", "--scenario", "missingpercentage", "--rows", "1000", "--columns", "4"])
        .output()
        .expect("gapbench should start");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("\"value\": 100"));
    assert!(stdout.contains("\"scenario\": \"missing\""));
    assert!(stdout.trim_end().ends_with("--- END ---"));
}

#[test]
fn plan_rejects_unsupported_pairs() {
    let output = gapbench()
        .args(["plan", "--kind", "streaming", "--scenario", "blackout"])
        .output()
        .expect("gapbench should start");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("cannot be generated"));
}

#[test]
fn builtin_catalog_lists_ranked_series() {
    let output = gapbench()
        .args(["algorithms", "--builtin"])
        .output()
        .expect("gapbench should start");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("cdrec_k3,cdrec_k2"));
    let mrnn = stdout.lines().find(|line| line.starts_with("m-rnn")).expect("m-rnn row");
    assert!(!mrnn.contains("mcar"));
    let cdrec = stdout.lines().find(|line| line.starts_with("cdrec")).expect("cdrec row");
    assert!(cdrec.contains("blackout,plottable,mcar"));
}

#[test]
fn config_warnings_are_flushed_on_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("gapbench.toml");
    fs::write(
        &config,
        format!(
            "datasets_root = \"{root}/data\"\nalgorithms_root = \"{root}/algos\"\noutput_root = \"{root}/out\"\ndatasets = [\"airq\"]\nEnableBatchMid = true\n",
            root = dir.path().display()
        ),
    )
    .expect("config");
    let output = gapbench()
        .args(["run", "--config"])
        .arg(&config)
        .output()
        .expect("gapbench should start");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("    Warning: unknown config entry with the key EnableBatchMid"));
    assert!(stdout.trim_end().ends_with("--- END ---"));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("airq"));
}
