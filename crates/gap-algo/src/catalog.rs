//! Standard algorithm pack shipped with the benchmark.

use std::collections::BTreeMap;

use crate::manifest::{AlgorithmManifest, RunnerSpec};

const COLLECTION_ENV: &str = "AlgoCollection/_data/";
const COLLECTION_BINARY: &str = "../cmake-build-debug/incCD";

/// Trajectory embedding of ssa degenerates on shorter series.
const SSA_MIN_ROWS: usize = 100;
/// m-rnn trains a network per test case; longer series take hours.
const MRNN_MAX_ROWS: usize = 2000;
/// Pattern search of tkcm grows quadratically with the series length.
const TKCM_MAX_ROWS: usize = 5000;

fn style(point: u8, color: &str) -> String {
    format!("linespoints lt 8 dt 1 lw 2 pt {point} lc rgbcolor \"{color}\" pointsize 1.2")
}

fn collection(code: &str, alg: &str, capabilities: &[&str], style: String) -> AlgorithmManifest {
    AlgorithmManifest {
        code: code.to_string(),
        env_path: COLLECTION_ENV.to_string(),
        input_dir: "in/".to_string(),
        output_dir: "out/".to_string(),
        capabilities: capabilities.iter().map(|cap| cap.to_string()).collect(),
        min_rows: None,
        max_rows: None,
        style: Some(style),
        rank_styles: BTreeMap::new(),
        runner: RunnerSpec::Native {
            binary: COLLECTION_BINARY.to_string(),
            name: alg.to_string(),
            ranks: Vec::new(),
        },
    }
}

/// Manifests of the built-in algorithms, ordered by code.
pub fn builtin_manifests() -> Vec<AlgorithmManifest> {
    let all = ["streaming", "multicolumn", "blackout", "mcar", "plottable"];
    let single = ["streaming", "blackout", "mcar", "plottable"];

    let mut cdrec = collection("cdrec", "cd", &all, style(7, "cyan"));
    cdrec.runner = RunnerSpec::Native {
        binary: COLLECTION_BINARY.to_string(),
        name: "cd".to_string(),
        ranks: vec![3, 2],
    };
    cdrec.rank_styles = BTreeMap::from([
        ("3".to_string(), "linespoints lt 8 lw 3 pt 7 lc rgbcolor \"cyan\" pointsize 1.2".to_string()),
        ("2".to_string(), "linespoints lt 8 lw 3 pt 7 lc rgbcolor \"blue\" pointsize 1.2".to_string()),
    ]);

    let mut ssa = collection(
        "ssa",
        "ssa",
        &["blackout", "plottable"],
        style(6, "dark-orange"),
    );
    ssa.min_rows = Some(SSA_MIN_ROWS);
    ssa.env_path = "ssa/tslib/".to_string();
    ssa.input_dir = "data_in/".to_string();
    ssa.output_dir = "data_out/".to_string();
    ssa.runner = RunnerSpec::Interpreter {
        program: "python".to_string(),
        module: "tester".to_string(),
        function: "ssa_recov".to_string(),
    };

    let mut mrnn = collection(
        "m-rnn",
        "m-rnn",
        &["streaming", "multicolumn", "blackout", "plottable"],
        style(4, "red"),
    );
    mrnn.max_rows = Some(MRNN_MAX_ROWS);
    mrnn.env_path = "M-RNN/".to_string();
    mrnn.input_dir = "data_in/".to_string();
    mrnn.output_dir = "data_out/".to_string();
    mrnn.runner = RunnerSpec::Interpreter {
        program: "python".to_string(),
        module: "testerMRNN".to_string(),
        function: "mrnn_recov".to_string(),
    };

    let mut tkcm = collection("tkcm", "tkcm", &single, style(5, "dark-green"));
    tkcm.max_rows = Some(TKCM_MAX_ROWS);

    let mut pack = vec![
        cdrec,
        tkcm,
        collection("spirit", "spirit", &single, style(3, "gold")),
        collection(
            "grouse",
            "grouse",
            &["streaming", "multicolumn", "plottable"],
            style(2, "dark-violet"),
        ),
        collection("ogd-imp", "ogdimpute", &all, style(8, "green")),
        ssa,
        mrnn,
        collection("pca-mme", "pca-mme", &all, style(1, "purple")),
        collection(
            "md-isvd",
            "mdisvd",
            &["multicolumn", "plottable"],
            style(1, "black"),
        ),
    ];
    pack.sort_by(|a, b| a.code.cmp(&b.code));
    pack
}
