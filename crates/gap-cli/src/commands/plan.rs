use std::error::Error;

use clap::Args;
use gap_core::{ExperimentKind, Scenario};
use gap_exp::to_canonical_json_bytes;
use gap_scenario::{data_window, materialize, DataWindow, TestCase};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Experiment kind, long or short name.
    #[arg(long, default_value = "recovery")]
    pub kind: String,
    /// Scenario, long or short name.
    #[arg(long)]
    pub scenario: String,
    /// Rows of the series.
    #[arg(long, default_value_t = gap_exp::DEFAULT_ROW_LIMIT)]
    pub rows: usize,
    /// Columns of the series.
    #[arg(long, default_value_t = 4)]
    pub columns: usize,
}

#[derive(Debug, Serialize)]
struct PlannedCase {
    #[serde(flatten)]
    case: TestCase,
    window: DataWindow,
}

#[derive(Debug, Serialize)]
struct Plan {
    kind: ExperimentKind,
    scenario: Scenario,
    rows: usize,
    columns: usize,
    cases: Vec<PlannedCase>,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let kind: ExperimentKind = args.kind.parse()?;
    let scenario: Scenario = args.scenario.parse()?;
    if !scenario.supports(kind) {
        return Err(format!("{scenario} cannot be generated for {kind}").into());
    }
    let cases = materialize(kind, scenario, args.rows, args.columns)?
        .into_iter()
        .map(|case| PlannedCase {
            window: data_window(scenario, args.rows, args.columns, case.value),
            case,
        })
        .collect();
    let plan = Plan {
        kind,
        scenario,
        rows: args.rows,
        columns: args.columns,
        cases,
    };
    let json = to_canonical_json_bytes(&plan)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}
