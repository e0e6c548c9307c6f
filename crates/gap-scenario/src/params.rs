use gap_core::{ErrorInfo, ExperimentKind, GapError, MissingBlock, Scenario};
use serde::{Deserialize, Serialize};

use crate::mcar::{self, McarSpec};

/// Run length of block-granular MCAR scenarios.
pub const MCAR_RUN: usize = 10;
/// Missing share of MCAR scenarios whose test case is not a percentage.
pub const MCAR_PERCENTAGE: usize = 10;

/// Size of the reference block for a series of `rows` rows.
pub fn block_size(rows: usize) -> usize {
    rows / 10
}

/// Interior offset of Recovery gaps; also the MCAR start-lock.
pub fn anchor(rows: usize) -> usize {
    rows / 20
}

/// Initial template and ordered test cases of a `(kind, scenario)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSetup {
    /// Blocks before the first update.
    pub template: Vec<MissingBlock>,
    /// Magnitudes along the scenario's axis, in execution order.
    pub test_cases: Vec<usize>,
}

/// One test case with its concrete layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Magnitude along the scenario's axis.
    pub value: usize,
    /// Missing blocks for this magnitude.
    pub blocks: Vec<MissingBlock>,
}

fn unsupported(kind: ExperimentKind, scenario: Scenario) -> GapError {
    GapError::Config(
        ErrorInfo::new(
            "gap_scenario.unsupported",
            "scenario cannot be generated for this experiment kind",
        )
        .with_context("kind", kind.long_name())
        .with_context("scenario", scenario.long_name()),
    )
}

fn closed_sequence(start: usize, end: usize, step: usize) -> Vec<usize> {
    if step == 0 {
        return Vec::new();
    }
    (start..=end).step_by(step).collect()
}

/// Computes the template and test case sequence.
///
/// Column-bounded scenarios drop test cases wider than `columns`; the
/// sequence may therefore be empty, which callers treat as "skip".
pub fn setup(
    kind: ExperimentKind,
    scenario: Scenario,
    rows: usize,
    columns: usize,
) -> Result<ScenarioSetup, GapError> {
    if !scenario.supports(kind) {
        return Err(unsupported(kind, scenario));
    }
    let block = block_size(rows);
    let anchor = anchor(rows) as i64;
    let (b, r) = (block as i64, rows as i64);
    let unset = MissingBlock::UNSET;
    let tail = kind.is_tail_anchored();

    let (template, mut test_cases) = match scenario {
        Scenario::Missing => (
            MissingBlock::new(0, if tail { unset } else { anchor }, unset),
            closed_sequence(block, block * 8, block),
        ),
        Scenario::Length => (
            MissingBlock::new(0, if tail { unset } else { anchor }, b),
            closed_sequence(200, rows, 200),
        ),
        Scenario::Columns => (
            MissingBlock::new(0, if tail { r - b } else { anchor }, b),
            closed_sequence(4, 12, 1),
        ),
        Scenario::Blackout => {
            let margin = if tail { 10 } else { anchor as usize };
            let cases = closed_sequence(10, 100, 10)
                .into_iter()
                .take_while(|tc| tc + margin < rows)
                .collect();
            (MissingBlock::unset(), cases)
        }
        Scenario::IncreasingBlocks => (MissingBlock::unset(), closed_sequence(1, 12, 1)),
        Scenario::BlockSlide => (
            MissingBlock::new(0, unset, 2 * b),
            closed_sequence(5, 80, 5),
        ),
        Scenario::MultiColumnDisjoint | Scenario::MultiColumnOverlap => (
            MissingBlock::new(0, anchor, unset),
            closed_sequence(1, 4, 1),
        ),
        Scenario::McarElement | Scenario::McarMultiBlock => {
            (MissingBlock::unset(), closed_sequence(10, 80, 10))
        }
        Scenario::McarBlock => (MissingBlock::unset(), closed_sequence(1, 12, 1)),
        Scenario::McarColumns => (MissingBlock::unset(), closed_sequence(4, 12, 1)),
        Scenario::McarLength => (MissingBlock::unset(), closed_sequence(200, rows, 200)),
    };

    if scenario.is_column_bounded() {
        test_cases.retain(|tc| *tc <= columns);
    }
    Ok(ScenarioSetup {
        template: vec![template],
        test_cases,
    })
}

/// Returns the blocks of `test_case`, derived from `previous`.
///
/// Rules that only adjust one field keep everything else of `previous`;
/// rules that lay blocks out from scratch ignore it. `previous` itself is
/// never modified.
pub fn advance(
    kind: ExperimentKind,
    scenario: Scenario,
    rows: usize,
    columns: usize,
    test_case: usize,
    previous: &[MissingBlock],
) -> Result<Vec<MissingBlock>, GapError> {
    if !scenario.supports(kind) {
        return Err(unsupported(kind, scenario));
    }
    let block = block_size(rows);
    let anchor = anchor(rows);
    let tail = kind.is_tail_anchored();
    let tc = test_case as i64;

    let blocks = match scenario {
        Scenario::Missing if tail => reshape(previous, scenario, |b| {
            b.start = rows as i64 - tc;
            b.length = tc;
        })?,
        Scenario::Missing => reshape(previous, scenario, |b| b.length = tc)?,
        Scenario::Length if tail => reshape(previous, scenario, |b| b.start = tc - b.length)?,
        Scenario::Length | Scenario::Columns => previous.to_vec(),
        Scenario::BlockSlide => reshape(previous, scenario, |b| {
            b.start = (rows * test_case / 100) as i64;
        })?,
        Scenario::Blackout => {
            let start = if tail { rows.saturating_sub(test_case) } else { anchor };
            (0..columns)
                .map(|column| MissingBlock::at(column, start, test_case))
                .collect()
        }
        Scenario::IncreasingBlocks => {
            let start = if tail {
                rows.saturating_sub(block)
            } else {
                rows.saturating_sub(block + anchor)
            };
            (0..test_case.min(columns))
                .map(|column| MissingBlock::at(column, start, block))
                .collect()
        }
        Scenario::MultiColumnDisjoint => staircase(test_case, block, 2 * block),
        Scenario::MultiColumnOverlap => staircase(test_case, block, 3 * block),
        Scenario::McarElement => mcar::generate(&McarSpec {
            rows,
            active_columns: columns,
            percentage: test_case,
            run: 1,
            start_lock: anchor,
        }),
        Scenario::McarBlock => mcar::generate(&McarSpec {
            rows,
            active_columns: test_case.min(columns),
            percentage: MCAR_PERCENTAGE,
            run: MCAR_RUN,
            start_lock: anchor,
        }),
        Scenario::McarMultiBlock => mcar::generate(&McarSpec {
            rows,
            active_columns: columns,
            percentage: test_case,
            run: MCAR_RUN,
            start_lock: anchor,
        }),
        Scenario::McarColumns => mcar::generate(&McarSpec {
            rows,
            active_columns: test_case,
            percentage: MCAR_PERCENTAGE,
            run: MCAR_RUN,
            start_lock: anchor,
        }),
        Scenario::McarLength => mcar::generate(&McarSpec {
            rows: test_case,
            active_columns: columns,
            percentage: MCAR_PERCENTAGE,
            run: MCAR_RUN,
            start_lock: self::anchor(test_case),
        }),
    };
    Ok(blocks)
}

/// Runs `setup` and every `advance` step, returning the concrete layouts.
pub fn materialize(
    kind: ExperimentKind,
    scenario: Scenario,
    rows: usize,
    columns: usize,
) -> Result<Vec<TestCase>, GapError> {
    let ScenarioSetup {
        template,
        test_cases,
    } = setup(kind, scenario, rows, columns)?;
    let mut cases = Vec::with_capacity(test_cases.len());
    for value in test_cases {
        let blocks = advance(kind, scenario, rows, columns, value, &template)?;
        cases.push(TestCase { value, blocks });
    }
    Ok(cases)
}

fn reshape<F>(
    previous: &[MissingBlock],
    scenario: Scenario,
    update: F,
) -> Result<Vec<MissingBlock>, GapError>
where
    F: Fn(&mut MissingBlock),
{
    if previous.is_empty() {
        return Err(GapError::Config(
            ErrorInfo::new(
                "gap_scenario.empty_template",
                "update rule needs the scenario template",
            )
            .with_context("scenario", scenario.long_name()),
        ));
    }
    Ok(previous
        .iter()
        .copied()
        .map(|mut block| {
            update(&mut block);
            block
        })
        .collect())
}

fn staircase(active: usize, block: usize, length: usize) -> Vec<MissingBlock> {
    (0..active)
        .map(|column| MissingBlock::at(column, block + column * block * 2, length))
        .collect()
}
