use gap_core::{ExperimentKind, MissingBlock, Scenario};
use gap_scenario::{advance, materialize, setup};

const ROWS: usize = 1000;
const COLUMNS: usize = 6;

#[test]
fn recovery_missing_reference_example() {
    let setup = setup(ExperimentKind::Recovery, Scenario::Missing, ROWS, COLUMNS).expect("setup");
    assert_eq!(setup.template, vec![MissingBlock::new(0, 50, -1)]);
    assert_eq!(setup.test_cases, (1..=8).map(|i| i * 100).collect::<Vec<_>>());
}

#[test]
fn noop_rule_reproduces_template() {
    for kind in [ExperimentKind::Continuous, ExperimentKind::Recovery, ExperimentKind::Streaming] {
        let setup = setup(kind, Scenario::Columns, ROWS, 12).expect("setup");
        let first = setup.test_cases[0];
        let blocks = advance(kind, Scenario::Columns, ROWS, 12, first, &setup.template)
            .expect("advance");
        assert_eq!(blocks, setup.template);
    }
}

#[test]
fn unsupported_pairs_are_configuration_errors() {
    let err = setup(ExperimentKind::Streaming, Scenario::MultiColumnDisjoint, ROWS, COLUMNS)
        .expect_err("streaming multicolumn");
    assert_eq!(err.info().code, "gap_scenario.unsupported");
    assert!(err.is_fatal());
    let err = advance(ExperimentKind::Continuous, Scenario::McarBlock, ROWS, COLUMNS, 1, &[])
        .expect_err("continuous mcar");
    assert_eq!(err.info().code, "gap_scenario.unsupported");
}

#[test]
fn column_bounded_cases_are_capped() {
    let setup = setup(ExperimentKind::Recovery, Scenario::McarBlock, ROWS, 3).expect("setup");
    assert_eq!(setup.test_cases, vec![1, 2, 3]);
    let setup = setup_or_empty(Scenario::Columns, 3);
    assert!(setup.is_empty());
}

fn setup_or_empty(scenario: Scenario, columns: usize) -> Vec<usize> {
    setup(ExperimentKind::Recovery, scenario, ROWS, columns)
        .expect("setup")
        .test_cases
}

#[test]
fn blackout_covers_every_column() {
    let cases = materialize(ExperimentKind::Continuous, Scenario::Blackout, ROWS, COLUMNS)
        .expect("materialize");
    assert_eq!(cases.first().map(|c| c.value), Some(10));
    assert_eq!(cases.last().map(|c| c.value), Some(100));
    for case in &cases {
        assert_eq!(case.blocks.len(), COLUMNS);
        for (column, block) in case.blocks.iter().enumerate() {
            assert_eq!(
                *block,
                MissingBlock::at(column, ROWS - case.value, case.value)
            );
        }
    }
}

#[test]
fn blackout_cases_stop_before_series_end() {
    let setup = setup(ExperimentKind::Recovery, Scenario::Blackout, 100, COLUMNS).expect("setup");
    // anchor = 5, so tc + 5 < 100 keeps 10..=90
    assert_eq!(setup.test_cases.last(), Some(&90));
}

#[test]
fn increasing_blocks_activate_more_columns() {
    let cases = materialize(ExperimentKind::Recovery, Scenario::IncreasingBlocks, ROWS, 4)
        .expect("materialize");
    assert_eq!(cases.len(), 4);
    for case in &cases {
        assert_eq!(case.blocks.len(), case.value);
        assert!(case
            .blocks
            .iter()
            .all(|b| b.start == (ROWS - 100 - 50) as i64 && b.length == 100));
    }
}

#[test]
fn block_slide_sweeps_window() {
    let cases = materialize(ExperimentKind::Recovery, Scenario::BlockSlide, ROWS, COLUMNS)
        .expect("materialize");
    assert_eq!(cases.len(), 16);
    assert_eq!(cases[0].blocks, vec![MissingBlock::at(0, 50, 200)]);
    assert_eq!(cases[15].blocks, vec![MissingBlock::at(0, 800, 200)]);
}

#[test]
fn multicolumn_staircases() {
    let disjoint = materialize(ExperimentKind::Recovery, Scenario::MultiColumnDisjoint, ROWS, COLUMNS)
        .expect("disjoint");
    let last = &disjoint.last().expect("cases").blocks;
    assert_eq!(
        last,
        &vec![
            MissingBlock::at(0, 100, 200),
            MissingBlock::at(1, 300, 200),
            MissingBlock::at(2, 500, 200),
            MissingBlock::at(3, 700, 200),
        ]
    );
    let overlap = materialize(ExperimentKind::Recovery, Scenario::MultiColumnOverlap, ROWS, COLUMNS)
        .expect("overlap");
    let last = &overlap.last().expect("cases").blocks;
    assert!(last.iter().all(|b| b.length == 300 && b.end() <= ROWS as i64));
    // consecutive columns share rows
    assert!(last[0].end() > last[1].start);
}

#[test]
fn continuous_length_anchors_at_window_tail() {
    let cases = materialize(ExperimentKind::Continuous, Scenario::Length, ROWS, COLUMNS)
        .expect("materialize");
    for case in cases {
        assert_eq!(case.blocks, vec![MissingBlock::at(0, case.value - 100, 100)]);
    }
}
