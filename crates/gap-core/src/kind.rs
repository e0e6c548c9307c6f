//! Experiment axes: what is measured, where gaps are anchored, and which
//! pattern of missing values is varied.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GapError};

/// Quantity measured by an experiment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experiment {
    /// Recovery accuracy against the ground truth.
    Precision,
    /// Wall-clock runtime of the algorithm.
    Runtime,
}

impl Experiment {
    /// All experiments in execution order.
    pub const ALL: [Experiment; 2] = [Experiment::Precision, Experiment::Runtime];

    /// Short tag used in file names.
    pub fn short_name(self) -> &'static str {
        match self {
            Experiment::Precision => "prec",
            Experiment::Runtime => "runtime",
        }
    }

    /// Long name used in result folder names.
    pub fn long_name(self) -> &'static str {
        match self {
            Experiment::Precision => "precision",
            Experiment::Runtime => "runtime",
        }
    }

    /// Value of the `-test` flag passed to native algorithm binaries.
    pub fn test_flag(self) -> &'static str {
        match self {
            Experiment::Precision => "o",
            Experiment::Runtime => "rt",
        }
    }

    /// Runtime-mode flag passed to interpreter-backed algorithms.
    pub fn runtime_mode(self) -> u8 {
        match self {
            Experiment::Precision => 0,
            Experiment::Runtime => 1,
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Where the missing values are anchored and which algorithms may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentKind {
    /// Gaps at the trailing edge of the series.
    Continuous,
    /// Gaps inside the series with context on both sides.
    Recovery,
    /// Continuous generation rules, streaming-capable algorithms only.
    Streaming,
}

impl ExperimentKind {
    /// All kinds in the order the orchestrator visits them.
    pub const ALL: [ExperimentKind; 3] = [
        ExperimentKind::Continuous,
        ExperimentKind::Recovery,
        ExperimentKind::Streaming,
    ];

    /// Short tag used in file names.
    pub fn short_name(self) -> &'static str {
        match self {
            ExperimentKind::Continuous => "cont",
            ExperimentKind::Recovery => "rec",
            ExperimentKind::Streaming => "str",
        }
    }

    /// Long name used in result folder names and scratch tokens.
    pub fn long_name(self) -> &'static str {
        match self {
            ExperimentKind::Continuous => "continuous",
            ExperimentKind::Recovery => "recovery",
            ExperimentKind::Streaming => "streaming",
        }
    }

    /// Whether gaps are anchored at the tail of the series.
    pub fn is_tail_anchored(self) -> bool {
        matches!(self, ExperimentKind::Continuous | ExperimentKind::Streaming)
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

impl FromStr for ExperimentKind {
    type Err = GapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        ExperimentKind::ALL
            .into_iter()
            .find(|kind| kind.long_name() == needle || kind.short_name() == needle)
            .ok_or_else(|| {
                GapError::Config(
                    ErrorInfo::new("gap_core.unknown_kind", "unrecognized experiment kind")
                        .with_context("kind", value),
                )
            })
    }
}

/// The axis of variation of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Growing single block in the first column.
    Missing,
    /// Growing series length with a fixed block.
    Length,
    /// Growing column count with a fixed block.
    Columns,
    /// Fixed-size block sliding over the timeline.
    BlockSlide,
    /// Every column missing over the same rows.
    Blackout,
    /// One block per column for a growing number of columns.
    IncreasingBlocks,
    /// Staircase of blocks that never share rows.
    MultiColumnDisjoint,
    /// Staircase of blocks whose rows overlap.
    MultiColumnOverlap,
    /// Single missing cells at random, growing percentage.
    McarElement,
    /// Random short blocks in a growing number of columns.
    McarBlock,
    /// Random short blocks in every column, growing percentage.
    McarMultiBlock,
    /// Random short blocks while the column count grows.
    McarColumns,
    /// Random short blocks while the series length grows.
    McarLength,
}

impl Scenario {
    /// Every scenario in catalogue order.
    pub const ALL: [Scenario; 13] = [
        Scenario::Missing,
        Scenario::Length,
        Scenario::Columns,
        Scenario::BlockSlide,
        Scenario::Blackout,
        Scenario::IncreasingBlocks,
        Scenario::MultiColumnDisjoint,
        Scenario::MultiColumnOverlap,
        Scenario::McarElement,
        Scenario::McarBlock,
        Scenario::McarMultiBlock,
        Scenario::McarColumns,
        Scenario::McarLength,
    ];

    /// Short tag used in file names.
    pub fn short_name(self) -> &'static str {
        match self {
            Scenario::Missing => "mis",
            Scenario::Length => "len",
            Scenario::Columns => "col",
            Scenario::BlockSlide => "bsld",
            Scenario::Blackout => "frow",
            Scenario::IncreasingBlocks => "incb",
            Scenario::MultiColumnDisjoint => "mc-dj",
            Scenario::MultiColumnOverlap => "mc-ol",
            Scenario::McarElement => "mcar-elem",
            Scenario::McarBlock => "mcar-blck",
            Scenario::McarMultiBlock => "mcar-mblk",
            Scenario::McarColumns => "mcar-col",
            Scenario::McarLength => "mcar-len",
        }
    }

    /// Long name used in configuration, result folders and scratch tokens.
    pub fn long_name(self) -> &'static str {
        match self {
            Scenario::Missing => "missingpercentage",
            Scenario::Length => "length",
            Scenario::Columns => "columns",
            Scenario::BlockSlide => "blockslide",
            Scenario::Blackout => "blackout",
            Scenario::IncreasingBlocks => "increasingblocks",
            Scenario::MultiColumnDisjoint => "multicolumn-disjoint",
            Scenario::MultiColumnOverlap => "multicolumn-overlap",
            Scenario::McarElement => "mcar-element",
            Scenario::McarBlock => "mcar-block",
            Scenario::McarMultiBlock => "mcar-multiblock",
            Scenario::McarColumns => "mcar-columns",
            Scenario::McarLength => "mcar-length",
        }
    }

    /// Axis label for plots.
    pub fn description(self) -> &'static str {
        match self {
            Scenario::Missing => "number of missing values",
            Scenario::Length => "number of rows",
            Scenario::Columns => "number of columns",
            Scenario::BlockSlide => "position of the block (% from top)",
            Scenario::Blackout => "number of missing rows",
            Scenario::IncreasingBlocks => "number of columns containing a missing block",
            Scenario::MultiColumnDisjoint | Scenario::MultiColumnOverlap => {
                "number of columns with missing values"
            }
            Scenario::McarElement => "% of the values missing in all time series",
            Scenario::McarBlock => "number of columns containing missing blocks",
            Scenario::McarMultiBlock => "% of the values missing in blocks",
            Scenario::McarColumns => "number of columns",
            Scenario::McarLength => "number of rows",
        }
    }

    /// Whether missing values are confined to the first column.
    pub fn is_single_column(self) -> bool {
        matches!(
            self,
            Scenario::Missing | Scenario::Length | Scenario::Columns | Scenario::BlockSlide
        )
    }

    /// Whether some rows may lose every column at once.
    pub fn has_blackouts(self) -> bool {
        matches!(
            self,
            Scenario::Blackout
                | Scenario::IncreasingBlocks
                | Scenario::McarElement
                | Scenario::McarBlock
                | Scenario::McarMultiBlock
                | Scenario::McarColumns
                | Scenario::McarLength
        )
    }

    /// Whether gap positions are sampled at random.
    pub fn is_mcar(self) -> bool {
        matches!(
            self,
            Scenario::McarElement
                | Scenario::McarBlock
                | Scenario::McarMultiBlock
                | Scenario::McarColumns
                | Scenario::McarLength
        )
    }

    /// Whether the test case value is the series length.
    pub fn varies_length(self) -> bool {
        matches!(self, Scenario::Length | Scenario::McarLength)
    }

    /// Whether the test case value is the column count of the data window.
    pub fn varies_columns(self) -> bool {
        matches!(self, Scenario::Columns | Scenario::McarColumns)
    }

    /// Whether the test case sequence is bounded by the dataset's column count.
    pub fn is_column_bounded(self) -> bool {
        matches!(
            self,
            Scenario::Columns
                | Scenario::IncreasingBlocks
                | Scenario::MultiColumnDisjoint
                | Scenario::MultiColumnOverlap
                | Scenario::McarBlock
                | Scenario::McarColumns
        )
    }

    /// Whether this scenario can be generated for `kind`.
    pub fn supports(self, kind: ExperimentKind) -> bool {
        match kind {
            ExperimentKind::Recovery => true,
            ExperimentKind::Continuous => matches!(
                self,
                Scenario::Missing
                    | Scenario::Length
                    | Scenario::Columns
                    | Scenario::Blackout
                    | Scenario::IncreasingBlocks
            ),
            ExperimentKind::Streaming => matches!(
                self,
                Scenario::Missing | Scenario::Length | Scenario::Columns
            ),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

impl FromStr for Scenario {
    type Err = GapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.long_name() == needle || scenario.short_name() == needle)
            .ok_or_else(|| {
                GapError::Config(
                    ErrorInfo::new(
                        "gap_core.unknown_scenario",
                        "list of scenarios contains an entry the benchmark does not support",
                    )
                    .with_context("scenario", value),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_from_str() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.long_name().parse::<Scenario>(), Ok(scenario));
            assert_eq!(scenario.short_name().parse::<Scenario>(), Ok(scenario));
        }
        for kind in ExperimentKind::ALL {
            assert_eq!(kind.long_name().parse::<ExperimentKind>(), Ok(kind));
        }
    }

    #[test]
    fn streaming_excludes_multi_column_scenarios() {
        for scenario in Scenario::ALL {
            if scenario.supports(ExperimentKind::Streaming) {
                assert!(scenario.is_single_column());
                assert!(scenario.supports(ExperimentKind::Continuous));
            }
        }
    }
}
