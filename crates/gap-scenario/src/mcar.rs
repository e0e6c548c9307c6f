use std::collections::BTreeMap;

use gap_core::{MissingBlock, RngHandle};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compactor::compact;

/// Parameters of one "missing completely at random" layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct McarSpec {
    /// Series length the layout is generated for.
    pub rows: usize,
    /// Columns `0..active_columns` receive missing values.
    pub active_columns: usize,
    /// Share of `rows * active_columns` cells to remove, in percent.
    pub percentage: usize,
    /// Length of every sampled run; 1 removes single cells.
    pub run: usize,
    /// Rows before this offset are never removed.
    pub start_lock: usize,
}

impl McarSpec {
    /// Number of runs drawn for this spec.
    pub fn draw_count(&self) -> usize {
        if self.run == 0 {
            return 0;
        }
        (self.rows * self.active_columns * self.percentage) / (100 * self.run)
    }

    /// Run slots of one column that lie fully after the start-lock.
    fn eligible_slots(&self) -> Vec<usize> {
        if self.run == 0 {
            return Vec::new();
        }
        (0..self.rows / self.run)
            .filter(|slot| slot * self.run >= self.start_lock)
            .collect()
    }
}

/// Samples a layout for `spec` and compacts it into blocks.
///
/// The generator is reseeded on every call, so equal specs always produce
/// equal block lists.
pub fn generate(spec: &McarSpec) -> Vec<MissingBlock> {
    compact(sample_cells(spec))
}

/// Samples the raw missing cells for `spec`, without compaction.
pub fn sample_cells(spec: &McarSpec) -> Vec<(usize, usize)> {
    let mut rng = RngHandle::scenario();
    let slots = spec.eligible_slots();
    let mut pools: BTreeMap<usize, Vec<usize>> = (0..spec.active_columns)
        .map(|column| (column, slots.clone()))
        .filter(|(_, pool)| !pool.is_empty())
        .collect();

    let mut cells = Vec::with_capacity(spec.draw_count() * spec.run);
    for _ in 0..spec.draw_count() {
        if pools.is_empty() {
            break;
        }
        let column_slot = rng.gen_range(0..pools.len());
        let Some(column) = pools.keys().nth(column_slot).copied() else {
            break;
        };
        let Some(pool) = pools.get_mut(&column) else {
            break;
        };
        let pick = rng.gen_range(0..pool.len());
        let slot = pool.remove(pick);
        cells.extend((0..spec.run).map(|offset| (column, slot * spec.run + offset)));
        if pool.is_empty() {
            pools.remove(&column);
        }
    }
    cells
}
