use std::collections::BTreeSet;

use gap_core::MissingBlock;

/// Merges scattered missing `(column, row)` cells into the minimal list of
/// contiguous blocks.
///
/// Output is sorted by `(column, start)`; blocks of the same column never
/// touch or overlap and together cover exactly the input cells. Duplicate
/// cells are accepted and counted once.
pub fn compact<I>(cells: I) -> Vec<MissingBlock>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let sorted: BTreeSet<(usize, usize)> = cells.into_iter().collect();
    let mut blocks = Vec::new();
    let mut run: Option<(usize, usize, usize)> = None;

    for (column, row) in sorted {
        run = match run {
            Some((col, start, last)) if col == column && row == last + 1 => Some((col, start, row)),
            Some((col, start, last)) => {
                blocks.push(MissingBlock::at(col, start, last - start + 1));
                Some((column, row, row))
            }
            None => Some((column, row, row)),
        };
    }
    if let Some((col, start, last)) = run {
        blocks.push(MissingBlock::at(col, start, last - start + 1));
    }
    blocks
}

/// Expands concrete blocks back into the cells they cover.
pub fn expand(blocks: &[MissingBlock]) -> Vec<(usize, usize)> {
    blocks
        .iter()
        .filter(|block| block.is_concrete())
        .flat_map(|block| {
            let column = block.column as usize;
            (block.start..block.end()).map(move |row| (column, row as usize))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_gap() {
        let blocks = compact([(0, 5), (0, 6), (0, 7), (0, 10)]);
        assert_eq!(
            blocks,
            vec![MissingBlock::at(0, 5, 3), MissingBlock::at(0, 10, 1)]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(compact(std::iter::empty()).is_empty());
    }

    #[test]
    fn single_cell_is_length_one() {
        assert_eq!(compact([(3, 42)]), vec![MissingBlock::at(3, 42, 1)]);
    }

    #[test]
    fn splits_on_column_change_even_when_rows_continue() {
        let blocks = compact([(1, 0), (0, 9), (0, 8), (1, 1), (0, 10)]);
        assert_eq!(
            blocks,
            vec![MissingBlock::at(0, 8, 3), MissingBlock::at(1, 0, 2)]
        );
    }

    #[test]
    fn duplicates_collapse() {
        let blocks = compact([(0, 1), (0, 1), (0, 2)]);
        assert_eq!(blocks, vec![MissingBlock::at(0, 1, 2)]);
    }
}
