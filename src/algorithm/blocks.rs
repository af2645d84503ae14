use std::collections::VecDeque;

use super::grid::Grid;

/// A connected group of aligned pairs: every index of one side is linked,
/// directly or through other links, to every index of the other side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawBlock {
    pub sides: [Vec<usize>; 2],
    pub links: Vec<[usize; 2]>,
}

/// Splits the aligned cells of `matrix` into connected blocks. Blocks come in
/// the order of their first cell in row-major order; sides and links are sorted.
pub(crate) fn extract_blocks(mut matrix: Grid<bool>) -> Vec<RawBlock> {
    let [rows, columns] = matrix.size();
    let mut blocks = vec![];
    for row in 0..rows {
        for column in 0..columns {
            if !matrix[[row, column]] {
                continue;
            }
            matrix[[row, column]] = false;
            let mut block = RawBlock {
                sides: [vec![row], vec![column]],
                links: vec![[row, column]],
            };
            let mut pending_rows = VecDeque::from([row]);
            let mut pending_columns = VecDeque::from([column]);
            while !pending_rows.is_empty() || !pending_columns.is_empty() {
                if let Some(current) = pending_rows.pop_front() {
                    for other in 0..columns {
                        if matrix[[current, other]] {
                            matrix[[current, other]] = false;
                            block.links.push([current, other]);
                            if !block.sides[1].contains(&other) {
                                block.sides[1].push(other);
                            }
                            pending_columns.push_back(other);
                        }
                    }
                }
                if let Some(current) = pending_columns.pop_front() {
                    for other in 0..rows {
                        if matrix[[other, current]] {
                            matrix[[other, current]] = false;
                            block.links.push([other, current]);
                            if !block.sides[0].contains(&other) {
                                block.sides[0].push(other);
                            }
                            pending_rows.push_back(other);
                        }
                    }
                }
            }
            for side in &mut block.sides {
                side.sort_unstable();
            }
            block.links.sort_unstable();
            blocks.push(block);
        }
    }
    blocks
}
