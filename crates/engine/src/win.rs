use crate::board::Board;
use crate::store::PathStore;
use flowpath_protocol::{Cell, Color};
use std::collections::HashMap;

/// True when every dot color has a segment joining two of its dots and the
/// committed segments cover every open cell.
pub fn is_solved(paths: &PathStore, board: &Board) -> bool {
    let mut dots: HashMap<&Color, Vec<Cell>> = HashMap::new();
    for (cell, color) in board.dots() {
        dots.entry(color).or_default().push(cell);
    }
    if dots.is_empty() {
        return false;
    }

    let connected = dots.iter().all(|(color, cells)| {
        paths.segments(color).iter().any(|seg| {
            let (a, b) = (seg.first(), seg.last());
            a != b && cells.contains(&a) && cells.contains(&b)
        })
    });
    if !connected {
        return false;
    }

    let covered = paths.covered_cells();
    covered.len() == board.open_count() && covered.iter().all(|&c| board.is_open(c))
}
