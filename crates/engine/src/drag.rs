use crate::board::Board;
use crate::geometry::{clamp, Axis, CellGeometry};
use crate::store::{evict, Eviction, PathStore};
use flowpath_protocol::{Cell, Color};
use std::borrow::Cow;

/// Upper bound on cell steps taken for a single pointer update.
pub const MAX_STEPS_PER_UPDATE: usize = 256;

/// The live, uncommitted path of one gesture.
///
/// `path` is never empty and the last cell is the growable tip. `locked`
/// is set while the tip sits on a dot of the session's color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    color: Color,
    path: Vec<Cell>,
    axis: Option<Axis>,
    locked: bool,
    has_moved: bool,
}

/// A freshly started session. `evicted` carries the replacement store when
/// starting on a dot removed existing segments; the caller installs it right away.
#[derive(Debug, Clone)]
pub struct DragStart {
    pub session: DragSession,
    pub evicted: Option<PathStore>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragUpdate {
    /// Where the trailing preview line ends, in local pixels.
    pub tip: (f32, f32),
    pub path_changed: bool,
}

impl DragSession {
    /// A session over an explicit path, as if it had been dragged out.
    pub fn new(color: Color, path: Vec<Cell>, has_moved: bool) -> Self {
        debug_assert!(!path.is_empty(), "drag path must hold at least one cell");
        Self {
            color,
            path,
            axis: None,
            locked: false,
            has_moved,
        }
    }

    /// Begins a drag at `cell`.
    ///
    /// Starting on a dot evicts that color's segments ending on the dot, and
    /// the color's segments terminating in the dot's area. Starting on a cell
    /// covered by a segment picks that segment up. Returns `None` on a closed
    /// cell, or on an open cell with neither a dot nor a segment.
    pub fn start(cell: Cell, board: &Board, paths: &PathStore) -> Option<DragStart> {
        if !board.is_open(cell) {
            tracing::debug!(%cell, "drag refused: cell is closed");
            return None;
        }

        if let Some(color) = board.dot_color(cell) {
            let mut store = Cow::Borrowed(paths);
            let mut evicted = evict(&mut store, Eviction::ColorEndpoint { color, cell });
            if let Some(area) = board.area(cell) {
                evicted |= evict(
                    &mut store,
                    Eviction::ColorInArea {
                        color,
                        area,
                        board,
                    },
                );
            }
            if evicted {
                tracing::debug!(%cell, %color, "drag start evicted existing segments");
            }
            return Some(DragStart {
                session: Self::new(color.clone(), vec![cell], false),
                evicted: evicted.then(|| store.into_owned()),
            });
        }

        let Some((color, segment)) = paths.find_covering(cell) else {
            tracing::debug!(%cell, "drag refused: nothing to pick up");
            return None;
        };
        let at = segment.position(cell)?;
        let path = pickup_path(segment.cells(), at, color, board);
        tracing::debug!(%cell, %color, segment = %segment.id(), kept = path.len(), "picked up segment");
        Some(DragStart {
            session: Self::new(color.clone(), path, false),
            evicted: None,
        })
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Set once the path has grown by a cell; retracting does not set it.
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub fn tip_cell(&self) -> Cell {
        self.path[self.path.len() - 1]
    }

    /// Feeds one pointer position (local pixels) into the session.
    pub fn update(&mut self, local: (f32, f32), board: &Board, geometry: CellGeometry) -> DragUpdate {
        let Some(bounds) = board.bounds() else {
            return DragUpdate {
                tip: geometry.snap(geometry.center(self.tip_cell())),
                path_changed: false,
            };
        };
        let target = bounds.clamp(geometry.cell_at(local));
        let last = self.tip_cell();
        let center = geometry.center(last);
        let delta = (local.0 - center.0, local.1 - center.1);

        self.axis = resolve_axis(self.axis, last, target, delta);
        let path_changed = match self.axis {
            Some(axis) => self.step_toward(axis, target, board),
            None => false,
        };

        let tip = self.tip(local, board, geometry);
        if self.path.len() <= 1 {
            self.axis = None;
        }
        DragUpdate { tip, path_changed }
    }

    fn step_toward(&mut self, axis: Axis, target: Cell, board: &Board) -> bool {
        let goal = axis.of(target);
        let mut changed = false;

        for _ in 0..MAX_STEPS_PER_UPDATE {
            let tip = self.tip_cell();
            let here = axis.of(tip);
            if here == goal {
                break;
            }
            let next = axis.with(tip, here + (goal - here).signum());

            // backtrack
            let len = self.path.len();
            if len >= 2 && self.path[len - 2] == next {
                self.path.pop();
                self.locked = false;
                changed = true;
                continue;
            }

            if self.locked || !board.is_open(next) {
                break;
            }

            if let Some(pos) = self.path.iter().position(|&c| c == next) {
                self.path.truncate(pos + 1);
                self.locked = false;
                changed = true;
                break;
            }

            let dot = board.dot_color(next);
            if dot.is_some_and(|c| c != &self.color) {
                break;
            }

            self.path.push(next);
            self.has_moved = true;
            changed = true;
            if dot.is_some() {
                self.locked = true;
                break;
            }
        }

        changed
    }

    fn tip(&self, local: (f32, f32), board: &Board, geometry: CellGeometry) -> (f32, f32) {
        let last = self.tip_cell();
        let center = geometry.center(last);
        let axis = match self.axis {
            Some(axis) if !self.locked => axis,
            _ => return geometry.snap(center),
        };

        let pointer = axis.component(local);
        let origin = axis.component(center);
        let dir = if pointer >= origin { 1 } else { -1 };
        let limit = origin + (dir * reach(last, axis, dir, board)) as f32 * geometry.cell_size;
        let along = if dir > 0 {
            clamp(pointer, origin, limit)
        } else {
            clamp(pointer, limit, origin)
        };
        geometry.snap(axis.place(center, along))
    }
}

/// Cells reachable from `from` in direction `dir` before leaving the open
/// set; a dot cell is reachable but nothing beyond it.
fn reach(from: Cell, axis: Axis, dir: i32, board: &Board) -> i32 {
    let mut cell = from;
    let mut n = 0;
    while (n as usize) < MAX_STEPS_PER_UPDATE {
        let next = axis.with(cell, axis.of(cell) + dir);
        if !board.is_open(next) {
            break;
        }
        n += 1;
        if board.dot_color(next).is_some() {
            break;
        }
        cell = next;
    }
    n
}

fn resolve_axis(current: Option<Axis>, last: Cell, target: Cell, delta: (f32, f32)) -> Option<Axis> {
    let moved_x = target.x != last.x;
    let moved_y = target.y != last.y;

    match current {
        None => match (moved_x, moved_y) {
            (true, false) => Some(Axis::X),
            (false, true) => Some(Axis::Y),
            (true, true) if delta.0.abs() >= delta.1.abs() => Some(Axis::X),
            (true, true) => Some(Axis::Y),
            (false, false) => None,
        },
        Some(axis) => {
            let other = axis.other();
            let along = axis.of(target) != axis.of(last);
            let across = other.of(target) != other.of(last);
            let dominates = other.component(delta).abs() > axis.component(delta).abs();
            if across && (!along || dominates) {
                Some(other)
            } else {
                Some(axis)
            }
        }
    }
}

/// Splits a picked-up segment at `at` and keeps one side, oriented so it
/// ends on the picked cell.
///
/// A side whose far end is a dot of `color` wins when only one side has
/// that; otherwise the longer side wins, ties going to the left side.
fn pickup_path(cells: &[Cell], at: usize, color: &Color, board: &Board) -> Vec<Cell> {
    let left: Vec<Cell> = cells[..=at].to_vec();
    let right: Vec<Cell> = cells[at..].iter().rev().copied().collect();
    let anchored = |side: &[Cell]| board.dot_color(side[0]) == Some(color);

    match (anchored(&left), anchored(&right)) {
        (true, false) => left,
        (false, true) => right,
        _ if right.len() > left.len() => right,
        _ => left,
    }
}
