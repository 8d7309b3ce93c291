use crate::geometry::Bounds;
use anyhow::Context;
use flowpath_protocol::{Cell, Color, Puzzle};
use std::collections::{HashMap, HashSet};

pub type AreaId = i32;

/// Read-only per-cell maps describing one puzzle: which cells are open,
/// which hold a dot (and its color), and which area each cell belongs to.
#[derive(Debug, Clone, Default)]
pub struct Board {
    open: HashSet<Cell>,
    dots: HashMap<Cell, Color>,
    areas: HashMap<Cell, AreaId>,
    bounds: Option<Bounds>,
}

impl Board {
    pub fn new(open: impl IntoIterator<Item = Cell>) -> Self {
        let open: HashSet<Cell> = open.into_iter().collect();
        let bounds = Bounds::from_cells(&open);
        Self {
            open,
            dots: HashMap::new(),
            areas: HashMap::new(),
            bounds,
        }
    }

    /// Full `width x height` rectangle of open cells.
    pub fn rect(width: i32, height: i32) -> Self {
        Self::new((0..height).flat_map(|y| (0..width).map(move |x| Cell::new(x, y))))
    }

    pub fn with_dot(mut self, cell: Cell, color: impl Into<Color>) -> Self {
        self.dots.insert(cell, color.into());
        self
    }

    pub fn with_area(mut self, cells: impl IntoIterator<Item = Cell>, area: AreaId) -> Self {
        for cell in cells {
            self.areas.insert(cell, area);
        }
        self
    }

    pub fn from_puzzle(puzzle: &Puzzle) -> anyhow::Result<Self> {
        if puzzle.width <= 0 || puzzle.height <= 0 {
            anyhow::bail!(
                "puzzle dimensions must be positive, got {}x{}",
                puzzle.width,
                puzzle.height
            );
        }
        let mut board = match &puzzle.open {
            Some(cells) => Self::new(cells.iter().copied()),
            None => Self::rect(puzzle.width, puzzle.height),
        };

        for pair in &puzzle.dots {
            for cell in [pair.a, pair.b] {
                if !board.is_open(cell) {
                    anyhow::bail!("dot {} of color {} is not on an open cell", cell, pair.color);
                }
                if let Some(existing) = board.dots.insert(cell, pair.color.clone()) {
                    return Err(anyhow::anyhow!("cell {cell} already holds a {existing} dot"))
                        .with_context(|| format!("placing {} dots", pair.color));
                }
            }
        }

        for area in &puzzle.areas {
            board = board.with_area(area.cells.iter().copied(), area.id);
        }
        Ok(board)
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.open.contains(&cell)
    }

    pub fn dot_color(&self, cell: Cell) -> Option<&Color> {
        self.dots.get(&cell)
    }

    pub fn area(&self, cell: Cell) -> Option<AreaId> {
        self.areas.get(&cell).copied()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn dots(&self) -> impl Iterator<Item = (Cell, &Color)> {
        self.dots.iter().map(|(cell, color)| (*cell, color))
    }
}
