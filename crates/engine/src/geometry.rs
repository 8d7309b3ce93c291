use flowpath_protocol::Cell;

/// Grid axis a path is currently growing along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    pub fn of(self, cell: Cell) -> i32 {
        match self {
            Axis::X => cell.x,
            Axis::Y => cell.y,
        }
    }

    /// `cell` with its coordinate on this axis replaced by `value`.
    pub fn with(self, cell: Cell, value: i32) -> Cell {
        match self {
            Axis::X => Cell::new(value, cell.y),
            Axis::Y => Cell::new(cell.x, value),
        }
    }

    pub fn component(self, point: (f32, f32)) -> f32 {
        match self {
            Axis::X => point.0,
            Axis::Y => point.1,
        }
    }

    pub fn place(self, point: (f32, f32), value: f32) -> (f32, f32) {
        match self {
            Axis::X => (value, point.1),
            Axis::Y => (point.0, value),
        }
    }
}

/// Inclusive bounding box of the open cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Option<Self> {
        cells.into_iter().fold(None, |acc, c| {
            Some(match acc {
                None => Bounds {
                    min_x: c.x,
                    min_y: c.y,
                    max_x: c.x,
                    max_y: c.y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(c.x),
                    min_y: b.min_y.min(c.y),
                    max_x: b.max_x.max(c.x),
                    max_y: b.max_y.max(c.y),
                },
            })
        })
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (self.min_x..=self.max_x).contains(&cell.x) && (self.min_y..=self.max_y).contains(&cell.y)
    }

    pub fn clamp(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.x.clamp(self.min_x, self.max_x),
            cell.y.clamp(self.min_y, self.max_y),
        )
    }
}

/// Maps local (pan/zoom corrected) pixel coordinates onto the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    pub cell_size: f32,
    pub pixel_ratio: f32,
}

impl CellGeometry {
    pub fn new(cell_size: f32, pixel_ratio: f32) -> Self {
        Self {
            cell_size,
            pixel_ratio,
        }
    }

    pub fn cell_at(&self, local: (f32, f32)) -> Cell {
        Cell::new(
            cell_index(local.0, self.cell_size),
            cell_index(local.1, self.cell_size),
        )
    }

    pub fn center(&self, cell: Cell) -> (f32, f32) {
        (
            cell_center(cell.x, self.cell_size),
            cell_center(cell.y, self.cell_size),
        )
    }

    pub fn snap(&self, point: (f32, f32)) -> (f32, f32) {
        (
            snap_to_pixel(point.0, self.pixel_ratio),
            snap_to_pixel(point.1, self.pixel_ratio),
        )
    }
}

/// Like `f32::clamp` but never panics; an inverted range collapses to `lo`.
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Rounds to the nearest physical pixel.
pub fn snap_to_pixel(value: f32, pixel_ratio: f32) -> f32 {
    if pixel_ratio <= 0.0 {
        return value;
    }
    (value * pixel_ratio).round() / pixel_ratio
}

pub fn cell_index(coord: f32, cell_size: f32) -> i32 {
    (coord / cell_size).floor() as i32
}

pub fn cell_center(index: i32, cell_size: f32) -> f32 {
    (index as f32 + 0.5) * cell_size
}

/// Scales `scale` by `factor` (clamped to `[min_scale, max_scale]`) while keeping the
/// screen point `focal` over the same local point. Returns the new `(scale, pan)`.
pub fn zoom_about(
    scale: f32,
    pan: (f32, f32),
    focal: (f32, f32),
    factor: f32,
    min_scale: f32,
    max_scale: f32,
) -> (f32, (f32, f32)) {
    let next = clamp(scale * factor, min_scale, max_scale);
    if scale <= 0.0 {
        return (next, pan);
    }
    let ratio = next / scale;
    let pan = (
        focal.0 - (focal.0 - pan.0) * ratio,
        focal.1 - (focal.1 - pan.1) * ratio,
    );
    (next, pan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_follows_pixel_ratio() {
        assert_eq!(snap_to_pixel(10.3, 1.0), 10.0);
        assert_eq!(snap_to_pixel(10.3, 2.0), 10.5);
        assert_eq!(snap_to_pixel(10.3, 0.0), 10.3);
    }

    #[test]
    fn cell_lookup_floors_negative_coordinates() {
        let g = CellGeometry::new(10.0, 1.0);
        assert_eq!(g.cell_at((25.0, 55.0)), Cell::new(2, 5));
        assert_eq!(g.cell_at((-0.5, 9.99)), Cell::new(-1, 0));
        assert_eq!(g.center(Cell::new(2, 5)), (25.0, 55.0));
    }

    #[test]
    fn zoom_keeps_focal_point_fixed() {
        let (scale, pan) = zoom_about(1.0, (10.0, 20.0), (110.0, 220.0), 2.0, 0.5, 4.0);
        assert_eq!(scale, 2.0);
        // local point under the focal before and after
        let before = ((110.0 - 10.0) / 1.0, (220.0 - 20.0) / 1.0);
        let after = ((110.0 - pan.0) / scale, (220.0 - pan.1) / scale);
        assert_eq!(before, after);

        let (scale, _) = zoom_about(3.0, (0.0, 0.0), (0.0, 0.0), 10.0, 0.5, 4.0);
        assert_eq!(scale, 4.0);
    }

    #[test]
    fn bounds_clamp_into_open_region() {
        let cells = [Cell::new(1, 1), Cell::new(4, 2), Cell::new(2, 6)];
        let b = Bounds::from_cells(&cells).unwrap();
        assert_eq!(b.clamp(Cell::new(-3, 9)), Cell::new(1, 6));
        assert!(b.contains(Cell::new(4, 6)));
        assert!(!b.contains(Cell::new(0, 1)));
        assert!(Bounds::from_cells(&[] as &[Cell]).is_none());
    }
}
