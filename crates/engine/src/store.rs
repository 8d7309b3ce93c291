use crate::board::{AreaId, Board};
use anyhow::Context;
use flowpath_protocol::{Cell, Color, PathPayload, SegmentId, SegmentPayload};
use hashlink::LinkedHashMap;
use std::borrow::Cow;
use std::collections::HashSet;

/// A committed, identity-bearing path of one color. Never edited cell by cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    id: SegmentId,
    cells: Vec<Cell>,
}

impl Segment {
    pub fn new(id: SegmentId, cells: Vec<Cell>) -> Self {
        debug_assert!(!cells.is_empty(), "segment {id} has no cells");
        Self { id, cells }
    }

    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn first(&self) -> Cell {
        self.cells[0]
    }

    pub fn last(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn position(&self, cell: Cell) -> Option<usize> {
        self.cells.iter().position(|&c| c == cell)
    }

    pub fn has_endpoint(&self, cell: Cell) -> bool {
        self.first() == cell || self.last() == cell
    }

    pub fn endpoints(&self) -> [Cell; 2] {
        [self.first(), self.last()]
    }
}

/// Selects segments for removal.
#[derive(Debug, Clone, Copy)]
pub enum Eviction<'a> {
    /// Any segment containing one of the cells.
    Intersecting(&'a HashSet<Cell>),
    /// Any segment whose first or last cell is one of the cells.
    EndpointIn(&'a HashSet<Cell>),
    /// Segments of `color` that start or end on `cell`.
    ColorEndpoint { color: &'a Color, cell: Cell },
    /// Segments of `color` whose first or last cell lies in `area`.
    ColorInArea {
        color: &'a Color,
        area: AreaId,
        board: &'a Board,
    },
}

impl Eviction<'_> {
    pub fn matches(&self, color: &Color, segment: &Segment) -> bool {
        match *self {
            Eviction::Intersecting(keys) => segment.cells().iter().any(|c| keys.contains(c)),
            Eviction::EndpointIn(keys) => segment.endpoints().iter().any(|c| keys.contains(c)),
            Eviction::ColorEndpoint { color: target, cell } => {
                color == target && segment.has_endpoint(cell)
            }
            Eviction::ColorInArea {
                color: target,
                area,
                board,
            } => {
                color == target
                    && segment
                        .endpoints()
                        .iter()
                        .any(|&c| board.area(c) == Some(area))
            }
        }
    }
}

/// Committed segments per color, in insertion order.
///
/// No color ever maps to an empty list: every removal drops the color key
/// once its last segment is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStore {
    by_color: LinkedHashMap<Color, Vec<Segment>>,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_color.is_empty()
    }

    pub fn segments(&self, color: &Color) -> &[Segment] {
        self.by_color.get(color).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn colors(&self) -> impl Iterator<Item = &Color> {
        self.by_color.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Color, &[Segment])> {
        self.by_color.iter().map(|(c, s)| (c, s.as_slice()))
    }

    pub fn segment_count(&self) -> usize {
        self.by_color.values().map(Vec::len).sum()
    }

    pub fn push(&mut self, color: Color, segment: Segment) {
        match self.by_color.get_mut(&color) {
            Some(list) => list.push(segment),
            None => {
                self.by_color.insert(color, vec![segment]);
            }
        }
    }

    /// First segment (scanning colors, then segments, in order) that covers `cell`.
    pub fn find_covering(&self, cell: Cell) -> Option<(&Color, &Segment)> {
        self.by_color
            .iter()
            .find_map(|(color, segs)| segs.iter().find(|s| s.contains(cell)).map(|s| (color, s)))
    }

    pub fn covered_cells(&self) -> HashSet<Cell> {
        self.by_color
            .values()
            .flatten()
            .flat_map(|s| s.cells().iter().copied())
            .collect()
    }

    pub fn remove_segment(&mut self, color: &Color, index: usize) -> Option<Segment> {
        let list = self.by_color.get_mut(color)?;
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.by_color.remove(color);
        }
        Some(removed)
    }

    pub fn any_segment(&self, mut pred: impl FnMut(&Color, &Segment) -> bool) -> bool {
        self.by_color
            .iter()
            .any(|(color, segs)| segs.iter().any(|s| pred(color, s)))
    }

    /// Keeps the segments for which `keep` holds. Returns whether anything was removed.
    pub fn retain_segments(&mut self, mut keep: impl FnMut(&Color, &Segment) -> bool) -> bool {
        let mut changed = false;
        let mut emptied = Vec::new();
        for (color, segs) in self.by_color.iter_mut() {
            let before = segs.len();
            segs.retain(|s| keep(color, s));
            changed |= segs.len() != before;
            if segs.is_empty() {
                emptied.push(color.clone());
            }
        }
        for color in emptied {
            self.by_color.remove(&color);
        }
        changed
    }

    pub fn would_evict(&self, eviction: &Eviction<'_>) -> bool {
        self.any_segment(|color, seg| eviction.matches(color, seg))
    }

    pub fn evict(&mut self, eviction: &Eviction<'_>) -> bool {
        self.retain_segments(|color, seg| !eviction.matches(color, seg))
    }

    pub fn remove_segments_intersecting_cells(&mut self, keys: &HashSet<Cell>) -> bool {
        self.evict(&Eviction::Intersecting(keys))
    }

    pub fn remove_segments_with_endpoint_in(&mut self, keys: &HashSet<Cell>) -> bool {
        self.evict(&Eviction::EndpointIn(keys))
    }

    pub fn remove_segments_at_endpoint(&mut self, cell: Cell) -> bool {
        let keys = HashSet::from([cell]);
        self.evict(&Eviction::EndpointIn(&keys))
    }

    pub fn remove_segments_of_color_in_area(
        &mut self,
        color: &Color,
        area: AreaId,
        board: &Board,
    ) -> bool {
        self.evict(&Eviction::ColorInArea { color, area, board })
    }

    pub fn to_payload(&self) -> PathPayload {
        let mut payload = PathPayload::new();
        for (color, segs) in self.by_color.iter() {
            let segs = segs
                .iter()
                .map(|s| SegmentPayload::from_cells(s.id().clone(), s.cells()))
                .collect();
            payload.push(color.clone(), segs);
        }
        payload
    }

    /// Rebuilds a store from its payload. Empty colors are dropped.
    pub fn from_payload(payload: &PathPayload) -> anyhow::Result<Self> {
        let mut store = Self::new();
        for (color, segs) in payload.iter() {
            for seg in segs {
                let cells = seg
                    .to_cells()
                    .filter(|cells| !cells.is_empty())
                    .with_context(|| {
                        format!(
                            "segment {} of {color} has {} coordinates; expected a non-empty even count",
                            seg.id,
                            seg.cells.len()
                        )
                    })?;
                store.push(color.clone(), Segment::new(seg.id.clone(), cells));
            }
        }
        Ok(store)
    }
}

/// Applies `eviction` to a borrowed-or-owned store, cloning only when
/// something is actually about to be removed.
pub fn evict(store: &mut Cow<'_, PathStore>, eviction: Eviction<'_>) -> bool {
    if !store.would_evict(&eviction) {
        return false;
    }
    store.to_mut().evict(&eviction)
}
