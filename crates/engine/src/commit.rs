use crate::board::{AreaId, Board};
use crate::drag::DragSession;
use crate::store::{evict, Eviction, PathStore, Segment};
use flowpath_protocol::SegmentId;
use std::borrow::Cow;
use std::collections::HashSet;
use time::OffsetDateTime;

/// Per-play-session prefix for segment identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdSeed(u64);

impl IdSeed {
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Seeded from the current wall clock, in milliseconds.
    pub fn now() -> Self {
        let ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Self(u64::try_from(ms).unwrap_or_default())
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn segment_id(self, counter: u64) -> SegmentId {
        SegmentId::new(format!("seg-{}-{counter}", self.0))
    }
}

#[derive(Debug, Clone)]
pub struct CommitOutcome<'a> {
    /// `Cow::Borrowed` of the input store when nothing changed.
    pub paths: Cow<'a, PathStore>,
    pub changed: bool,
    pub next_segment_id: u64,
}

/// Reconciles a finished drag (or tap) against the committed paths.
///
/// A tap on a dot deletes every segment ending there; any other single-cell
/// session commits nothing. A path of two or more cells evicts, in order:
/// the color's segments in the start dot's area, the color's segments in the
/// end dot's area (when it differs), any segment ending on a dot endpoint of
/// the path, and any segment sharing a cell with the path. The path is then
/// appended as a new segment.
pub fn commit<'a>(
    paths: &'a PathStore,
    session: &DragSession,
    board: &Board,
    seed: IdSeed,
    next_segment_id: u64,
) -> CommitOutcome<'a> {
    let path = session.path();
    let unchanged = CommitOutcome {
        paths: Cow::Borrowed(paths),
        changed: false,
        next_segment_id,
    };

    let (first, last) = match path {
        [] => return unchanged,
        [only] => {
            if session.has_moved() || board.dot_color(*only).is_none() {
                return unchanged;
            }
            let keys = HashSet::from([*only]);
            let mut store = Cow::Borrowed(paths);
            let changed = evict(&mut store, Eviction::EndpointIn(&keys));
            if changed {
                tracing::debug!(cell = %only, "tap removed segments");
            }
            return CommitOutcome {
                paths: store,
                changed,
                next_segment_id,
            };
        }
        [first, .., last] => (*first, *last),
    };

    let color = session.color();
    let mut store = Cow::Borrowed(paths);
    let mut evicted = false;

    let start_area: Option<AreaId> = board
        .area(first)
        .filter(|_| board.dot_color(first) == Some(color));
    if let Some(area) = start_area {
        evicted |= evict(
            &mut store,
            Eviction::ColorInArea {
                color,
                area,
                board,
            },
        );
    }

    let end_area = board
        .area(last)
        .filter(|_| board.dot_color(last) == Some(color));
    if let Some(area) = end_area.filter(|a| Some(*a) != start_area) {
        evicted |= evict(
            &mut store,
            Eviction::ColorInArea {
                color,
                area,
                board,
            },
        );
    }

    let dot_ends: HashSet<_> = [first, last]
        .into_iter()
        .filter(|&c| board.dot_color(c).is_some())
        .collect();
    if !dot_ends.is_empty() {
        evicted |= evict(&mut store, Eviction::EndpointIn(&dot_ends));
    }

    let crossed: HashSet<_> = path.iter().copied().collect();
    evicted |= evict(&mut store, Eviction::Intersecting(&crossed));

    let id = seed.segment_id(next_segment_id);
    tracing::debug!(%color, segment = %id, cells = path.len(), evicted, "committed segment");
    store
        .to_mut()
        .push(color.clone(), Segment::new(id, path.to_vec()));

    CommitOutcome {
        paths: store,
        changed: true,
        next_segment_id: next_segment_id.wrapping_add(1),
    }
}
