use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One grid square. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Cell {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for [i32; 2] {
    fn from(cell: Cell) -> Self {
        [cell.x, cell.y]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Color {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire form of one committed segment: `cells` is a flat `[x0, y0, x1, y1, ...]` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPayload {
    pub id: SegmentId,
    pub cells: Vec<i32>,
}

impl SegmentPayload {
    pub fn from_cells(id: SegmentId, cells: &[Cell]) -> Self {
        Self {
            id,
            cells: cells.iter().flat_map(|c| [c.x, c.y]).collect(),
        }
    }

    /// Decodes the flat coordinate list. `None` when it has an odd length.
    pub fn to_cells(&self) -> Option<Vec<Cell>> {
        if self.cells.len() % 2 != 0 {
            return None;
        }
        Some(
            self.cells
                .chunks_exact(2)
                .map(|pair| Cell::new(pair[0], pair[1]))
                .collect(),
        )
    }
}

/// Serializable path set: a JSON object mapping color to its segments.
///
/// Entry order is kept exactly as built (or as read), so decoding and
/// re-encoding a payload reproduces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPayload {
    colors: Vec<(Color, Vec<SegmentPayload>)>,
}

impl PathPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, color: Color, segments: Vec<SegmentPayload>) {
        self.colors.push((color, segments));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Color, &[SegmentPayload])> {
        self.colors.iter().map(|(c, s)| (c, s.as_slice()))
    }

    pub fn get(&self, color: &Color) -> Option<&[SegmentPayload]> {
        self.colors
            .iter()
            .find(|(c, _)| c == color)
            .map(|(_, s)| s.as_slice())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

impl Serialize for PathPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.colors.len()))?;
        for (color, segments) in &self.colors {
            map.serialize_entry(color, segments)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PathPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = PathPayload;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of color to segment list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut payload = PathPayload::new();
                while let Some((color, segments)) =
                    access.next_entry::<Color, Vec<SegmentPayload>>()?
                {
                    payload.push(color, segments);
                }
                Ok(payload)
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotPair {
    pub color: Color,
    pub a: Cell,
    pub b: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: i32,
    pub cells: Vec<Cell>,
}

/// Board description supplied by the level layer.
///
/// `open` defaults to the full `width x height` rectangle when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Vec<Cell>>,
    pub dots: Vec<DotPair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub areas: Vec<Area>,
}

/// Pointer and view input, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    Begin { x: f32, y: f32 },
    Update { x: f32, y: f32 },
    End,
    Cancel,
    Pan { dx: f32, dy: f32 },
    Zoom { focal_x: f32, focal_y: f32, factor: f32 },
    Undo,
    Redo,
    Reset,
}

/// Results handed back to the application side after each gesture phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerUpdate {
    Preview {
        color: Color,
        cells: Vec<Cell>,
        tip: [f32; 2],
        path_changed: bool,
    },
    PreviewCleared,
    Paths {
        payload: PathPayload,
        solved: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_color_order() {
        let raw = r#"{"red":[{"id":"seg-1-0","cells":[0,0,0,1]}],"blue":[{"id":"seg-1-1","cells":[3,3,4,3]}],"amber":[]}"#;
        let payload = PathPayload::from_json(raw).unwrap();
        let colors: Vec<&str> = payload.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(colors, vec!["red", "blue", "amber"]);
        assert_eq!(payload.to_json().unwrap(), raw);
    }

    #[test]
    fn segment_payload_rejects_odd_coordinates() {
        let seg = SegmentPayload {
            id: SegmentId::new("s"),
            cells: vec![0, 0, 1],
        };
        assert_eq!(seg.to_cells(), None);

        let seg = SegmentPayload::from_cells(SegmentId::new("s"), &[Cell::new(2, 3), Cell::new(2, 4)]);
        assert_eq!(seg.cells, vec![2, 3, 2, 4]);
        assert_eq!(seg.to_cells(), Some(vec![Cell::new(2, 3), Cell::new(2, 4)]));
    }

    #[test]
    fn puzzle_reads_cells_as_pairs() {
        let raw = r#"{"width":3,"height":1,"dots":[{"color":"red","a":[0,0],"b":[2,0]}]}"#;
        let puzzle: Puzzle = serde_json::from_str(raw).unwrap();
        assert_eq!(puzzle.dots[0].b, Cell::new(2, 0));
        assert!(puzzle.open.is_none());
        assert!(puzzle.areas.is_empty());
    }

    #[test]
    fn gesture_events_are_tagged() {
        let ev: GestureEvent = serde_json::from_str(r#"{"kind":"begin","x":5.0,"y":7.5}"#).unwrap();
        assert_eq!(ev, GestureEvent::Begin { x: 5.0, y: 7.5 });
        let ev: GestureEvent = serde_json::from_str(r#"{"kind":"end"}"#).unwrap();
        assert_eq!(ev, GestureEvent::End);
    }
}
