pub mod board;
pub mod commit;
pub mod config;
pub mod controller;
pub mod drag;
pub mod geometry;
pub mod history;
pub mod store;
pub mod win;

pub use board::{AreaId, Board};
pub use commit::{commit, CommitOutcome, IdSeed};
pub use config::EngineConfig;
pub use controller::{PathController, PumpStatus, ViewTransform};
pub use drag::{DragSession, DragStart, DragUpdate, MAX_STEPS_PER_UPDATE};
pub use geometry::{Axis, Bounds, CellGeometry};
pub use history::PathHistory;
pub use store::{Eviction, PathStore, Segment};
pub use win::is_solved;
