//! Umbrella crate for the flowpath drawing engine.
//!
//! Depend on `flowpath` to get the engine (drag sessions, commits, the
//! controller) and the wire types it exchanges with a UI under one name.

pub use flowpath_engine as engine;
pub use flowpath_protocol as protocol;
