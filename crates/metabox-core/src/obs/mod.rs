//! Lifecycle notification boundary.
//!
//! Core pipeline logic does not talk to collaborators directly. Render and
//! save passes emit events through the sink; whoever is listening (a REST
//! exposure layer, host hooks, tests) subscribes a sink for the duration.

pub mod sink;

pub use sink::*;
