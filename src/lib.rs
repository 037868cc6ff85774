//! Deterministic grid pursuit simulation: maze model, interchangeable path
//! search, per-pursuer state machines and a replayable tick loop.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod grid;
pub mod levels;
pub mod metrics;
pub mod pathfinding;
pub mod replay;
pub mod rng;
pub mod types;
