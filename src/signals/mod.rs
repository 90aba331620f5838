//! Crossing detection and run orchestration.

pub mod detector;
pub mod engine;

pub use detector::{classify, detect, detect_edge, CrossingOutcome, Edge};
pub use engine::{RunSummary, SignalEngine};
