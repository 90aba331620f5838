//! Core application primitives (run context, bootstrap)

pub mod context;
pub mod runtime;

pub use context::{RunContext, RunSettings};
pub use runtime::{bootstrap, notify_operator, RunOptions};
