//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod policy;
pub mod signal;

pub use indicators::{closes, OscillatorReading, PricePoint, SymbolSnapshot};
pub use policy::SymbolPolicy;
pub use signal::{SignalEvent, SignalType};
