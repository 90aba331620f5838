//! Append-only observation log.
//!
//! The log is the engine's only persistent state: the newest record per
//! symbol is the prior value the crossing detector compares against on the
//! next invocation.

pub mod csv_store;
pub mod memory;
pub mod record;

pub use csv_store::CsvHistoryStore;
pub use memory::MemoryHistoryStore;
pub use record::HistoryRecord;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed history row at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("unexpected history header: {0}")]
    HeaderMismatch(String),

    #[error("history log unavailable: {0}")]
    Unavailable(String),

    #[error("latest history row for {0} is corrupt")]
    CorruptEntry(String),
}

pub trait HistoryStore: Send {
    /// Newest record for `symbol`: greatest date, last appended on ties.
    fn try_latest(&self, symbol: &str) -> Result<Option<HistoryRecord>, HistoryError>;

    fn append(&mut self, record: HistoryRecord) -> Result<(), HistoryError>;

    /// Fail-closed lookup: an unreadable log reads as "no prior data".
    fn latest(&self, symbol: &str) -> Option<HistoryRecord> {
        match self.try_latest(symbol) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "History lookup failed, treating as cold start");
                None
            }
        }
    }
}
