use crate::history::{HistoryError, HistoryRecord, HistoryStore};

/// Unindexed in-memory log for tests and embedders that keep no file.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    records: Vec<HistoryRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn try_latest(&self, symbol: &str) -> Result<Option<HistoryRecord>, HistoryError> {
        // max_by_key keeps the last of equal maxima, which is append order.
        Ok(self
            .records
            .iter()
            .filter(|r| r.symbol == symbol)
            .max_by_key(|r| r.date)
            .cloned())
    }

    fn append(&mut self, record: HistoryRecord) -> Result<(), HistoryError> {
        self.records.push(record);
        Ok(())
    }
}
