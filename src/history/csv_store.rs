//! CSV-backed history log with an in-memory latest-record index.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::history::record::HEADER;
use crate::history::{HistoryError, HistoryRecord, HistoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    At(usize),
    /// Poisoned; `best` is the newest valid row seen so far.
    Corrupt { best: Option<usize> },
}

/// Append-only CSV log.
///
/// The file is scanned once at open; after that every record lives in
/// `records` and `index` points each symbol at its newest entry, so lookups
/// never rescan the file. The on-disk format is untouched by the index.
pub struct CsvHistoryStore {
    path: PathBuf,
    records: Vec<HistoryRecord>,
    index: HashMap<String, Slot>,
    unavailable: Option<String>,
}

impl CsvHistoryStore {
    /// Open (or prepare to create) the log at `path`.
    ///
    /// Never fails: a log that cannot be read leaves the store usable for
    /// appends while every lookup reports it as unavailable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            records: Vec::new(),
            index: HashMap::new(),
            unavailable: None,
        };

        match store.load() {
            Ok(()) => {
                info!(
                    path = %store.path.display(),
                    records = store.records.len(),
                    symbols = store.index.len(),
                    "History log loaded"
                );
            }
            Err(e) => {
                warn!(
                    path = %store.path.display(),
                    error = %e,
                    "History log unreadable, all symbols start cold"
                );
                store.records.clear();
                store.index.clear();
                store.unavailable = Some(e.to_string());
            }
        }

        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }

    fn load(&mut self) -> Result<(), HistoryError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No history log yet");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(());
        }
        if !headers.iter().map(str::trim).eq(HEADER.iter().copied()) {
            return Err(HistoryError::HeaderMismatch(
                headers.iter().collect::<Vec<_>>().join(","),
            ));
        }

        for result in reader.records() {
            let row = result?;
            match HistoryRecord::from_row(&row) {
                Ok(record) => self.index_record(record),
                Err(e) => {
                    let symbol = row.get(1).map(str::trim).unwrap_or("");
                    if symbol.is_empty() {
                        // Cannot tell whose row this is, so nobody's prior can be trusted.
                        return Err(e);
                    }
                    warn!(symbol = %symbol, error = %e, "Skipping corrupt history row");
                    self.poison(symbol);
                }
            }
        }

        Ok(())
    }

    fn poison(&mut self, symbol: &str) {
        let best = match self.index.get(symbol) {
            Some(Slot::At(idx)) => Some(*idx),
            Some(Slot::Corrupt { best }) => *best,
            None => None,
        };
        self.index.insert(symbol.to_string(), Slot::Corrupt { best });
    }

    /// A poisoned symbol recovers only through a row at least as new as the
    /// newest valid row before the corruption.
    fn index_record(&mut self, record: HistoryRecord) {
        let idx = self.records.len();
        let newer = match self.index.get(&record.symbol) {
            Some(Slot::At(current)) | Some(Slot::Corrupt { best: Some(current) }) => {
                record.date >= self.records[*current].date
            }
            Some(Slot::Corrupt { best: None }) | None => true,
        };
        if newer {
            self.index.insert(record.symbol.clone(), Slot::At(idx));
        }
        self.records.push(record);
    }

    /// Whether the file is empty (or absent) and whether its last line is
    /// unterminated.
    fn tail_state(&self) -> io::Result<(bool, bool)> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((true, false)),
            Err(e) => return Err(e),
        };
        if file.metadata()?.len() == 0 {
            return Ok((true, false));
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok((false, last[0] != b'\n'))
    }
}

impl HistoryStore for CsvHistoryStore {
    fn try_latest(&self, symbol: &str) -> Result<Option<HistoryRecord>, HistoryError> {
        if let Some(reason) = &self.unavailable {
            return Err(HistoryError::Unavailable(reason.clone()));
        }
        match self.index.get(symbol) {
            Some(Slot::At(idx)) => Ok(self.records.get(*idx).cloned()),
            Some(Slot::Corrupt { .. }) => Err(HistoryError::CorruptEntry(symbol.to_string())),
            None => Ok(None),
        }
    }

    fn append(&mut self, record: HistoryRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (write_header, unterminated) = self.tail_state()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if unterminated {
            warn!(path = %self.path.display(), "History log ends mid-line, terminating it");
            file.write_all(b"\n")?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(HEADER)?;
            info!(path = %self.path.display(), "Initialized history log");
        }
        writer.write_record(record.to_row())?;
        writer.flush()?;

        debug!(
            symbol = %record.symbol,
            signal_type = %record.signal_type,
            "Appended history record"
        );
        self.index_record(record);
        Ok(())
    }
}
