pub mod json_backend;

use crate::{core::ClearAuthorization, domain::ClosureRecord, errors::Result};

/// What a ledger read found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No ledger file yet.
    Missing,
    Loaded(Vec<ClosureRecord>),
    /// The file exists but could not be read or parsed.
    Unreadable { reason: String },
}

impl LoadOutcome {
    pub fn is_unreadable(&self) -> bool {
        matches!(self, LoadOutcome::Unreadable { .. })
    }

    /// Lenient view: missing and unreadable ledgers both read as empty.
    pub fn into_records(self) -> Vec<ClosureRecord> {
        match self {
            LoadOutcome::Missing => Vec::new(),
            LoadOutcome::Loaded(records) => records,
            LoadOutcome::Unreadable { reason } => {
                tracing::warn!(%reason, "ledger unreadable; treating history as empty");
                Vec::new()
            }
        }
    }
}

/// Append-only persistence for closure records.
///
/// Implementations assume a single logical writer but must serialize
/// concurrent appends so that no record is lost.
pub trait LedgerStore {
    /// Reads the whole ledger. Never fails; see [`LoadOutcome`].
    fn load(&self) -> LoadOutcome;

    /// Adds `record` after all existing ones and returns the new record count.
    /// Fails if the write did not durably complete.
    fn append(&self, record: &ClosureRecord) -> Result<usize>;

    /// Irreversibly empties the ledger.
    fn clear(&self, authorization: ClearAuthorization) -> Result<()>;

    /// The persisted bytes, unmodified.
    fn raw_bytes(&self) -> Result<Vec<u8>>;

    fn records(&self) -> Vec<ClosureRecord> {
        self.load().into_records()
    }
}

pub use json_backend::JsonLedgerStore;
