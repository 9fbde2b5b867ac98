use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{
    core::ClearAuthorization,
    domain::ClosureRecord,
    errors::{CloseError, Result},
    utils::paths::ensure_dir,
};

use super::{LedgerStore, LoadOutcome};

const TMP_SUFFIX: &str = "tmp";
const LOCK_SUFFIX: &str = "lock";
const EMPTY_LEDGER: &[u8] = b"[]";

/// Pretty-printed JSON array of closures in a single file.
///
/// Writes are staged to `<file>.tmp` and renamed into place. Appends and
/// clears hold an exclusive lock on `<file>.lock` across their
/// read-modify-write.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_outcome(&self) -> LoadOutcome {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(err) => {
                return LoadOutcome::Unreadable {
                    reason: err.to_string(),
                }
            }
        };
        match serde_json::from_slice::<Vec<ClosureRecord>>(&data) {
            Ok(mut records) => {
                for (index, record) in records.iter_mut().enumerate() {
                    match record.recompute_totals() {
                        Ok(true) => tracing::warn!(
                            index,
                            timestamp = %record.timestamp,
                            "stored totals disagree with entered figures; using recomputed totals"
                        ),
                        Ok(false) => {}
                        Err(err) => {
                            return LoadOutcome::Unreadable {
                                reason: format!("record {index}: {err}"),
                            }
                        }
                    }
                }
                LoadOutcome::Loaded(records)
            }
            Err(err) => LoadOutcome::Unreadable {
                reason: err.to_string(),
            },
        }
    }

    fn lock(&self) -> Result<LedgerLock> {
        LedgerLock::acquire(&sibling_path(&self.path, LOCK_SUFFIX))
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> LoadOutcome {
        self.read_outcome()
    }

    fn append(&self, record: &ClosureRecord) -> Result<usize> {
        let _lock = self.lock()?;
        let mut records = match self.read_outcome() {
            LoadOutcome::Missing => Vec::new(),
            LoadOutcome::Loaded(records) => records,
            LoadOutcome::Unreadable { reason } => {
                return Err(CloseError::LedgerUnreadable {
                    path: self.path.clone(),
                    reason,
                })
            }
        };

        let mut record = record.clone();
        if record.recompute_totals()? {
            tracing::warn!("record totals were stale at append; recomputed");
        }
        records.push(record);

        let json = serde_json::to_string_pretty(&records)?;
        replace_file(&self.path, json.as_bytes())?;
        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "closure appended to ledger"
        );
        Ok(records.len())
    }

    fn clear(&self, _authorization: ClearAuthorization) -> Result<()> {
        let _lock = self.lock()?;
        replace_file(&self.path, EMPTY_LEDGER)?;
        tracing::info!(path = %self.path.display(), "ledger cleared");
        Ok(())
    }

    fn raw_bytes(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(EMPTY_LEDGER.to_vec()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Exclusive advisory lock, released when dropped.
struct LedgerLock {
    _file: File,
}

impl LedgerLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        file.lock()?;
        Ok(Self { _file: file })
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    sibling.set_extension(ext);
    sibling
}

/// Stages `data` next to `path`, syncs it, then renames it over `path`.
/// The original file is untouched if any step before the rename fails.
pub(crate) fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = sibling_path(path, TMP_SUFFIX);
    let staged = write_synced(&tmp, data).and_then(|()| fs::rename(&tmp, path));
    if let Err(err) = staged {
        if tmp.is_file() {
            let _ = fs::remove_file(&tmp);
        }
        return Err(err.into());
    }
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_paths_keep_original_extension() {
        let path = Path::new("/var/data/closures.json");
        assert_eq!(
            sibling_path(path, TMP_SUFFIX),
            PathBuf::from("/var/data/closures.json.tmp")
        );
        assert_eq!(
            sibling_path(Path::new("ledger"), LOCK_SUFFIX),
            PathBuf::from("ledger.lock")
        );
    }
}
