//! File-backed credential store
//!
//! Persists the credential record as JSON. Every write goes to a temporary
//! file in the target directory, is synced, then renamed over the store file,
//! so an interrupted commit leaves either the old or the new record on disk.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use hex::FromHex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::credential_record::CredentialRecord;
use crate::error::{StorageError, WipeguardResult};
use crate::model::{Salt, SecretValue};
use crate::ports::{CommitOutcome, SecurityStateStore};

const FORMAT_VERSION: u32 = 1;

/// On-disk layout of the store file
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    initialized: bool,
    device_salt: String,
    pin_digest: Option<String>,
    wipe_code_digest: Option<String>,
    #[serde(default)]
    pin_failures: u32,
}

impl StoredRecord {
    fn from_record(initialized: bool, record: &CredentialRecord) -> Self {
        Self {
            version: FORMAT_VERSION,
            initialized,
            device_salt: hex::encode(record.device_salt),
            pin_digest: record.pin_digest.map(hex::encode),
            wipe_code_digest: record.wipe_code_digest.map(hex::encode),
            pin_failures: record.pin_failures,
        }
    }

    fn into_record(self) -> Result<(bool, CredentialRecord), StorageError> {
        if self.version != FORMAT_VERSION {
            return Err(StorageError::Corrupt {
                reason: format!("unsupported format version {}", self.version),
            });
        }

        let mut record = CredentialRecord::new(decode_digest("device_salt", &self.device_salt)?);
        record.pin_digest = self
            .pin_digest
            .as_deref()
            .map(|value| decode_digest("pin_digest", value))
            .transpose()?;
        record.wipe_code_digest = self
            .wipe_code_digest
            .as_deref()
            .map(|value| decode_digest("wipe_code_digest", value))
            .transpose()?;
        record.pin_failures = self.pin_failures;

        Ok((self.initialized, record))
    }
}

fn decode_digest(field: &str, value: &str) -> Result<[u8; 32], StorageError> {
    <[u8; 32]>::from_hex(value).map_err(|e| StorageError::Corrupt {
        reason: format!("{field}: {e}"),
    })
}

/// Write `stored` to `path` through a synced temporary file and a rename
fn write_atomically(path: &Path, stored: &StoredRecord) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::Builder::new()
        .prefix(".wipeguard")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    serde_json::to_writer_pretty(temp_file.as_file_mut(), stored)?;
    temp_file.as_file_mut().write_all(b"\n")?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Sibling file guarding the store
///
/// The store file itself is replaced on every commit, so it cannot carry
/// the lock.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock(path: &Path) -> std::io::Result<RwLock<File>> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path(path))?;
    Ok(RwLock::new(file))
}

fn read_record(path: &Path) -> WipeguardResult<(bool, CredentialRecord)> {
    let bytes = fs::read(path)?;
    let stored: StoredRecord = serde_json::from_slice(&bytes).map_err(StorageError::from)?;
    Ok(stored.into_record()?)
}

fn read_shared(path: &Path) -> WipeguardResult<(bool, CredentialRecord)> {
    let lock = open_lock(path)?;
    let _guard = lock.read()?;
    read_record(path)
}

/// Credential store kept in a JSON file
///
/// The file is the source of truth. Queries read it under a shared lock and
/// every mutation re-reads it under an exclusive lock before writing, so
/// several handles on one path never undo each other's commits. The cached
/// record is only used when the file cannot be read.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    initialized: bool,
    record: CredentialRecord,
}

impl FileStore {
    /// Initialize a new device store protected by `pin`
    ///
    /// An empty `pin` creates a device without a PIN. Fails if `path`
    /// already exists.
    pub fn create(
        path: impl Into<PathBuf>,
        pin: &SecretValue,
        salt: &Salt,
    ) -> WipeguardResult<Self> {
        let path = path.into();
        let mut lock = open_lock(&path)?;
        let _guard = lock.write()?;

        if path.exists() {
            return Err(StorageError::AlreadyExists {
                path: path.display().to_string(),
            }
            .into());
        }

        let record = CredentialRecord::with_pin(CredentialRecord::random_device_salt(), pin, salt);
        write_atomically(&path, &StoredRecord::from_record(true, &record))?;
        info!(path = %path.display(), has_pin = record.has_pin(), "Created credential store");

        Ok(Self {
            path,
            initialized: true,
            record,
        })
    }

    /// Load an existing store
    pub fn open(path: impl Into<PathBuf>) -> WipeguardResult<Self> {
        let path = path.into();
        let (initialized, record) = read_shared(&path)?;
        debug!(path = %path.display(), ?record, "Opened credential store");

        Ok(Self {
            path,
            initialized,
            record,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn wipe_code_matches(&self, code: &SecretValue) -> bool {
        self.with_current(|_, record| record.wipe_code_matches(code))
    }

    /// Evaluate `f` against the on-disk state
    fn with_current<R>(&self, f: impl FnOnce(bool, &CredentialRecord) -> R) -> R {
        match read_shared(&self.path) {
            Ok((initialized, record)) => f(initialized, &record),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Using cached credential state");
                f(self.initialized, &self.record)
            }
        }
    }

    /// Re-read the record under an exclusive lock and write back `f`'s result
    ///
    /// Nothing is written if the file cannot be read.
    fn update(
        &mut self,
        f: impl FnOnce(&CredentialRecord) -> CredentialRecord,
    ) -> WipeguardResult<()> {
        let mut lock = open_lock(&self.path)?;
        let _guard = lock.write()?;

        let (initialized, current) = read_record(&self.path)?;
        let next = f(&current);
        self.initialized = initialized;
        self.record = current;

        write_atomically(&self.path, &StoredRecord::from_record(initialized, &next))?;
        self.record = next;
        Ok(())
    }
}

impl SecurityStateStore for FileStore {
    fn is_initialized(&self) -> bool {
        self.with_current(|initialized, _| initialized)
    }

    fn has_pin(&self) -> bool {
        self.with_current(|_, record| record.has_pin())
    }

    fn has_wipe_code(&self) -> bool {
        self.with_current(|_, record| record.has_wipe_code())
    }

    fn check_pin(&mut self, pin: &SecretValue, salt: &Salt) -> bool {
        let mut verdict = None;
        let result = self.update(|record| {
            let matches = record.pin_matches(pin, salt);
            verdict = Some(matches);
            let mut next = record.clone();
            next.record_pin_attempt(matches);
            next
        });

        // The verdict stands even if the counter cannot be written.
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist PIN attempt counter");
        }
        verdict.unwrap_or(false)
    }

    fn change_wipe_code(
        &mut self,
        pin: &SecretValue,
        salt: &Salt,
        new_wipe_code: &SecretValue,
    ) -> CommitOutcome {
        let mut authorized = None;
        let result = self.update(|record| {
            let granted = record.authorizes(pin, salt);
            authorized = Some(granted);
            let mut next = if granted {
                record.with_wipe_code(new_wipe_code)
            } else {
                record.clone()
            };
            if next.has_pin() {
                next.record_pin_attempt(granted);
            }
            next
        });

        match (result, authorized) {
            (Ok(()), Some(true)) => {
                debug!(has_wipe_code = self.record.has_wipe_code(), "Wipe code committed");
                CommitOutcome::Committed
            }
            (Ok(()), _) => CommitOutcome::Unauthorized,
            (Err(e), Some(false)) => {
                warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to persist PIN attempt counter"
                );
                CommitOutcome::Unauthorized
            }
            (Err(e), _) => {
                warn!(error = %e, path = %self.path.display(), "Credential write failed");
                CommitOutcome::StorageFault
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::error::WipeguardError;
    use crate::ports::contract_tests::store_contract;
    use tempfile::TempDir;

    /// Store in a directory that outlives the test body
    fn contract_store() -> FileStore {
        let dir = tempfile::tempdir().unwrap().keep();
        FileStore::create(
            dir.join("device.json"),
            &SecretValue::from_str(store_contract::CONTRACT_PIN),
            &Salt::empty(),
        )
        .unwrap()
    }

    contract_tests_for!(
        file_store_contract,
        make = contract_store,
        tests = {
            test_fresh_store_state => store_contract::test_fresh_store_state,
            test_check_pin_success => store_contract::test_check_pin_success,
            test_check_pin_failure => store_contract::test_check_pin_failure,
            test_check_pin_is_salted => store_contract::test_check_pin_is_salted,
            test_set_wipe_code => store_contract::test_set_wipe_code,
            test_remove_wipe_code => store_contract::test_remove_wipe_code,
            test_unauthorized_change_leaves_state => store_contract::test_unauthorized_change_leaves_state,
        }
    );

    fn pin() -> SecretValue {
        SecretValue::from_str("1234")
    }

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::create(dir.path().join("device.json"), &pin(), &Salt::empty()).unwrap()
    }

    #[test]
    fn test_commit_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let outcome =
            store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5678"));
        assert!(outcome.is_committed());

        let reopened = FileStore::open(store.path()).unwrap();
        assert!(reopened.is_initialized());
        assert!(reopened.has_pin());
        assert!(reopened.has_wipe_code());
        assert!(reopened.wipe_code_matches(&SecretValue::from_str("5678")));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let result = FileStore::create(store.path(), &pin(), &Salt::empty());

        assert!(matches!(
            result,
            Err(WipeguardError::Storage(StorageError::AlreadyExists { .. }))
        ));
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(store
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5678"))
            .is_committed());

        // A non-empty directory at the target path makes the rename fail.
        fs::remove_file(store.path()).unwrap();
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("blocker"), b"x").unwrap();

        let outcome = store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::empty());

        assert_eq!(outcome, CommitOutcome::StorageFault);
        assert!(store.has_wipe_code());
        assert!(store.wipe_code_matches(&SecretValue::from_str("5678")));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("42"));
        store.check_pin(&SecretValue::from_str("0000"), &Salt::empty());

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["device.json", "device.json.lock"]);
    }

    #[test]
    fn test_failed_pin_on_stale_handle_keeps_newer_wipe_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = store_in(&dir);
        let mut second = FileStore::open(first.path()).unwrap();

        assert!(second
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5678"))
            .is_committed());
        assert!(!first.check_pin(&SecretValue::from_str("0000"), &Salt::empty()));

        let reopened = FileStore::open(first.path()).unwrap();
        assert!(reopened.has_wipe_code());
        assert!(reopened.wipe_code_matches(&SecretValue::from_str("5678")));
    }

    #[test]
    fn test_unauthorized_commit_on_stale_handle_keeps_newer_wipe_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = store_in(&dir);
        let mut second = FileStore::open(first.path()).unwrap();

        assert!(second
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5678"))
            .is_committed());
        let outcome = first.change_wipe_code(
            &SecretValue::from_str("0000"),
            &Salt::empty(),
            &SecretValue::from_str("1111"),
        );

        assert_eq!(outcome, CommitOutcome::Unauthorized);
        assert!(second.wipe_code_matches(&SecretValue::from_str("5678")));
    }

    #[test]
    fn test_handles_see_each_others_commits() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = store_in(&dir);
        let mut second = FileStore::open(first.path()).unwrap();

        assert!(second
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5678"))
            .is_committed());
        assert!(first.has_wipe_code());

        assert!(first
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::empty())
            .is_committed());
        assert!(!second.has_wipe_code());
    }

    #[test]
    fn test_concurrent_commits_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_in(&dir).path().to_path_buf();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut store = FileStore::open(&path).unwrap();
                    for _ in 0..5 {
                        store.check_pin(&SecretValue::from_str(&format!("000{i}")), &Salt::empty());
                    }
                })
            })
            .collect();
        let mut store = FileStore::open(&path).unwrap();
        assert!(store
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5678"))
            .is_committed());
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(FileStore::open(&path)
            .unwrap()
            .wipe_code_matches(&SecretValue::from_str("5678")));
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        fs::write(&path, b"not json").unwrap();

        let result = FileStore::open(&path);

        assert!(matches!(
            result,
            Err(WipeguardError::Storage(StorageError::Serialization(_)))
        ));
    }

    #[test]
    fn test_open_rejects_bad_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        fs::write(
            &path,
            br#"{"version":1,"initialized":true,"device_salt":"abcd","pin_digest":null,"wipe_code_digest":null}"#,
        )
        .unwrap();

        let result = FileStore::open(&path);

        assert!(matches!(
            result,
            Err(WipeguardError::Storage(StorageError::Corrupt { .. }))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileStore::open(dir.path().join("absent.json"));
        assert!(matches!(result, Err(WipeguardError::Storage(StorageError::Io(_)))));
    }

    #[test]
    fn test_store_file_holds_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("97531"));

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(!content.contains("97531"));
        assert!(content.contains("\"version\": 1"));
    }
}
