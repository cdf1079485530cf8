//! Run-scoped intermediate storage
//!
//! Stages hand large payloads to each other through JSON files in a work
//! directory. Every file name carries the run id, so concurrent runs never
//! share files and one run's leftovers can be removed without touching
//! another's.
//!
//! A [`StorageHandle`] is not `Clone` and [`BatchStore::release`] takes it by
//! value, so each file is released at most once.

use crate::core::verification::calculate_checksum_bytes;
use crate::domain::{EtlError, Result, RunId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const LISTING_PREFIX: &str = "animals_";
const BATCH_PREFIX: &str = "load_batch_";

/// File name of the extract stage handoff
pub fn listing_file_name(run_id: &RunId) -> String {
    format!("{LISTING_PREFIX}{run_id}.json")
}

/// File name of one load batch
pub fn batch_file_name(batch_index: usize, run_id: &RunId) -> String {
    format!("{BATCH_PREFIX}{batch_index}_{run_id}.json")
}

/// Owned reference to one stored payload
#[derive(Debug, PartialEq, Eq)]
pub struct StorageHandle {
    path: PathBuf,
}

impl StorageHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Directory-backed payload store
#[derive(Debug, Clone)]
pub struct BatchStore {
    root: PathBuf,
}

impl BatchStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            EtlError::StorageIo(format!(
                "Failed to create work directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serialize `value` as JSON into `name`
    ///
    /// Returns the handle and the SHA-256 of the bytes written.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(StorageHandle, String)> {
        let payload = serde_json::to_vec(value)?;
        let path = self.root.join(name);

        fs::write(&path, &payload).map_err(|e| {
            EtlError::StorageIo(format!("Failed to write {}: {e}", path.display()))
        })?;

        let checksum = calculate_checksum_bytes(&payload);
        tracing::debug!(
            path = %path.display(),
            bytes = payload.len(),
            "Stored payload"
        );

        Ok((StorageHandle { path }, checksum))
    }

    /// Read the raw bytes behind a handle
    pub fn read_bytes(&self, handle: &StorageHandle) -> Result<Vec<u8>> {
        fs::read(&handle.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                EtlError::StorageIo(format!("Payload {handle} does not exist"))
            }
            _ => EtlError::StorageIo(format!("Failed to read {handle}: {e}")),
        })
    }

    /// Read and deserialize the payload behind a handle
    ///
    /// # Errors
    ///
    /// [`EtlError::StorageIo`] if the file is missing or its content does
    /// not deserialize.
    pub fn read_json<T: DeserializeOwned>(&self, handle: &StorageHandle) -> Result<T> {
        let bytes = self.read_bytes(handle)?;
        decode(handle, &bytes)
    }

    /// Delete the payload behind a handle
    ///
    /// Failures are logged and otherwise ignored.
    pub fn release(&self, handle: StorageHandle) {
        match fs::remove_file(&handle.path) {
            Ok(()) => tracing::debug!(path = %handle, "Released payload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %handle, "Payload already gone")
            }
            Err(e) => tracing::warn!(path = %handle, error = %e, "Failed to delete payload"),
        }
    }

    /// Remove every file left behind by `run_id`
    ///
    /// Returns the number of files removed.
    pub fn cleanup_run(&self, run_id: &RunId) -> usize {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.root.display(),
                    error = %e,
                    "Failed to list work directory"
                );
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            if !belongs_to_run(name, run_id) {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(file = name, error = %e, "Failed to remove leftover file"),
            }
        }

        if removed > 0 {
            tracing::info!(run_id = %run_id, removed = removed, "Cleaned up intermediate files");
        }

        removed
    }
}

/// Deserialize bytes read from `handle`
pub(crate) fn decode<T: DeserializeOwned>(handle: &StorageHandle, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| EtlError::StorageIo(format!("Payload {handle} is corrupt: {e}")))
}

fn belongs_to_run(name: &str, run_id: &RunId) -> bool {
    if name == listing_file_name(run_id) {
        return true;
    }

    let suffix = format!("_{run_id}.json");
    name.strip_prefix(BATCH_PREFIX)
        .and_then(|rest| rest.strip_suffix(suffix.as_str()))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use tempfile::TempDir;

    fn store() -> (TempDir, BatchStore) {
        let dir = TempDir::new().unwrap();
        let store = BatchStore::new(dir.path().join("work")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_write_read_release() {
        let (_dir, store) = store();
        let (handle, checksum) = store.write_json("payload.json", &json!([1, 2, 3])).unwrap();

        assert_eq!(checksum.len(), 64);
        let value: Value = store.read_json(&handle).unwrap();
        assert_eq!(value, json!([1, 2, 3]));

        let path = handle.path().to_path_buf();
        store.release(handle);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_payload_is_storage_error() {
        let (_dir, store) = store();
        let (handle, _) = store.write_json("gone.json", &json!({})).unwrap();
        fs::remove_file(handle.path()).unwrap();

        let result: Result<Value> = store.read_json(&handle);
        assert!(matches!(result, Err(EtlError::StorageIo(_))));

        // Releasing a file that is already gone is not an error
        store.release(handle);
    }

    #[test]
    fn test_corrupt_payload_is_storage_error() {
        let (_dir, store) = store();
        let (handle, _) = store.write_json("corrupt.json", &json!([1])).unwrap();
        fs::write(handle.path(), b"{not json").unwrap();

        let result: Result<Vec<u32>> = store.read_json(&handle);
        match result {
            Err(EtlError::StorageIo(msg)) => assert!(msg.contains("corrupt")),
            other => panic!("Expected StorageIo error, got {other:?}"),
        }
    }

    #[test]
    fn test_cleanup_only_touches_own_run() {
        let (_dir, store) = store();
        let run = RunId::from_str("1").unwrap();
        let other = RunId::from_str("x_1").unwrap();

        store.write_json(&listing_file_name(&run), &json!([])).unwrap();
        store.write_json(&batch_file_name(0, &run), &json!([])).unwrap();
        store.write_json(&batch_file_name(12, &run), &json!([])).unwrap();
        store.write_json(&batch_file_name(0, &other), &json!([])).unwrap();
        store.write_json(&listing_file_name(&other), &json!([])).unwrap();
        store.write_json("unrelated.json", &json!([])).unwrap();

        assert_eq!(store.cleanup_run(&run), 3);
        assert_eq!(store.cleanup_run(&run), 0);
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 3);
    }

    #[test]
    fn test_file_names() {
        let run = RunId::from_str("run-7").unwrap();
        assert_eq!(listing_file_name(&run), "animals_run-7.json");
        assert_eq!(batch_file_name(3, &run), "load_batch_3_run-7.json");
    }
}
