use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::StorageError;

/// Pretty JSON written to a sibling temp file, then renamed over `path`.
pub(crate) fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

/// Loads `path`, substituting `default()` when the file is missing or
/// unparsable. Unparsable bytes are archived under `backups` first, and the
/// default is written back so the next load is clean. Never fails.
pub(crate) fn load_or_recover<T, F>(path: &Path, backups: &Path, default: F) -> T
where
    T: DeserializeOwned + Serialize,
    F: Fn() -> T,
{
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let value = default();
            if let Err(e) = save_json(path, &value) {
                warn!(path = %path.display(), error = %e, "Could not write default file");
            }
            return value;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read file; using defaults");
            return default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(parse_error) => {
            match backup_bytes(path, backups, &bytes) {
                Ok(backup) => warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %parse_error,
                    "Corrupt file archived; resetting to defaults"
                ),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupt file could not be archived; resetting to defaults"
                ),
            }
            let value = default();
            if let Err(e) = save_json(path, &value) {
                warn!(path = %path.display(), error = %e, "Could not reset corrupt file");
            }
            value
        }
    }
}

fn backup_bytes(path: &Path, backups: &Path, bytes: &[u8]) -> Result<PathBuf, StorageError> {
    std::fs::create_dir_all(backups)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let target = unused_path(backups, &stem, "bak");
    std::fs::write(&target, bytes)?;
    info!(backup = %target.display(), "Wrote backup");
    Ok(target)
}

/// `<dir>/<stem>-<local ts>.<ext>`, with a `-N` suffix when files from the
/// same second already exist.
pub(crate) fn unused_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let mut target = dir.join(format!("{stem}-{ts}.{ext}"));
    let mut n = 1;
    while target.exists() {
        target = dir.join(format!("{stem}-{ts}-{n}.{ext}"));
        n += 1;
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        save_json(&path, &vec![1, 2, 3]).unwrap();
        save_json(&path, &vec![4]).unwrap();
        let back: Vec<i32> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, vec![4]);
        // only the target remains; the temp file was renamed away
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_file_is_created_with_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.json");
        let value: Vec<u32> = load_or_recover(&path, &dir.path().join("backups"), || vec![7]);
        assert_eq!(value, vec![7]);
        assert!(path.exists());
    }

    #[test]
    fn repeated_corruption_gets_distinct_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.json");
        let backups = dir.path().join("backups");
        for _ in 0..2 {
            std::fs::write(&path, b"{{{").unwrap();
            let value: Vec<u32> = load_or_recover(&path, &backups, Vec::new);
            assert!(value.is_empty());
        }
        assert_eq!(std::fs::read_dir(&backups).unwrap().count(), 2);
    }
}
