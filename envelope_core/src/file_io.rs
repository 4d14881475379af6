//! # File I/O Module
//!
//! Session persistence on disk:
//! - **Atomic saves**: write to `.tmp`, sync, rename over the target
//! - **File locking**: a `.lock` sidecar with holder metadata plus an fs2 OS lock
//! - **Version validation**: the schema version is checked on load
//!
//! Sessions are stored as `<key>.session.json`; the lock for a file sits
//! next to it as `<key>.session.json.lock`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use envelope_core::file_io::{load_session, save_session, FileLock};
//! use envelope_core::session::Session;
//! use std::path::Path;
//!
//! let session = Session::new("jdoe");
//! let path = Path::new("jdoe.session.json");
//!
//! let lock = FileLock::acquire(path, "jdoe")?;
//! save_session(&session, path)?;
//! drop(lock);
//!
//! let loaded = load_session(path)?;
//! assert_eq!(loaded.meta.id, session.meta.id);
//! # Ok::<(), envelope_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::session::{Session, SessionStore, SCHEMA_VERSION};

/// Extension of session files written by [`FileSessionStore`]
pub const SESSION_EXTENSION: &str = "session.json";

/// Lock file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User or service holding the lock
    pub user_id: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Exclusive lock on a session file, released on drop.
///
/// The fs2 OS lock on the sidecar decides who holds the file; [`LockInfo`]
/// is written into it so a refused caller can see who has it. A sidecar
/// left behind by a dead process carries no OS lock and is taken over.
pub struct FileLock {
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`, or fail with `FileLocked`.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        if lock_file.try_lock_exclusive().is_err() {
            let holder = read_holder(&mut lock_file);
            return Err(match holder {
                Some(existing) => CalcError::file_locked(
                    path.display().to_string(),
                    format!("{} (pid {})", existing.user_id, existing.pid),
                    existing.locked_at.to_rfc3339(),
                ),
                None => CalcError::file_locked(path.display().to_string(), "another process", "unknown"),
            });
        }

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        let write_error =
            |e: std::io::Error| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string());
        lock_file.set_len(0).map_err(write_error)?;
        lock_file.write_all(lock_json.as_bytes()).map_err(write_error)?;
        lock_file.sync_all().map_err(write_error)?;

        log::debug!("acquired lock {} for {}", lock_path.display(), info.user_id);

        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Lock sidecar path: `x.session.json` -> `x.session.json.lock`
pub fn lock_path_for(session_path: &Path) -> PathBuf {
    let mut lock_path = session_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Holder metadata from a sidecar someone else has locked; unreadable is None
fn read_holder(lock_file: &mut File) -> Option<LockInfo> {
    let mut contents = String::new();
    lock_file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Save a session with atomic write semantics.
///
/// Serializes to a sibling `.tmp` file, syncs it, then renames it over `path`.
pub fn save_session(session: &Session, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(session).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    log::debug!("saved session {} to {}", session.meta.id, path.display());
    Ok(())
}

/// Load a session and check its schema version.
///
/// # Errors
///
/// * `FileError` - I/O failure
/// * `SerializationError` - invalid JSON
/// * `VersionMismatch` - incompatible schema version
pub fn load_session(path: &Path) -> CalcResult<Session> {
    let contents = read_to_string(path, "read")?;

    let session: Session = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&session.meta.version)?;

    Ok(session)
}

/// Major versions must match; for 0.x schemas the file's minor version must
/// not be newer than ours.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

/// Directory-backed [`SessionStore`]: one `<key>.session.json` per key.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
    user_id: String,
}

impl FileSessionStore {
    /// Store rooted at `dir`; `user_id` is recorded in the locks it takes.
    pub fn new(dir: impl Into<PathBuf>, user_id: impl Into<String>) -> CalcResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CalcError::file_error("create directory", dir.display().to_string(), e.to_string()))?;
        Ok(FileSessionStore {
            dir,
            user_id: user_id.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a key
    pub fn path_for(&self, key: &str) -> CalcResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
            && !key.starts_with('.');
        if !valid {
            return Err(CalcError::invalid_input(
                "key",
                key,
                "Session keys may only contain letters, digits, '-', '_', '.', '@' and must not start with '.'",
            ));
        }
        Ok(self.dir.join(format!("{}.{}", key, SESSION_EXTENSION)))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> CalcResult<Option<Session>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        load_session(&path).map(Some)
    }

    fn set(&self, key: &str, session: &Session) -> CalcResult<()> {
        let path = self.path_for(key)?;
        let _lock = FileLock::acquire(&path, self.user_id.clone())?;
        save_session(session, &path)
    }

    fn remove(&self, key: &str) -> CalcResult<bool> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(false);
        }
        let _lock = FileLock::acquire(&path, self.user_id.clone())?;
        fs::remove_file(&path)
            .map_err(|e| CalcError::file_error("remove", path.display().to_string(), e.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_session_path(name: &str) -> PathBuf {
        temp_dir().join(format!("envelope_test_{}.{}", name, SESSION_EXTENSION))
    }

    fn temp_store_dir(name: &str) -> PathBuf {
        temp_dir().join(format!("envelope_store_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/path/to/jdoe.session.json"));
        assert_eq!(lock_path, Path::new("/path/to/jdoe.session.json.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("jdoe");
        assert_eq!(info.user_id, "jdoe");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_leftover_lock_is_taken_over() {
        let path = temp_session_path("leftover");
        let lock_path = lock_path_for(&path);
        let mut leftover = LockInfo::new("crashed");
        leftover.pid = 0;
        fs::write(&lock_path, serde_json::to_string(&leftover).unwrap()).unwrap();

        let lock = FileLock::acquire(&path, "jdoe").unwrap();
        let written: LockInfo = serde_json::from_str(&fs::read_to_string(&lock_path).unwrap()).unwrap();
        assert_eq!(written.user_id, "jdoe");
        assert_eq!(written.pid, std::process::id());

        drop(lock);
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_session_path("roundtrip");
        let session = Session::new("jdoe");
        save_session(&session, &path).unwrap();

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded, session);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_session_path("atomic");
        let tmp_path = path.with_extension("json.tmp");

        save_session(&Session::new("jdoe"), &path).unwrap();
        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_session_path("lock_test");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "jdoe").unwrap();
        assert_eq!(lock.info.user_id, "jdoe");
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        // Held by this live process
        let err = FileLock::acquire(&path, "other").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.is_recoverable());
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_session_path("newer");
        let mut session = Session::new("jdoe");
        session.meta.version = "0.9.0".to_string();
        save_session(&session, &path).unwrap();

        let err = load_session(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_session_store() {
        let dir = temp_store_dir("crud");
        let store = FileSessionStore::new(&dir, "api").unwrap();

        assert!(store.get("jdoe").unwrap().is_none());
        let session = Session::new("jdoe");
        store.set("jdoe", &session).unwrap();
        assert!(dir.join("jdoe.session.json").exists());
        assert!(!dir.join("jdoe.session.json.lock").exists());
        assert_eq!(store.get("jdoe").unwrap().unwrap(), session);

        assert!(store.remove("jdoe").unwrap());
        assert!(!store.remove("jdoe").unwrap());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = temp_store_dir("keys");
        let store = FileSessionStore::new(&dir, "api").unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.path_for(key).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
        assert!(store.path_for("j.doe@example.com").is_ok());
        let _ = fs::remove_dir_all(&dir);
    }
}
