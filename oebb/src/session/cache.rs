//! Disk cache for session credentials.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::CredentialBundle;

/// Cache location relative to the user's cache directory.
const CACHE_FILE: &str = "oebb-cli/auth.json";

/// Errors writing the credential cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No cache directory could be determined for this platform
    #[error("no cache directory available")]
    NoCacheDir,

    /// Filesystem operation failed
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize credentials
    #[error("failed to serialize credentials: {0}")]
    Json(#[from] serde_json::Error),
}

/// Disk cache for a single credential bundle.
///
/// Validity is judged from the file's modification time plus the bundle's
/// lifetime, so a bundle written by an earlier run keeps its original expiry.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    /// Create a cache backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a cache in the platform cache directory
    /// (e.g. `~/.cache/oebb-cli/auth.json`).
    pub fn in_user_cache_dir() -> Result<Self, CacheError> {
        let dir = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(Self::new(dir.join(CACHE_FILE)))
    }

    /// Try to load unexpired credentials.
    ///
    /// Returns `None` if the cache doesn't exist, is invalid, or has expired.
    pub fn load(&self) -> Option<CredentialBundle> {
        self.load_at(Utc::now())
    }

    fn load_at(&self, now: DateTime<Utc>) -> Option<CredentialBundle> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let mut bundle: CredentialBundle = serde_json::from_str(&contents).ok()?;

        let modified: SystemTime = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        bundle.issued_at = DateTime::<Utc>::from(modified);

        if bundle.is_expired_at(now) {
            debug!(path = %self.path.display(), "cached credentials expired");
            return None;
        }

        Some(bundle)
    }

    /// Save credentials, creating parent directories if needed.
    ///
    /// On Unix the file is readable by its owner only.
    pub fn store(&self, bundle: &CredentialBundle) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string(bundle)?;
        write_private(&self.path, json.as_bytes()).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "stored credentials");
        Ok(())
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn bundle(expires_in_secs: u64) -> CredentialBundle {
        CredentialBundle {
            access_token: "tok".into(),
            channel: "inet".into(),
            session_id: "sess".into(),
            support_id: "sup".into(),
            expires_in_secs,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn store_and_load() {
        let dir = tempdir().unwrap();
        let cache = CredentialCache::new(dir.path().join("auth.json"));

        cache.store(&bundle(1800)).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.session_id, "sess");
        assert_eq!(loaded.expires_in_secs, 1800);
    }

    #[test]
    fn expiry_uses_file_modification_time() {
        let dir = tempdir().unwrap();
        let cache = CredentialCache::new(dir.path().join("auth.json"));
        cache.store(&bundle(600)).unwrap();

        let now = Utc::now();
        assert!(cache.load_at(now).is_some());
        assert!(cache.load_at(now + Duration::seconds(601)).is_none());
    }

    #[test]
    fn zero_lifetime_is_never_loaded() {
        let dir = tempdir().unwrap();
        let cache = CredentialCache::new(dir.path().join("auth.json"));

        cache.store(&bundle(0)).unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn missing_cache_returns_none() {
        let cache = CredentialCache::new("/nonexistent/path/auth.json");
        assert!(cache.load().is_none());
    }

    #[test]
    fn corrupt_cache_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(CredentialCache::new(&path).load().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("oebb-cli").join("auth.json");
        let cache = CredentialCache::new(&path);

        cache.store(&bundle(60)).unwrap();
        assert!(path.exists());
        assert_eq!(cache.path(), path);
    }

    #[cfg(unix)]
    #[test]
    fn cache_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        CredentialCache::new(&path).store(&bundle(60)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
