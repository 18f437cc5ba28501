use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::{Credentials, SessionStore};
use crate::error::{ApiError, ApiResult};

/// Credentials persisted as a small JSON document on disk.
///
/// The file is read once on open; writes go through to disk before the
/// in-memory copy is replaced.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cached: RwLock<Credentials>,
}

impl FileSessionStore {
    pub fn open(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cached = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Credentials::default(),
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable session file"
                );
                Credentials::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Credentials::default(),
            Err(e) => {
                return Err(ApiError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, credentials: &Credentials) -> ApiResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json)
            .map_err(|e| ApiError::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Credentials {
        self.cached
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credentials: Credentials) -> ApiResult<()> {
        self.persist(&credentials)?;
        *self
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = credentials;
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ApiError::Storage(format!(
                    "Failed to remove {}: {}",
                    self.path.display(),
                    e
                )))
            }
        }
        *self
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Credentials::default();
        Ok(())
    }
}
