//! Key/value persistence for the configuration document.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use super::document::CompanionConfig;
use super::error::ConfigError;

/// Storage for the configuration document.
///
/// The pipeline only ever reads; `set` is used by the configuration handoff.
pub trait ConfigStore: Send + Sync {
    /// Load the current document, or `None` if the user never configured
    /// the app.
    fn get(&self) -> Result<Option<CompanionConfig>, ConfigError>;

    /// Replace the stored document.
    fn set(&self, config: &CompanionConfig) -> Result<(), ConfigError>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Result<Option<CompanionConfig>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No config file");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        // An empty file is what a cleared key looks like
        if contents.trim().is_empty() {
            return Ok(None);
        }

        CompanionConfig::from_json(&contents).map(Some)
    }

    /// Creates parent directories if they don't exist.
    fn set(&self, config: &CompanionConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(config).map_err(|e| ConfigError::Invalid {
            message: format!("failed to serialize config: {e}"),
        })?;

        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(
            path = %self.path.display(),
            favourites = config.favourites.len(),
            "Saved config"
        );
        Ok(())
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: RwLock<Option<CompanionConfig>>,
}

impl MemoryConfigStore {
    /// Create an empty (unconfigured) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a document.
    pub fn with_config(config: CompanionConfig) -> Self {
        Self {
            inner: RwLock::new(Some(config)),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> Result<Option<CompanionConfig>, ConfigError> {
        let guard = self.inner.read().map_err(|_| ConfigError::Invalid {
            message: "config lock poisoned".to_string(),
        })?;
        Ok(guard.clone())
    }

    fn set(&self, config: &CompanionConfig) -> Result<(), ConfigError> {
        let mut guard = self.inner.write().map_err(|_| ConfigError::Invalid {
            message: "config lock poisoned".to_string(),
        })?;
        *guard = Some(config.clone());
        Ok(())
    }
}
