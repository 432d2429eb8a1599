//! Local persisted state: the display name and the last known session id.
//!
//! Both are plain key-value entries that survive a restart. They are read
//! once at startup into a [`LocalState`], written on change and cleared on
//! sign-out.

use crate::errors::{AppError, AppResult};
use crate::models::SessionId;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_DISPLAY_NAME: &str = "display_name";
pub const KEY_ACTIVE_SESSION: &str = "active_session";

pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&mut self, key: &str) -> AppResult<()>;
}

/// YAML file store (`state.yml` next to the config file).
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Load the store; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&content).map_err(|e| {
                    AppError::Config(format!("corrupt state file {}: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    fn flush(&self) -> AppResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(&self.entries)
            .map_err(|e| AppError::Config(format!("cannot serialize state: {e}")))?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Volatile store, for tests and `--test` runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Snapshot of the persisted identity, read at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalState {
    pub display_name: Option<String>,
    pub active_session: Option<SessionId>,
}

impl LocalState {
    pub fn load(store: &dyn StateStore) -> Self {
        Self {
            display_name: store
                .get(KEY_DISPLAY_NAME)
                .filter(|n| !n.trim().is_empty()),
            active_session: store
                .get(KEY_ACTIVE_SESSION)
                .filter(|s| !s.trim().is_empty())
                .map(SessionId::new),
        }
    }
}
