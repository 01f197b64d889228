use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
};

use crate::{error::Result, task::Task};

pub const STORAGE_KEY: &str = "taskflow.tasks";

/// String key-value storage the board persists into.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Memory storage whose writes can be switched to fail.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: std::rc::Rc<std::cell::Cell<bool>>,
}

#[cfg(test)]
impl FlakyStorage {
    /// Shared switch; `true` makes every later `set` fail.
    pub(crate) fn write_switch(&self) -> std::rc::Rc<std::cell::Cell<bool>> {
        self.fail_writes.clone()
    }
}

#[cfg(test)]
impl Storage for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::other("disk full").into());
        }
        self.inner.set(key, value)
    }
}

/// Reads and writes the whole task collection under a single key.
#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
    key: String,
}

impl<S: Storage> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Absent, unreadable or malformed content all load as an empty collection.
    pub fn load(&self) -> Vec<Task> {
        let data = match self.storage.get(&self.key) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, "Failed to read tasks: {err}");
                return Vec::new();
            }
        };
        serde_json::from_str(&data).unwrap_or_else(|err| {
            tracing::warn!(key = %self.key, "Discarding malformed tasks: {err}");
            Vec::new()
        })
    }

    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let data = serde_json::to_string_pretty(tasks)?;
        self.storage.set(&self.key, &data)?;
        tracing::debug!(key = %self.key, count = tasks.len(), "Saved tasks");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }
}
