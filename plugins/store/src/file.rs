//! Group-file backend
//!
//! Every group is a pretty-printed JSON object of string values stored in
//! `<storage dir>/<group>.json`.

use crate::{AppName, KeyValueStore, StoreError};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Load a group file
///
/// A missing or empty file is an empty group.
async fn load_group(path: &Path) -> Result<HashMap<String, String>, StoreError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Sibling file a group is written to before it replaces the group file
fn staging_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Save a group file, creating the storage directory on demand
///
/// The contents go to a staging file that is then renamed over the group
/// file, so readers and crashes see either the old or the new group.
async fn save_group(path: &Path, data: &HashMap<String, String>) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let contents = serde_json::to_string_pretty(data).map_err(StoreError::Serialize)?;
    let staging = staging_path(path);
    fs::write(&staging, contents)
        .await
        .map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
    fs::rename(&staging, path).await.map_err(io_error)?;

    debug!(path = %path.display(), entries = data.len(), "group saved");
    Ok(())
}

/// Key-value store persisted as one JSON file per group
///
/// Clones share the same write lock, so read-modify-write cycles issued
/// through any clone never interleave.
///
/// # Example
///
/// ```ignore
/// use iced_kv_store::{AppName, FileStore, KeyValueStore};
///
/// async fn remember_theme() -> Result<(), iced_kv_store::StoreError> {
///     let store = FileStore::new(&AppName::new("com", "example", "myapp"), "settings");
///     store.set("theme", "\"dark\"".to_string()).await
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Store for `group` under the application's platform storage directory
    pub fn new(app_name: &AppName, group: &str) -> Self {
        Self::in_dir(app_name.storage_dir(), group)
    }

    /// Store for `group` under an explicit directory
    pub fn in_dir(dir: impl AsRef<Path>, group: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{group}.json")),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing group file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the group, apply `modifier` and save it back if it reports a change
    async fn modify<F>(&self, modifier: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut HashMap<String, String>) -> bool,
    {
        let _guard = self.write_lock.lock().await;

        let mut data = load_group(&self.path).await?;
        let modified = modifier(&mut data);

        if modified {
            save_group(&self.path, &data).await?;
        }

        Ok(modified)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut data = load_group(&self.path).await?;
        Ok(data.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.modify(|data| {
            data.insert(key.to_string(), value);
            true
        })
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.modify(|data| data.remove(key).is_some()).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        save_group(&self.path, &HashMap::new()).await
    }
}
