//! Persists configuration changes.
//!
//! Every update re-reads the file, replaces or appends exactly one list
//! entry (or the `current-context` key) and writes the whole tree back.
//! Unknown keys and all other entries, secrets included, are written back
//! verbatim. Writes go to a sibling temporary file that is renamed over the
//! target. There is no locking; concurrent writers race and the last one wins.

use crate::core::domain::{
    error::{ConfigError, ConfigResult},
    model::{
        cluster::Cluster,
        config_document::{CLUSTERS_KEY, CONTEXTS_KEY, CURRENT_CONTEXT_KEY, USERS_KEY},
        context::Context,
        user::User,
    },
};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Owner read/write only.
pub const FILE_MODE: u32 = 0o600;
/// Owner only.
pub const DIR_MODE: u32 = 0o700;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Writes `config` to `path`, creating the parent directory if needed.
    ///
    /// The file always ends up with mode 0600, even if it existed with
    /// wider permissions.
    pub fn save(&self, path: &Path, config: &Value) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                create_private_dir(parent)?;
            }
        }
        write_atomically(path, config, FILE_MODE)
    }

    /// Sets `current-context` and returns the updated tree.
    pub fn update_current_context(&self, path: &Path, name: &str) -> ConfigResult<Value> {
        self.update(path, |root| {
            root.insert(CURRENT_CONTEXT_KEY.into(), Value::String(name.to_string()));
            Ok(())
        })
    }

    pub fn upsert_context(&self, path: &Path, context: &Context) -> ConfigResult<Value> {
        self.upsert(path, CONTEXTS_KEY, context.name(), &context.to_entry())
    }

    pub fn upsert_cluster(&self, path: &Path, cluster: &Cluster) -> ConfigResult<Value> {
        self.upsert(path, CLUSTERS_KEY, cluster.name(), &cluster.to_entry())
    }

    pub fn upsert_user(&self, path: &Path, user: &User) -> ConfigResult<Value> {
        self.upsert(path, USERS_KEY, user.name(), &user.to_entry())
    }

    fn upsert<T: Serialize>(
        &self,
        path: &Path,
        key: &str,
        name: &str,
        entry: &T,
    ) -> ConfigResult<Value> {
        let entry = serde_yaml::to_value(entry)
            .map_err(|e| ConfigError::Invalid(format!("failed to serialize {}: {}", key, e)))?;
        self.update(path, |root| {
            let list = root
                .entry(Value::String(key.to_string()))
                .or_insert(Value::Sequence(Vec::new()));
            if list.is_null() {
                *list = Value::Sequence(Vec::new());
            }
            let Value::Sequence(items) = list else {
                return Err(ConfigError::Invalid(format!("'{}' must be a list", key)));
            };
            match items
                .iter_mut()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
            {
                Some(existing) => *existing = entry,
                None => items.push(entry),
            }
            Ok(())
        })
    }

    /// Read-modify-write of the whole file, keeping its permission bits.
    fn update<F>(&self, path: &Path, mutate: F) -> ConfigResult<Value>
    where
        F: FnOnce(&mut Mapping) -> ConfigResult<()>,
    {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::io(path, e)
            }
        })?;
        let mut root: Value = if contents.trim().is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| {
                ConfigError::Invalid(format!("failed to parse {}: {}", path.display(), e))
            })?
        };
        if root.is_null() {
            root = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(mapping) = &mut root else {
            return Err(ConfigError::Invalid(format!(
                "{}: top level must be a mapping",
                path.display()
            )));
        };
        mutate(mapping)?;

        let mode = existing_mode(path).unwrap_or(FILE_MODE);
        write_atomically(path, &root, mode)?;
        debug!(path = %path.display(), "configuration updated");
        Ok(root)
    }
}

fn write_atomically(path: &Path, config: &Value, mode: u32) -> ConfigResult<()> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| ConfigError::Invalid(format!("failed to serialize configuration: {}", e)))?;
    let temp = temp_path(path);

    let result = (|| -> std::io::Result<()> {
        let mut file = open_private(&temp, mode)?;
        file.write_all(yaml.as_bytes())?;
        file.sync_all()?;
        set_mode(&temp, mode)?;
        fs::rename(&temp, path)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&temp);
        ConfigError::io(path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    path.with_file_name(format!(".{}.tmp{}", file_name, std::process::id()))
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> ConfigResult<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|e| ConfigError::io(dir, e))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> ConfigResult<()> {
    fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))
}

#[cfg(unix)]
fn open_private(path: &Path, mode: u32) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path, _mode: u32) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

/// Permission bits of an existing file.
#[cfg(unix)]
pub(crate) fn existing_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .ok()
        .map(|meta| meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub(crate) fn existing_mode(_path: &Path) -> Option<u32> {
    None
}
