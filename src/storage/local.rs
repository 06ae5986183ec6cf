//! Device-local session storage: `localStorage` in the browser, a JSON file in
//! the user's data directory everywhere else.

use super::{SessionStore, StorageError, decode_sessions, encode_sessions};
use crate::types::ChatSession;

#[cfg(not(target_arch = "wasm32"))]
use super::STORAGE_KEY;
#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

/// Environment variable overriding the native storage directory.
pub const DATA_DIR_ENV: &str = "NEURALCHAT_DATA_DIR";

#[cfg(not(target_arch = "wasm32"))]
pub struct LocalStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl LocalStore {
    /// Store under `$NEURALCHAT_DATA_DIR`, or `<data_local_dir>/neuralchat`.
    pub fn new() -> Self {
        Self::in_dir(default_data_dir())
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_raw(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn write_raw(&self, raw: &str) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, raw).map_err(io_err)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("neuralchat");
    }

    PathBuf::from("cache").join("neuralchat")
}

#[cfg(target_arch = "wasm32")]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Unavailable("localStorage is not accessible".into()))
    }

    fn read_raw(&self) -> Option<String> {
        Self::storage()
            .ok()?
            .get_item(super::STORAGE_KEY)
            .ok()
            .flatten()
    }

    fn write_raw(&self, raw: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(super::STORAGE_KEY, raw)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for LocalStore {
    fn load(&self) -> Vec<ChatSession> {
        decode_sessions(self.read_raw())
    }

    fn save_all(&self, sessions: &[ChatSession]) -> Result<(), StorageError> {
        let raw = encode_sessions(sessions)?;
        self.write_raw(&raw)
    }
}
