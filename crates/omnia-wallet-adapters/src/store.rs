use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use omnia_wallet_core::{PortError, SessionStorePort};
#[cfg(not(target_arch = "wasm32"))]
use tracing::warn;

use crate::WalletAdapterConfig;

/// Shared in-memory key-value store. Clones see the same entries, which is
/// how tests simulate an application restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, PortError> {
        self.inner
            .lock()
            .map_err(|e| PortError::Storage(format!("memory store lock poisoned: {e}")))
    }
}

impl SessionStorePort for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PortError> {
        self.entries()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Native stand-in for `localStorage`: one JSON object of key to value.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
    write_lock: Arc<Mutex<()>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_raw(&self) -> Result<String, PortError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(PortError::Storage(format!(
                "read {} failed: {e}",
                self.path.display()
            ))),
        }
    }

    fn parse(&self, raw: &str) -> Result<BTreeMap<String, String>, PortError> {
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(raw).map_err(|e| {
            PortError::Storage(format!("{} is not a key-value object: {e}", self.path.display()))
        })
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PortError> {
        self.parse(&self.read_raw()?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), PortError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PortError::Storage(format!("create {} failed: {e}", parent.display()))
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Storage(format!("encode store failed: {e}")))?;
        // a reader sees either the old file or the new one, never a partial write
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw)
            .map_err(|e| PortError::Storage(format!("write {} failed: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            PortError::Storage(format!("replace {} failed: {e}", self.path.display()))
        })
    }

    /// Read-modify-write under the store lock. A file that no longer parses
    /// is replaced rather than blocking every later write.
    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), PortError> {
        let _g = self
            .write_lock
            .lock()
            .map_err(|e| PortError::Storage(format!("file store lock poisoned: {e}")))?;
        let raw = self.read_raw()?;
        let mut entries = match self.parse(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "discarding unreadable wallet store");
                BTreeMap::new()
            }
        };
        apply(&mut entries);
        self.write_all(&entries)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SessionStorePort for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PortError> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl BrowserStore {
    fn storage(&self) -> Result<web_sys::Storage, PortError> {
        web_sys::window()
            .ok_or_else(|| PortError::Storage("missing window".to_owned()))?
            .local_storage()
            .map_err(|e| PortError::Storage(format!("localStorage access denied: {e:?}")))?
            .ok_or_else(|| PortError::Storage("localStorage unavailable".to_owned()))
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStorePort for BrowserStore {
    fn load(&self, key: &str) -> Result<Option<String>, PortError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| PortError::Storage(format!("localStorage.getItem failed: {e:?}")))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PortError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| PortError::Storage(format!("localStorage.setItem failed: {e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| PortError::Storage(format!("localStorage.removeItem failed: {e:?}")))
    }
}

/// Store selected by the runtime: `localStorage` in the browser, a file when
/// `store_path` is set, memory otherwise.
#[derive(Debug, Clone)]
pub enum RuntimeStore {
    Memory(MemoryStore),
    #[cfg(not(target_arch = "wasm32"))]
    File(FileStore),
    #[cfg(target_arch = "wasm32")]
    Browser(BrowserStore),
}

impl RuntimeStore {
    pub fn from_config(config: &WalletAdapterConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let _ = config;
            Self::Browser(BrowserStore)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            match config.store_path {
                Some(ref path) => Self::File(FileStore::new(path.clone())),
                None => Self::Memory(MemoryStore::new()),
            }
        }
    }
}

impl SessionStorePort for RuntimeStore {
    fn load(&self, key: &str) -> Result<Option<String>, PortError> {
        match self {
            Self::Memory(s) => s.load(key),
            #[cfg(not(target_arch = "wasm32"))]
            Self::File(s) => s.load(key),
            #[cfg(target_arch = "wasm32")]
            Self::Browser(s) => s.load(key),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PortError> {
        match self {
            Self::Memory(s) => s.save(key, value),
            #[cfg(not(target_arch = "wasm32"))]
            Self::File(s) => s.save(key, value),
            #[cfg(target_arch = "wasm32")]
            Self::Browser(s) => s.save(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        match self {
            Self::Memory(s) => s.remove(key),
            #[cfg(not(target_arch = "wasm32"))]
            Self::File(s) => s.remove(key),
            #[cfg(target_arch = "wasm32")]
            Self::Browser(s) => s.remove(key),
        }
    }
}
