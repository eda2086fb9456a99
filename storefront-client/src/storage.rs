//! Host storage bindings
//!
//! The core persists cart envelopes, the customer record, and the bearer
//! token through storage surfaces the host application injects. Storage is
//! best-effort by contract: a failed write is logged and dropped, a failed
//! read behaves like a missing key, and no storage fault ever reaches a
//! caller of the commerce API.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A flat string key-value store.
pub trait StorageArea: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Sink for the host cookie surface.
///
/// The debounced cart writer mirrors the item count here so that a server
/// (or a non-scripted page) can render the cart badge without touching the
/// persisted envelope. Hosts render the cookie site-wide (`path=/`) with
/// the given max-age.
pub trait CookieSink: Send + Sync {
    fn set(&self, name: &str, value: &str, max_age: Duration);
}

// =============================================================================
// In-memory implementations
// =============================================================================

/// In-memory storage area. Backs the session-scoped store and tests.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed writes since creation. Persistence tests use
    /// this to observe debounce coalescing.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageArea for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

/// Recording cookie jar. Real hosts push cookies to their own surface;
/// tests read back what the core mirrored.
#[derive(Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, (String, Duration)>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<(String, Duration)> {
        self.cookies.lock().unwrap().get(name).cloned()
    }
}

impl CookieSink for MemoryCookieJar {
    fn set(&self, name: &str, value: &str, max_age: Duration) {
        self.cookies
            .lock()
            .unwrap()
            .insert(name.to_string(), (value.to_string(), max_age));
    }
}

// =============================================================================
// File-backed storage
// =============================================================================

/// Directory-backed storage area, one file per key.
///
/// Keys are fixed identifiers chosen by this crate, never user input, so
/// they are used as file names directly.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl StorageArea for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(error) = std::fs::write(self.path_for(key), value) {
            tracing::warn!(key, %error, "storage write failed");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if path.exists()
            && let Err(error) = std::fs::remove_file(&path)
        {
            tracing::warn!(key, %error, "storage remove failed");
        }
    }
}

// =============================================================================
// Host context
// =============================================================================

/// The storage surfaces a host hands to the commerce core.
#[derive(Clone)]
pub struct HostContext {
    /// Durable store: cart envelopes, customer record, backend override.
    pub durable: Arc<dyn StorageArea>,
    /// Session-scoped store: the bearer token. Gone when the host session
    /// ends; never written durably.
    pub session: Arc<dyn StorageArea>,
    /// Cookie mirror for server-visible cart badge rendering.
    pub cookies: Arc<dyn CookieSink>,
}

impl HostContext {
    /// Fully in-memory context (tests, throwaway hosts).
    pub fn in_memory() -> Self {
        Self {
            durable: Arc::new(MemoryStorage::new()),
            session: Arc::new(MemoryStorage::new()),
            cookies: Arc::new(MemoryCookieJar::new()),
        }
    }

    /// Durable state on disk under `dir`; session state in memory.
    pub fn file_backed(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        Ok(Self {
            durable: Arc::new(FileStorage::new(dir)?),
            session: Arc::new(MemoryStorage::new()),
            cookies: Arc::new(MemoryCookieJar::new()),
        })
    }
}
