//! Launch cache: a key-value store port plus a clock port.
//!
//! The cache keeps two fixed keys, the serialized launch list and the
//! millisecond timestamp of the last write. Freshness is judged against an
//! injected [`Clock`] so tests never touch real time or real storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{Error, LaunchRecord};
use dashmap::DashMap;
use tracing::{debug, warn};

pub const CACHE_KEY: &str = "spacex_launches_cache";
pub const CACHE_TIMESTAMP_KEY: &str = "spacex_launches_timestamp";
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

// ── Ports ─────────────────────────────────────────────────────────────

/// String key-value storage.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;

    fn clear(&self) -> Result<(), Error> {
        self.remove(CACHE_KEY)?;
        self.remove(CACHE_TIMESTAMP_KEY)
    }
}

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

// ── Stores ────────────────────────────────────────────────────────────

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, String>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, Error> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        // A corrupt file is replaced rather than blocking every write.
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.read_all().unwrap_or_default();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

// ── Launch cache ──────────────────────────────────────────────────────

/// Typed view over a [`CacheStore`] for the launch list.
pub struct LaunchCache<S, C> {
    store: S,
    clock: C,
    ttl: Duration,
}

impl<S: CacheStore, C: Clock> LaunchCache<S, C> {
    pub fn new(store: S, clock: C, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached launches, only if written within the freshness window.
    pub fn load_fresh(&self) -> Result<Option<Vec<LaunchRecord>>, Error> {
        let Some(written_at) = self.written_at()? else {
            return Ok(None);
        };
        let age_ms = self.clock.now().timestamp_millis() - written_at;
        if age_ms < 0 || age_ms as u128 >= self.ttl.as_millis() {
            debug!("Launch cache is stale ({} ms old)", age_ms);
            return Ok(None);
        }
        self.load_any()
    }

    /// Cached launches regardless of age.
    pub fn load_any(&self) -> Result<Option<Vec<LaunchRecord>>, Error> {
        match self.store.get(CACHE_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, launches: &[LaunchRecord]) -> Result<(), Error> {
        let raw = serde_json::to_string(launches)?;
        self.store.set(CACHE_KEY, &raw)?;
        self.store.set(
            CACHE_TIMESTAMP_KEY,
            &self.clock.now().timestamp_millis().to_string(),
        )
    }

    pub fn clear(&self) -> Result<(), Error> {
        self.store.clear()
    }

    fn written_at(&self) -> Result<Option<i64>, Error> {
        let Some(raw) = self.store.get(CACHE_TIMESTAMP_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(ms) => Ok(Some(ms)),
            Err(_) => {
                warn!("Ignoring malformed cache timestamp {:?}", raw);
                Ok(None)
            }
        }
    }
}
