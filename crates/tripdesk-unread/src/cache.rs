use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tokio::sync::broadcast;

const CACHE_FILE: &str = "read_positions.json";
const UPDATE_CHANNEL_CAPACITY: usize = 32;

/// Broadcast payload for a read-position advance, consumed by other mounted
/// surfaces in the same process (the storage-event analogue).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheUpdate {
    pub observer_id: String,
    pub thread_id: String,
    pub message_id: String,
}

/// Durable local record of the last-seen message per (observer, thread).
///
/// One JSON file, keys shaped `lastSeenMessage_{observerId}_{threadId}`,
/// read synchronously so surfaces can restore state on mount before the
/// authoritative fetch completes. This cache is optimistic-render state
/// only; unread counts are never derived from it.
pub struct ReadPositionCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    updates: broadcast::Sender<CacheUpdate>,
}

impl ReadPositionCache {
    /// Open (or create) the cache under `dir`.
    ///
    /// An unreadable or corrupt cache file is discarded: losing the
    /// optimistic positions only costs one authoritative fetch.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache directory {:?}", dir))?;

        let path = dir.join(CACHE_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = ?path, "discarding corrupt read-position cache");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            updates,
        })
    }

    fn key(observer_id: &str, thread_id: &str) -> String {
        format!("lastSeenMessage_{}_{}", observer_id, thread_id)
    }

    /// Last-seen message id recorded for the pair, if any.
    pub fn last_seen(&self, observer_id: &str, thread_id: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(&Self::key(observer_id, thread_id))
            .cloned()
    }

    /// Record an advance and notify other surfaces.
    ///
    /// Persistence failures are logged and swallowed; the in-memory entry
    /// and the broadcast still happen, the position is simply not durable
    /// until the next successful write.
    pub fn record(&self, observer_id: &str, thread_id: &str, message_id: &str) {
        let snapshot = {
            let mut entries = self.entries.lock().unwrap();
            entries.insert(
                Self::key(observer_id, thread_id),
                message_id.to_string(),
            );
            entries.clone()
        };

        if let Err(e) = self.persist(&snapshot) {
            tracing::warn!(error = %e, "failed to persist read-position cache");
        }

        let _ = self.updates.send(CacheUpdate {
            observer_id: observer_id.to_string(),
            thread_id: thread_id.to_string(),
            message_id: message_id.to_string(),
        });
    }

    /// Subscribe to advances recorded by any surface in this process.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheUpdate> {
        self.updates.subscribe()
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .context("failed to serialize read-position cache")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write cache file {:?}", self.path))?;
        Ok(())
    }
}
