use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tokio_util::time::{DelayQueue, delay_queue};

struct Entry {
    value: String,
    generation: u64,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

enum ExpiryCommand {
    Schedule {
        key: String,
        generation: u64,
        ttl: Duration,
    },
    Cancel {
        key: String,
    },
}

/// Process-local fallback store.
///
/// Expiry is driven by one scheduler task per store. Each key has at most one pending
/// expiry; overwriting or deleting a key cancels it, and an expiry only removes the exact
/// write it was scheduled for. Reads also honor the deadline, so a value is never served
/// after its TTL even if the scheduler lags.
///
/// Cloning shares the same store. The scheduler stops once every clone is dropped.
/// Must be constructed inside a Tokio runtime.
#[derive(Clone)]
pub struct LocalCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    generation: Arc<AtomicU64>,
    scheduler: mpsc::UnboundedSender<ExpiryCommand>,
}

impl LocalCache {
    pub fn new() -> Self {
        let entries = Arc::new(Mutex::new(HashMap::new()));
        let (scheduler, commands) = mpsc::unbounded_channel();
        tokio::spawn(run_expiry_scheduler(entries.clone(), commands));

        Self {
            entries,
            generation: Arc::new(AtomicU64::new(0)),
            scheduler,
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// `ttl` is expected to be non-zero when present.
    pub async fn set(&self, key: &str, value: String, ttl: Option<u64>) {
        let ttl = ttl.map(Duration::from_secs);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        let command = match ttl {
            Some(ttl) => ExpiryCommand::Schedule {
                key: key.to_string(),
                generation,
                ttl,
            },
            None => ExpiryCommand::Cancel {
                key: key.to_string(),
            },
        };

        // Commands must reach the scheduler in the same order the writes land.
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                generation,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        self.send(command);
    }

    pub async fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.send(ExpiryCommand::Cancel {
                key: key.to_string(),
            });
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn send(&self, command: ExpiryCommand) {
        if self.scheduler.send(command).is_err() {
            log::warn!("Local cache expiry scheduler is not running; relying on read-time expiry");
        }
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_expiry_scheduler(
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    mut commands: mpsc::UnboundedReceiver<ExpiryCommand>,
) {
    let mut queue: DelayQueue<(String, u64)> = DelayQueue::new();
    let mut pending: HashMap<String, delay_queue::Key> = HashMap::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ExpiryCommand::Schedule { key, generation, ttl }) => {
                    if let Some(previous) = pending.remove(&key) {
                        queue.remove(&previous);
                    }
                    let handle = queue.insert((key.clone(), generation), ttl);
                    pending.insert(key, handle);
                }
                Some(ExpiryCommand::Cancel { key }) => {
                    if let Some(previous) = pending.remove(&key) {
                        queue.remove(&previous);
                    }
                }
                None => break,
            },
            Some(expired) = queue.next(), if !queue.is_empty() => {
                let (key, generation) = expired.into_inner();
                pending.remove(&key);

                let mut entries = entries.lock().await;
                if entries.get(&key).is_some_and(|entry| entry.generation == generation) {
                    entries.remove(&key);
                    log::debug!("Local cache entry expired: {key}");
                }
            }
        }
    }

    log::debug!("Local cache expiry scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_value_without_ttl_persists() {
        let cache = LocalCache::new();
        cache.set("k", "v".into(), None).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_entry_removed_after_ttl() {
        let cache = LocalCache::new();
        cache.set("k", "v".into(), Some(1)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_cancels_pending_expiry() {
        let cache = LocalCache::new();
        cache.set("k", "old".into(), Some(1)).await;
        cache.set("k", "new".into(), None).await;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_shorter_ttl_does_not_evict_refreshed_value() {
        let cache = LocalCache::new();
        cache.set("k", "first".into(), Some(1)).await;
        cache.set("k", "second".into(), Some(3)).await;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("second"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overwrites_expire_last_write() {
        let cache = LocalCache::new();
        let writers: Vec<_> = (0..64u64)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.set("k", format!("v{i}"), Some(1)).await;
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = LocalCache::new();
        cache.set("k", "v".into(), Some(30)).await;
        cache.delete("k").await;
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = LocalCache::new();
        let other = cache.clone();
        cache.set("k", "v".into(), None).await;
        assert_eq!(other.get("k").await.as_deref(), Some("v"));
    }
}
