//! In-memory store binding for tests and local development

use crate::error::StoreError;
use crate::store::{Command, Pipeline, ScanPage, StoreClient};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const DEFAULT_SCAN_PAGE: usize = 64;

#[derive(Debug, Clone)]
struct StoredValue {
    data: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(data: String, expire_ms: Option<u64>) -> Self {
        Self {
            data,
            expires_at: expire_ms.map(|ms| Instant::now() + Duration::from_millis(ms)),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory [`StoreClient`] with millisecond TTL and cursor-paged scans
///
/// Expired entries are dropped lazily on read. Scan cursors index into a
/// sorted snapshot of the matching keys, so a scan stays stable across pages
/// as long as the keyspace does not change underneath it.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, StoredValue>>>,
    closed: Arc<AtomicBool>,
    scan_page: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
            scan_page: DEFAULT_SCAN_PAGE,
        }
    }

    /// Set the number of keys returned per scan page
    pub fn with_scan_page(mut self, scan_page: usize) -> Self {
        self.scan_page = scan_page.max(1);
        self
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::Disconnected)
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Glob match supporting `*` wildcards, the only pattern form the scan
/// contract uses
fn key_matches(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(stripped) => rest = stripped,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;

        let mut data = self.data.write();
        match data.get(key) {
            Some(value) if value.is_expired() => {
                data.remove(key);
                Ok(None)
            }
            Some(value) => Ok(Some(value.data.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, expire_ms: Option<u64>) -> Result<(), StoreError> {
        self.ensure_open()?;

        self.data
            .write()
            .insert(key.to_string(), StoredValue::new(value.to_string(), expire_ms));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        self.ensure_open()?;

        Ok(self.data.write().remove(key).map_or(0, |_| 1))
    }

    async fn scan(&self, pattern: &str, cursor: u64) -> Result<ScanPage, StoreError> {
        self.ensure_open()?;

        let data = self.data.read();
        let mut matching: Vec<String> = data
            .iter()
            .filter(|(key, value)| !value.is_expired() && key_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        matching.sort();

        let start = cursor as usize;
        let end = (start + self.scan_page).min(matching.len());
        let keys = matching
            .get(start..end)
            .map(|page| page.to_vec())
            .unwrap_or_default();
        let next = if end >= matching.len() { 0 } else { end as u64 };

        Ok(ScanPage { cursor: next, keys })
    }

    async fn exec(&self, pipeline: Pipeline) -> Result<(), StoreError> {
        self.ensure_open()?;

        // one lock acquisition for the whole batch
        let mut data = self.data.write();
        for command in pipeline.commands() {
            match command {
                Command::Del(key) => {
                    data.remove(key);
                }
            }
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let store = MemoryStore::new();

        store.set("key1", "value1", None).await.unwrap();

        let result = store.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new();

        let result = store.get("nonexistent").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let store = MemoryStore::new();

        store.set("key1", "value1", Some(20)).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap(), Some("value1".to_string()));

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_del_missing_key_is_zero() {
        let store = MemoryStore::new();

        store.set("key1", "value1", None).await.unwrap();

        assert_eq!(store.del("key1").await.unwrap(), 1);
        assert_eq!(store.del("key1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scan_pages_cover_namespace() {
        let store = MemoryStore::new().with_scan_page(2);

        for i in 0..5 {
            store
                .set(&format!("app:{i}"), "v", None)
                .await
                .unwrap();
        }
        store.set("other:1", "v", None).await.unwrap();

        let mut cursor = 0;
        let mut seen = Vec::new();
        loop {
            let page = store.scan("app:*", cursor).await.unwrap();
            assert!(page.keys.len() <= 2);
            seen.extend(page.keys);
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }

        seen.sort();
        assert_eq!(seen, vec!["app:0", "app:1", "app:2", "app:3", "app:4"]);
    }

    #[tokio::test]
    async fn test_exec_deletes_batch() {
        let store = MemoryStore::new();

        store.set("a", "1", None).await.unwrap();
        store.set("b", "2", None).await.unwrap();
        store.set("c", "3", None).await.unwrap();

        let mut pipeline = Pipeline::new();
        pipeline.del("a").del("c").del("missing");

        store.exec(pipeline).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), Some("2".to_string()));
        assert_eq!(store.get("c").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disconnect_poisons_operations() {
        let store = MemoryStore::new();
        store.set("key1", "value1", None).await.unwrap();

        store.disconnect().await;

        assert!(matches!(
            store.get("key1").await,
            Err(StoreError::Disconnected)
        ));
        assert!(matches!(
            store.set("key2", "v", None).await,
            Err(StoreError::Disconnected)
        ));
    }

    #[test]
    fn test_key_matches() {
        assert!(key_matches("mikro:*", "mikro:user:1"));
        assert!(key_matches("mikro:*", "mikro:"));
        assert!(!key_matches("mikro:*", "other:user:1"));
        assert!(!key_matches("mikro:*", "mik"));
        assert!(key_matches("exact", "exact"));
        assert!(!key_matches("exact", "exactly"));
        assert!(key_matches("*:user", "app:user"));
        assert!(key_matches("a*b*c", "aXbYc"));
        assert!(key_matches("a*b*c", "abc"));
        assert!(!key_matches("a*b*c", "acb"));
    }
}
