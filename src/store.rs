//! Abstract store capabilities consumed by the adapter

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Deserialize;

/// One page of a cursor scan
///
/// A returned cursor of `0` signals that enumeration is complete. Scans are
/// restartable from scratch only; there is no seeking back to an earlier
/// cursor.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanPage {
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// A queued store command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Delete a key
    Del(String),
}

/// Explicit command list executed in a single round trip
///
/// Commands are queued locally and nothing reaches the store until the
/// pipeline is handed to [`StoreClient::exec`].
#[derive(Debug, Default)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a delete for `key`
    pub fn del(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Del(key.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands, in submission order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

/// Capabilities the adapter consumes from the external store
///
/// `expire_ms` is a relative millisecond TTL; once it elapses the store
/// deletes the key on its own, independent of this process.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Read a key. An absent key is `None`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a key, optionally with a millisecond TTL.
    async fn set(&self, key: &str, value: &str, expire_ms: Option<u64>) -> Result<(), StoreError>;

    /// Delete a key, returning the number of keys removed.
    async fn del(&self, key: &str) -> Result<u64, StoreError>;

    /// One step of a cursor scan over keys matching `pattern`. Start with
    /// cursor `0`; enumeration is complete when the returned cursor is `0`.
    async fn scan(&self, pattern: &str, cursor: u64) -> Result<ScanPage, StoreError>;

    /// Execute every queued command in one round trip.
    async fn exec(&self, pipeline: Pipeline) -> Result<(), StoreError>;

    /// Drop the connection without draining in-flight commands.
    async fn disconnect(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_starts_empty() {
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
        assert!(pipeline.commands().is_empty());
    }

    #[test]
    fn test_pipeline_queues_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.del("a").del("b").del("c");

        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline.commands(),
            &[
                Command::Del("a".to_string()),
                Command::Del("b".to_string()),
                Command::Del("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_page_deserializes() {
        let page: ScanPage =
            serde_json::from_str(r#"{"cursor": 42, "keys": ["app:a", "app:b"]}"#).unwrap();
        assert_eq!(page.cursor, 42);
        assert_eq!(page.keys, vec!["app:a", "app:b"]);
    }
}
