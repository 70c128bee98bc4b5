//! Cache adapter: key namespacing, TTL writes and bulk invalidation

use crate::client::{HttpStoreClient, StoreConfig};
use crate::codec;
use crate::error::{CacheError, Result};
use crate::logger::{LogSink, StdoutLog};
use crate::store::{Pipeline, StoreClient};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Key prefix used when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "mikro";

/// How the adapter reaches the store
pub enum Connection {
    /// Adopt an already-connected client
    Handle(Arc<dyn StoreClient>),
    /// Build a new client from connection parameters
    Params(StoreConfig),
}

/// Adapter configuration, immutable once the adapter is built
pub struct CacheOptions {
    /// Namespace prefix; every physical key is `<key_prefix>:<key>`
    pub key_prefix: String,
    /// Default expiration applied to writes that do not override it, in
    /// milliseconds. `None` (or zero) means entries persist until removed.
    pub expiration_ms: Option<u64>,
    /// Log every operation through the configured sink
    pub debug: bool,
    /// Sink for debug messages
    pub logger: Arc<dyn LogSink>,
    /// Store connection
    pub connection: Connection,
}

impl CacheOptions {
    /// Create options with the given connection and defaults for the rest
    pub fn new(connection: Connection) -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            expiration_ms: None,
            debug: false,
            logger: Arc::new(StdoutLog),
            connection,
        }
    }

    /// Set the namespace prefix
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Set the default expiration in milliseconds
    pub fn with_expiration_ms(mut self, expiration_ms: Option<u64>) -> Self {
        self.expiration_ms = expiration_ms;
        self
    }

    /// Enable or disable debug logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the debug log sink
    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = logger;
        self
    }
}

/// Caching adapter over a TTL-capable key-value store
///
/// Every logical key is mapped into a private namespace
/// (`<key_prefix>:<key>`), values are stored as JSON text, and expiration is
/// delegated to the store's own TTL mechanism. The adapter holds no state of
/// its own; every call is a fresh round trip and the store is the sole source
/// of truth for which entries exist.
pub struct CacheAdapter {
    key_prefix: String,
    expiration_ms: Option<u64>,
    debug: bool,
    logger: Arc<dyn LogSink>,
    store: Arc<dyn StoreClient>,
}

impl CacheAdapter {
    /// Build an adapter, resolving the connection into a concrete client
    ///
    /// A [`Connection::Params`] connection constructs an [`HttpStoreClient`];
    /// construction failure surfaces as [`CacheError::Connection`].
    pub fn new(options: CacheOptions) -> Result<Self> {
        let store: Arc<dyn StoreClient> = match options.connection {
            Connection::Handle(handle) => handle,
            Connection::Params(config) => {
                Arc::new(HttpStoreClient::connect(config).map_err(CacheError::Connection)?)
            }
        };

        Ok(Self {
            key_prefix: options.key_prefix,
            expiration_ms: options.expiration_ms,
            debug: options.debug,
            logger: options.logger,
            store,
        })
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    fn log(&self, message: String) {
        if self.debug {
            self.logger.record(&message);
        }
    }

    /// Read a cached value
    ///
    /// An absent (or already expired) key is `Ok(None)`. Text that is present
    /// but does not decode surfaces as [`CacheError::Decode`]; that is
    /// corruption, not a miss.
    ///
    /// # Example
    /// ```no_run
    /// # use mikro_cache::{CacheAdapter, CacheOptions, Connection, StoreConfig};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let cache = CacheAdapter::new(CacheOptions::new(Connection::Params(StoreConfig::new("http://localhost:15500"))))?;
    /// let user: Option<serde_json::Value> = cache.get("user:1").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<V>(&self, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned,
    {
        let key = self.physical_key(key);

        let text = self.store.get(&key).await.map_err(|err| {
            self.log(format!("GET key={key} failed: {err}"));
            CacheError::Read(err)
        })?;

        self.log(format!("GET key={key} value={text:?}"));

        match text.as_deref() {
            None | Some("") => Ok(None),
            Some(text) => codec::decode(text).map(Some),
        }
    }

    /// Write a cached value
    ///
    /// # Arguments
    /// * `key` - The logical key to write under
    /// * `data` - The value to cache
    /// * `_origin` - Provenance metadata supplied by callers; it does not
    ///   affect caching
    /// * `expiration_ms` - Optional TTL in milliseconds, overriding the
    ///   configured default
    ///
    /// Whichever expiration is in effect (and non-zero) is applied as a
    /// relative millisecond TTL, after which the store expires the entry on
    /// its own.
    ///
    /// # Example
    /// ```no_run
    /// # use mikro_cache::{CacheAdapter, CacheOptions, Connection, StoreConfig};
    /// # use serde_json::json;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let cache = CacheAdapter::new(CacheOptions::new(Connection::Params(StoreConfig::new("http://localhost:15500"))))?;
    /// cache.set("user:1", &json!({"name": "a"}), "app", None).await?;
    /// cache.set("session:abc", &json!("token"), "app", Some(3_600_000)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set<V>(
        &self,
        key: &str,
        data: &V,
        _origin: &str,
        expiration_ms: Option<u64>,
    ) -> Result<()>
    where
        V: Serialize,
    {
        let text = codec::encode(data)?;
        let key = self.physical_key(key);
        let expiration = expiration_ms.or(self.expiration_ms).filter(|ms| *ms > 0);

        self.log(format!("SET key={key} value={text} ttl={expiration:?}"));

        self.store.set(&key, &text, expiration).await.map_err(|err| {
            self.log(format!("SET key={key} failed: {err}"));
            CacheError::Write(err)
        })
    }

    /// Delete one entry; deleting an absent key succeeds
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = self.physical_key(key);

        self.log(format!("DEL key={key}"));

        self.store.del(&key).await.map_err(|err| {
            self.log(format!("DEL key={key} failed: {err}"));
            CacheError::Write(err)
        })?;
        Ok(())
    }

    /// Delete every entry under this adapter's prefix
    ///
    /// The store has no atomic delete-by-pattern, so this is a two-phase
    /// sweep: cursor-scan the namespace into one pipeline, then submit every
    /// delete in a single round trip. The sweep is best effort: keys written
    /// concurrently with an in-progress clear may or may not be removed, and
    /// a failed execution is not rolled back. Keys under other prefixes are
    /// never touched.
    pub async fn clear(&self) -> Result<()> {
        let pattern = format!("{}:*", self.key_prefix);

        let mut pipeline = Pipeline::new();
        let mut cursor = 0;
        loop {
            let page = self.store.scan(&pattern, cursor).await.map_err(|err| {
                self.log(format!("SWEEP pattern={pattern} failed: {err}"));
                CacheError::Sweep(err)
            })?;

            for key in page.keys {
                pipeline.del(key);
            }

            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }

        if pipeline.is_empty() {
            return Ok(());
        }

        self.log(format!("SWEEP pattern={pattern} keys={}", pipeline.len()));

        self.store.exec(pipeline).await.map_err(|err| {
            self.log(format!("SWEEP pattern={pattern} failed: {err}"));
            CacheError::Sweep(err)
        })
    }

    /// Disconnect from the store without draining in-flight commands
    ///
    /// Callers must ensure no operations are concurrently in flight.
    pub async fn close(&self) {
        self.store.disconnect().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn adapter_with(options: CacheOptions) -> CacheAdapter {
        CacheAdapter::new(options).unwrap()
    }

    #[test]
    fn test_physical_key_is_prefixed() {
        let store = Arc::new(MemoryStore::new());
        let adapter = adapter_with(CacheOptions::new(Connection::Handle(store)));

        assert_eq!(adapter.physical_key("user:1"), "mikro:user:1");
    }

    #[test]
    fn test_custom_prefix() {
        let store = Arc::new(MemoryStore::new());
        let adapter = adapter_with(
            CacheOptions::new(Connection::Handle(store)).with_key_prefix("tenant-a"),
        );

        assert_eq!(adapter.physical_key("k"), "tenant-a:k");
    }

    #[test]
    fn test_options_defaults() {
        let options = CacheOptions::new(Connection::Handle(Arc::new(MemoryStore::new())));

        assert_eq!(options.key_prefix, DEFAULT_KEY_PREFIX);
        assert_eq!(options.expiration_ms, None);
        assert!(!options.debug);
    }

    #[test]
    fn test_new_from_params() {
        let options = CacheOptions::new(Connection::Params(StoreConfig::new(
            "http://localhost:15500",
        )));
        assert!(CacheAdapter::new(options).is_ok());
    }

    #[test]
    fn test_new_from_invalid_params() {
        let options = CacheOptions::new(Connection::Params(StoreConfig::new("not-a-url")));
        let result = CacheAdapter::new(options);
        assert!(matches!(result, Err(CacheError::Connection(_))));
    }
}
