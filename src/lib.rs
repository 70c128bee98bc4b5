//! # mikro-cache
//!
//! Namespaced cache adapter over TTL-capable key-value stores.
//!
//! ## Features
//!
//! - **Key namespacing**: every entry lives under `<prefix>:<key>`, so many
//!   adapters and applications can share one store without collisions
//! - **TTL writes**: millisecond-precision expiration, delegated to the
//!   store's own clock
//! - **Bulk invalidation**: a cursor scan of the namespace followed by one
//!   pipelined delete, leaving other prefixes untouched
//! - **Pluggable bindings**: an HTTP command client, an in-memory store, or
//!   any [`StoreClient`] implementation of your own
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mikro_cache::{CacheAdapter, CacheOptions, Connection, StoreConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = CacheOptions::new(Connection::Params(StoreConfig::new(
//!         "http://localhost:15500",
//!     )))
//!     .with_expiration_ms(Some(60_000));
//!
//!     let cache = CacheAdapter::new(options)?;
//!
//!     cache.set("user:1", &json!({"name": "a"}), "app", None).await?;
//!     let user: Option<serde_json::Value> = cache.get("user:1").await?;
//!     println!("cached: {:?}", user);
//!
//!     cache.clear().await?;
//!     cache.close().await;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod client;
pub mod codec;
pub mod error;
pub mod logger;
pub mod memory;
pub mod store;

pub use adapter::{CacheAdapter, CacheOptions, Connection, DEFAULT_KEY_PREFIX};
pub use client::{HttpStoreClient, StoreConfig};
pub use error::{CacheError, Result, StoreError};
pub use logger::{LogSink, StdoutLog, TracingLog};
pub use memory::MemoryStore;
pub use store::{Command, Pipeline, ScanPage, StoreClient};
