//! HTTP command client for the external store

use crate::error::StoreError;
use crate::store::{Command, Pipeline, ScanPage, StoreClient};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

/// Store connection parameters
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store server
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional authentication token
    pub auth_token: Option<String>,
}

impl StoreConfig {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }

    /// Set the timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the authentication token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Store client speaking the command-envelope HTTP protocol
///
/// All commands use the same format:
/// ```json
/// {
///   "command": "kv.get",
///   "request_id": "uuid",
///   "payload": { ... }
/// }
/// ```
/// and responses carry `{"success": bool, "payload": ..., "error": ...}`.
pub struct HttpStoreClient {
    http: Client,
    base_url: Url,
    closed: AtomicBool,
}

impl HttpStoreClient {
    /// Build a client from connection parameters
    pub fn connect(config: StoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)?;

        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(ref token) = config.auth_token {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token).parse().unwrap(),
            );
            builder = builder.default_headers(headers);
        }

        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            closed: AtomicBool::new(false),
        })
    }

    async fn send_command(&self, command: &str, payload: Value) -> Result<Value, StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Disconnected);
        }

        let request_id = uuid::Uuid::new_v4().to_string();

        let body = json!({
            "command": command,
            "request_id": request_id,
            "payload": payload,
        });

        let url = self.base_url.join("api/v1/command")?;

        let response = self.http.post(url).json(&body).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StoreError::Server(error_text));
        }

        let result: Value = response.json().await?;

        if !result["success"].as_bool().unwrap_or(false) {
            let error_msg = result["error"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(StoreError::Server(error_msg));
        }

        Ok(result["payload"].clone())
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let payload = json!({"key": key});
        let response = self.send_command("kv.get", payload).await?;

        // null payload means the key is absent or expired
        if response.is_null() {
            return Ok(None);
        }

        match response {
            Value::String(text) => Ok(Some(text)),
            other => Err(StoreError::InvalidResponse(format!(
                "kv.get returned a non-string payload: {other}"
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str, expire_ms: Option<u64>) -> Result<(), StoreError> {
        let payload = json!({
            "key": key,
            "value": value,
            "ttl_ms": expire_ms,
        });

        self.send_command("kv.set", payload).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        let payload = json!({"key": key});
        let response = self.send_command("kv.del", payload).await?;

        Ok(response["deleted"].as_u64().unwrap_or(0))
    }

    async fn scan(&self, pattern: &str, cursor: u64) -> Result<ScanPage, StoreError> {
        let payload = json!({"pattern": pattern, "cursor": cursor});
        let response = self.send_command("kv.scan", payload).await?;

        serde_json::from_value(response)
            .map_err(|e| StoreError::InvalidResponse(format!("kv.scan payload: {e}")))
    }

    async fn exec(&self, pipeline: Pipeline) -> Result<(), StoreError> {
        let commands: Vec<Value> = pipeline
            .commands()
            .iter()
            .map(|command| match command {
                Command::Del(key) => json!({"op": "del", "key": key}),
            })
            .collect();

        self.send_command("pipeline.exec", json!({"commands": commands}))
            .await?;
        Ok(())
    }

    async fn disconnect(&self) {
        // Ungraceful: in-flight commands are not drained, later calls fail.
        self.closed.store(true, Ordering::SeqCst);
    }
}
