// src/infrastructure/transport.rs
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::constants::ANKI_CONNECT_VERSION;
use crate::domain::ConnectError;
use crate::infrastructure::config::ConnectConfig;

/// One AnkiConnect round trip: send an action with its params, get the raw
/// response envelope back.
///
/// Implementations report everything below the protocol (connection,
/// timeout, HTTP status, body parsing) as `ConnectError::Transport` and
/// never interpret the envelope; that is the caller's job.
pub trait Transport {
    fn call(&self, action: &str, params: Value) -> Result<Value, ConnectError>;
}

/// Blocking HTTP transport against a local AnkiConnect endpoint.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    endpoint: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpTransport {
    pub fn new(config: &ConnectConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        debug!(endpoint = %config.endpoint, timeout_secs = config.timeout_secs, "Creating HTTP transport");
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    fn post(&self, body: &Value) -> Result<Value, ConnectError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .map_err(|e| ConnectError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectError::Transport(format!(
                "unexpected HTTP status {}",
                status
            )));
        }

        response
            .json::<Value>()
            .map_err(|e| ConnectError::Transport(format!("response body is not JSON: {}", e)))
    }
}

impl Transport for HttpTransport {
    fn call(&self, action: &str, params: Value) -> Result<Value, ConnectError> {
        let body = json!({
            "action": action,
            "version": ANKI_CONNECT_VERSION,
            "params": params,
        });
        debug!(action, "AnkiConnect request");
        with_retries(self.max_retries, self.retry_backoff, action, || {
            self.post(&body)
        })
    }
}

/// Run `op`, retrying transport failures up to `max_retries` additional
/// times. Backoff is linear: the Nth retry sleeps N times `backoff`.
/// API-level errors are never retried.
pub fn with_retries<T>(
    max_retries: u32,
    backoff: Duration,
    action: &str,
    op: impl Fn() -> Result<T, ConnectError>,
) -> Result<T, ConnectError> {
    let mut attempt: u32 = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(ConnectError::Transport(msg)) if attempt < max_retries => {
                attempt += 1;
                warn!(action, attempt, error = %msg, "Transport failure, retrying");
                thread::sleep(backoff * attempt);
            }
            Err(err) => return Err(err),
        }
    }
}
