//! Asynchronous (remote) validators.
//!
//! Each validator POSTs the control's current value to its endpoint and
//! publishes the verdict back over the session's result channel. A new
//! check for a validator aborts that validator's own in-flight check, so at
//! most one request per validator instance is ever outstanding. Transport,
//! parse, and timeout failures produce no result at all: validity stays in
//! its last-known state.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    check: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    valid: bool,
}

/// Terminal result of one remote check, applied by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncOutcome {
    pub control: String,
    pub valid: bool,
    pub message: String,
}

/// Transport seam for remote checks. `None` means "no result": the caller
/// must treat it as pending, never as pass or fail.
#[async_trait]
pub trait RemoteChecker: Send + Sync {
    async fn check(&self, url: &str, value: &str) -> Option<bool>;
}

/// Production transport: JSON POST `{"check": value}`, expecting
/// `{"valid": bool}` back.
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteChecker for HttpChecker {
    async fn check(&self, url: &str, value: &str) -> Option<bool> {
        let response = self
            .client
            .post(url)
            .json(&CheckRequest { check: value })
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(url, error = %err, "remote validation transport failed");
                return None;
            }
        };

        match response.json::<CheckResponse>().await {
            Ok(body) => Some(body.valid),
            Err(err) => {
                warn!(url, error = %err, "remote validation returned an unexpected shape");
                None
            }
        }
    }
}

/// One remote check bound to a control, with its single in-flight slot.
pub struct AsyncValidator {
    pub url: String,
    pub message: String,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncValidator {
    pub fn new(url: &str, message: &str) -> Self {
        Self {
            url: url.to_string(),
            message: message.to_string(),
            in_flight: Mutex::new(None),
        }
    }

    /// Start a check for the given value, cancelling this validator's own
    /// in-flight check first. Must be called from within a tokio runtime.
    pub fn trigger(
        &self,
        control_name: &str,
        value: &str,
        checker: Arc<dyn RemoteChecker>,
        results: UnboundedSender<AsyncOutcome>,
    ) {
        let mut slot = self.in_flight.lock().expect("in-flight slot poisoned");
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let url = self.url.clone();
        let message = self.message.clone();
        let control = control_name.to_string();
        let value = value.to_string();

        *slot = Some(tokio::spawn(async move {
            match checker.check(&url, &value).await {
                Some(valid) => {
                    debug!(control = %control, valid, "remote validation completed");
                    let _ = results.send(AsyncOutcome {
                        control,
                        valid,
                        message,
                    });
                }
                None => {
                    debug!(control = %control, "remote validation produced no result");
                }
            }
        }));
    }
}

impl fmt::Debug for AsyncValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValidator")
            .field("url", &self.url)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
