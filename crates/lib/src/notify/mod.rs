//! Verification-code delivery
//!
//! The only long-latency collaborator in the system. A
//! [`NotificationSender`] takes (recipient, code) and reports delivery
//! success or failure; retries, batching, and provider selection are its own
//! concern, never the session layer's. [`HttpNotifier`] talks to the relay
//! endpoint served by `podium-relay`.

mod errors;

pub use errors::NotifyError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Fire-and-forget delivery of a verification code with a boolean success
/// contract.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Attempt to deliver `code` to `email`. No retries at this boundary.
    async fn send_code(&self, email: &str, code: &str) -> Result<()>;
}

/// Wire format of a dispatch request to the relay endpoint.
#[derive(Debug, Serialize)]
struct SendCodeRequest<'a> {
    email: &'a str,
    code: &'a str,
}

/// Wire format of the relay's success acknowledgement.
#[derive(Debug, Deserialize)]
struct SendCodeAck {
    #[serde(default)]
    ok: bool,
}

/// Delivers codes by POSTing JSON `{ email, code }` to a relay endpoint.
///
/// Success is a 2xx response whose body carries `{ "ok": true }`; anything
/// else is a delivery failure reported to the caller.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpNotifier {
    /// Create a notifier targeting `endpoint`
    /// (e.g. `http://localhost:3000/api/send-code`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSender for HttpNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendCodeRequest { email, code })
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::EndpointStatus {
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        let ack: SendCodeAck = response.json().await.unwrap_or(SendCodeAck { ok: false });
        if !ack.ok {
            return Err(NotifyError::NotConfirmed.into());
        }
        Ok(())
    }
}

/// Test double that records every dispatched code instead of sending it.
///
/// Construct with [`RecordingNotifier::succeeding`] or
/// [`RecordingNotifier::failing`]; tests read back the last code with
/// [`RecordingNotifier::last_code`].
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    fail: bool,
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// A notifier whose dispatches all succeed.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A notifier whose dispatches all fail with a transport error.
    /// The attempted (email, code) pairs are still recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// All (email, code) pairs dispatched so far, in order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// The code from the most recent dispatch, if any.
    pub fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        if self.fail {
            return Err(NotifyError::Transport {
                reason: "recording notifier configured to fail".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
