use std::io::{self, Read};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Webhook replies are only surfaced in truncated error messages.
const MAX_RESPONSE_BODY_BYTES: u64 = 16 * 1024;

/// Raw HTTP outcome of a webhook POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Other(String),
}

/// Blocking JSON POST to a webhook.
pub trait WebhookTransport: Send + Sync {
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

pub struct ReqwestWebhookTransport {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestWebhookTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Other(err.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn with_client(client: reqwest::blocking::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl WebhookTransport for ReqwestWebhookTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .map_err(|err| classify(err, self.timeout))?;
        let status = response.status().as_u16();
        let body = read_body(response, self.timeout)?;
        Ok(TransportResponse { status, body })
    }
}

/// Reads at most [`MAX_RESPONSE_BODY_BYTES`]; a stalled body is a timeout.
fn read_body(reader: impl Read, timeout: Duration) -> Result<String, TransportError> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_RESPONSE_BODY_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|err| {
            if io_timed_out(&err) {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Other(format!("cannot read response body: {err}"))
            }
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn io_timed_out(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout)
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
