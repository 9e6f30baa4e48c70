//! Webhook delivery of finished cards.
//!
//! Every outcome, including pre-flight validation failures and transport errors, is
//! reported as a [`DeliveryResult`]; `send` never fails.

mod transport;

pub use transport::{ReqwestWebhookTransport, TransportError, TransportResponse, WebhookTransport};

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

use crate::adaptive::AdaptiveCard;
use crate::error::{CardError, CardResult};
use crate::validation::{TargetPlatform, ValidationResult, ValidationUtility};

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Shape of the POSTed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEnvelope {
    /// The card document itself.
    #[default]
    Card,
    /// A Teams `message` activity carrying the card as its only attachment.
    TeamsMessage,
}

impl PayloadEnvelope {
    pub fn wrap(&self, card: Value) -> Value {
        match self {
            PayloadEnvelope::Card => card,
            PayloadEnvelope::TeamsMessage => json!({
                "type": "message",
                "attachments": [{
                    "contentType": ADAPTIVE_CARD_CONTENT_TYPE,
                    "contentUrl": null,
                    "content": card,
                }]
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryConfig {
    pub webhook_url: Option<String>,
    pub target: TargetPlatform,
    pub timeout: Duration,
    pub envelope: PayloadEnvelope,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            target: TargetPlatform::default(),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            envelope: PayloadEnvelope::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl DeliveryResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: None,
            message: message.into(),
            validation: None,
        }
    }
}

pub struct DeliveryManager<T = ReqwestWebhookTransport> {
    webhook_url: Option<Url>,
    envelope: PayloadEnvelope,
    validator: ValidationUtility,
    transport: T,
}

impl DeliveryManager<ReqwestWebhookTransport> {
    pub fn new(config: DeliveryConfig) -> CardResult<Self> {
        let transport = ReqwestWebhookTransport::new(config.timeout)
            .map_err(|err| CardError::invalid(format!("cannot build HTTP client: {err}")))?;
        Self::with_transport(config, transport)
    }
}

impl<T: WebhookTransport> DeliveryManager<T> {
    pub fn with_transport(config: DeliveryConfig, transport: T) -> CardResult<Self> {
        let webhook_url = config.webhook_url.as_deref().map(parse_webhook_url).transpose()?;
        Ok(Self {
            webhook_url,
            envelope: config.envelope,
            validator: ValidationUtility::new(config.target),
            transport,
        })
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_ref().map(Url::as_str)
    }

    /// Replaces the destination; only absolute `http`/`https` URLs are accepted.
    pub fn set_webhook_url(&mut self, webhook_url: &str) -> CardResult<()> {
        self.webhook_url = Some(parse_webhook_url(webhook_url)?);
        Ok(())
    }

    pub fn validate_before_send(&self, card: &AdaptiveCard) -> CardResult<ValidationResult> {
        self.validator.validate(card)
    }

    pub fn send(&self, card: &AdaptiveCard, validate: bool) -> DeliveryResult {
        match card.to_value() {
            Ok(value) => self.send_json(&value, validate),
            Err(err) => DeliveryResult::failed(format!("Card serialization failed: {err}")),
        }
    }

    /// Same as [`Self::send`] for a card that only exists as JSON.
    pub fn send_json(&self, card: &Value, validate: bool) -> DeliveryResult {
        let Some(url) = self.webhook_url.as_ref() else {
            record_outcome("not_configured");
            return DeliveryResult::failed("No webhook URL configured");
        };

        let payload = self.envelope.wrap(card.clone());
        let mut validation = None;
        if validate {
            let checked = self.validator.validate_json(card).and_then(|mut result| {
                // The envelope adds bytes the host counts against the same limit.
                if self.envelope != PayloadEnvelope::Card {
                    if let Some(detail) = self.validator.check_payload_size(&payload)? {
                        result.details.push(detail);
                        result.valid = false;
                    }
                }
                Ok(result)
            });
            let result = match checked {
                Ok(result) => result,
                Err(err) => {
                    record_outcome("invalid");
                    return DeliveryResult::failed(format!("Card validation failed: {err}"));
                }
            };
            if !result.valid {
                warn!(failures = ?result.details, "card rejected before delivery");
                record_outcome("invalid");
                return DeliveryResult {
                    message: format!("Card validation failed: {}", result.summary()),
                    validation: Some(result),
                    ..DeliveryResult::failed("")
                };
            }
            validation = Some(result);
        }

        let started = Instant::now();
        let outcome = self.transport.post_json(url.as_str(), &payload);
        histogram!("cardkit_delivery_seconds").record(started.elapsed().as_secs_f64());

        let mut result = match outcome {
            Ok(response) if (200..300).contains(&response.status) => {
                info!(status = response.status, host = ?url.host_str(), "card delivered");
                record_outcome("delivered");
                DeliveryResult {
                    success: true,
                    status_code: Some(response.status),
                    message: "Card delivered successfully".to_string(),
                    validation: None,
                }
            }
            Ok(response) => {
                warn!(status = response.status, host = ?url.host_str(), "webhook rejected card");
                record_outcome("rejected");
                DeliveryResult {
                    success: false,
                    status_code: Some(response.status),
                    message: format!(
                        "Delivery failed with status {}: {}",
                        response.status,
                        truncate(&response.body)
                    ),
                    validation: None,
                }
            }
            Err(TransportError::Timeout(after)) => {
                warn!(timeout = ?after, host = ?url.host_str(), "webhook delivery timed out");
                record_outcome("timeout");
                DeliveryResult::failed(format!("Delivery timed out after {after:?}"))
            }
            Err(TransportError::Connect(reason)) => {
                warn!(%reason, host = ?url.host_str(), "webhook connection failed");
                record_outcome("connect_error");
                DeliveryResult::failed(format!("Delivery connection failed: {reason}"))
            }
            Err(TransportError::Other(reason)) => {
                warn!(%reason, host = ?url.host_str(), "webhook delivery failed");
                record_outcome("error");
                DeliveryResult::failed(format!("Delivery error: {reason}"))
            }
        };
        result.validation = validation;
        result
    }
}

fn parse_webhook_url(raw: &str) -> CardResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|err| CardError::invalid(format!("invalid webhook url '{raw}': {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CardError::invalid(format!(
            "webhook url must use http or https, got '{other}'"
        ))),
    }
}

fn record_outcome(outcome: &'static str) {
    counter!("cardkit_delivery_total", "outcome" => outcome).increment(1);
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::TextBlock;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Value)>>,
        reply: Mutex<Option<Result<TransportResponse, TransportError>>>,
    }

    impl RecordingTransport {
        fn replying(reply: Result<TransportResponse, TransportError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Mutex::new(Some(reply)),
            }
        }
    }

    impl WebhookTransport for RecordingTransport {
        fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone()));
            self.reply.lock().unwrap().take().unwrap_or(Ok(TransportResponse {
                status: 200,
                body: "1".into(),
            }))
        }
    }

    fn config(url: Option<&str>) -> DeliveryConfig {
        DeliveryConfig {
            webhook_url: url.map(str::to_string),
            ..DeliveryConfig::default()
        }
    }

    fn card() -> AdaptiveCard {
        let mut card = AdaptiveCard::default();
        card.push(TextBlock::new("hello").id("msg"));
        card
    }

    #[test]
    fn missing_url_is_reported() {
        let manager =
            DeliveryManager::with_transport(config(None), RecordingTransport::default()).unwrap();
        let result = manager.send(&card(), true);
        assert!(!result.success);
        assert_eq!(result.message, "No webhook URL configured");
    }

    #[test]
    fn webhook_urls_are_checked() {
        let bad = DeliveryManager::with_transport(
            config(Some("not a url")),
            RecordingTransport::default(),
        );
        assert!(bad.is_err());
        let mut manager =
            DeliveryManager::with_transport(config(None), RecordingTransport::default()).unwrap();
        assert!(manager.set_webhook_url("ftp://example.com/hook").is_err());
        manager.set_webhook_url("https://example.com/hook").unwrap();
        assert_eq!(manager.webhook_url(), Some("https://example.com/hook"));
    }

    #[test]
    fn invalid_card_is_never_posted() {
        let manager = DeliveryManager::with_transport(
            config(Some("https://example.com/hook")),
            RecordingTransport::default(),
        )
        .unwrap();
        let result = manager.send(&AdaptiveCard::default(), true);
        assert!(!result.success);
        assert!(result.message.starts_with("Card validation failed"));
        assert!(result.validation.is_some());
        assert!(manager.transport.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn successful_post_carries_validation() {
        let manager = DeliveryManager::with_transport(
            config(Some("https://example.com/hook")),
            RecordingTransport::default(),
        )
        .unwrap();
        let result = manager.send(&card(), true);
        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert!(result.validation.unwrap().valid);
        let calls = manager.transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "https://example.com/hook");
        assert_eq!(calls[0].1["type"], "AdaptiveCard");
    }

    #[test]
    fn teams_envelope_wraps_card() {
        let manager = DeliveryManager::with_transport(
            DeliveryConfig {
                envelope: PayloadEnvelope::TeamsMessage,
                ..config(Some("https://example.com/hook"))
            },
            RecordingTransport::default(),
        )
        .unwrap();
        assert!(manager.send(&card(), false).success);
        let calls = manager.transport.calls.lock().unwrap();
        let payload = &calls[0].1;
        assert_eq!(payload["type"], "message");
        assert_eq!(payload["attachments"][0]["contentType"], ADAPTIVE_CARD_CONTENT_TYPE);
        assert_eq!(payload["attachments"][0]["content"]["type"], "AdaptiveCard");
    }

    #[test]
    fn teams_envelope_counts_toward_the_size_limit() {
        let mut card = card();
        let base = serde_json::to_vec(&card.to_value().unwrap()).unwrap().len();
        let limit = (TargetPlatform::Teams.size_limit_kb() * 1024.0) as usize;
        card.push(TextBlock::new("x".repeat(limit - base - 64)));
        assert!(ValidationUtility::new(TargetPlatform::Teams).validate(&card).unwrap().valid);

        let bare = DeliveryManager::with_transport(
            config(Some("https://example.com/hook")),
            RecordingTransport::default(),
        )
        .unwrap();
        assert!(bare.send(&card, true).success);

        let wrapped = DeliveryManager::with_transport(
            DeliveryConfig {
                envelope: PayloadEnvelope::TeamsMessage,
                ..config(Some("https://example.com/hook"))
            },
            RecordingTransport::default(),
        )
        .unwrap();
        let result = wrapped.send(&card, true);
        assert!(!result.success);
        assert!(result.message.starts_with("Card validation failed"));
        let validation = result.validation.unwrap();
        assert!(!validation.valid);
        assert!(validation.details.iter().any(|d| d.contains("payload size")));
        assert!(wrapped.transport.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn non_success_status_keeps_truncated_body() {
        let manager = DeliveryManager::with_transport(
            config(Some("https://example.com/hook")),
            RecordingTransport::replying(Ok(TransportResponse {
                status: 400,
                body: "e".repeat(2000),
            })),
        )
        .unwrap();
        let result = manager.send(&card(), false);
        assert!(!result.success);
        assert_eq!(result.status_code, Some(400));
        assert!(result.message.starts_with("Delivery failed with status 400: "));
        assert!(result.message.len() < 600);
    }

    #[test]
    fn timeouts_and_connect_errors_differ() {
        let timed_out = DeliveryManager::with_transport(
            config(Some("https://example.com/hook")),
            RecordingTransport::replying(Err(TransportError::Timeout(Duration::from_secs(5)))),
        )
        .unwrap()
        .send(&card(), false);
        let refused = DeliveryManager::with_transport(
            config(Some("https://example.com/hook")),
            RecordingTransport::replying(Err(TransportError::Connect("refused".into()))),
        )
        .unwrap()
        .send(&card(), false);
        assert!(timed_out.message.contains("timed out"));
        assert!(refused.message.contains("connection failed"));
        assert_eq!(timed_out.status_code, None);
    }
}
