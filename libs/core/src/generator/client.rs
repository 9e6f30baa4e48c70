use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde_json::Value;

use super::GenerateError;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Blocking chat-completion endpoint.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &Value) -> Result<Value, GenerateError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GenerateError::Config(format!("cannot build HTTP client: {err}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            timeout,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &Value) -> Result<Value, GenerateError> {
        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|err| {
                counter!("cardkit_generator_errors_total", "kind" => "transport").increment(1);
                if err.is_timeout() {
                    GenerateError::Timeout(self.timeout)
                } else {
                    GenerateError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        histogram!(
            "cardkit_generator_roundtrip_seconds",
            "status" => status.as_str().to_string()
        )
        .record(started.elapsed().as_secs_f64());

        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable>".into());
            counter!("cardkit_generator_errors_total", "kind" => "remote").increment(1);
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response.json::<Value>().map_err(|err| {
            counter!("cardkit_generator_errors_total", "kind" => "decode").increment(1);
            GenerateError::Malformed(format!("completion response is not JSON: {err}"))
        })
    }
}
