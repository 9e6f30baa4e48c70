//! Natural-language card generation through an LLM with function tools.
//!
//! The model only ever chooses a [`CardRequest`]; cards are always assembled locally by
//! the template and factory code and validated before they are handed back or sent.

mod client;
mod request;

pub use client::{CompletionClient, OpenAiClient};
pub use request::{
    ArticleArgs, CardRequest, ConfirmationArgs, CustomArgs, CustomElement, DashboardArgs,
    DataFormat, FormArgs, NotificationArgs, VisualizeArgs, tool_definitions,
};

use std::time::Duration;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::adaptive::AdaptiveCard;
use crate::delivery::{DeliveryManager, DeliveryResult, WebhookTransport};
use crate::error::CardError;
use crate::validation::{ValidationResult, ValidationUtility};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are an Adaptive Card design expert. Turn the user's request \
into exactly one call to the provided card tools: a template (notification, form, article, \
dashboard, confirmation), a custom card, or a data visualization. Keep cards concise, \
accessible and focused. Add a one-sentence explanation of your design choice.";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generator configuration error: {0}")]
    Config(String),
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),
    #[error("completion API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("model did not select a card tool")]
    NoToolCall,
    #[error("malformed model output: {0}")]
    Malformed(String),
    #[error(transparent)]
    Card(#[from] CardError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_GENERATOR_TIMEOUT,
        }
    }

    fn check(&self) -> Result<(), GenerateError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerateError::Config(
                "an API key is required (set OPENAI_API_KEY)".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(GenerateError::Config("model must not be empty".into()));
        }
        Ok(())
    }
}

/// Outcome of one generation round.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCard {
    pub card: AdaptiveCard,
    pub validation: ValidationResult,
    /// Free text the model returned next to its tool call.
    pub explanation: String,
    pub tool: &'static str,
}

pub struct AdaptiveCardGenerator<C = OpenAiClient> {
    model: String,
    client: C,
    validator: ValidationUtility,
}

impl AdaptiveCardGenerator<OpenAiClient> {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.check()?;
        let client = OpenAiClient::new(&config.base_url, &config.api_key, config.timeout)?;
        Self::with_client(config, client)
    }
}

impl<C: CompletionClient> AdaptiveCardGenerator<C> {
    pub fn with_client(config: GeneratorConfig, client: C) -> Result<Self, GenerateError> {
        config.check()?;
        Ok(Self {
            model: config.model,
            client,
            validator: ValidationUtility::default(),
        })
    }

    /// Validates generated cards against `validator`'s target instead of Teams.
    pub fn with_validator(mut self, validator: ValidationUtility) -> Self {
        self.validator = validator;
        self
    }

    /// One completion round; the first tool call decides the card. No retries.
    pub fn generate(&self, prompt: &str) -> Result<GeneratedCard, GenerateError> {
        if prompt.trim().is_empty() {
            return Err(CardError::invalid("prompt must not be empty").into());
        }
        let request = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "tools": tool_definitions(),
            "tool_choice": "required",
        });
        let response = self.client.complete(&request)?;

        let message = response
            .pointer("/choices/0/message")
            .ok_or_else(|| GenerateError::Malformed("response has no choices".into()))?;
        let explanation = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let call = message
            .pointer("/tool_calls/0/function")
            .ok_or(GenerateError::NoToolCall)?;
        let name = call
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GenerateError::Malformed("tool call has no name".into()))?;
        let arguments = match call.get("arguments") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => "{}".to_string(),
        };

        let request = CardRequest::from_tool_call(name, &arguments)?;
        debug!(tool = request.tool_name(), "model selected card tool");
        let card = request.render()?;
        let validation = self.validator.validate(&card)?;
        Ok(GeneratedCard {
            card,
            validation,
            explanation,
            tool: request.tool_name(),
        })
    }

    /// Generates a card and delivers it with validation enforced.
    pub fn generate_and_send<T: WebhookTransport>(
        &self,
        prompt: &str,
        delivery: &DeliveryManager<T>,
    ) -> Result<(GeneratedCard, DeliveryResult), GenerateError> {
        let generated = self.generate(prompt)?;
        let delivered = delivery.send(&generated.card, true);
        Ok((generated, delivered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedClient {
        reply: Value,
        seen: Mutex<Vec<Value>>,
    }

    impl ScriptedClient {
        fn new(reply: Value) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for ScriptedClient {
        fn complete(&self, request: &Value) -> Result<Value, GenerateError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn tool_reply(name: &str, arguments: Value) -> Value {
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "A confirmation keeps it simple.",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": name, "arguments": arguments.to_string()}
                    }]
                }
            }]
        })
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = AdaptiveCardGenerator::with_client(
            GeneratorConfig::new(""),
            ScriptedClient::new(Value::Null),
        )
        .err()
        .unwrap();
        assert!(matches!(err, GenerateError::Config(_)));
    }

    #[test]
    fn tool_call_becomes_validated_card() {
        let client = ScriptedClient::new(tool_reply(
            "create_confirmation_card",
            json!({"title": "Restart?", "message": "The service will be down briefly"}),
        ));
        let generator =
            AdaptiveCardGenerator::with_client(GeneratorConfig::new("sk-test"), client).unwrap();
        let generated = generator.generate("ask me before restarting").unwrap();
        assert_eq!(generated.tool, "create_confirmation_card");
        assert_eq!(generated.card.actions.len(), 2);
        assert!(generated.validation.valid);
        assert_eq!(generated.explanation, "A confirmation keeps it simple.");

        let seen = generator.client.seen.lock().unwrap();
        assert_eq!(seen[0]["model"], DEFAULT_MODEL);
        assert_eq!(seen[0]["tool_choice"], "required");
        assert_eq!(seen[0]["messages"][1]["content"], "ask me before restarting");
    }

    #[test]
    fn plain_text_answers_are_no_tool_call() {
        let client = ScriptedClient::new(json!({
            "choices": [{"message": {"role": "assistant", "content": "Sure!"}}]
        }));
        let generator =
            AdaptiveCardGenerator::with_client(GeneratorConfig::new("k"), client).unwrap();
        assert!(matches!(generator.generate("hi"), Err(GenerateError::NoToolCall)));
    }

    #[test]
    fn template_errors_surface_as_card_errors() {
        let client = ScriptedClient::new(tool_reply(
            "create_form_card",
            json!({"title": "F", "fields": [{"type": "slider", "id": "x", "label": "X"}]}),
        ));
        let generator =
            AdaptiveCardGenerator::with_client(GeneratorConfig::new("k"), client).unwrap();
        assert!(matches!(generator.generate("form"), Err(GenerateError::Card(_))));
    }
}
