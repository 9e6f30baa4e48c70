use std::env;
use std::time::Duration;

use crate::delivery::{DEFAULT_DELIVERY_TIMEOUT, DeliveryConfig, PayloadEnvelope};
use crate::error::{CardError, CardResult};
use crate::generator::{DEFAULT_BASE_URL, DEFAULT_GENERATOR_TIMEOUT, DEFAULT_MODEL, GeneratorConfig};
use crate::validation::TargetPlatform;

pub const ENV_TARGET: &str = "CARDKIT_TARGET";
pub const ENV_WEBHOOK_URL: &str = "CARDKIT_WEBHOOK_URL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "CARDKIT_OPENAI_MODEL";
pub const ENV_BASE_URL: &str = "CARDKIT_OPENAI_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CARDKIT_HTTP_TIMEOUT_SECS";

/// Toolkit-wide settings, explicitly constructed and passed to the components.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitConfig {
    pub target: TargetPlatform,
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Overrides both the delivery and the generator timeout when set.
    pub timeout: Option<Duration>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            target: TargetPlatform::default(),
            webhook_url: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ToolkitConfig {
    pub fn from_env() -> CardResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> CardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        let target = get(ENV_TARGET)
            .map(|value| value.parse::<TargetPlatform>())
            .transpose()?
            .unwrap_or(defaults.target);
        let timeout = get(ENV_TIMEOUT_SECS)
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        CardError::invalid(format!(
                            "{ENV_TIMEOUT_SECS} must be a positive number of seconds, got '{value}'"
                        ))
                    })
            })
            .transpose()?;

        Ok(Self {
            target,
            webhook_url: get(ENV_WEBHOOK_URL),
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or(defaults.model),
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            timeout,
        })
    }

    pub fn delivery(&self) -> DeliveryConfig {
        DeliveryConfig {
            webhook_url: self.webhook_url.clone(),
            target: self.target,
            timeout: self.timeout.unwrap_or(DEFAULT_DELIVERY_TIMEOUT),
            envelope: PayloadEnvelope::default(),
        }
    }

    /// Fails when no API key is configured.
    pub fn generator(&self) -> CardResult<GeneratorConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| CardError::invalid(format!("{ENV_API_KEY} is not set")))?;
        Ok(GeneratorConfig {
            api_key,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout.unwrap_or(DEFAULT_GENERATOR_TIMEOUT),
        })
    }
}
