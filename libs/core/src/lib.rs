//! Cardkit core: building, validating and delivering Adaptive Cards.
//!
//! Factories, layout helpers and the data connector produce typed [`Element`]s; templates
//! and the [`CardBuilder`] assemble them into an [`AdaptiveCard`]; [`ValidationUtility`]
//! checks the finished document against a host's limits and [`DeliveryManager`] posts it
//! to a webhook. [`AdaptiveCardGenerator`] lets an LLM pick the template.
pub mod adaptive;
pub mod builder;
pub mod config;
pub mod data_connector;
pub mod delivery;
pub mod element_factory;
pub mod error;
pub mod generator;
pub mod layout;
pub mod templates;
pub mod validation;

pub use adaptive::*;
pub use builder::{ActionSpec, CardBuilder};
pub use config::ToolkitConfig;
pub use data_connector::{DataConnector, MAX_JSON_DEPTH};
pub use delivery::{
    DeliveryConfig, DeliveryManager, DeliveryResult, PayloadEnvelope, ReqwestWebhookTransport,
    TransportError, TransportResponse, WebhookTransport,
};
pub use element_factory::{ChoiceSource, ElementFactory, TextOptions};
pub use error::{CardError, CardResult};
pub use generator::{
    AdaptiveCardGenerator, CardRequest, CompletionClient, GenerateError, GeneratedCard,
    GeneratorConfig, OpenAiClient,
};
pub use layout::LayoutHelper;
pub use templates::{FormField, NotificationLevel, TemplateFactory};
pub use validation::{TargetPlatform, ValidationResult, ValidationUtility};

/// Crate version, as reported by the CLI.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
