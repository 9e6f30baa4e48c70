use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::actions::Action;
use super::elements::Element;
use crate::error::{CardError, CardResult};

pub const DEFAULT_CARD_VERSION: &str = "1.5";
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6"];
pub const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";

/// Top level Adaptive Card document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "AdaptiveCard")]
pub struct AdaptiveCard {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub version: String,
    #[serde(default)]
    pub body: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl AdaptiveCard {
    /// Creates an empty card; `version` must be one of [`SUPPORTED_VERSIONS`].
    pub fn new(version: &str) -> CardResult<Self> {
        let version = version.trim();
        if !is_supported_version(version) {
            return Err(CardError::invalid(format!(
                "unsupported card version '{version}' (supported: {})",
                SUPPORTED_VERSIONS.join(", ")
            )));
        }
        Ok(Self {
            schema: Some(ADAPTIVE_CARD_SCHEMA.to_string()),
            version: version.to_string(),
            body: Vec::new(),
            actions: Vec::new(),
        })
    }

    pub fn push(&mut self, element: impl Into<Element>) -> &mut Self {
        self.body.push(element.into());
        self
    }

    pub fn push_action(&mut self, action: impl Into<Action>) -> &mut Self {
        self.actions.push(action.into());
        self
    }

    pub fn to_value(&self) -> CardResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Compact JSON, the form that is measured and delivered.
    pub fn to_json(&self) -> CardResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> CardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_value(value: Value) -> CardResult<Self> {
        match value.get("type").and_then(Value::as_str) {
            Some("AdaptiveCard") => Ok(serde_json::from_value(value)?),
            _ => Err(CardError::invalid("document is not an AdaptiveCard")),
        }
    }
}

impl Default for AdaptiveCard {
    fn default() -> Self {
        Self {
            schema: Some(ADAPTIVE_CARD_SCHEMA.to_string()),
            version: DEFAULT_CARD_VERSION.to_string(),
            body: Vec::new(),
            actions: Vec::new(),
        }
    }
}

pub fn is_supported_version(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Anything a template or builder can append card content to.
pub trait CardSink {
    fn append_body_element(&mut self, element: Element) -> CardResult<()>;
    fn append_action(&mut self, action: Action) -> CardResult<()>;
}

impl CardSink for AdaptiveCard {
    fn append_body_element(&mut self, element: Element) -> CardResult<()> {
        self.body.push(element);
        Ok(())
    }

    fn append_action(&mut self, action: Action) -> CardResult<()> {
        self.actions.push(action);
        Ok(())
    }
}

/// Raw card documents, as loaded from disk or produced by another library.
impl CardSink for Value {
    fn append_body_element(&mut self, element: Element) -> CardResult<()> {
        let element = serde_json::to_value(element)?;
        array_field(self, "body")?.push(element);
        Ok(())
    }

    fn append_action(&mut self, action: Action) -> CardResult<()> {
        let action = serde_json::to_value(action)?;
        array_field(self, "actions")?.push(action);
        Ok(())
    }
}

fn array_field<'a>(card: &'a mut Value, field: &str) -> CardResult<&'a mut Vec<Value>> {
    let object = card
        .as_object_mut()
        .ok_or_else(|| CardError::invalid("card document must be a JSON object"))?;
    object
        .entry(field)
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| CardError::invalid(format!("card field '{field}' must be an array")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::elements::TextBlock;
    use serde_json::json;

    #[test]
    fn serializes_card_envelope() {
        let mut card = AdaptiveCard::new("1.4").unwrap();
        card.push(TextBlock::new("hi"));
        let value = card.to_value().unwrap();
        assert_eq!(value["type"], "AdaptiveCard");
        assert_eq!(value["version"], "1.4");
        assert_eq!(value["$schema"], ADAPTIVE_CARD_SCHEMA);
        assert_eq!(value["body"][0]["text"], "hi");
        assert!(value.get("actions").is_none());
    }

    #[test]
    fn rejects_unknown_versions() {
        let err = AdaptiveCard::new("2.0").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn value_sink_appends_to_arrays() {
        let mut doc = json!({"type": "AdaptiveCard", "version": "1.5"});
        doc.append_body_element(TextBlock::new("one").into()).unwrap();
        doc.append_action(Action::open_url("Docs", "https://example.com").into())
            .unwrap();
        assert_eq!(doc["body"][0]["type"], "TextBlock");
        assert_eq!(doc["actions"][0]["type"], "Action.OpenUrl");

        let mut broken = json!({"body": "nope"});
        assert!(broken.append_body_element(TextBlock::new("x").into()).is_err());
    }

    #[test]
    fn from_value_requires_card_type() {
        let card = AdaptiveCard::from_value(json!({
            "type": "AdaptiveCard",
            "version": "1.5",
            "body": [{"type": "TextBlock", "text": "x"}]
        }))
        .unwrap();
        assert_eq!(card.body.len(), 1);
        assert!(AdaptiveCard::from_value(json!({"type": "Message"})).is_err());
    }
}
