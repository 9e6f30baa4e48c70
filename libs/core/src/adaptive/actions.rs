use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::style::ActionStyle;

/// A user-triggerable command attached to a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "Action.Submit")]
    Submit(SubmitAction),
    #[serde(rename = "Action.OpenUrl")]
    OpenUrl(OpenUrlAction),
    #[serde(untagged)]
    Raw(Value),
}

impl Action {
    pub fn submit(title: impl Into<String>) -> SubmitAction {
        SubmitAction {
            title: title.into(),
            data: None,
            style: None,
        }
    }

    pub fn open_url(title: impl Into<String>, url: impl Into<String>) -> OpenUrlAction {
        OpenUrlAction {
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Action::Submit(_) => "Action.Submit",
            Action::OpenUrl(_) => "Action.OpenUrl",
            Action::Raw(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Action::Submit(action) => Some(action.title.as_str()),
            Action::OpenUrl(action) => Some(action.title.as_str()),
            Action::Raw(value) => value.get("title").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAction {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ActionStyle>,
}

impl SubmitAction {
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets a single entry in the submitted payload, creating it if needed.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn style(mut self, style: ActionStyle) -> Self {
        self.style = Some(style);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenUrlAction {
    pub title: String,
    pub url: String,
}

impl From<SubmitAction> for Action {
    fn from(value: SubmitAction) -> Self {
        Action::Submit(value)
    }
}

impl From<OpenUrlAction> for Action {
    fn from(value: OpenUrlAction) -> Self {
        Action::OpenUrl(value)
    }
}
