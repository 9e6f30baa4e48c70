use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adaptive::{
    Action, AdaptiveCard, CardSink, DEFAULT_CARD_VERSION, Element, FontSize, FontWeight, Image,
    TextBlock,
};
use crate::error::{CardResult, require_non_empty};

/// Fluent card assembly.
///
/// ```
/// use cardkit_core::{CardBuilder, TextBlock};
///
/// let card = CardBuilder::new()
///     .version("1.4")
///     .add_item(TextBlock::new("Deploy finished"))
///     .build()
///     .unwrap();
/// assert_eq!(card.version, "1.4");
/// assert_eq!(card.body.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CardBuilder {
    version: String,
    body: Vec<Element>,
    actions: Vec<Action>,
}

impl Default for CardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CardBuilder {
    pub fn new() -> Self {
        Self {
            version: DEFAULT_CARD_VERSION.to_string(),
            body: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn add_item(mut self, element: impl Into<Element>) -> Self {
        self.body.push(element.into());
        self
    }

    pub fn add_items<I, E>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        self.body.extend(elements.into_iter().map(Into::into));
        self
    }

    pub fn add_action(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Appends the collected content to any [`CardSink`].
    pub fn write_to<S: CardSink + ?Sized>(self, sink: &mut S) -> CardResult<()> {
        for element in self.body {
            sink.append_body_element(element)?;
        }
        for action in self.actions {
            sink.append_action(action)?;
        }
        Ok(())
    }

    /// Fails when the configured version is not a supported schema version.
    pub fn build(self) -> CardResult<AdaptiveCard> {
        let mut card = AdaptiveCard::new(&self.version)?;
        self.write_to(&mut card)?;
        Ok(card)
    }

    /// Large bold title, wrapped message and an optional image.
    pub fn basic_card(
        title: &str,
        message: &str,
        image_url: Option<&str>,
    ) -> CardResult<AdaptiveCard> {
        Self::basic(title, message, image_url)?.build()
    }

    pub fn action_card(
        title: &str,
        message: &str,
        actions: &[ActionSpec],
        image_url: Option<&str>,
    ) -> CardResult<AdaptiveCard> {
        let mut builder = Self::basic(title, message, image_url)?;
        for spec in actions {
            builder = builder.add_action(spec.to_action()?);
        }
        builder.build()
    }

    fn basic(title: &str, message: &str, image_url: Option<&str>) -> CardResult<Self> {
        require_non_empty("title", title)?;
        require_non_empty("message", message)?;
        let mut builder = Self::new()
            .add_item(
                TextBlock::new(title)
                    .size(FontSize::Large)
                    .weight(FontWeight::Bolder)
                    .wrap(true),
            )
            .add_item(TextBlock::new(message).wrap(true));
        if let Some(url) = image_url.filter(|url| !url.trim().is_empty()) {
            builder = builder.add_item(Image::new(url).alt_text(title));
        }
        Ok(builder)
    }
}

/// Loosely specified action, as accepted from agents and JSON inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    OpenUrl {
        title: String,
        url: String,
    },
    Submit {
        title: String,
        #[serde(default)]
        data: Option<Map<String, Value>>,
    },
}

impl ActionSpec {
    pub fn to_action(&self) -> CardResult<Action> {
        match self {
            ActionSpec::OpenUrl { title, url } => {
                require_non_empty("action title", title)?;
                require_non_empty("action url", url)?;
                Ok(Action::open_url(title.as_str(), url.as_str()).into())
            }
            ActionSpec::Submit { title, data } => {
                require_non_empty("action title", title)?;
                let mut action = Action::submit(title.as_str());
                action.data = data.clone();
                Ok(action.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_rejects_bad_version_at_build() {
        let err = CardBuilder::new().version("9.9").build().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn builder_writes_into_raw_documents() {
        let mut doc = json!({"type": "AdaptiveCard", "version": "1.5", "body": []});
        CardBuilder::new()
            .add_items([TextBlock::new("a"), TextBlock::new("b")])
            .add_action(Action::submit("Go"))
            .write_to(&mut doc)
            .unwrap();
        assert_eq!(doc["body"].as_array().unwrap().len(), 2);
        assert_eq!(doc["actions"][0]["title"], "Go");
    }

    #[test]
    fn basic_card_layout() {
        let card = CardBuilder::basic_card("Title", "Body", Some("https://x/y.png")).unwrap();
        assert_eq!(card.body.len(), 3);
        assert_eq!(card.body[2].type_name(), "Image");
        assert!(CardBuilder::basic_card("", "Body", None).is_err());
    }

    #[test]
    fn action_card_maps_specs() {
        let specs: Vec<ActionSpec> = serde_json::from_value(json!([
            {"type": "open_url", "title": "Docs", "url": "https://docs"},
            {"type": "submit", "title": "Ack", "data": {"ack": true}}
        ]))
        .unwrap();
        let card = CardBuilder::action_card("T", "M", &specs, None).unwrap();
        let kinds: Vec<_> = card.actions.iter().map(Action::type_name).collect();
        assert_eq!(kinds, vec!["Action.OpenUrl", "Action.Submit"]);
    }
}
