//! Whole-card templates for recurring scenarios.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adaptive::{
    Action, ActionStyle, AdaptiveCard, Color, ColumnWidth, Container, ContainerStyle, Element,
    ImageSize, Spacing, TextBlock,
};
use crate::builder::CardBuilder;
use crate::data_connector::DataConnector;
use crate::element_factory::{ChoiceSource, ElementFactory, TextOptions};
use crate::error::{CardError, CardResult, require_non_empty};
use crate::layout::LayoutHelper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Success,
    Danger,
}

impl NotificationLevel {
    pub const ALL: [NotificationLevel; 4] = [
        NotificationLevel::Info,
        NotificationLevel::Warning,
        NotificationLevel::Success,
        NotificationLevel::Danger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Success => "success",
            NotificationLevel::Danger => "danger",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NotificationLevel::Info => Color::Accent,
            NotificationLevel::Warning => Color::Warning,
            NotificationLevel::Success => Color::Good,
            NotificationLevel::Danger => Color::Attention,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ️",
            NotificationLevel::Warning => "⚠️",
            NotificationLevel::Success => "✅",
            NotificationLevel::Danger => "⛔",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationLevel {
    type Err = CardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                CardError::invalid(format!(
                    "unsupported notification level '{value}' \
                     (expected info, warning, success or danger)"
                ))
            })
    }
}

/// One input of a form card.
///
/// `field_type` is matched case-insensitively against `text`, `date` and `choice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Vec<Value>,
    #[serde(default)]
    pub multi_select: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl FormField {
    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new("text", id, label)
    }

    pub fn date(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new("date", id, label)
    }

    pub fn choice(id: impl Into<String>, label: impl Into<String>, choices: Vec<Value>) -> Self {
        Self {
            choices,
            ..Self::new("choice", id, label)
        }
    }

    pub fn new(
        field_type: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            field_type: field_type.into(),
            id: id.into(),
            label: Some(label.into()),
            placeholder: None,
            required: false,
            choices: Vec::new(),
            multi_select: false,
            max_length: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    fn input(&self) -> CardResult<Element> {
        let placeholder = self.placeholder.as_deref();
        match self.field_type.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ElementFactory::create_text_input(
                &self.id,
                placeholder,
                self.required,
                self.max_length,
            )?
            .into()),
            "date" => {
                Ok(ElementFactory::create_date_input(&self.id, placeholder, self.required)?.into())
            }
            "choice" => Ok(ElementFactory::create_choice_set(
                &self.id,
                self.choices.iter().cloned().map(ChoiceSource::Raw),
                placeholder,
                self.required,
                self.multi_select,
            )?
            .into()),
            other => Err(CardError::invalid(format!(
                "unsupported form field type '{other}' for field '{}'",
                self.id
            ))),
        }
    }
}

pub struct TemplateFactory;

impl TemplateFactory {
    /// Title, colored message and an optional "View Details" link.
    ///
    /// With an icon the title shares a row with a small image; without one the title is
    /// prefixed by the level's glyph.
    pub fn create_notification_card(
        title: &str,
        message: &str,
        level: NotificationLevel,
        icon_url: Option<&str>,
        action_url: Option<&str>,
    ) -> CardResult<AdaptiveCard> {
        require_non_empty("message", message)?;
        let mut builder = CardBuilder::new();
        builder = match present(icon_url) {
            Some(icon) => {
                let heading = ElementFactory::create_heading(title, 2)?;
                let image = ElementFactory::create_image(
                    icon,
                    &format!("{level} icon"),
                    Some(ImageSize::Small),
                    None,
                )?;
                builder.add_item(LayoutHelper::create_two_column_layout(
                    vec![heading.into()],
                    vec![image.into()],
                    Some(ColumnWidth::Stretch),
                    Some(ColumnWidth::Auto),
                ))
            }
            None => {
                require_non_empty("title", title)?;
                builder.add_item(ElementFactory::create_heading(
                    &format!("{} {}", level.glyph(), title.trim()),
                    2,
                )?)
            }
        };
        builder = builder.add_item(ElementFactory::create_text(
            message,
            TextOptions::default().color(level.color()),
        )?);
        if let Some(url) = present(action_url) {
            builder = builder.add_action(Action::open_url("View Details", url));
        }
        builder.build()
    }

    /// Heading, optional subtitle, then a label and input per field in order. Fields
    /// without a label are labelled with their id.
    pub fn create_form_card(
        title: &str,
        subtitle: Option<&str>,
        fields: &[FormField],
        submit_label: &str,
    ) -> CardResult<AdaptiveCard> {
        require_non_empty("submit label", submit_label)?;
        let mut builder = CardBuilder::new().add_item(ElementFactory::create_heading(title, 1)?);
        if let Some(subtitle) = present(subtitle) {
            builder = builder
                .add_item(ElementFactory::create_text(subtitle, TextOptions::default().subtle())?);
        }
        for field in fields {
            let input = field.input()?;
            let label = present(field.label.as_deref()).unwrap_or(field.id.as_str());
            builder = builder
                .add_item(TextBlock::new(label).wrap(true).spacing(Spacing::Medium))
                .add_item(input);
        }
        let form_id = title.trim().to_lowercase().replace(' ', "_");
        builder
            .add_action(Action::submit(submit_label).with_data("form_id", form_id))
            .build()
    }

    pub fn create_article_card(
        title: &str,
        content: &str,
        image_url: Option<&str>,
        author: Option<&str>,
        date: Option<&str>,
        action_url: Option<&str>,
    ) -> CardResult<AdaptiveCard> {
        require_non_empty("content", content)?;
        let mut builder = CardBuilder::new();
        if let Some(url) = present(image_url) {
            let image = ElementFactory::create_image(url, title, Some(ImageSize::Large), None)?;
            builder = builder.add_item(image);
        }
        builder = builder.add_item(ElementFactory::create_heading(title, 1)?);
        let byline = match (present(author), present(date)) {
            (Some(author), Some(date)) => Some(format!("By {author} | {date}")),
            (Some(author), None) => Some(format!("By {author}")),
            (None, Some(date)) => Some(date.to_string()),
            (None, None) => None,
        };
        if let Some(byline) = byline {
            builder = builder.add_item(TextBlock::new(byline).subtle(true).spacing(Spacing::Small));
        }
        builder = builder.add_item(TextBlock::new(content).wrap(true).spacing(Spacing::Medium));
        if let Some(url) = present(action_url) {
            builder = builder.add_action(Action::open_url("Read More", url));
        }
        builder.build()
    }

    /// Emphasised header, optional description, a fact per metric and an optional chart.
    pub fn create_dashboard_card<I, K, V>(
        title: &str,
        metrics: I,
        description: Option<&str>,
        chart_image_url: Option<&str>,
    ) -> CardResult<AdaptiveCard>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let header = Container::new(vec![ElementFactory::create_heading(title, 1)?.into()])
            .style(ContainerStyle::Emphasis)
            .bleed(true);
        let mut builder = CardBuilder::new().add_item(header);
        if let Some(description) = present(description) {
            builder =
                builder.add_item(TextBlock::new(description).wrap(true).spacing(Spacing::Medium));
        }
        builder = builder.add_item(DataConnector::create_fact_set(metrics));
        if let Some(url) = present(chart_image_url) {
            let chart = ElementFactory::create_image(url, "Chart", Some(ImageSize::Large), None)?;
            builder = builder.add_item(chart.separator(true));
        }
        builder.build()
    }

    pub fn create_confirmation_card(
        title: &str,
        message: &str,
        confirm_button_text: &str,
        cancel_button_text: &str,
    ) -> CardResult<AdaptiveCard> {
        Self::create_confirmation_card_with_data(
            title,
            message,
            confirm_button_text,
            cancel_button_text,
            Map::new(),
        )
    }

    /// Like [`Self::create_confirmation_card`], merging `action_data` into the confirm payload.
    pub fn create_confirmation_card_with_data(
        title: &str,
        message: &str,
        confirm_button_text: &str,
        cancel_button_text: &str,
        action_data: Map<String, Value>,
    ) -> CardResult<AdaptiveCard> {
        require_non_empty("confirm button text", confirm_button_text)?;
        require_non_empty("cancel button text", cancel_button_text)?;
        require_non_empty("message", message)?;
        let mut confirm_data = Map::new();
        confirm_data.insert("action".to_string(), Value::from("confirm"));
        confirm_data.extend(action_data);

        CardBuilder::new()
            .add_item(ElementFactory::create_heading(title, 1)?)
            .add_item(TextBlock::new(message).wrap(true).spacing(Spacing::Medium))
            .add_action(
                Action::submit(confirm_button_text)
                    .data(confirm_data)
                    .style(ActionStyle::Positive),
            )
            .add_action(
                Action::submit(cancel_button_text)
                    .with_data("action", "cancel")
                    .style(ActionStyle::Default),
            )
            .build()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
