use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::style::{
    ChoiceInputStyle, Color, ColumnWidth, ContainerStyle, FontSize, FontType, FontWeight,
    ImageSize, ImageStyle, Spacing, VerticalAlignment,
};

/// One body element of an Adaptive Card.
///
/// The recognised element types are modelled as typed variants; anything else is kept
/// verbatim in [`Element::Raw`] so that payloads produced elsewhere survive a round trip.
/// Each element struct writes its own `type` discriminant, so a struct serialized on its
/// own and the same struct inside an `Element` produce identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Element {
    TextBlock(TextBlock),
    Image(Image),
    FactSet(FactSet),
    InputText(TextInput),
    InputDate(DateInput),
    InputChoiceSet(ChoiceSet),
    Column(Column),
    ColumnSet(ColumnSet),
    Container(Container),
    Raw(Value),
}

impl<'de> Deserialize<'de> for Element {
    /// Dispatches on `type`. Unknown types, and known types whose fields do not fit the
    /// typed model, are kept as [`Element::Raw`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let element = match value.get("type").and_then(Value::as_str) {
            Some("TextBlock") => typed::<TextBlock>(&value),
            Some("Image") => typed::<Image>(&value),
            Some("FactSet") => typed::<FactSet>(&value),
            Some("Input.Text") => typed::<TextInput>(&value),
            Some("Input.Date") => typed::<DateInput>(&value),
            Some("Input.ChoiceSet") => typed::<ChoiceSet>(&value),
            Some("Column") => typed::<Column>(&value),
            Some("ColumnSet") => typed::<ColumnSet>(&value),
            Some("Container") => typed::<Container>(&value),
            _ => None,
        };
        Ok(element.unwrap_or(Element::Raw(value)))
    }
}

fn typed<T>(value: &Value) -> Option<Element>
where
    T: DeserializeOwned + Into<Element>,
{
    T::deserialize(value).ok().map(Into::into)
}

impl Element {
    /// Schema discriminant of the element (`"TextBlock"`, `"Input.Text"`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            Element::TextBlock(_) => "TextBlock",
            Element::Image(_) => "Image",
            Element::FactSet(_) => "FactSet",
            Element::InputText(_) => "Input.Text",
            Element::InputDate(_) => "Input.Date",
            Element::InputChoiceSet(_) => "Input.ChoiceSet",
            Element::Column(_) => "Column",
            Element::ColumnSet(_) => "ColumnSet",
            Element::Container(_) => "Container",
            Element::Raw(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Element::TextBlock(el) => el.id.as_deref(),
            Element::Image(el) => el.id.as_deref(),
            Element::FactSet(el) => el.id.as_deref(),
            Element::InputText(el) => Some(el.id.as_str()),
            Element::InputDate(el) => Some(el.id.as_str()),
            Element::InputChoiceSet(el) => Some(el.id.as_str()),
            Element::Column(el) => el.id.as_deref(),
            Element::ColumnSet(el) => el.id.as_deref(),
            Element::Container(el) => el.id.as_deref(),
            Element::Raw(value) => value.get("id").and_then(Value::as_str),
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Element::Column(column) => Some(column),
            _ => None,
        }
    }
}

macro_rules! element_from {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    Element::$variant(value)
                }
            }
        )+
    };
}

element_from! {
    TextBlock => TextBlock,
    Image => Image,
    FactSet => FactSet,
    TextInput => InputText,
    DateInput => InputDate,
    ChoiceSet => InputChoiceSet,
    Column => Column,
    ColumnSet => ColumnSet,
    Container => Container,
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Element::Raw(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "TextBlock", rename_all = "camelCase")]
pub struct TextBlock {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FontSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_subtle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_type: Option<FontType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: None,
            weight: None,
            color: None,
            is_subtle: None,
            wrap: None,
            font_type: None,
            spacing: None,
            separator: None,
            id: None,
        }
    }

    pub fn size(mut self, size: FontSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Marks the text as subtle; `false` clears the attribute.
    pub fn subtle(mut self, is_subtle: bool) -> Self {
        self.is_subtle = is_subtle.then_some(true);
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = Some(wrap);
        self
    }

    pub fn font_type(mut self, font_type: FontType) -> Self {
        self.font_type = Some(font_type);
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn separator(mut self, separator: bool) -> Self {
        self.separator = separator.then_some(true);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Image", rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ImageStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Image {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: None,
            size: None,
            style: None,
            spacing: None,
            separator: None,
            id: None,
        }
    }

    pub fn alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    pub fn size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn separator(mut self, separator: bool) -> Self {
        self.separator = separator.then_some(true);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FactSet", rename_all = "camelCase")]
pub struct FactSet {
    pub facts: Vec<Fact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl FactSet {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self {
            facts,
            spacing: None,
            separator: None,
            id: None,
        }
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Input.Text", rename_all = "camelCase")]
pub struct TextInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_multiline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
}

impl TextInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            placeholder: None,
            is_required: false,
            is_multiline: false,
            max_length: None,
            error_message: None,
            spacing: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn multiline(mut self, is_multiline: bool) -> Self {
        self.is_multiline = is_multiline;
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Input.Date", rename_all = "camelCase")]
pub struct DateInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl DateInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            placeholder: None,
            is_required: false,
            min: None,
            max: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    /// Earliest selectable date, `YYYY-MM-DD`.
    pub fn min(mut self, min: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<String>) -> Self {
        self.max = Some(max.into());
        self
    }
}

/// A selectable option of an `Input.ChoiceSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub title: String,
    pub value: String,
}

impl Choice {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Input.ChoiceSet", rename_all = "camelCase")]
pub struct ChoiceSet {
    pub id: String,
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_multi_select: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ChoiceInputStyle>,
}

impl ChoiceSet {
    pub fn new(id: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            id: id.into(),
            choices,
            label: None,
            placeholder: None,
            is_required: false,
            is_multi_select: false,
            style: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn multi_select(mut self, is_multi_select: bool) -> Self {
        self.is_multi_select = is_multi_select;
        self
    }

    pub fn style(mut self, style: ChoiceInputStyle) -> Self {
        self.style = Some(style);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Column", rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub items: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<ColumnWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ContainerStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_content_alignment: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Column {
    pub fn new(items: Vec<Element>) -> Self {
        Self {
            items,
            width: None,
            style: None,
            vertical_content_alignment: None,
            spacing: None,
            separator: None,
            id: None,
        }
    }

    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn vertical_content_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_content_alignment = Some(alignment);
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Horizontal arrangement of columns.
///
/// `columns` holds [`Element`]s so that foreign payloads load unchanged; the layout
/// helpers only ever place [`Element::Column`] values here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ColumnSet", rename_all = "camelCase")]
pub struct ColumnSet {
    #[serde(default)]
    pub columns: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ContainerStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ColumnSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: columns.into_iter().map(Element::Column).collect(),
            style: None,
            spacing: None,
            separator: None,
            id: None,
        }
    }

    pub fn style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn separator(mut self, separator: bool) -> Self {
        self.separator = separator.then_some(true);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Container", rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub items: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ContainerStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Container {
    pub fn new(items: Vec<Element>) -> Self {
        Self {
            items,
            style: None,
            spacing: None,
            separator: None,
            bleed: None,
            id: None,
        }
    }

    pub fn style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn maybe_style(mut self, style: Option<ContainerStyle>) -> Self {
        self.style = style;
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn separator(mut self, separator: bool) -> Self {
        self.separator = separator.then_some(true);
        self
    }

    pub fn bleed(mut self, bleed: bool) -> Self {
        self.bleed = bleed.then_some(true);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
