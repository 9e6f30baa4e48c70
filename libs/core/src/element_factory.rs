//! Single-element constructors with host-friendly defaults.

use serde_json::Value;

use crate::adaptive::{
    Choice, ChoiceSet, Color, Column, ColumnWidth, DateInput, Element, FontSize, FontWeight,
    Image, ImageSize, ImageStyle, TextBlock, TextInput,
};
use crate::error::{CardError, CardResult, require_non_empty};

/// Optional presentation attributes for [`ElementFactory::create_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub weight: Option<FontWeight>,
    pub color: Option<Color>,
    pub size: Option<FontSize>,
    pub is_subtle: bool,
    pub wrap: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            weight: None,
            color: None,
            size: None,
            is_subtle: false,
            wrap: true,
        }
    }
}

impl TextOptions {
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn size(mut self, size: FontSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn subtle(mut self) -> Self {
        self.is_subtle = true;
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }
}

/// A choice as supplied by a caller: typed, a `{"title", "value"}` map or a bare string.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceSource {
    Typed(Choice),
    Raw(Value),
}

impl From<Choice> for ChoiceSource {
    fn from(value: Choice) -> Self {
        ChoiceSource::Typed(value)
    }
}

impl From<Value> for ChoiceSource {
    fn from(value: Value) -> Self {
        ChoiceSource::Raw(value)
    }
}

impl From<(&str, &str)> for ChoiceSource {
    fn from((title, value): (&str, &str)) -> Self {
        ChoiceSource::Typed(Choice::new(title, value))
    }
}

impl ChoiceSource {
    fn into_choice(self, index: usize) -> CardResult<Choice> {
        let choice = match self {
            ChoiceSource::Typed(choice) => choice,
            // A bare string is both the title and the submitted value.
            ChoiceSource::Raw(Value::String(text)) => Choice::new(text.clone(), text),
            ChoiceSource::Raw(value) => {
                let field = |name: &str| match value.get(name) {
                    Some(Value::String(text)) => Some(text.clone()),
                    Some(Value::Number(number)) => Some(number.to_string()),
                    Some(Value::Bool(flag)) => Some(flag.to_string()),
                    _ => None,
                };
                match (field("title"), field("value")) {
                    (Some(title), Some(value)) => Choice { title, value },
                    _ => {
                        return Err(CardError::invalid(format!(
                            "choice {index} must provide 'title' and 'value'"
                        )));
                    }
                }
            }
        };
        require_non_empty(&format!("choice {index} title"), &choice.title)?;
        require_non_empty(&format!("choice {index} value"), &choice.value)?;
        Ok(choice)
    }
}

/// Input ids end up as keys of the submitted payload, so they are kept to
/// ASCII letters, digits and underscores.
pub fn is_valid_input_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn require_input_id(id: &str) -> CardResult<()> {
    require_non_empty("input id", id)?;
    if !is_valid_input_id(id) {
        return Err(CardError::invalid(format!(
            "input id '{id}' may only contain letters, digits and '_'"
        )));
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub struct ElementFactory;

impl ElementFactory {
    pub fn create_text(text: &str, options: TextOptions) -> CardResult<TextBlock> {
        require_non_empty("text", text)?;
        let mut block = TextBlock::new(text).wrap(options.wrap).subtle(options.is_subtle);
        block.weight = options.weight;
        block.color = options.color;
        block.size = options.size;
        Ok(block)
    }

    /// Heading text. Levels below 1 render as level 1 and levels above 3 as level 3.
    pub fn create_heading(text: &str, level: i64) -> CardResult<TextBlock> {
        let size = match level.clamp(1, 3) {
            1 => FontSize::ExtraLarge,
            2 => FontSize::Large,
            _ => FontSize::Medium,
        };
        Self::create_text(
            text,
            TextOptions::default().weight(FontWeight::Bolder).size(size),
        )
    }

    /// Bold text in a semantic color, `attention` unless told otherwise.
    pub fn create_important_text(text: &str, color: Option<Color>) -> CardResult<TextBlock> {
        Self::create_text(
            text,
            TextOptions::default()
                .weight(FontWeight::Bolder)
                .color(color.unwrap_or(Color::Attention)),
        )
    }

    pub fn create_image(
        url: &str,
        alt_text: &str,
        size: Option<ImageSize>,
        style: Option<ImageStyle>,
    ) -> CardResult<Image> {
        require_non_empty("image url", url)?;
        require_non_empty("image alt text", alt_text)?;
        let mut image = Image::new(url.trim()).alt_text(alt_text);
        image.size = size;
        image.style = style;
        Ok(image)
    }

    pub fn create_text_input(
        id: &str,
        placeholder: Option<&str>,
        is_required: bool,
        max_length: Option<u32>,
    ) -> CardResult<TextInput> {
        require_input_id(id)?;
        let mut input = TextInput::new(id).required(is_required);
        input.placeholder = non_blank(placeholder);
        input.max_length = max_length;
        Ok(input)
    }

    pub fn create_date_input(
        id: &str,
        placeholder: Option<&str>,
        is_required: bool,
    ) -> CardResult<DateInput> {
        require_input_id(id)?;
        let mut input = DateInput::new(id).required(is_required);
        input.placeholder = non_blank(placeholder);
        Ok(input)
    }

    pub fn create_choice_set<I, C>(
        id: &str,
        choices: I,
        placeholder: Option<&str>,
        is_required: bool,
        is_multi_select: bool,
    ) -> CardResult<ChoiceSet>
    where
        I: IntoIterator<Item = C>,
        C: Into<ChoiceSource>,
    {
        require_input_id(id)?;
        let choices = choices
            .into_iter()
            .enumerate()
            .map(|(index, choice)| choice.into().into_choice(index))
            .collect::<CardResult<Vec<_>>>()?;
        if choices.is_empty() {
            return Err(CardError::invalid(format!(
                "choice set '{id}' needs at least one choice"
            )));
        }
        let mut set = ChoiceSet::new(id, choices)
            .required(is_required)
            .multi_select(is_multi_select);
        set.placeholder = non_blank(placeholder);
        Ok(set)
    }

    pub fn create_column(width: ColumnWidth, items: Vec<Element>) -> Column {
        Column::new(items).width(width)
    }

    /// Column whose width is given in textual form (`"auto"`, `"stretch"`, `"2"`, `"80px"`).
    pub fn create_column_with_width(width: &str, items: Vec<Element>) -> CardResult<Column> {
        Ok(Self::create_column(width.parse()?, items))
    }
}
