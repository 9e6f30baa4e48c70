use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::GenerateError;
use crate::adaptive::{AdaptiveCard, ColumnWidth, ContainerStyle, Element};
use crate::builder::{ActionSpec, CardBuilder};
use crate::data_connector::{DataConnector, scalar_text};
use crate::element_factory::{ElementFactory, TextOptions};
use crate::error::{CardError, CardResult};
use crate::layout::LayoutHelper;
use crate::templates::{FormField, NotificationLevel, TemplateFactory};

/// A card-building call selected by the model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments")]
pub enum CardRequest {
    #[serde(rename = "create_notification_card")]
    Notification(NotificationArgs),
    #[serde(rename = "create_form_card")]
    Form(FormArgs),
    #[serde(rename = "create_article_card")]
    Article(ArticleArgs),
    #[serde(rename = "create_dashboard_card")]
    Dashboard(DashboardArgs),
    #[serde(rename = "create_confirmation_card")]
    Confirmation(ConfirmationArgs),
    #[serde(rename = "create_custom_card")]
    Custom(CustomArgs),
    #[serde(rename = "visualize_data")]
    VisualizeData(VisualizeArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationArgs {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub level: Option<NotificationLevel>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormArgs {
    pub title: String,
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub submit_label: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticleArgs {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardArgs {
    pub title: String,
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chart_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfirmationArgs {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub confirm_button_text: Option<String>,
    #[serde(default)]
    pub cancel_button_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomArgs {
    pub elements: Vec<CustomElement>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum CustomElement {
    Heading {
        text: String,
        #[serde(default)]
        level: Option<i64>,
    },
    Text {
        text: String,
        #[serde(default)]
        is_subtle: bool,
    },
    Image {
        url: String,
        alt_text: String,
    },
    FactSet {
        facts: Map<String, Value>,
    },
    Container {
        #[serde(default)]
        items: Vec<CustomElement>,
        #[serde(default)]
        style: Option<ContainerStyle>,
    },
    ColumnSet {
        columns: Vec<Vec<CustomElement>>,
    },
}

impl CustomElement {
    fn build(&self) -> CardResult<Element> {
        Ok(match self {
            CustomElement::Heading { text, level } => {
                ElementFactory::create_heading(text, level.unwrap_or(1))?.into()
            }
            CustomElement::Text { text, is_subtle } => {
                let options = if *is_subtle {
                    TextOptions::default().subtle()
                } else {
                    TextOptions::default()
                };
                ElementFactory::create_text(text, options)?.into()
            }
            CustomElement::Image { url, alt_text } => {
                ElementFactory::create_image(url, alt_text, None, None)?.into()
            }
            CustomElement::FactSet { facts } => DataConnector::create_fact_set(
                facts.iter().map(|(key, value)| (key.clone(), scalar_text(value))),
            )
            .into(),
            CustomElement::Container { items, style } => {
                LayoutHelper::create_container(build_all(items)?, *style, None, false).into()
            }
            CustomElement::ColumnSet { columns } => LayoutHelper::create_equal_columns(
                columns.iter().map(|items| build_all(items)).collect::<CardResult<_>>()?,
            )?
            .into(),
        })
    }
}

fn build_all(elements: &[CustomElement]) -> CardResult<Vec<Element>> {
    elements.iter().map(CustomElement::build).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    Json,
    Csv,
    KeyValue,
    List,
    Table,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisualizeArgs {
    pub data_format: DataFormat,
    pub data: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub numbered: bool,
}

#[derive(Deserialize)]
struct TableData {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl VisualizeArgs {
    fn elements(&self) -> CardResult<Vec<Element>> {
        let parse = |what: &str| -> CardResult<Value> {
            serde_json::from_str(&self.data)
                .map_err(|err| CardError::invalid(format!("invalid {what} data: {err}")))
        };
        match self.data_format {
            DataFormat::Json => DataConnector::from_json_str(&self.data),
            DataFormat::Csv => DataConnector::from_csv(&self.data),
            DataFormat::KeyValue => match parse("key-value")? {
                Value::Object(map) => Ok(vec![
                    DataConnector::key_value_pairs_to_columns(
                        &map,
                        ColumnWidth::Weight(1),
                        ColumnWidth::Weight(2),
                    )
                    .into(),
                ]),
                _ => Err(CardError::invalid("key-value data must be a JSON object")),
            },
            DataFormat::List => match parse("list")? {
                Value::Array(items) => {
                    let items: Vec<String> = items.iter().map(scalar_text).collect();
                    Ok(DataConnector::create_list(&items, self.numbered))
                }
                _ => Err(CardError::invalid("list data must be a JSON array")),
            },
            DataFormat::Table => {
                let table: TableData = serde_json::from_value(parse("table")?).map_err(|err| {
                    CardError::invalid(format!("table data needs 'headers' and 'rows': {err}"))
                })?;
                let rows: Vec<Vec<String>> = table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(scalar_text).collect())
                    .collect();
                DataConnector::create_table(&table.headers, &rows, None, true)
            }
        }
    }
}

impl CardRequest {
    /// Decodes a tool call whose arguments arrive as JSON text.
    pub fn from_tool_call(name: &str, arguments: &str) -> Result<Self, GenerateError> {
        let arguments: Value = serde_json::from_str(arguments).map_err(|err| {
            GenerateError::Malformed(format!("arguments of '{name}' are not JSON: {err}"))
        })?;
        serde_json::from_value(json!({"name": name, "arguments": arguments}))
            .map_err(|err| {
                GenerateError::Malformed(format!("cannot use tool call '{name}': {err}"))
            })
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            CardRequest::Notification(_) => "create_notification_card",
            CardRequest::Form(_) => "create_form_card",
            CardRequest::Article(_) => "create_article_card",
            CardRequest::Dashboard(_) => "create_dashboard_card",
            CardRequest::Confirmation(_) => "create_confirmation_card",
            CardRequest::Custom(_) => "create_custom_card",
            CardRequest::VisualizeData(_) => "visualize_data",
        }
    }

    pub fn render(&self) -> CardResult<AdaptiveCard> {
        match self {
            CardRequest::Notification(args) => TemplateFactory::create_notification_card(
                &args.title,
                &args.message,
                args.level.unwrap_or(NotificationLevel::Info),
                args.icon_url.as_deref(),
                args.action_url.as_deref(),
            ),
            CardRequest::Form(args) => TemplateFactory::create_form_card(
                &args.title,
                args.subtitle.as_deref(),
                &args.fields,
                args.submit_label.as_deref().unwrap_or("Submit"),
            ),
            CardRequest::Article(args) => TemplateFactory::create_article_card(
                &args.title,
                &args.content,
                args.image_url.as_deref(),
                args.author.as_deref(),
                args.date.as_deref(),
                args.action_url.as_deref(),
            ),
            CardRequest::Dashboard(args) => TemplateFactory::create_dashboard_card(
                &args.title,
                args.metrics
                    .iter()
                    .map(|(key, value)| (key.clone(), scalar_text(value))),
                args.description.as_deref(),
                args.chart_image_url.as_deref(),
            ),
            CardRequest::Confirmation(args) => TemplateFactory::create_confirmation_card(
                &args.title,
                &args.message,
                args.confirm_button_text.as_deref().unwrap_or("Confirm"),
                args.cancel_button_text.as_deref().unwrap_or("Cancel"),
            ),
            CardRequest::Custom(args) => {
                let mut builder = CardBuilder::new().add_items(build_all(&args.elements)?);
                for spec in &args.actions {
                    builder = builder.add_action(spec.to_action()?);
                }
                builder.build()
            }
            CardRequest::VisualizeData(args) => {
                let title = args.title.as_deref().unwrap_or("Data Visualization");
                CardBuilder::new()
                    .add_item(ElementFactory::create_heading(title, 1)?)
                    .add_items(args.elements()?)
                    .build()
            }
        }
    }
}

static TOOLS: Lazy<Value> = Lazy::new(build_tools);

/// Function-tool declarations offered to the model, one per [`CardRequest`] variant.
pub fn tool_definitions() -> &'static Value {
    &TOOLS
}

fn build_tools() -> Value {
    let string = |description: &str| json!({"type": "string", "description": description});
    let tool = |name: &str, description: &str, properties: Value, required: &[&str]| {
        json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    };
    let action_items = json!({
        "type": "object",
        "properties": {
            "type": {"type": "string", "enum": ["open_url", "submit"]},
            "title": {"type": "string"},
            "url": {"type": "string"},
            "data": {"type": "object"}
        },
        "required": ["type", "title"]
    });

    Value::Array(vec![
        tool(
            "create_notification_card",
            "Create a simple notification card",
            json!({
                "title": string("The notification title"),
                "message": string("The notification message"),
                "level": {"type": "string", "enum": ["info", "warning", "success", "danger"]},
                "icon_url": string("Optional URL for an icon"),
                "action_url": string("Optional URL for the card's action")
            }),
            &["title", "message"],
        ),
        tool(
            "create_form_card",
            "Create a form card with input fields",
            json!({
                "title": string("The form title"),
                "subtitle": string("Optional subtitle for the form"),
                "submit_label": string("Label for the submit button"),
                "fields": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "type": {"type": "string", "enum": ["text", "date", "choice"]},
                            "id": string("Field id: letters, digits and underscores"),
                            "label": string("Field label"),
                            "placeholder": string("Optional placeholder text"),
                            "required": {"type": "boolean"},
                            "multi_select": {"type": "boolean"},
                            "choices": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "title": {"type": "string"},
                                        "value": {"type": "string"}
                                    }
                                }
                            }
                        },
                        "required": ["type", "id", "label"]
                    }
                }
            }),
            &["title", "fields"],
        ),
        tool(
            "create_article_card",
            "Create a card that displays an article or news item",
            json!({
                "title": string("The article title"),
                "content": string("The article content"),
                "image_url": string("Optional URL for a header image"),
                "author": string("Optional author name"),
                "date": string("Optional date string"),
                "action_url": string("Optional URL for a 'Read More' action")
            }),
            &["title", "content"],
        ),
        tool(
            "create_dashboard_card",
            "Create a card that displays dashboard metrics",
            json!({
                "title": string("The dashboard title"),
                "metrics": {"type": "object", "description": "Metric names and values"},
                "description": string("Optional description text"),
                "chart_image_url": string("Optional URL for a chart image")
            }),
            &["title", "metrics"],
        ),
        tool(
            "create_confirmation_card",
            "Create a card that requests confirmation for an action",
            json!({
                "title": string("The confirmation title"),
                "message": string("The confirmation message"),
                "confirm_button_text": string("Text for the confirm button"),
                "cancel_button_text": string("Text for the cancel button")
            }),
            &["title", "message"],
        ),
        tool(
            "create_custom_card",
            "Create a custom card with specified elements and layout",
            json!({
                "elements": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "type": {
                                "type": "string",
                                "enum": [
                                    "heading", "text", "image", "fact_set", "container",
                                    "column_set"
                                ]
                            },
                            "content": {
                                "type": "object",
                                "description": "Element-specific configuration"
                            }
                        },
                        "required": ["type", "content"]
                    }
                },
                "actions": {"type": "array", "items": action_items}
            }),
            &["elements"],
        ),
        tool(
            "visualize_data",
            "Convert structured data into card elements",
            json!({
                "data_format": {
                    "type": "string",
                    "enum": ["json", "csv", "key_value", "list", "table"]
                },
                "data": string("The data to visualize, as text"),
                "title": string("Optional title for the visualization"),
                "numbered": {"type": "boolean", "description": "Number list items"}
            }),
            &["data_format", "data"],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::Container;

    #[test]
    fn every_request_has_a_tool() {
        let tools = tool_definitions();
        let names: Vec<_> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names.len(), 7);
        assert!(names.contains(&"visualize_data".to_string()));
    }

    #[test]
    fn notification_call_renders() {
        let request = CardRequest::from_tool_call(
            "create_notification_card",
            r#"{"title": "Heads up", "message": "Maintenance tonight", "level": "warning"}"#,
        )
        .unwrap();
        assert_eq!(request.tool_name(), "create_notification_card");
        let card = request.render().unwrap();
        assert_eq!(card.body.len(), 2);
    }

    #[test]
    fn unknown_tools_and_bad_levels_are_malformed() {
        assert!(matches!(
            CardRequest::from_tool_call("make_coffee", "{}"),
            Err(GenerateError::Malformed(_))
        ));
        assert!(matches!(
            CardRequest::from_tool_call(
                "create_notification_card",
                r#"{"title": "t", "message": "m", "level": "critical"}"#
            ),
            Err(GenerateError::Malformed(_))
        ));
        assert!(CardRequest::from_tool_call("create_article_card", "not json").is_err());
    }

    #[test]
    fn custom_cards_nest_elements() {
        let request = CardRequest::from_tool_call(
            "create_custom_card",
            r#"{
                "elements": [
                    {"type": "heading", "content": {"text": "Status", "level": 2}},
                    {"type": "container", "content": {"style": "emphasis", "items": [
                        {"type": "text", "content": {"text": "All good", "is_subtle": true}}
                    ]}},
                    {"type": "column_set", "content": {"columns": [
                        [{"type": "fact_set", "content": {"facts": {"cpu": 12}}}],
                        [{"type": "image", "content": {"url": "https://img", "alt_text": "graph"}}]
                    ]}}
                ],
                "actions": [{"type": "open_url", "title": "Open", "url": "https://x"}]
            }"#,
        )
        .unwrap();
        let card = request.render().unwrap();
        let kinds: Vec<_> = card.body.iter().map(Element::type_name).collect();
        assert_eq!(kinds, vec!["TextBlock", "Container", "ColumnSet"]);
        assert_eq!(card.actions.len(), 1);
    }

    #[test]
    fn visualize_table_and_bad_list() {
        let table = CardRequest::from_tool_call(
            "visualize_data",
            &json!({
                "data_format": "table",
                "data": r#"{"headers": ["a", "b"], "rows": [[1, 2]]}"#,
            })
            .to_string(),
        )
        .unwrap()
        .render()
        .unwrap();
        assert_eq!(table.body.len(), 3);

        let bad = CardRequest::from_tool_call(
            "visualize_data",
            r#"{"data_format": "list", "data": "{\"not\": \"a list\"}"}"#,
        )
        .unwrap()
        .render()
        .unwrap_err();
        assert!(bad.is_invalid_argument());
    }

    #[test]
    fn container_conversion_is_lossless() {
        let element = CustomElement::Container {
            items: vec![],
            style: Some(ContainerStyle::Good),
        }
        .build()
        .unwrap();
        assert_eq!(
            element,
            Element::Container(Container::new(vec![]).style(ContainerStyle::Good))
        );
    }
}
