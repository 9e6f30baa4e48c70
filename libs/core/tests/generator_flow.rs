use std::sync::Mutex;

use cardkit_core::{
    AdaptiveCardGenerator, CompletionClient, DeliveryConfig, DeliveryManager, GenerateError,
    GeneratorConfig, TargetPlatform, TransportError, TransportResponse, ValidationUtility,
    WebhookTransport,
};
use serde_json::{Value, json};

struct ScriptedModel {
    reply: Result<Value, u16>,
}

impl ScriptedModel {
    fn calling(name: &str, arguments: &str) -> Self {
        Self {
            reply: Ok(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_7",
                            "type": "function",
                            "function": {"name": name, "arguments": arguments}
                        }]
                    }
                }]
            })),
        }
    }
}

impl CompletionClient for ScriptedModel {
    fn complete(&self, _request: &Value) -> Result<Value, GenerateError> {
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(GenerateError::Api {
                status: *status,
                message: "rate limited".into(),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingHook {
    posts: Mutex<Vec<(String, Value)>>,
}

impl WebhookTransport for RecordingHook {
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        Ok(TransportResponse {
            status: 200,
            body: "1".into(),
        })
    }
}

fn generator(model: ScriptedModel) -> AdaptiveCardGenerator<ScriptedModel> {
    AdaptiveCardGenerator::with_client(GeneratorConfig::new("sk-test"), model).unwrap()
}

#[test]
fn table_visualization_is_rendered_locally() {
    let arguments = json!({
        "data_format": "table",
        "title": "Quarterly sales",
        "data": json!({
            "headers": ["Quarter", "Revenue"],
            "rows": [["Q1", 10], ["Q2", 12.5]]
        })
        .to_string(),
    });
    let generated = generator(ScriptedModel::calling("visualize_data", &arguments.to_string()))
        .generate("show my sales table")
        .unwrap();

    assert_eq!(generated.tool, "visualize_data");
    assert_eq!(generated.explanation, "");
    let body = generated.card.to_value().unwrap()["body"].clone();
    assert_eq!(body[0]["text"], "Quarterly sales");
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[3]["columns"][1]["items"][0]["text"], "12.5");
    assert!(generated.validation.valid);
}

#[test]
fn custom_card_keeps_element_order_and_actions() {
    let arguments = json!({
        "elements": [
            {"type": "heading", "content": {"text": "Status", "level": 2}},
            {"type": "column_set", "content": {"columns": [
                [{"type": "text", "content": {"text": "API"}}],
                [{"type": "text", "content": {"text": "up", "is_subtle": true}}]
            ]}}
        ],
        "actions": [{
            "type": "open_url",
            "title": "Status page",
            "url": "https://status.example.com"
        }]
    });
    let generated = generator(ScriptedModel::calling(
        "create_custom_card",
        &arguments.to_string(),
    ))
    .generate("status card")
    .unwrap();

    let card = generated.card.to_value().unwrap();
    assert_eq!(card["body"][0]["type"], "TextBlock");
    assert_eq!(card["body"][1]["type"], "ColumnSet");
    assert_eq!(card["body"][1]["columns"].as_array().unwrap().len(), 2);
    assert_eq!(card["actions"][0]["type"], "Action.OpenUrl");
}

#[test]
fn unknown_tools_and_broken_arguments_are_malformed() {
    let unknown = generator(ScriptedModel::calling("create_pie_chart", "{}")).generate("pie");
    assert!(matches!(unknown, Err(GenerateError::Malformed(_))));

    let broken =
        generator(ScriptedModel::calling("create_notification_card", "{\"title\": ")).generate("x");
    assert!(matches!(broken, Err(GenerateError::Malformed(_))));
}

#[test]
fn bad_data_is_an_argument_error() {
    let arguments = json!({"data_format": "json", "data": "not json"});
    let err = generator(ScriptedModel::calling("visualize_data", &arguments.to_string()))
        .generate("chart")
        .unwrap_err();
    match err {
        GenerateError::Card(card) => assert!(card.is_invalid_argument()),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn api_failures_propagate() {
    let err = generator(ScriptedModel { reply: Err(429) })
        .generate("anything")
        .unwrap_err();
    assert!(matches!(err, GenerateError::Api { status: 429, .. }));
}

#[test]
fn generated_card_is_validated_then_delivered() {
    let arguments = json!({"title": "Build broke", "message": "main is red", "level": "danger"});
    let generator = generator(ScriptedModel::calling(
        "create_notification_card",
        &arguments.to_string(),
    ))
    .with_validator(ValidationUtility::new(TargetPlatform::Teams));
    let manager = DeliveryManager::with_transport(
        DeliveryConfig {
            webhook_url: Some("https://hooks.example.com/ci".into()),
            ..DeliveryConfig::default()
        },
        RecordingHook::default(),
    )
    .unwrap();

    let (generated, delivered) = generator.generate_and_send("tell the team", &manager).unwrap();
    assert!(delivered.success, "{}", delivered.message);
    assert_eq!(delivered.status_code, Some(200));
    assert_eq!(generated.tool, "create_notification_card");
    assert_eq!(
        generated.card.to_value().unwrap()["body"][0]["text"],
        "⛔ Build broke"
    );
}
