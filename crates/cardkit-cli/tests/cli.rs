use serde_json::{Value, json};
use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn cli_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cardkit"));
    for key in [
        "CARDKIT_TARGET",
        "CARDKIT_WEBHOOK_URL",
        "CARDKIT_HTTP_TIMEOUT_SECS",
        "OPENAI_API_KEY",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("LOG_FORMAT", "plain").env("RUST_LOG", "warn");
    cmd
}

fn run(args: &[&str]) -> Output {
    cli_cmd().args(args).output().expect("run cardkit CLI")
}

fn run_json(args: &[&str]) -> Value {
    let output = run(args);
    if !output.status.success() {
        panic!(
            "CLI command {:?} failed: status={:?}\nstdout={}\nstderr={}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn render_notification_prints_card() {
    let card = run_json(&[
        "render",
        "notification",
        "--title",
        "Deploy finished",
        "--message",
        "All green",
        "--level",
        "success",
        "--action-url",
        "https://ci.example.com/42",
    ]);
    assert_eq!(card["type"], "AdaptiveCard");
    assert_eq!(card["body"][0]["text"], "✅ Deploy finished");
    assert_eq!(card["body"][1]["color"], "good");
    assert_eq!(card["actions"][0]["url"], "https://ci.example.com/42");
}

#[test]
fn render_dashboard_collects_repeated_metrics() {
    let card = run_json(&[
        "render",
        "dashboard",
        "--title",
        "Ops",
        "--metric",
        "Uptime=99.9%",
        "--metric",
        "Errors=3",
    ]);
    let facts = &card["body"][1]["facts"];
    assert_eq!(facts[0], json!({"title": "Uptime", "value": "99.9%"}));
    assert_eq!(facts[1], json!({"title": "Errors", "value": "3"}));
}

#[test]
fn form_reads_fields_file() {
    let fields = temp_file(
        r#"[{"type": "text", "id": "name", "label": "Name", "required": true},
            {"type": "choice", "id": "team", "label": "Team", "choices": ["Red", "Blue"]}]"#,
    );
    let card = run_json(&[
        "form",
        "--title",
        "Sign Up",
        "--fields",
        fields.path().to_str().unwrap(),
    ]);
    let types: Vec<&str> = card["body"]
        .as_array()
        .unwrap()
        .iter()
        .map(|element| element["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        ["TextBlock", "TextBlock", "Input.Text", "TextBlock", "Input.ChoiceSet"]
    );
    assert_eq!(card["actions"][0]["data"]["form_id"], "sign_up");
}

#[test]
fn data_from_csv_builds_table() {
    let csv = temp_file("name,score\nada,10\ngrace,12\n");
    let card = run_json(&[
        "data",
        "--csv",
        csv.path().to_str().unwrap(),
        "--title",
        "Scores",
    ]);
    let body = card["body"].as_array().unwrap();
    assert_eq!(body[0]["text"], "Scores");
    // header row plus two data rows
    assert_eq!(body.len(), 4);
    assert!(body[1..].iter().all(|row| row["type"] == "ColumnSet"));
}

#[test]
fn data_requires_an_input() {
    let output = run(&["data", "--title", "Nothing"]);
    assert!(!output.status.success());
}

#[test]
fn validate_exit_code_follows_result() {
    let good = temp_file(
        r#"{"type": "AdaptiveCard", "version": "1.5",
            "body": [{"type": "TextBlock", "id": "t", "text": "hi"}]}"#,
    );
    let report = run_json(&["validate", good.path().to_str().unwrap()]);
    assert_eq!(report["valid"], true);
    assert_eq!(report["size_limit"], 28.0);

    let empty = temp_file(r#"{"type": "AdaptiveCard", "version": "1.5", "body": []}"#);
    let output = run(&["validate", empty.path().to_str().unwrap(), "--target", "generic"]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["size_limit"], 40.0);
}

#[test]
fn validate_rejects_unknown_target() {
    let card = temp_file(r#"{"type": "AdaptiveCard", "version": "1.5", "body": []}"#);
    let output = run(&["validate", card.path().to_str().unwrap(), "--target", "slack"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn send_without_webhook_reports_failure() {
    let card = temp_file(
        r#"{"type": "AdaptiveCard", "version": "1.5",
            "body": [{"type": "TextBlock", "text": "hi"}]}"#,
    );
    let output = run(&["send", card.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["success"], false);
    assert_eq!(result["message"], "No webhook URL configured");
}

#[test]
fn generate_without_api_key_fails() {
    let output = run(&["generate", "--prompt", "a welcome card"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("OPENAI_API_KEY"));
}
