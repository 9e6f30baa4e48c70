//! Pre-delivery checks of finished cards against a host's limits.
//!
//! Argument problems (a document that is not card-shaped) are errors. Everything found
//! inside a well-formed card is collected into a [`ValidationResult`] in a single pass.

mod target;
mod walker;

pub use target::TargetPlatform;

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::adaptive::{AdaptiveCard, is_supported_version};
use crate::error::{CardError, CardResult};
use walker::TreeWalker;

const APPROACHING_LIMIT_RATIO: f64 = 0.8;
const OPTIMIZE_HINT_RATIO: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Compact JSON size in kilobytes.
    pub size: f64,
    pub size_limit: f64,
    pub details: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    /// Hard failures joined for one-line reporting.
    pub fn summary(&self) -> String {
        self.details.join("; ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationUtility {
    target: TargetPlatform,
}

impl ValidationUtility {
    pub fn new(target: TargetPlatform) -> Self {
        Self { target }
    }

    pub fn target(&self) -> TargetPlatform {
        self.target
    }

    pub fn validate(&self, card: &AdaptiveCard) -> CardResult<ValidationResult> {
        self.validate_json(&card.to_value()?)
    }

    pub fn validate_json(&self, card: &Value) -> CardResult<ValidationResult> {
        let body = card_body(card)?;
        let size = json_size_kb(card)?;
        let limit = self.target.size_limit_kb();

        let report = TreeWalker::new(&self.target).walk(body, card.get("actions"));
        let mut details = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        match card.get("version").and_then(Value::as_str) {
            None => details.push("card is missing 'version'".to_string()),
            Some(version) if !is_supported_version(version) => {
                details.push(format!("unsupported card version '{version}'"));
                suggestions.push(version_suggestion(version));
            }
            Some(version) if version_key(version) > version_key(self.target.max_version()) => {
                details.push(format!(
                    "card version {version} is newer than {} supports ({})",
                    self.target,
                    self.target.max_version()
                ));
                suggestions.push(version_suggestion(version));
            }
            Some(_) => {}
        }

        if body.is_empty() {
            details.push("card body is empty".to_string());
            suggestions
                .push("Card body is empty. Add at least one element to the card.".to_string());
        }

        if size > limit {
            details.push(format!(
                "card size {size:.2}KB exceeds the {} limit of {limit}KB",
                self.target
            ));
            suggestions.extend(
                [
                    "Card size exceeds the limit for the target platform.",
                    "Consider reducing the number of elements or simplifying complex elements.",
                    "Minimize the use of images or use lower resolution images.",
                    "Break content into multiple smaller cards if possible.",
                ]
                .map(String::from),
            );
        } else if size > limit * APPROACHING_LIMIT_RATIO {
            warnings.push(format!(
                "Card size ({size:.2}KB) is approaching the limit ({limit}KB)."
            ));
            suggestions.push("Consider optimizing the card to reduce its size.".to_string());
        }

        details.extend(report.details);
        warnings.extend(report.warnings);
        suggestions.extend(report.suggestions);
        if !report.has_ids {
            warnings.push(
                "No elements have IDs, which may limit interactivity and accessibility."
                    .to_string(),
            );
        }

        let result = ValidationResult {
            valid: details.is_empty(),
            size,
            size_limit: limit,
            details,
            warnings,
            suggestions,
        };
        counter!(
            "cardkit_validation_total",
            "target" => self.target.as_str(),
            "result" => if result.valid { "valid" } else { "invalid" }
        )
        .increment(1);
        debug!(
            platform = %self.target,
            size_kb = result.size,
            failures = result.details.len(),
            warnings = result.warnings.len(),
            "card validated"
        );
        Ok(result)
    }

    /// Failure detail for a POST body, card or envelope, larger than the target accepts.
    pub fn check_payload_size(&self, payload: &Value) -> CardResult<Option<String>> {
        let size = json_size_kb(payload)?;
        let limit = self.target.size_limit_kb();
        Ok((size > limit).then(|| {
            format!(
                "payload size {size:.2}KB exceeds the {} limit of {limit}KB",
                self.target
            )
        }))
    }

    /// Compact JSON size of the card in kilobytes.
    pub fn get_size(&self, card: &AdaptiveCard) -> CardResult<f64> {
        json_size_kb(&card.to_value()?)
    }

    /// Size-driven hints; empty while the card stays under 70% of the limit.
    pub fn suggest_optimizations(&self, card: &AdaptiveCard) -> CardResult<Vec<String>> {
        let value = card.to_value()?;
        let size = json_size_kb(&value)?;
        let limit = self.target.size_limit_kb();
        let mut suggestions = Vec::new();
        if size <= limit * OPTIMIZE_HINT_RATIO {
            return Ok(suggestions);
        }
        suggestions.push(format!(
            "Card size ({size:.2}KB) is {:.1}% of the limit.",
            size / limit * 100.0
        ));
        let report = TreeWalker::new(&self.target).walk(card_body(&value)?, None);
        if card.body.len() > 10 {
            suggestions.push("Consider reducing the number of elements in the card.".to_string());
        }
        if report.image_count > 0 {
            suggestions.push(format!(
                "Card contains {} images. Consider reducing image count or size.",
                report.image_count
            ));
        }
        if report.container_count > 3 {
            suggestions.push(format!(
                "Card contains {} containers. Consider simplifying the structure.",
                report.container_count
            ));
        }
        Ok(suggestions)
    }
}

fn card_body(card: &Value) -> CardResult<&[Value]> {
    let object = card
        .as_object()
        .ok_or_else(|| CardError::invalid("card must be a JSON object"))?;
    match object.get("type").and_then(Value::as_str) {
        Some("AdaptiveCard") => {}
        Some(other) => {
            return Err(CardError::invalid(format!(
                "expected an AdaptiveCard, got '{other}'"
            )));
        }
        None => return Err(CardError::invalid("card is missing 'type'")),
    }
    match object.get("body") {
        Some(Value::Array(body)) => Ok(body),
        Some(_) => Err(CardError::invalid("card 'body' must be an array")),
        None => Err(CardError::invalid("card is missing 'body'")),
    }
}

fn json_size_kb(card: &Value) -> CardResult<f64> {
    Ok(serde_json::to_vec(card)?.len() as f64 / 1024.0)
}

fn version_key(version: &str) -> (u32, u32) {
    let mut parts = version.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
    (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
}

fn version_suggestion(version: &str) -> String {
    format!(
        "Some elements or fields require a newer schema version than '{version}'. \
         Consider upgrading the card version or removing incompatible elements."
    )
}
