use std::collections::HashSet;

use serde_json::Value;

use super::target::TargetPlatform;

/// Inline `data:` images above this many bytes earn a suggestion.
const INLINE_IMAGE_HINT_BYTES: usize = 4 * 1024;

/// Findings from one pass over a card tree.
#[derive(Debug, Default)]
pub(crate) struct TreeReport {
    pub details: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub max_depth: usize,
    pub element_count: usize,
    pub image_count: usize,
    pub container_count: usize,
    pub has_ids: bool,
}

pub(crate) struct TreeWalker<'a> {
    target: &'a TargetPlatform,
    report: TreeReport,
    seen_ids: HashSet<String>,
    reported_duplicates: HashSet<String>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(target: &'a TargetPlatform) -> Self {
        Self {
            target,
            report: TreeReport::default(),
            seen_ids: HashSet::new(),
            reported_duplicates: HashSet::new(),
        }
    }

    pub fn walk(mut self, body: &[Value], actions: Option<&Value>) -> TreeReport {
        for (index, element) in body.iter().enumerate() {
            self.element(element, &format!("body[{index}]"), 1);
        }
        match actions {
            None | Some(Value::Null) => {}
            Some(Value::Array(actions)) => {
                for (index, action) in actions.iter().enumerate() {
                    self.action(action, &format!("actions[{index}]"));
                }
            }
            Some(_) => self
                .report
                .details
                .push("card 'actions' must be an array".to_string()),
        }
        if self.report.max_depth > self.target.max_depth() {
            self.report.details.push(format!(
                "nesting depth {} exceeds the {} limit of {}",
                self.report.max_depth,
                self.target,
                self.target.max_depth()
            ));
        }
        self.report
    }

    fn element(&mut self, element: &Value, path: &str, depth: usize) {
        self.report.max_depth = self.report.max_depth.max(depth);
        self.report.element_count += 1;

        let Some(object) = element.as_object() else {
            self.report.details.push(format!("{path} is not an object"));
            return;
        };
        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            self.report.details.push(format!("{path} is missing 'type'"));
            return;
        };
        if let Some(id) = object.get("id").and_then(Value::as_str) {
            self.record_id(id);
        }

        match kind {
            "TextBlock" => self.require_string(element, path, kind, "text"),
            "Image" => {
                self.report.image_count += 1;
                self.require_string(element, path, kind, "url");
                self.image_hints(element, path);
            }
            "FactSet" => {
                if let Some(facts) = self.require_array(element, path, kind, "facts") {
                    for (index, fact) in facts.iter().enumerate() {
                        self.title_value_entry(fact, &format!("{path}.facts[{index}]"), true);
                    }
                }
            }
            "Input.Text" | "Input.Date" => self.require_string(element, path, kind, "id"),
            "Input.ChoiceSet" => {
                self.require_string(element, path, kind, "id");
                if let Some(choices) = self.require_array(element, path, kind, "choices") {
                    if choices.is_empty() {
                        self.report
                            .details
                            .push(format!("{path} (Input.ChoiceSet) has no choices"));
                    }
                    for (index, choice) in choices.iter().enumerate() {
                        self.title_value_entry(choice, &format!("{path}.choices[{index}]"), false);
                    }
                }
            }
            "Container" => {
                self.report.container_count += 1;
                if let Some(items) = self.require_array(element, path, kind, "items") {
                    self.children(items, &format!("{path}.items"), depth);
                }
            }
            "Column" => {
                self.report.container_count += 1;
                if let Some(items) = self.optional_array(element, path, kind, "items") {
                    self.children(items, &format!("{path}.items"), depth);
                }
            }
            "ColumnSet" => {
                self.report.container_count += 1;
                if let Some(columns) = self.optional_array(element, path, kind, "columns") {
                    for (index, column) in columns.iter().enumerate() {
                        let column_path = format!("{path}.columns[{index}]");
                        match column.get("type").and_then(Value::as_str) {
                            Some("Column") => self.element(column, &column_path, depth + 1),
                            Some(other) => self.report.details.push(format!(
                                "{column_path} is a {other}, only Column is allowed in a ColumnSet"
                            )),
                            None => self.report.details.push(format!(
                                "{column_path} is missing 'type', \
                                 only Column is allowed in a ColumnSet"
                            )),
                        }
                    }
                }
            }
            // Unrecognised element types pass through unchecked.
            _ => {}
        }
    }

    fn children(&mut self, items: &[Value], path: &str, depth: usize) {
        for (index, item) in items.iter().enumerate() {
            self.element(item, &format!("{path}[{index}]"), depth + 1);
        }
    }

    fn action(&mut self, action: &Value, path: &str) {
        let Some(kind) = action.get("type").and_then(Value::as_str) else {
            self.report.details.push(format!("{path} is missing 'type'"));
            return;
        };
        let has_title = action
            .get("title")
            .and_then(Value::as_str)
            .is_some_and(|title| !title.trim().is_empty());
        if !has_title {
            self.report
                .warnings
                .push(format!("{path} ({kind}) has no title"));
        }
        if kind == "Action.OpenUrl" {
            self.require_string(action, path, kind, "url");
        }
    }

    fn record_id(&mut self, id: &str) {
        self.report.has_ids = true;
        if !self.seen_ids.insert(id.to_string())
            && self.reported_duplicates.insert(id.to_string())
        {
            self.report.details.push(format!("duplicate element id '{id}'"));
        }
    }

    fn image_hints(&mut self, image: &Value, path: &str) {
        let has_alt = image
            .get("altText")
            .and_then(Value::as_str)
            .is_some_and(|alt| !alt.trim().is_empty());
        if !has_alt {
            self.report
                .warnings
                .push(format!("{path} (Image) has no altText"));
        }
        if let Some(url) = image.get("url").and_then(Value::as_str)
            && url.starts_with("data:")
            && url.len() > INLINE_IMAGE_HINT_BYTES
        {
            self.report.suggestions.push(format!(
                "{path} embeds a {:.1}KB inline image; \
                 consider hosting it and referencing it by URL",
                url.len() as f64 / 1024.0
            ));
        }
    }

    /// Facts may carry empty strings; choices need non-blank titles and values.
    fn title_value_entry(&mut self, entry: &Value, path: &str, allow_blank: bool) {
        for field in ["title", "value"] {
            let present = match entry.get(field).and_then(Value::as_str) {
                Some(text) => allow_blank || !text.trim().is_empty(),
                None => false,
            };
            if !present {
                self.report
                    .details
                    .push(format!("{path} is missing required field '{field}'"));
            }
        }
    }

    fn require_string(&mut self, element: &Value, path: &str, kind: &str, field: &str) {
        let present = match element.get(field) {
            Some(Value::String(text)) => field == "text" || !text.trim().is_empty(),
            _ => false,
        };
        if !present {
            self.report
                .details
                .push(format!("{path} ({kind}) is missing required field '{field}'"));
        }
    }

    fn require_array<'v>(
        &mut self,
        element: &'v Value,
        path: &str,
        kind: &str,
        field: &str,
    ) -> Option<&'v Vec<Value>> {
        match element.get(field) {
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.report
                    .details
                    .push(format!("{path} ({kind}) field '{field}' must be an array"));
                None
            }
            None => {
                self.report
                    .details
                    .push(format!("{path} ({kind}) is missing required field '{field}'"));
                None
            }
        }
    }

    fn optional_array<'v>(
        &mut self,
        element: &'v Value,
        path: &str,
        kind: &str,
        field: &str,
    ) -> Option<&'v Vec<Value>> {
        match element.get(field) {
            None | Some(Value::Null) => None,
            Some(_) => self.require_array(element, path, kind, field),
        }
    }
}
