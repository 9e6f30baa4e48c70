//! Structured data (maps, lists, rows, JSON, CSV) rendered as card elements.

use serde_json::{Map, Value};

use crate::adaptive::{
    Column, ColumnSet, ColumnWidth, Container, ContainerStyle, Element, Fact, FactSet, FontType,
    FontWeight, TextBlock,
};
use crate::error::{CardError, CardResult};

/// Nesting levels rendered structurally by [`DataConnector::from_json`]; anything deeper
/// is shown as raw JSON text.
pub const MAX_JSON_DEPTH: usize = 4;

pub struct DataConnector;

impl DataConnector {
    /// One fact per entry, in iteration order.
    pub fn create_fact_set<I, K, V>(facts: I) -> FactSet
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        FactSet::new(
            facts
                .into_iter()
                .map(|(title, value)| Fact {
                    title: title.into(),
                    value: value.into(),
                })
                .collect(),
        )
    }

    pub fn create_list<S: AsRef<str>>(items: &[S], is_numbered: bool) -> Vec<Element> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let text = if is_numbered {
                    format!("{}. {}", index + 1, item.as_ref())
                } else {
                    format!("• {}", item.as_ref())
                };
                TextBlock::new(text).wrap(true).into()
            })
            .collect()
    }

    /// A header row followed by one row per record, each row a `ColumnSet`.
    ///
    /// Without explicit widths every column gets weight 1. With `alternate_row_style`
    /// every second data row is shaded.
    pub fn create_table<H, C, R>(
        headers: &[H],
        rows: &[R],
        column_widths: Option<&[ColumnWidth]>,
        alternate_row_style: bool,
    ) -> CardResult<Vec<Element>>
    where
        H: AsRef<str>,
        C: AsRef<str>,
        R: AsRef<[C]>,
    {
        if headers.is_empty() {
            return Err(CardError::invalid("table needs at least one header"));
        }
        let widths = match column_widths {
            Some(widths) if widths.len() != headers.len() => {
                return Err(CardError::invalid(format!(
                    "table has {} headers but {} column widths",
                    headers.len(),
                    widths.len()
                )));
            }
            Some(widths) => widths.to_vec(),
            None => vec![ColumnWidth::Weight(1); headers.len()],
        };
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.as_ref().len() != headers.len())
        {
            return Err(CardError::invalid(format!(
                "table row {index} has {} cells, expected {}",
                row.as_ref().len(),
                headers.len()
            )));
        }

        let cell_row = |cells: Vec<TextBlock>| -> ColumnSet {
            ColumnSet::new(
                cells
                    .into_iter()
                    .zip(&widths)
                    .map(|(cell, width)| Column::new(vec![cell.into()]).width(*width))
                    .collect(),
            )
        };

        let mut table = Vec::with_capacity(rows.len() + 1);
        let header = cell_row(
            headers
                .iter()
                .map(|title| {
                    TextBlock::new(title.as_ref())
                        .weight(FontWeight::Bolder)
                        .wrap(true)
                })
                .collect(),
        )
        .style(ContainerStyle::Emphasis);
        table.push(header.into());

        for (index, row) in rows.iter().enumerate() {
            let mut set = cell_row(
                row.as_ref()
                    .iter()
                    .map(|cell| TextBlock::new(cell.as_ref()).wrap(true))
                    .collect(),
            );
            if alternate_row_style && index % 2 == 1 {
                set = set.style(ContainerStyle::Accent);
            }
            table.push(set.into());
        }
        Ok(table)
    }

    /// Renders arbitrary JSON.
    ///
    /// | shape | rendering |
    /// |---|---|
    /// | object | fact set of scalar entries, then a bold label plus rendering per nested entry |
    /// | array of objects | table over the union of keys, in first-seen order |
    /// | array of scalars | bullet list |
    /// | empty array | nothing |
    /// | mixed array | each item in turn |
    /// | scalar | one text block |
    ///
    /// Below [`MAX_JSON_DEPTH`] levels the remaining value becomes a monospace block of
    /// compact JSON.
    pub fn from_json(data: &Value) -> CardResult<Vec<Element>> {
        let mut out = Vec::new();
        render_value(data, 0, &mut out)?;
        Ok(out)
    }

    pub fn from_json_str(text: &str) -> CardResult<Vec<Element>> {
        let data: Value = serde_json::from_str(text)
            .map_err(|err| CardError::invalid(format!("invalid JSON data: {err}")))?;
        Self::from_json(&data)
    }

    /// First record is the header row.
    pub fn from_csv(text: &str) -> CardResult<Vec<Element>> {
        if text.trim().is_empty() {
            return Err(CardError::invalid("CSV data is empty"));
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        let mut records = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|err| CardError::invalid(format!("malformed CSV data: {err}")))?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        let Some((headers, rows)) = records.split_first() else {
            return Err(CardError::invalid("CSV data has no header line"));
        };
        Self::create_table(headers, rows, None, false)
    }

    /// One two-column row per key: bold key on the left, value on the right.
    pub fn key_value_pairs_to_columns(
        data: &Map<String, Value>,
        key_width: ColumnWidth,
        value_width: ColumnWidth,
    ) -> Container {
        let rows = data
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Object(_) | Value::Array(_) => {
                        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                    }
                    scalar => scalar_text(scalar),
                };
                ColumnSet::new(vec![
                    Column::new(vec![
                        TextBlock::new(key.as_str())
                            .weight(FontWeight::Bolder)
                            .wrap(true)
                            .into(),
                    ])
                    .width(key_width),
                    Column::new(vec![TextBlock::new(value).wrap(true).into()]).width(value_width),
                ])
                .into()
            })
            .collect();
        Container::new(rows)
    }
}

/// Display form of a JSON scalar; strings are unquoted and `null` is empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn render_value(value: &Value, depth: usize, out: &mut Vec<Element>) -> CardResult<()> {
    if depth > MAX_JSON_DEPTH {
        out.push(
            TextBlock::new(value.to_string())
                .font_type(FontType::Monospace)
                .wrap(true)
                .into(),
        );
        return Ok(());
    }
    match value {
        Value::Object(map) => {
            let facts: Vec<_> = map
                .iter()
                .filter(|(_, value)| is_scalar(value))
                .map(|(key, value)| (key.clone(), scalar_text(value)))
                .collect();
            if !facts.is_empty() {
                out.push(DataConnector::create_fact_set(facts).into());
            }
            for (key, nested) in map.iter().filter(|(_, value)| !is_scalar(value)) {
                out.push(
                    TextBlock::new(key.as_str())
                        .weight(FontWeight::Bolder)
                        .wrap(true)
                        .into(),
                );
                render_value(nested, depth + 1, out)?;
            }
        }
        Value::Array(items) if items.is_empty() => {}
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut headers: Vec<&str> = Vec::new();
            for item in items.iter().filter_map(Value::as_object) {
                for key in item.keys() {
                    if !headers.contains(&key.as_str()) {
                        headers.push(key);
                    }
                }
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .filter_map(Value::as_object)
                .map(|item| {
                    headers
                        .iter()
                        .map(|key| match item.get(*key) {
                            Some(cell) if is_scalar(cell) => scalar_text(cell),
                            Some(cell) => cell.to_string(),
                            None => String::new(),
                        })
                        .collect()
                })
                .collect();
            if headers.is_empty() {
                return Ok(());
            }
            out.extend(DataConnector::create_table(&headers, &rows, None, false)?);
        }
        Value::Array(items) if items.iter().all(is_scalar) => {
            let texts: Vec<String> = items.iter().map(scalar_text).collect();
            out.extend(DataConnector::create_list(&texts, false));
        }
        Value::Array(items) => {
            for item in items {
                render_value(item, depth + 1, out)?;
            }
        }
        scalar => out.push(TextBlock::new(scalar_text(scalar)).wrap(true).into()),
    }
    Ok(())
}
