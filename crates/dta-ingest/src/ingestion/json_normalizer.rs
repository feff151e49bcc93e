//! Semi-structured normalizer for JSON review files

use serde_json::{Map, Number, Value};

use super::columns::normalize_column_names;
use crate::error::{Error, Result};
use crate::types::{NormalizedTable, RawFile};

/// Field cleaned and scored when present
pub const TEXT_FIELD: &str = "text";

/// Column holding the placeholder score
pub const SENTIMENT_FIELD: &str = "sentiment_score";

/// Score assigned when the text is not a string
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Accepted top-level shapes, resolved once after parsing
#[derive(Debug, Clone, PartialEq)]
pub enum JsonShape {
    /// `[{...}, {...}]`
    List(Vec<Value>),
    /// `{"reviews": [{...}, ...], ...}`
    Reviews(Vec<Value>),
    /// Any other object, taken as one record
    Single(Map<String, Value>),
}

impl JsonShape {
    /// Classify a parsed document; `Err` carries a human-readable reason
    pub fn resolve(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Array(items) => Ok(Self::List(items)),
            Value::Object(mut object) => match object.remove("reviews") {
                Some(Value::Array(items)) => Ok(Self::Reviews(items)),
                Some(other) => Err(format!(
                    "'reviews' must be a list, found {}",
                    value_kind(&other)
                )),
                None => Ok(Self::Single(object)),
            },
            other => Err(format!("Unexpected JSON format: top-level {}", value_kind(&other))),
        }
    }

    /// Records in document order
    pub fn into_records(self) -> std::result::Result<Vec<Map<String, Value>>, String> {
        match self {
            Self::Single(object) => Ok(vec![object]),
            Self::List(items) | Self::Reviews(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Object(object) => Ok(object),
                    other => Err(format!("record {} is a {}, not an object", idx, value_kind(&other))),
                })
                .collect(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Normalizer for JSON review files
pub struct JsonNormalizer;

impl JsonNormalizer {
    /// Parse and normalize a JSON file
    pub fn normalize(raw: &RawFile) -> Result<NormalizedTable> {
        let filename = raw.filename();
        tracing::info!("Processing JSON data from {}", filename);

        let value: Value = serde_json::from_slice(raw.content())
            .map_err(|e| Error::parse(&filename, format!("malformed JSON: {}", e)))?;
        let shape = JsonShape::resolve(value).map_err(|msg| Error::parse(&filename, msg))?;
        let records = shape.into_records().map_err(|msg| Error::parse(&filename, msg))?;

        let mut table = records_to_table(records)?;

        if let Some(idx) = table.column_index(TEXT_FIELD) {
            table.update_column(idx, |cell| {
                if let Value::String(text) = cell {
                    *text = collapse_whitespace(text);
                }
            });

            let scores = table.column_values(idx).map(placeholder_sentiment).collect();
            table.set_column(SENTIMENT_FIELD, scores)?;
        }

        Ok(table)
    }
}

/// Build a table from records; columns are the union of keys in first-seen order
fn records_to_table(records: Vec<Map<String, Value>>) -> Result<NormalizedTable> {
    let mut source_names: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !source_names.contains(key) {
                source_names.push(key.clone());
            }
        }
    }

    let names = normalize_column_names(&source_names)?;

    let rows = records
        .into_iter()
        .map(|mut record| {
            source_names
                .iter()
                .map(|key| record.remove(key).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    NormalizedTable::new(names, rows)
}

/// Trim and collapse internal whitespace runs to one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length-based stand-in for a sentiment model: `min(1, chars / 1000)` for
/// strings, 0.5 for anything else. Carries no semantic meaning.
pub fn placeholder_sentiment(text: &Value) -> Value {
    let score = match text {
        Value::String(s) => (s.chars().count() as f64 / 1000.0).min(1.0),
        _ => NEUTRAL_SCORE,
    };
    Number::from_f64(score).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(doc: &str) -> Result<NormalizedTable> {
        JsonNormalizer::normalize(&RawFile::from_bytes("reviews.json", doc.as_bytes().to_vec()))
    }

    #[test]
    fn test_shape_dispatch() {
        let reviews = normalize(r#"{"reviews": [{"text": "ok"}, {"text": "bad"}]}"#).unwrap();
        assert_eq!(reviews.row_count(), 2);

        let list = normalize(r#"[{"text": "x"}]"#).unwrap();
        assert_eq!(list.row_count(), 1);

        let single = normalize(r#"{"text": "solo"}"#).unwrap();
        assert_eq!(single.row_count(), 1);
        assert_eq!(single.cell(0, "text"), Some(&json!("solo")));
    }

    #[test]
    fn test_shape_resolution_variants() {
        assert!(matches!(JsonShape::resolve(json!([])), Ok(JsonShape::List(_))));
        assert!(matches!(JsonShape::resolve(json!({"reviews": []})), Ok(JsonShape::Reviews(_))));
        assert!(matches!(JsonShape::resolve(json!({"a": 1})), Ok(JsonShape::Single(_))));
        assert!(JsonShape::resolve(json!(42)).is_err());
        assert!(JsonShape::resolve(json!({"reviews": "none"})).is_err());
    }

    #[test]
    fn test_unsupported_shapes_are_parse_errors() {
        assert!(matches!(normalize("\"just a string\""), Err(Error::Parse { .. })));
        assert!(matches!(normalize("[1, 2]"), Err(Error::Parse { .. })));
        assert!(matches!(normalize("{\"reviews\": [ "), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_columns_union_and_normalized() {
        let table = normalize(
            r#"[{"Review ID": 1, "Text": "fine"}, {"Review ID": 2, "Star Rating": 4}]"#,
        )
        .unwrap();

        assert_eq!(table.column_names(), vec!["review_id", "text", "star_rating", "sentiment_score"]);
        assert_eq!(table.cell(1, "text"), Some(&Value::Null));
        assert_eq!(table.cell(0, "star_rating"), Some(&Value::Null));
    }

    #[test]
    fn test_colliding_keys_fail() {
        let err = normalize(r#"[{"Text": "a"}, {"text": "b"}]"#).unwrap_err();
        assert!(matches!(err, Error::SchemaConflict { .. }));
    }

    #[test]
    fn test_text_whitespace_collapsed() {
        let table = normalize("[{\"text\": \"  great \\n\\t product   overall \"}]").unwrap();
        assert_eq!(table.cell(0, "text"), Some(&json!("great product overall")));
    }

    #[test]
    fn test_sentiment_placeholder() {
        let short = "a".repeat(500);
        let long = "a".repeat(2000);
        let doc = json!([{"text": short}, {"text": long}, {"text": 17}, {"other": true}]).to_string();
        let table = normalize(&doc).unwrap();

        let scores: Vec<f64> = table
            .column_values(table.column_index(SENTIMENT_FIELD).unwrap())
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(scores, vec![0.5, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_no_text_field_means_no_score() {
        let table = normalize(r#"[{"rating": 5}]"#).unwrap();
        assert!(table.column_index(SENTIMENT_FIELD).is_none());
    }
}
