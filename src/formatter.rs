use crate::error::{self, FormatError};
use crate::location::{self, LibraryBoundary};
use crate::record::{FieldValue, LogRecord};
use serde_json::{Map, Value};

/// Keys present in every record, in emission order. Custom fields never
/// override them.
pub const STANDARD_FIELDS: [&str; 7] = [
    "timestamp",
    "level",
    "message",
    "module",
    "filename",
    "function_name",
    "line",
];

/// Field whose object value is flattened into the top level of the record.
pub const CUSTOM_FIELD: &str = "custom";

/// Output of [`StructuredFormatter::format_detailed`].
#[derive(Debug, Clone)]
pub struct Formatted {
    /// One compact JSON object, without trailing newline.
    pub line: String,
    /// Custom fields that were left out, and why.
    pub dropped: Vec<FormatError>,
}

/// Renders records as single-line JSON objects.
#[derive(Debug, Clone, Default)]
pub struct StructuredFormatter {
    boundary: LibraryBoundary,
}

impl StructuredFormatter {
    pub fn new(boundary: LibraryBoundary) -> Self {
        Self { boundary }
    }

    /// Render `record` as one JSON line. Never fails.
    pub fn format(&self, record: &LogRecord) -> String {
        self.format_detailed(record).line
    }

    /// Like [`StructuredFormatter::format`], also reporting which custom
    /// fields were dropped.
    pub fn format_detailed(&self, record: &LogRecord) -> Formatted {
        let standard = self.standard_fields(record);
        let mut object = standard.clone();
        let mut dropped = Vec::new();

        for (key, value) in record.fields.iter() {
            if key == CUSTOM_FIELD {
                match value {
                    FieldValue::Json(Value::Object(inner)) => {
                        for (k, v) in inner {
                            if k == CUSTOM_FIELD {
                                dropped.push(FormatError::Collision(k.clone()));
                                continue;
                            }
                            merge_custom(&mut object, &mut dropped, k, v);
                        }
                    }
                    FieldValue::Json(other) => {
                        dropped.push(FormatError::CustomNotObject(json_kind(other)))
                    }
                    FieldValue::Unserializable(reason) => dropped.push(FormatError::Unserializable {
                        key: key.to_string(),
                        reason: reason.clone(),
                    }),
                }
                continue;
            }

            match value {
                FieldValue::Json(v) => merge_custom(&mut object, &mut dropped, key, v),
                FieldValue::Unserializable(reason) => dropped.push(FormatError::Unserializable {
                    key: key.to_string(),
                    reason: reason.clone(),
                }),
            }
        }

        let line = match serde_json::to_string(&object) {
            Ok(line) => line,
            Err(e) => {
                let err = FormatError::Degraded(e.to_string());
                error::report(&err);
                dropped.push(err);
                serde_json::to_string(&standard).unwrap_or_else(|_| minimal_line(record))
            }
        };

        Formatted { line, dropped }
    }

    fn standard_fields(&self, record: &LogRecord) -> Map<String, Value> {
        let source = location::extract(record, &self.boundary);

        let mut object = Map::new();
        object.insert("timestamp".into(), Value::String(format_timestamp(record)));
        object.insert("level".into(), Value::String(record.level.as_str().into()));
        object.insert("message".into(), Value::String(record.message.clone()));
        object.insert("module".into(), Value::String(source.module));
        object.insert("filename".into(), Value::String(source.filename));
        object.insert("function_name".into(), Value::String(source.function_name));
        object.insert("line".into(), Value::from(source.line));
        object
    }
}

/// ISO-8601 UTC with microseconds and a trailing `Z`.
pub fn format_timestamp(record: &LogRecord) -> String {
    record.created.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn merge_custom(
    object: &mut Map<String, Value>,
    dropped: &mut Vec<FormatError>,
    key: &str,
    value: &Value,
) {
    if STANDARD_FIELDS.contains(&key) {
        dropped.push(FormatError::Collision(key.to_string()));
        return;
    }
    object.insert(key.to_string(), value.clone());
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Last resort when even the standard fields fail to serialize.
fn minimal_line(record: &LogRecord) -> String {
    format!(
        "{{\"timestamp\":\"{}\",\"level\":\"{}\"}}",
        format_timestamp(record),
        record.level.as_str()
    )
}
