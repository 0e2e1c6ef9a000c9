use crate::config::Level;
use crate::location::Frame;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One log call, captured before formatting.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Name of the logger that produced the record.
    pub logger: String,
    pub level: Level,
    /// Message with arguments already interpolated.
    pub message: String,
    pub created: DateTime<Utc>,
    /// Call frames, innermost first. The first frame is where the record was
    /// captured and doubles as its origin for fallback purposes.
    pub frames: Vec<Frame>,
    pub fields: Fields,
}

impl LogRecord {
    pub fn new(logger: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            level,
            message: message.into(),
            created: Utc::now(),
            frames: Vec::new(),
            fields: Fields::new(),
        }
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// The frame the record was captured at, if any.
    pub fn origin(&self) -> Option<&Frame> {
        self.frames.first()
    }
}

/// A custom field value as held until formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    /// The value's `Serialize` implementation failed; the formatter leaves
    /// the key out of the record.
    Unserializable(String),
}

/// Ordered custom fields attached to a single log call.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Fields::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Serialize `value` into a JSON value and store it under `key`.
    ///
    /// A serialization failure is recorded rather than returned, so call
    /// sites never have to handle it.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(e) => FieldValue::Unserializable(e.to_string()),
        };
        self.put(key.into(), value);
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.put(key.into(), FieldValue::Json(value));
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn put(&mut self, key: String, value: FieldValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert_value(key, value);
        }
        fields
    }
}

impl From<serde_json::Map<String, Value>> for Fields {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}
