use crate::config::Level as LogLevel;
use crate::location::{Frame, MAX_FRAMES};
use crate::logger::Logger;
use crate::record::{Fields, LogRecord};
use chrono::Utc;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns `tracing` events into JSON lines
/// written through a [`Logger`]'s handlers.
///
/// The event's own callsite is the innermost frame, followed by the
/// enclosing spans, innermost first. A span's name stands in for the
/// function name, which matches spans created by `#[instrument]`.
pub struct StructuredLayer {
    logger: Logger,
}

impl StructuredLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

/// TRACE and DEBUG both map to DEBUG; there is no CRITICAL in `tracing`.
pub fn map_level(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE | Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warning,
        _ => LogLevel::Error,
    }
}

impl<S> Layer<S> for StructuredLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = map_level(meta.level());
        if !self.logger.is_enabled_for(level) {
            return;
        }

        let mut fields = Fields::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let mut event_frame = Frame::from_metadata(meta);
        let mut frames = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.take(MAX_FRAMES - 1) {
                let span_meta = span.metadata();
                if frames.is_empty() && span_meta.module_path() == meta.module_path() {
                    event_frame = event_frame.with_function(span_meta.name());
                }
                frames.push(Frame::from_metadata(span_meta).with_function(span_meta.name()));
            }
        }
        frames.insert(0, event_frame);

        let record = LogRecord {
            logger: self.logger.name().to_string(),
            level,
            message: message.unwrap_or_default(),
            created: Utc::now(),
            frames,
            fields,
        };
        self.logger.emit(&record);
    }
}

/// Collects event fields; `message` is kept apart from the custom fields.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert_value(field.name(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert_value(field.name(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert_value(field.name(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form and become null
        self.fields.insert_value(field.name(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert_value(field.name(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert_value(field.name(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert_value(field.name(), Value::String(format!("{:?}", value)));
        }
    }
}
