//! Newline-delimited JSON records.
//!
//! # Record Layout
//! Fields appear in this order, each only when it has a value:
//! `component, env, timestamp, level, logger, message, thread`, then
//! `stackhash, stacktrace` when an error is attached, then the static custom
//! fields, then the ambient context of the logging thread.
//!
//! Every standard field name can be remapped, e.g. `logger=name,thread=t`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::value::RawValue;

use crate::encoder::stack_hash::StackHasher;
use crate::encoder::throwable::ThrowableRenderer;
use crate::encoder::timestamp::{TimestampFormat, Zone};
use crate::encoder::RecordEncoder;
use crate::logger::LogEvent;
use crate::observability::reporter;

/// The standard fields of a JSON record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardField {
    Component = 0,
    Env,
    Timestamp,
    Level,
    Logger,
    Message,
    Thread,
    StackHash,
    StackTrace,
}

const BASE_NAMES: [&str; 9] = [
    "component",
    "env",
    "timestamp",
    "level",
    "logger",
    "message",
    "thread",
    "stackhash",
    "stacktrace",
];

/// Output names of the standard fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    names: [String; 9],
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            names: BASE_NAMES.map(str::to_owned),
        }
    }
}

impl PropertyNames {
    /// Apply a `key=value` mapping separated by `,` or `;`.
    ///
    /// Keys are matched case-insensitively against the base names; unknown
    /// keys and malformed pairs are ignored.
    pub fn parse(mapping: Option<&str>) -> Self {
        let mut names = Self::default();
        let Some(mapping) = mapping else {
            return names;
        };
        for pair in mapping.split([',', ';']) {
            let parts: Vec<&str> = pair.trim().split('=').collect();
            let [key, value] = parts.as_slice() else {
                continue;
            };
            let (key, value) = (key.trim().to_lowercase(), value.trim());
            if value.is_empty() {
                continue;
            }
            if let Some(idx) = BASE_NAMES.iter().position(|base| *base == key) {
                names.names[idx] = value.to_owned();
            }
        }
        names
    }

    pub fn get(&self, field: StandardField) -> &str {
        &self.names[field as usize]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// Builder for [`JsonEncoder`].
#[derive(Debug)]
pub struct JsonEncoderBuilder {
    component: Option<String>,
    environment: Option<String>,
    property_names: PropertyNames,
    custom_fields: Vec<(String, Box<RawValue>)>,
    timestamp: Option<TimestampFormat>,
    include_stack_hash: bool,
    renderer: ThrowableRenderer,
    hasher: Option<StackHasher>,
}

impl Default for JsonEncoderBuilder {
    fn default() -> Self {
        Self {
            component: None,
            environment: None,
            property_names: PropertyNames::default(),
            custom_fields: Vec::new(),
            timestamp: None,
            include_stack_hash: true,
            renderer: ThrowableRenderer::default(),
            hasher: None,
        }
    }
}

impl JsonEncoderBuilder {
    pub fn component(mut self, component: Option<String>) -> Self {
        self.component = component.filter(|c| !c.is_empty());
        self
    }

    pub fn environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment.filter(|e| !e.is_empty());
        self
    }

    pub fn property_names(mut self, property_names: PropertyNames) -> Self {
        self.property_names = property_names;
        self
    }

    /// Add one custom field holding a pre-serialized JSON value.
    pub fn custom_field(mut self, key: impl Into<String>, value: Box<RawValue>) -> Self {
        self.custom_fields.push((key.into(), value));
        self
    }

    /// Add every member of a JSON object as a static custom field.
    ///
    /// Text that is not a JSON object is reported and ignored.
    pub fn custom_fields(mut self, json: Option<&str>) -> Self {
        let Some(json) = json.map(str::trim).filter(|j| !j.is_empty()) else {
            return self;
        };
        match parse_custom_fields(json) {
            Ok(fields) => self.custom_fields.extend(fields),
            Err(e) => reporter::report_config_error("logger.customFields", &e),
        }
        self
    }

    pub fn timestamp(mut self, timestamp: TimestampFormat) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn include_stack_hash(mut self, include: bool) -> Self {
        self.include_stack_hash = include;
        self
    }

    pub fn throwable_renderer(mut self, renderer: ThrowableRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn stack_hasher(mut self, hasher: StackHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn build(self) -> JsonEncoder {
        let hasher = self
            .hasher
            .unwrap_or_else(|| StackHasher::new(self.renderer.filter()));
        JsonEncoder {
            component: self.component,
            environment: self.environment,
            names: self.property_names,
            custom_fields: self.custom_fields,
            timestamp: self
                .timestamp
                .unwrap_or_else(|| TimestampFormat::json_default(Zone::Local)),
            include_stack_hash: self.include_stack_hash,
            renderer: self.renderer,
            hasher,
        }
    }
}

/// Parse a JSON object into pre-serialized custom fields, in key order.
pub fn parse_custom_fields(json: &str) -> Result<Vec<(String, Box<RawValue>)>, serde_json::Error> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
    object
        .into_iter()
        .map(|(key, value)| serde_json::value::to_raw_value(&value).map(|raw| (key, raw)))
        .collect()
}

/// Encodes events as single-line JSON objects.
#[derive(Debug)]
pub struct JsonEncoder {
    component: Option<String>,
    environment: Option<String>,
    names: PropertyNames,
    custom_fields: Vec<(String, Box<RawValue>)>,
    timestamp: TimestampFormat,
    include_stack_hash: bool,
    renderer: ThrowableRenderer,
    hasher: StackHasher,
}

impl JsonEncoder {
    pub fn builder() -> JsonEncoderBuilder {
        JsonEncoderBuilder::default()
    }
}

enum FieldValue<'a> {
    Text(&'a str),
    Raw(&'a RawValue),
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Raw(raw) => raw.serialize(serializer),
        }
    }
}

/// Ordered field list serialized as one JSON object.
struct Record<'a>(Vec<(&'a str, FieldValue<'a>)>);

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl RecordEncoder for JsonEncoder {
    fn encode(&self, event: &LogEvent<'_>) -> Vec<u8> {
        let trace = event
            .error
            .map(|t| self.renderer.render(t))
            .unwrap_or_default();
        let hash = match event.error {
            Some(t) if self.include_stack_hash && !trace.is_empty() => Some(self.hasher.hex_hash(t)),
            _ => None,
        };
        let timestamp = self.timestamp.format(event.timestamp);
        let message = event.message();

        let mut fields = Vec::with_capacity(BASE_NAMES.len() + self.custom_fields.len() + event.context.len());
        let names = &self.names;
        let standard = [
            (StandardField::Component, self.component.as_deref()),
            (StandardField::Env, self.environment.as_deref()),
            (StandardField::Timestamp, Some(timestamp.as_str())),
            (StandardField::Level, Some(event.level.as_str())),
            (StandardField::Logger, Some(event.logger_name)),
            (StandardField::Message, Some(message.as_str())),
            (StandardField::Thread, Some(event.thread_name.as_str())),
            (StandardField::StackHash, hash.as_deref()),
            (StandardField::StackTrace, Some(trace.as_str())),
        ];
        for (field, value) in standard {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.push((names.get(field), FieldValue::Text(value)));
            }
        }
        for (key, raw) in &self.custom_fields {
            fields.push((key.as_str(), FieldValue::Raw(raw)));
        }
        for (key, value) in &event.context {
            fields.push((key.as_str(), FieldValue::Text(value.as_str())));
        }

        match serde_json::to_vec(&Record(fields)) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                bytes
            }
            Err(e) => {
                reporter::report_encode_failure(event.logger_name, &e);
                Vec::new()
            }
        }
    }
}
