//! Encoding of the persisted inventory/projects records.
//!
//! Payloads above a size threshold have their well-known field names
//! abbreviated and are prefixed with [`TRANSFORM_MARKER`]. Decoding reverses
//! the transform and falls back to a plain JSON parse when the transformed
//! payload cannot be read.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Prefix identifying an abbreviated payload.
pub const TRANSFORM_MARKER: &str = "~pb1:";

/// Plain JSON payloads larger than this many bytes are abbreviated.
pub const DEFAULT_COMPRESS_THRESHOLD: usize = 64 * 1024;

const PART_FIELDS: &[(&str, &str)] = &[
    ("name", "n"),
    ("quantity", "q"),
    ("purchaseUrl", "u"),
    ("type", "t"),
    ("projects", "p"),
];

const PROJECT_FIELDS: &[(&str, &str)] = &[("name", "n"), ("bom", "b")];

const LINE_FIELDS: &[(&str, &str)] = &[("name", "n"), ("quantity", "q")];

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Persisted payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which persisted record a payload holds; decides which keys are abbreviated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Inventory,
    Projects,
}

/// Serialize a record, abbreviating it when the plain form exceeds `threshold` bytes.
pub fn encode(kind: RecordKind, value: &Value, threshold: usize) -> Result<String, CodecError> {
    let plain = serde_json::to_string(value)?;
    if plain.len() <= threshold {
        return Ok(plain);
    }

    let mut shrunk = value.clone();
    transform(kind, &mut shrunk, Direction::Abbreviate);
    let body = serde_json::to_string(&shrunk)?;
    Ok(format!("{TRANSFORM_MARKER}{body}"))
}

/// Decode a stored payload, abbreviated or plain.
pub fn decode(kind: RecordKind, text: &str) -> Result<Value, CodecError> {
    if let Some(body) = text.strip_prefix(TRANSFORM_MARKER) {
        match serde_json::from_str::<Value>(body) {
            Ok(mut value) => {
                transform(kind, &mut value, Direction::Expand);
                return Ok(value);
            }
            Err(err) => {
                warn!(error = %err, "abbreviated payload unreadable; trying plain JSON");
            }
        }
    }
    Ok(serde_json::from_str(text)?)
}

#[derive(Clone, Copy)]
enum Direction {
    Abbreviate,
    Expand,
}

fn transform(kind: RecordKind, value: &mut Value, direction: Direction) {
    let Value::Object(records) = value else {
        return;
    };
    for record in records.values_mut() {
        let Value::Object(fields) = record else {
            continue;
        };
        match kind {
            RecordKind::Inventory => rename_fields(fields, PART_FIELDS, direction),
            RecordKind::Projects => {
                rename_fields(fields, PROJECT_FIELDS, direction);
                let bom_key = match direction {
                    Direction::Abbreviate => "b",
                    Direction::Expand => "bom",
                };
                if let Some(Value::Object(lines)) = fields.get_mut(bom_key) {
                    for line in lines.values_mut() {
                        if let Value::Object(line_fields) = line {
                            rename_fields(line_fields, LINE_FIELDS, direction);
                        }
                    }
                }
            }
        }
    }
}

fn rename_fields(fields: &mut Map<String, Value>, table: &[(&str, &str)], direction: Direction) {
    for (long, short) in table {
        let (from, to) = match direction {
            Direction::Abbreviate => (*long, *short),
            Direction::Expand => (*short, *long),
        };
        if fields.contains_key(to) {
            continue;
        }
        if let Some(v) = fields.remove(from) {
            fields.insert(to.to_string(), v);
        }
    }
}
