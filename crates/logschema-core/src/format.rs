//! Light structural checks for well-known structured log formats.
//!
//! Only inline content is checked; the engine skips this stage for remote
//! content. Formats without a checker (`json-schema`, `custom`, unset) rely
//! on the media-type stage alone.

use serde_json::{Map, Value};

use crate::descriptor::LogFormat;

/// Top-level keys that identify a W3C PROV / OPM document.
pub const PROV_KEYS: &[&str] = &[
    "wasGeneratedBy",
    "used",
    "wasAssociatedWith",
    "entity",
    "activity",
    "agent",
];

/// Top-level keys every RO-Crate metadata document must carry, in check order.
pub const RO_CRATE_KEYS: &[&str] = &["@context", "@graph"];

/// Run the structural check registered for `format`.
///
/// Returns a human-readable reason on failure.
pub fn check_format(format: Option<&LogFormat>, content: &str) -> Result<(), String> {
    match format.map(LogFormat::canonical) {
        Some(LogFormat::Opm) => check_opm(content),
        Some(LogFormat::RoCrate) => check_ro_crate(content),
        Some(LogFormat::JsonSchema)
        | Some(LogFormat::Custom)
        | Some(LogFormat::Unrecognized(_))
        | None => Ok(()),
    }
}

/// At least one PROV relation or element must be present at top level.
pub fn check_opm(content: &str) -> Result<(), String> {
    let doc = parse_object(content)?;
    if PROV_KEYS.iter().any(|key| doc.contains_key(*key)) {
        return Ok(());
    }
    Err(format!(
        "no W3C PROV keys found (expected at least one of: {})",
        PROV_KEYS.join(", ")
    ))
}

/// Both `@context` and `@graph` must be present at top level.
pub fn check_ro_crate(content: &str) -> Result<(), String> {
    let doc = parse_object(content)?;
    match RO_CRATE_KEYS.iter().find(|key| !doc.contains_key(**key)) {
        Some(missing) => Err(format!("missing required field '{}' for RO-Crate", missing)),
        None => Ok(()),
    }
}

fn parse_object(content: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(content).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(map),
        other => Err(format!(
            "expected a JSON object at top level, found {}",
            json_kind(&other)
        )),
    }
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
