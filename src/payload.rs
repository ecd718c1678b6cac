use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{IngestError, Result};
use crate::types::RawPayload;

pub const RAW_PAYLOAD_SCHEMA: &str = include_str!("../schemas/raw_payload.v1.json");

/// Check the top-level shape of a raw payload against the bundled schema
pub fn validate_payload_shape(value: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(RAW_PAYLOAD_SCHEMA)?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|e| IngestError::Config(format!("raw payload schema does not compile: {e}")))?;

    if let Err(errors) = compiled.validate(value) {
        let messages: Vec<String> = errors
            .map(|e| format!("{} at '{}'", e, e.instance_path))
            .collect();
        return Err(IngestError::MalformedPayload(messages.join("; ")));
    }
    Ok(())
}

pub fn parse_payload(value: Value) -> Result<RawPayload> {
    validate_payload_shape(&value)?;
    serde_json::from_value(value).map_err(|e| IngestError::MalformedPayload(e.to_string()))
}

/// Read and shape-check a payload file; unreadable JSON is as fatal as a wrong shape
pub fn read_payload(path: &Path) -> Result<RawPayload> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| IngestError::MalformedPayload(format!("{}: {}", path.display(), e)))?;
    parse_payload(value)
}
