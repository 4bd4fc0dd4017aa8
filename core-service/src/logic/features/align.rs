//! Schema Aligner
//!
//! Maps an arbitrary record onto the fixed ordered vector the models were
//! trained on. Missing fields become `0.0`, unknown fields are dropped.
//! Pure function: no I/O, no shared state.

use serde_json::Value;

use super::layout::FeatureSchema;
use super::record::FeatureRecord;
use super::vector::AlignedVector;
use crate::logic::error::ValidationError;

/// Align `record` onto `schema`.
///
/// For each schema field in order, emits the coerced value if present and
/// `0.0` otherwise. Values of keys outside the schema are never inspected.
pub fn align(record: &FeatureRecord, schema: &FeatureSchema) -> Result<AlignedVector, ValidationError> {
    let mut values = Vec::with_capacity(schema.len());

    for field in schema.iter() {
        let value = match record.get(field) {
            Some(raw) => coerce(field, raw)?.unwrap_or(0.0),
            None => 0.0,
        };
        values.push(value);
    }

    Ok(AlignedVector::new(schema, values))
}

/// Coerce a JSON value to f32. `Ok(None)` means "treat as absent".
fn coerce(field: &str, raw: &Value) -> Result<Option<f32>, ValidationError> {
    let value = match raw {
        Value::Null => return Ok(None),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::new(field, format!("has unrepresentable number {}", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new(field, format!("could not convert string to float: '{}'", s)))?,
        Value::Array(_) => return Err(ValidationError::new(field, "must be a number, got an array")),
        Value::Object(_) => return Err(ValidationError::new(field, "must be a number, got an object")),
    };

    let value = value as f32;
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }

    Ok(Some(value))
}
