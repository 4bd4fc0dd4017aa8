//! Error Taxonomy
//!
//! Three failure classes, each with its own reaction:
//! - `ConfigurationError`: artifact missing/corrupt at startup, fatal.
//! - `ValidationError`: request field not coercible to a number, request rejected.
//! - `InferenceError`: shape mismatch or out-of-domain class index, request rejected.
//!
//! `PredictError` is the single error surfaced by the orchestrator boundary.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing artifacts: {}", format_paths(.paths))]
    MissingArtifacts { paths: Vec<PathBuf> },

    #[error("cannot read artifact {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to load model {}: {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl ConfigurationError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}' {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// INFERENCE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
#[error("InferenceError: {0}")]
pub struct InferenceError(pub String);

// ============================================================================
// ORCHESTRATOR BOUNDARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl PredictError {
    /// Validation failures are caller mistakes; inference failures point at
    /// artifact or schema drift and need operator attention.
    pub fn is_validation(&self) -> bool {
        matches!(self, PredictError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifacts_lists_every_path() {
        let err = ConfigurationError::MissingArtifacts {
            paths: vec![PathBuf::from("models/threshold.json"), PathBuf::from("models/autoencoder.onnx")],
        };
        let msg = err.to_string();
        assert!(msg.contains("models/threshold.json"));
        assert!(msg.contains("models/autoencoder.onnx"));
    }

    #[test]
    fn test_predict_error_messages() {
        let err: PredictError = ValidationError::new("a", "is not numeric").into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid record: field 'a' is not numeric");

        let err: PredictError = InferenceError("label index 9 out of range".into()).into();
        assert!(!err.is_validation());
        assert!(err.to_string().contains("label index 9"));
    }
}
