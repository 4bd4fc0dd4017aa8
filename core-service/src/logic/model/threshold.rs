//! Decision Threshold & Threshold Gate
//!
//! The threshold is a trained operating point loaded from `threshold.json`.
//! It is never adjusted at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logic::error::ConfigurationError;

/// Gate outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gate {
    Benign,
    Anomaly,
}

/// `ANOMALY` iff `score > threshold`. A score equal to the threshold is benign.
pub fn classify(score: f64, threshold: f64) -> Gate {
    if score > threshold {
        Gate::Anomaly
    } else {
        Gate::Benign
    }
}

/// On-disk layout of `threshold.json`
#[derive(Debug, Deserialize)]
struct ThresholdFile {
    threshold: f64,
}

/// Loaded cutoff, read-only for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionThreshold(f64);

impl DecisionThreshold {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err(format!("threshold must be finite, got {}", value));
        }
        Ok(Self(value))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let file: ThresholdFile = serde_json::from_str(&raw)
            .map_err(|e| ConfigurationError::malformed(path, format!("expected {{\"threshold\": <float>}}: {}", e)))?;

        let threshold = Self::new(file.threshold).map_err(|reason| ConfigurationError::malformed(path, reason))?;

        log::info!("Decision threshold loaded: {:.6}", threshold.value());
        Ok(threshold)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn gate(&self, score: f64) -> Gate {
        classify(score, self.0)
    }
}
