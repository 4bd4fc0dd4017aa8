//! Feature Layout - Feature Schema
//!
//! **This type controls the vector layout the models were trained on.**
//!
//! The schema is an ordered, immutable list of field names loaded once from
//! `feature_names.json`. Every vector entering scoring has exactly this arity
//! and this field order.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::ConfigurationError;

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered feature names. Cloning is cheap (shared storage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
    fingerprint: u32,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty layouts and duplicate names.
    pub fn new<I, S>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err("feature schema is empty".to_string());
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate feature name '{}'", name));
            }
        }

        let fingerprint = fingerprint_of(&names);

        Ok(Self {
            names: names.into(),
            fingerprint,
        })
    }

    /// Load `feature_names.json` (a JSON array of strings)
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let names: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| ConfigurationError::malformed(path, format!("expected a list of strings: {}", e)))?;

        let schema = Self::new(names).map_err(|reason| ConfigurationError::malformed(path, reason))?;

        log::info!(
            "Feature schema loaded: {} fields (fingerprint {:08x})",
            schema.len(),
            schema.fingerprint()
        );

        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Get feature index by name (O(n), only used off the hot path)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get feature name by index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// CRC32 over the names in order, used to spot schema/model drift in logs.
    /// Computed once at construction.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            fingerprint: format!("{:08x}", self.fingerprint()),
            feature_count: self.len(),
            feature_names: self.names.to_vec(),
        }
    }
}

fn fingerprint_of(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub fingerprint: String,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}
