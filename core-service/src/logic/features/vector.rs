//! Aligned Vector - Dense model input
//!
//! **Schema-stamped feature vector**
//!
//! Carries the fingerprint of the schema it was aligned against, so a vector
//! built for one layout is never silently fed to a model trained on another.

use serde::{Deserialize, Serialize};

use super::layout::FeatureSchema;

/// Dense ordered vector of length N, produced only by the Schema Aligner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedVector {
    /// CRC32 fingerprint of the schema this vector follows
    pub fingerprint: u32,
    /// Feature values in schema order
    values: Vec<f32>,
}

impl AlignedVector {
    pub(crate) fn new(schema: &FeatureSchema, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self {
            fingerprint: schema.fingerprint(),
            values,
        }
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f32> {
        schema.index_of(name).and_then(|i| self.get(i))
    }

    /// Whether this vector was aligned against `schema`
    pub fn matches(&self, schema: &FeatureSchema) -> bool {
        self.fingerprint == schema.fingerprint() && self.values.len() == schema.len()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

impl AsRef<[f32]> for AlignedVector {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}
