//! Features Module - Schema alignment
//!
//! Turns a raw request record into the dense, ordered vector the models
//! were trained on.

pub mod layout;
pub mod record;
pub mod vector;
pub mod align;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FeatureSchema, LayoutInfo};
pub use record::FeatureRecord;
pub use vector::AlignedVector;
pub use align::align;
