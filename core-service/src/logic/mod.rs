//! Logic Module - Inference pipeline
//!
//! - `features/` - Schema alignment (record -> ordered vector)
//! - `model/` - Learned artifacts (baseline scorer, threshold, attack classifier)
//! - `pipeline/` - Inference context + orchestrator state machine

pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
