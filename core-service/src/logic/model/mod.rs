//! Model Module - Learned artifacts
//!
//! Baseline (autoencoder) scoring, threshold gate, attack classifier.
//! Models sit behind `Send + Sync` traits so ONNX sessions and in-memory
//! test models are interchangeable.

pub mod inference;
pub mod threshold;
pub mod classifier;
pub mod digest;

#[cfg(test)]
pub(crate) mod onnx_fixtures;

// Re-export common types
pub use inference::{BaselineModel, OnnxBaseline, ReconstructionScorer, reconstruction_error};
pub use threshold::{classify, DecisionThreshold, Gate};
pub use classifier::{AttackClassifier, AttackModel, LabelMap, OnnxAttackModel};
pub use digest::{sha256_file, ChecksumManifest};
