//! Pipeline Module - Inference context + orchestrator

pub mod context;
pub mod orchestrator;


pub use context::{ArtifactPaths, InferenceContext, ModelMetadata};
pub use orchestrator::{predict, predict_detailed, Prediction, Stage, StageName, Verdict};
