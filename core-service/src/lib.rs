//! FlowGuard Core
//!
//! Two-stage inference over a single network-flow feature record:
//! reconstruction-error anomaly scoring against a learned baseline, then
//! attack-family classification for anomalous records.
//!
//! ```text
//! record -> align -> score (MSE) -> gate (> threshold?) -> BENIGN
//!                                                       -> classify -> ANOMALY{attack}
//! ```

pub mod constants;
pub mod logic;

pub use logic::error::{ConfigurationError, InferenceError, PredictError, ValidationError};
pub use logic::features::{align, AlignedVector, FeatureRecord, FeatureSchema, LayoutInfo};
pub use logic::model::{
    AttackClassifier, AttackModel, BaselineModel, DecisionThreshold, Gate, LabelMap, ReconstructionScorer,
};
pub use logic::pipeline::{
    predict, predict_detailed, ArtifactPaths, InferenceContext, ModelMetadata, Prediction, Stage, StageName, Verdict,
};
