//! Inference Orchestrator
//!
//! Linear state machine, no branching back:
//!
//! ```text
//! RECEIVED -> ALIGNED -> SCORED -> GATED -> TERMINAL(BENIGN)
//!                                        -> CLASSIFIED -> TERMINAL(ANOMALY)
//! ```
//!
//! Each `advance` performs exactly one transition, so callers (and tests) can
//! stop at any intermediate stage. Failures from any step surface as a single
//! `PredictError`; nothing is retried and no partial verdict is returned.

use serde::{Deserialize, Serialize};

use super::context::InferenceContext;
use crate::logic::error::{InferenceError, PredictError};
use crate::logic::features::{align, AlignedVector, FeatureRecord};
use crate::logic::model::Gate;

// ============================================================================
// VERDICT
// ============================================================================

/// `{"label": "BENIGN"}` or `{"label": "ANOMALY", "attack": "<category>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum Verdict {
    #[serde(rename = "BENIGN")]
    Benign,
    #[serde(rename = "ANOMALY")]
    Anomaly { attack: String },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Benign => crate::constants::LABEL_BENIGN,
            Verdict::Anomaly { .. } => crate::constants::LABEL_ANOMALY,
        }
    }

    pub fn attack(&self) -> Option<&str> {
        match self {
            Verdict::Benign => None,
            Verdict::Anomaly { attack } => Some(attack),
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, Verdict::Anomaly { .. })
    }
}

/// Verdict plus the numbers behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Reconstruction MSE
    pub mse: f64,
    pub threshold: f64,
    /// Stages traversed, in order
    pub stages: Vec<StageName>,
}

// ============================================================================
// STATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageName {
    Received,
    Aligned,
    Scored,
    Gated,
    Classified,
    Terminal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage<'r> {
    Received(&'r FeatureRecord),
    Aligned(AlignedVector),
    Scored {
        vector: AlignedVector,
        score: f64,
    },
    Gated {
        vector: AlignedVector,
        score: f64,
        gate: Gate,
    },
    Classified {
        score: f64,
        attack: String,
    },
    Terminal {
        verdict: Verdict,
        score: f64,
    },
}

impl<'r> Stage<'r> {
    pub fn start(record: &'r FeatureRecord) -> Self {
        Stage::Received(record)
    }

    pub fn name(&self) -> StageName {
        match self {
            Stage::Received(_) => StageName::Received,
            Stage::Aligned(_) => StageName::Aligned,
            Stage::Scored { .. } => StageName::Scored,
            Stage::Gated { .. } => StageName::Gated,
            Stage::Classified { .. } => StageName::Classified,
            Stage::Terminal { .. } => StageName::Terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Terminal { .. })
    }

    /// Perform one transition. `Terminal` stays `Terminal`.
    pub fn advance(self, ctx: &InferenceContext) -> Result<Stage<'r>, PredictError> {
        let next = match self {
            Stage::Received(record) => Stage::Aligned(align(record, ctx.schema())?),

            Stage::Aligned(vector) => {
                if !vector.matches(ctx.schema()) {
                    return Err(InferenceError(format!(
                        "Vector layout {:08x} ({} features) does not match schema {:08x} ({} features)",
                        vector.fingerprint,
                        vector.len(),
                        ctx.schema().fingerprint(),
                        ctx.schema().len()
                    ))
                    .into());
                }
                let score = ctx.scorer().score(&vector)?;
                Stage::Scored { vector, score }
            }

            Stage::Scored { vector, score } => {
                let gate = ctx.threshold().gate(score);
                Stage::Gated { vector, score, gate }
            }

            Stage::Gated { score, gate: Gate::Benign, .. } => Stage::Terminal {
                verdict: Verdict::Benign,
                score,
            },

            Stage::Gated { vector, score, gate: Gate::Anomaly } => {
                let attack = ctx.classifier().classify_attack(&vector)?;
                Stage::Classified { score, attack }
            }

            Stage::Classified { score, attack } => Stage::Terminal {
                verdict: Verdict::Anomaly { attack },
                score,
            },

            terminal @ Stage::Terminal { .. } => terminal,
        };

        log::debug!("pipeline -> {:?}", next.name());
        Ok(next)
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Score one record: BENIGN, or ANOMALY with its attack category
pub fn predict(ctx: &InferenceContext, record: &FeatureRecord) -> Result<Verdict, PredictError> {
    predict_detailed(ctx, record).map(|p| p.verdict)
}

/// Like `predict`, keeping the MSE, threshold and the stage trail
pub fn predict_detailed(ctx: &InferenceContext, record: &FeatureRecord) -> Result<Prediction, PredictError> {
    let mut stage = Stage::start(record);
    let mut stages = vec![stage.name()];

    loop {
        if let Stage::Terminal { verdict, score } = stage {
            return Ok(Prediction {
                verdict,
                mse: score,
                threshold: ctx.threshold().value(),
                stages,
            });
        }

        // Callers own the failure report; the core only traces where it stopped
        let from = stage.name();
        stage = stage.advance(ctx).map_err(|e| {
            log::debug!("pipeline stopped at {:?}: {}", from, e);
            e
        })?;
        stages.push(stage.name());
    }
}

impl InferenceContext {
    pub fn predict(&self, record: &FeatureRecord) -> Result<Verdict, PredictError> {
        predict(self, record)
    }

    pub fn predict_detailed(&self, record: &FeatureRecord) -> Result<Prediction, PredictError> {
        predict_detailed(self, record)
    }
}
