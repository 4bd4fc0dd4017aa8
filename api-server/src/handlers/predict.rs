//! Prediction handlers
//!
//! `POST /predict`       one record -> verdict
//! `POST /score`         one record -> verdict + MSE + threshold + stage trail
//! `POST /predict/batch` many records -> one result per record, in order
//!
//! Session runs are synchronous and serialized per model, so every handler
//! hands the work to the blocking pool and keeps the runtime workers free.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use flowguard_core::{FeatureRecord, InferenceContext, PredictError, Prediction, Verdict};

use crate::{AppError, AppResult, AppState};

/// Default upper bound on records per batch
pub const MAX_BATCH_RECORDS: usize = 1024;

#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(length(min = 1, message = "records must not be empty"))]
    pub records: Vec<FeatureRecord>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Verdict(Verdict),
    Error { detail: String },
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub anomalies: usize,
    pub errors: usize,
}

/// Run `job` against the shared context on the blocking pool
async fn run_blocking<T, F>(ctx: &Arc<InferenceContext>, job: F) -> AppResult<T>
where
    F: FnOnce(&InferenceContext) -> T + Send + 'static,
    T: Send + 'static,
{
    let ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || job(&ctx))
        .await
        .map_err(|e| AppError::InternalError(format!("Inference task failed: {}", e)))
}

/// Log a failed request once, at a level matching who is at fault
fn rejected(request_id: Uuid, ctx: &InferenceContext, err: PredictError) -> AppError {
    if err.is_validation() {
        tracing::warn!(%request_id, "request rejected: {}", err);
    } else {
        tracing::error!(
            %request_id,
            fingerprint = %ctx.metadata().layout.fingerprint,
            "inference failed: {}",
            err
        );
    }
    AppError::from(err)
}

/// Score one record
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<FeatureRecord>, JsonRejection>,
) -> AppResult<Json<Verdict>> {
    let Json(record) = payload?;
    let request_id = Uuid::new_v4();

    let verdict = run_blocking(&state.ctx, move |ctx| ctx.predict(&record))
        .await?
        .map_err(|e| rejected(request_id, &state.ctx, e))?;

    tracing::info!(
        %request_id,
        label = verdict.label(),
        attack = verdict.attack().unwrap_or("-"),
        "prediction"
    );

    Ok(Json(verdict))
}

/// Score one record, keeping the numbers behind the verdict
pub async fn score(
    State(state): State<AppState>,
    payload: Result<Json<FeatureRecord>, JsonRejection>,
) -> AppResult<Json<Prediction>> {
    let Json(record) = payload?;
    let request_id = Uuid::new_v4();

    let prediction = run_blocking(&state.ctx, move |ctx| ctx.predict_detailed(&record))
        .await?
        .map_err(|e| rejected(request_id, &state.ctx, e))?;

    tracing::info!(
        %request_id,
        label = prediction.verdict.label(),
        mse = prediction.mse,
        threshold = prediction.threshold,
        "scored"
    );

    Ok(Json(prediction))
}

/// Score many records. A bad record yields an error entry, not a failed batch.
pub async fn batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> AppResult<Json<BatchResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    if req.records.len() > state.config.max_batch {
        return Err(AppError::BadRequest(format!(
            "batch of {} records exceeds limit of {}",
            req.records.len(),
            state.config.max_batch
        )));
    }

    let request_id = Uuid::new_v4();

    let response = run_blocking(&state.ctx, move |ctx| {
        let mut anomalies = 0;
        let mut errors = 0;

        let results: Vec<BatchItem> = req
            .records
            .iter()
            .map(|record| match ctx.predict(record) {
                Ok(verdict) => {
                    if verdict.is_anomaly() {
                        anomalies += 1;
                    }
                    BatchItem::Verdict(verdict)
                }
                Err(e) => {
                    errors += 1;
                    BatchItem::Error { detail: e.to_string() }
                }
            })
            .collect();

        BatchResponse {
            results,
            anomalies,
            errors,
        }
    })
    .await?;

    tracing::info!(
        %request_id,
        records = response.results.len(),
        anomalies = response.anomalies,
        errors = response.errors,
        "batch scored"
    );

    Ok(Json(response))
}
