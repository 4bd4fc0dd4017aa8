//! Model metadata handler

use axum::{extract::State, Json};

use flowguard_core::ModelMetadata;

use crate::AppState;

/// Loaded artifacts: schema, threshold, categories, digests
pub async fn metadata(State(state): State<AppState>) -> Json<ModelMetadata> {
    Json(state.ctx.metadata().clone())
}
