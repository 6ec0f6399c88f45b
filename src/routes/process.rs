use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ProcessResponse;
use crate::scan::pipeline;
use crate::state::SharedState;

/// Stage failures come back as `success: false` with a 200. Only a missing
/// or incomplete upload is an HTTP error.
pub async fn process(
    State(state): State<SharedState>,
    Path(upload_id): Path<String>,
) -> Result<Json<ProcessResponse>, AppError> {
    let upload_id = Uuid::parse_str(&upload_id)
        .map_err(|_| AppError::NotFound("Upload not found".to_string()))?;

    let submission = state.store.resolve(upload_id).await?;
    let outcome = pipeline::run(&state, &submission).await;

    Ok(Json(outcome.into()))
}
