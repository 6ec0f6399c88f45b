use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{AppError, ScanError};
use crate::state::SharedState;

pub async fn list(State(state): State<SharedState>) -> Json<Value> {
    match state.cards.list_all().await {
        Ok(cards) => Json(json!({ "success": true, "data": cards })),
        Err(e) => {
            tracing::warn!("Could not list ID cards: {e}");
            Json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Record not found".to_string()))?;

    match state.cards.get(id).await {
        Ok(card) => Ok(Json(json!({ "success": true, "data": card }))),
        Err(ScanError::NotFound(msg)) => Err(AppError::NotFound(msg)),
        Err(e) => {
            tracing::warn!("Could not load ID card {id}: {e}");
            Ok(Json(json!({ "success": false, "error": e.to_string() })))
        }
    }
}
