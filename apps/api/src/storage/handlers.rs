use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::storage::ObjectDescriptor;
use crate::state::AppState;

/// GET /api/v1/storage/objects
pub async fn handle_list_objects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ObjectDescriptor>>, AppError> {
    Ok(Json(state.objects.list_all().await?))
}
