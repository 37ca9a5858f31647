//! Format endpoints

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use commander_ledger_client::Access;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `DELETE /api/formats/:id`
///
/// Removes the format, every match played under it and their participant
/// rows. Admin only.
pub async fn delete_format(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;

    if !caller.capability(None).is_admin() {
        return Err(ApiError::Forbidden(
            "only an admin can delete a format".to_string(),
        ));
    }
    if !state.has_service_key() {
        return Err(ApiError::ServiceUnavailable(
            "format deletion is not configured".to_string(),
        ));
    }

    state
        .backend
        .get_format(Access::Service, id)
        .await?
        .ok_or_else(|| ApiError::not_found("format"))?;

    let match_ids = state.backend.match_ids_for_format(Access::Service, id).await?;
    state.backend.delete_matches(Access::Service, &match_ids).await?;
    state.backend.delete_format(Access::Service, id).await?;

    info!(
        format_id = %id,
        user_id = %caller.id(),
        matches = match_ids.len(),
        "format deleted"
    );

    Ok(Json(json!({ "deleted": id, "matches_deleted": match_ids.len() })))
}
