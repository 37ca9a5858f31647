//! Account endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PublicUrlRequest {
    /// Object path inside the bucket
    pub path: String,

    /// Bucket, defaults to the avatar bucket
    #[serde(default)]
    pub bucket: Option<String>,
}

/// `DELETE /api/delete-user`
///
/// Deletes the caller's own auth user.
pub async fn delete_user(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Value>> {
    if !state.has_service_key() {
        return Err(ApiError::ServiceUnavailable(
            "account deletion is not configured".to_string(),
        ));
    }

    state.backend.delete_auth_user(caller.id()).await?;
    info!(user_id = %caller.id(), "account deleted");

    Ok(Json(json!({ "deleted": caller.id() })))
}

/// `POST /api/resend-confirmation`
pub async fn resend_confirmation(
    State(state): State<AppState>,
    payload: Result<Json<ResendRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let email = request.email.trim();

    let looks_valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !looks_valid {
        return Err(ApiError::BadRequest("a valid email is required".to_string()));
    }

    state.backend.resend_confirmation(email).await?;
    Ok(Json(json!({ "sent": true })))
}

/// `POST /api/profile/public-url`
///
/// Resolves an uploaded avatar to its public URL and stores it on the
/// caller's profile.
pub async fn profile_public_url(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<PublicUrlRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;

    let path = request.path.trim().trim_start_matches('/');
    if path.is_empty() || path.split('/').any(|segment| segment == "..") {
        return Err(ApiError::BadRequest("invalid object path".to_string()));
    }

    let bucket = request
        .bucket
        .as_deref()
        .map(str::trim)
        .filter(|bucket| !bucket.is_empty())
        .unwrap_or(&state.config.avatar_bucket);

    let url = state.backend.public_object_url(bucket, path);
    state
        .backend
        .update_profile_avatar(caller.access(), caller.id(), &url)
        .await?;

    Ok(Json(json!({ "public_url": url })))
}
