//! Maintenance endpoints

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use commander_ledger_core::auth::secrets_match;

use crate::backfill::{run_backfill, BackfillJob, BackfillParams, BackfillReport};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the backfill secret
pub const BACKFILL_SECRET_HEADER: &str = "x-backfill-secret";

/// `POST /api/tools/backfill-commander-colors`
///
/// Batch parameters come from the query string or a JSON body; body values
/// win. A non-empty body that is not valid JSON parameters is rejected
/// before anything runs.
pub async fn backfill_commander_colors(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<BackfillParams>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<BackfillReport>> {
    let Some(expected) = state.config.backfill_secret.as_deref() else {
        return Err(ApiError::ServiceUnavailable(
            "backfill is not configured".to_string(),
        ));
    };

    let provided = headers
        .get(BACKFILL_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !secrets_match(expected, provided) {
        return Err(ApiError::Unauthorized("invalid backfill secret".to_string()));
    }

    if !state.has_service_key() {
        return Err(ApiError::ServiceUnavailable(
            "backfill needs the backend service key".to_string(),
        ));
    }

    let Query(mut params) = query?;
    if let Some(body) = body_params(&headers, &body)? {
        params = BackfillParams {
            offset: body.offset.or(params.offset),
            limit: body.limit.or(params.limit),
            concurrency: body.concurrency.or(params.concurrency),
            dry_run: body.dry_run.or(params.dry_run),
        };
    }

    let job = BackfillJob::from_params(&params, &state.config.ledger.backfill);
    let report = run_backfill(state.backend.as_ref(), state.cards.as_ref(), job).await?;

    Ok(Json(report))
}

fn body_params(headers: &HeaderMap, body: &[u8]) -> ApiResult<Option<BackfillParams>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false);
    if !is_json {
        return Err(ApiError::BadRequest(
            "backfill body must be sent as application/json".to_string(),
        ));
    }

    let Json(params) = Json::<BackfillParams>::from_bytes(body)?;
    Ok(Some(params))
}
