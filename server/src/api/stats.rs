//! Read-only statistics endpoints
//!
//! The reductions run over every match, participant and profile row. A
//! backend failure degrades the response to an empty report instead of an
//! error.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use commander_ledger_client::{Access, HostedBackend};
use commander_ledger_core::stats::{
    build_leaderboard, color_usage, commander_usage, home_summary, player_report, ColorUsage,
    CommanderUsage, Dataset, HomeSummary, PlayerReport, PlayerStanding,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub leaderboard: Vec<PlayerStanding>,
    pub commanders: Vec<CommanderUsage>,
    pub colors: Vec<ColorUsage>,
}

/// Fetch every row the reductions need
pub async fn load_dataset(backend: &dyn HostedBackend) -> Dataset {
    let fetched = tokio::try_join!(
        backend.list_matches(Access::Anonymous),
        backend.list_participants(Access::Anonymous),
        backend.list_profiles(Access::Anonymous),
    );

    match fetched {
        Ok((matches, participants, profiles)) => Dataset::new(matches, participants, profiles),
        Err(e) => {
            warn!(error = %e, "could not load statistics rows");
            Dataset::default()
        }
    }
}

/// `GET /api/stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let dataset = load_dataset(state.backend.as_ref()).await;

    Json(StatsResponse {
        leaderboard: build_leaderboard(&dataset),
        commanders: commander_usage(&dataset),
        colors: color_usage(&dataset),
    })
}

/// `GET /api/players/:id/stats`
pub async fn player_stats(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<PlayerReport>> {
    let Path(id) = path?;
    let dataset = load_dataset(state.backend.as_ref()).await;
    let top_n = state.config.ledger.stats.top_commanders;

    Ok(Json(player_report(&dataset, id, top_n)))
}

/// `GET /api/home`
pub async fn home(State(state): State<AppState>) -> Json<HomeSummary> {
    let dataset = load_dataset(state.backend.as_ref()).await;

    let deck_count = match state.backend.list_decks(Access::Anonymous, None).await {
        Ok(decks) => decks.len(),
        Err(e) => {
            warn!(error = %e, "could not count decks");
            0
        }
    };

    Json(home_summary(
        &dataset,
        deck_count,
        Utc::now(),
        &state.config.ledger.stats,
    ))
}
