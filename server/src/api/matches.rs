//! Match endpoints

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use commander_ledger_core::models::{
    validate_roster, Match, NewMatch, NewParticipant, Participant,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParticipantInput {
    #[serde(default)]
    pub user_id: Option<Uuid>,

    #[serde(default)]
    pub deck_id: Option<Uuid>,

    #[serde(default)]
    pub commander_name: Option<String>,

    #[serde(default)]
    pub commander_image: Option<String>,

    #[serde(default)]
    pub commander_colors: Option<Vec<String>>,

    #[serde(default)]
    pub is_winner: bool,

    #[serde(default)]
    pub kills: i64,

    #[serde(default)]
    pub damage_dealt: i64,

    #[serde(default)]
    pub placement: Option<i32>,
}

impl ParticipantInput {
    fn into_row(self, match_id: Uuid) -> NewParticipant {
        NewParticipant {
            match_id,
            user_id: self.user_id,
            deck_id: self.deck_id,
            commander_name: self.commander_name,
            commander_image: self.commander_image,
            commander_colors: self.commander_colors,
            is_winner: self.is_winner,
            kills: self.kills,
            damage_dealt: self.damage_dealt,
            placement: self.placement,
        }
        .normalized()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    #[serde(default)]
    pub format_id: Option<Uuid>,

    #[serde(default)]
    pub event_id: Option<Uuid>,

    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: Option<String>,

    pub participants: Vec<ParticipantInput>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMatch {
    #[serde(rename = "match")]
    pub row: Match,

    pub participants: Vec<Participant>,
}

/// `POST /api/matches/create`
pub async fn create_match(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreateMatchRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedMatch>)> {
    let Json(request) = payload?;

    // match_id is unknown until the match row exists
    let mut roster: Vec<NewParticipant> = request
        .participants
        .into_iter()
        .map(|input| input.into_row(Uuid::nil()))
        .collect();
    validate_roster(&roster)?;

    let new_match = NewMatch {
        format_id: request.format_id,
        event_id: request.event_id,
        created_by: caller.id(),
        played_at: request.played_at,
        notes: request
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty()),
    };

    let row = state.backend.insert_match(caller.access(), &new_match).await?;
    for participant in &mut roster {
        participant.match_id = row.id;
    }

    let participants = match state
        .backend
        .insert_participants(caller.access(), &roster)
        .await
    {
        Ok(participants) => participants,
        Err(e) => {
            // do not leave a match without its pod behind
            if let Err(cleanup) = state.backend.delete_match(caller.access(), row.id).await {
                warn!(match_id = %row.id, error = %cleanup, "could not remove partial match");
            }
            return Err(e.into());
        }
    };

    info!(
        match_id = %row.id,
        user_id = %caller.id(),
        participants = participants.len(),
        "match recorded"
    );

    Ok((StatusCode::CREATED, Json(CreatedMatch { row, participants })))
}

/// `DELETE /api/matches/:id` and `POST /api/matches/:id/delete`
pub async fn delete_match(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let row = state
        .backend
        .get_match(caller.access(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("match"))?;

    let capability = caller.capability(row.created_by);
    if !capability.can_modify() {
        return Err(ApiError::Forbidden(
            "only the creator or an admin can delete this match".to_string(),
        ));
    }

    state
        .backend
        .delete_match(caller.write_access(&state, capability), id)
        .await?;
    info!(match_id = %id, user_id = %caller.id(), ?capability, "match deleted");

    Ok(Json(json!({ "deleted": id })))
}
