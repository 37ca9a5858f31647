//! Deck endpoints

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use commander_ledger_core::models::{Deck, NewDeck};
use commander_ledger_core::Archetype;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A deck with its archetype
#[derive(Debug, Serialize)]
pub struct DeckView {
    #[serde(flatten)]
    pub deck: Deck,

    pub archetype: Archetype,
}

impl From<Deck> for DeckView {
    fn from(deck: Deck) -> Self {
        let archetype = deck.archetype();
        Self { deck, archetype }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDecksQuery {
    /// Only decks owned by this user
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,

    #[serde(default)]
    pub commander_name: Option<String>,

    #[serde(default)]
    pub commander_scryfall_id: Option<String>,

    #[serde(default)]
    pub commander_image: Option<String>,

    #[serde(default)]
    pub commander_colors: Option<Vec<String>>,

    #[serde(default)]
    pub format_id: Option<Uuid>,
}

/// `GET /api/decks`
pub async fn list_decks(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<ListDecksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<DeckView>>> {
    let Query(query) = query?;
    let decks = state
        .backend
        .list_decks(caller.access(), query.user_id)
        .await?;
    Ok(Json(decks.into_iter().map(DeckView::from).collect()))
}

/// `POST /api/decks`
pub async fn create_deck(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreateDeckRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DeckView>)> {
    let Json(request) = payload?;

    let new_deck = NewDeck {
        commander_name: request.commander_name,
        commander_scryfall_id: request.commander_scryfall_id,
        commander_image: request.commander_image,
        commander_colors: request.commander_colors,
        format_id: request.format_id,
        ..NewDeck::new(caller.id(), &request.name)
    }
    .normalized();
    new_deck.validate()?;

    let deck = state.backend.insert_deck(caller.access(), &new_deck).await?;
    info!(deck_id = %deck.id, user_id = %caller.id(), "deck created");

    Ok((StatusCode::CREATED, Json(deck.into())))
}

/// `GET /api/decks/:id`
pub async fn get_deck(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeckView>> {
    let Path(id) = path?;
    let deck = state
        .backend
        .get_deck(caller.access(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("deck"))?;
    Ok(Json(deck.into()))
}

/// `DELETE /api/decks/:id`
pub async fn delete_deck(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let deck = state
        .backend
        .get_deck(caller.access(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("deck"))?;

    let capability = caller.capability(Some(deck.user_id));
    if !capability.can_modify() {
        return Err(ApiError::Forbidden(
            "only the owner or an admin can delete this deck".to_string(),
        ));
    }

    state
        .backend
        .delete_deck(caller.write_access(&state, capability), id)
        .await?;
    info!(deck_id = %id, user_id = %caller.id(), ?capability, "deck deleted");

    Ok(Json(json!({ "deleted": id })))
}
