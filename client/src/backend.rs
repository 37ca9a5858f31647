//! The hosted backend as seen by the services
//!
//! Handlers and the backfill job only talk to the backend through
//! [`HostedBackend`], so tests can swap in an in-memory implementation.

use async_trait::async_trait;
use commander_ledger_core::models::{
    Deck, Format, Match, NewDeck, NewMatch, NewParticipant, Participant, Profile,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Credentials a backend call is made with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    /// Public API key only; row-level security sees an anonymous caller
    Anonymous,

    /// The caller's own access token
    User(&'a str),

    /// The service key, bypassing row-level security
    Service,
}

/// User record returned by the auth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User id, shared with the profile row
    pub id: Uuid,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Server-controlled metadata
    #[serde(default)]
    pub app_metadata: Value,

    /// User-editable metadata
    #[serde(default)]
    pub user_metadata: Value,
}

/// Operations the services need from the hosted backend
#[async_trait]
pub trait HostedBackend: Send + Sync {
    /// Resolve an access token to its user
    async fn current_user(&self, token: &str) -> Result<AuthUser>;

    /// Fetch one profile
    async fn get_profile(&self, access: Access<'_>, id: Uuid) -> Result<Option<Profile>>;

    /// Fetch every profile
    async fn list_profiles(&self, access: Access<'_>) -> Result<Vec<Profile>>;

    /// Store a new avatar URL on a profile
    async fn update_profile_avatar(&self, access: Access<'_>, id: Uuid, url: &str) -> Result<()>;

    /// List decks, optionally restricted to one owner, newest first
    async fn list_decks(&self, access: Access<'_>, owner: Option<Uuid>) -> Result<Vec<Deck>>;

    /// Fetch one deck
    async fn get_deck(&self, access: Access<'_>, id: Uuid) -> Result<Option<Deck>>;

    /// Insert a deck and return the stored row
    async fn insert_deck(&self, access: Access<'_>, deck: &NewDeck) -> Result<Deck>;

    /// Delete a deck
    async fn delete_deck(&self, access: Access<'_>, id: Uuid) -> Result<()>;

    /// One page of decks whose `color_code` is still `NULL`, oldest first
    async fn decks_missing_color_code(
        &self,
        access: Access<'_>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Deck>>;

    /// Write the derived colors back to a deck
    async fn update_deck_colors(
        &self,
        access: Access<'_>,
        id: Uuid,
        colors: &[String],
        color_code: &str,
    ) -> Result<()>;

    /// Fetch every match
    async fn list_matches(&self, access: Access<'_>) -> Result<Vec<Match>>;

    /// Fetch one match
    async fn get_match(&self, access: Access<'_>, id: Uuid) -> Result<Option<Match>>;

    /// Insert a match and return the stored row
    async fn insert_match(&self, access: Access<'_>, new_match: &NewMatch) -> Result<Match>;

    /// Fetch every participant row
    async fn list_participants(&self, access: Access<'_>) -> Result<Vec<Participant>>;

    /// Insert participant rows and return the stored rows
    async fn insert_participants(
        &self,
        access: Access<'_>,
        rows: &[NewParticipant],
    ) -> Result<Vec<Participant>>;

    /// Delete matches and their participant rows
    async fn delete_matches(&self, access: Access<'_>, ids: &[Uuid]) -> Result<()>;

    /// Delete one match and its participant rows
    async fn delete_match(&self, access: Access<'_>, id: Uuid) -> Result<()> {
        self.delete_matches(access, &[id]).await
    }

    /// Fetch one format
    async fn get_format(&self, access: Access<'_>, id: Uuid) -> Result<Option<Format>>;

    /// Ids of the matches played under a format
    async fn match_ids_for_format(&self, access: Access<'_>, format_id: Uuid) -> Result<Vec<Uuid>>;

    /// Delete a format row
    async fn delete_format(&self, access: Access<'_>, id: Uuid) -> Result<()>;

    /// Delete an auth user; requires the service key
    async fn delete_auth_user(&self, id: Uuid) -> Result<()>;

    /// Send the signup confirmation email again
    async fn resend_confirmation(&self, email: &str) -> Result<()>;

    /// Public URL of an object in a storage bucket
    fn public_object_url(&self, bucket: &str, path: &str) -> String;
}
