//! In-memory collaborators for handler and backfill tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use commander_ledger_client::{
    Access, AuthUser, CardData, CardRef, CardSource, ClientError, HostedBackend, Result,
};
use commander_ledger_core::models::{
    Deck, Format, Match, NewDeck, NewMatch, NewParticipant, Participant, Profile,
};
use mockall::mock;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::state::AppState;

mock! {
    pub Cards {}

    #[async_trait]
    impl CardSource for Cards {
        async fn fetch_card(&self, card: CardRef) -> Result<CardData>;
    }
}

/// Rows held by [`MemoryBackend`]
#[derive(Debug, Default)]
pub struct Tables {
    pub users: HashMap<String, AuthUser>,
    pub profiles: Vec<Profile>,
    pub decks: Vec<Deck>,
    pub matches: Vec<Match>,
    pub participants: Vec<Participant>,
    pub formats: Vec<Format>,
    pub deleted_users: Vec<Uuid>,
    pub resent: Vec<String>,
    pub color_updates: Vec<Uuid>,
    pub service_calls: usize,
}

/// Hosted backend kept in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub tables: Mutex<Tables>,
    pub fail_reads: bool,
    pub fail_participant_insert: bool,
    /// Deck whose color write is refused
    pub fail_color_update: Option<Uuid>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user reachable with `token`
    pub fn add_user(&self, token: &str, username: &str, app_metadata: Value) -> Uuid {
        let id = Uuid::new_v4();
        let mut tables = self.tables.lock().unwrap();
        tables.users.insert(
            token.to_string(),
            AuthUser {
                id,
                email: Some(format!("{}@example.com", username)),
                app_metadata,
                user_metadata: json!({}),
            },
        );
        tables.profiles.push(Profile::new(id, username));
        id
    }

    pub fn add_deck(&self, owner: Uuid, name: &str, colors: Option<&[&str]>) -> Deck {
        let deck = Deck {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.to_string(),
            commander_name: Some(format!("{} Commander", name)),
            commander_scryfall_id: None,
            commander_image: None,
            commander_colors: colors.map(|c| c.iter().map(|s| s.to_string()).collect()),
            color_code: None,
            format_id: None,
            created_at: Some(Utc::now()),
        };
        self.tables.lock().unwrap().decks.push(deck.clone());
        deck
    }

    pub fn add_match(&self, created_by: Uuid, format_id: Option<Uuid>) -> Match {
        let row = Match {
            id: Uuid::new_v4(),
            format_id,
            event_id: None,
            created_by: Some(created_by),
            played_at: Some(Utc::now()),
            created_at: None,
            notes: None,
        };
        self.tables.lock().unwrap().matches.push(row.clone());
        row
    }

    pub fn add_participant(
        &self,
        match_id: Uuid,
        user_id: Uuid,
        commander: &str,
        is_winner: bool,
    ) {
        self.tables.lock().unwrap().participants.push(Participant {
            match_id,
            user_id: Some(user_id),
            deck_id: None,
            commander_name: Some(commander.to_string()),
            commander_image: None,
            commander_colors: None,
            is_winner,
            kills: 0,
            damage_dealt: 0,
            placement: None,
        });
    }

    pub fn add_format(&self, name: &str) -> Format {
        let format = Format {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.tables.lock().unwrap().formats.push(format.clone());
        format
    }

    fn note(&self, access: Access<'_>) -> Result<()> {
        if self.fail_reads {
            return Err(ClientError::Server {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        if access == Access::Service {
            self.tables.lock().unwrap().service_calls += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl HostedBackend for MemoryBackend {
    async fn current_user(&self, token: &str) -> Result<AuthUser> {
        self.tables
            .lock()
            .unwrap()
            .users
            .get(token)
            .cloned()
            .ok_or_else(|| ClientError::Unauthorized("invalid JWT".to_string()))
    }

    async fn get_profile(&self, access: Access<'_>, id: Uuid) -> Result<Option<Profile>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self, access: Access<'_>) -> Result<Vec<Profile>> {
        self.note(access)?;
        Ok(self.tables.lock().unwrap().profiles.clone())
    }

    async fn update_profile_avatar(&self, access: Access<'_>, id: Uuid, url: &str) -> Result<()> {
        self.note(access)?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == id) {
            profile.avatar_url = Some(url.to_string());
        }
        Ok(())
    }

    async fn list_decks(&self, access: Access<'_>, owner: Option<Uuid>) -> Result<Vec<Deck>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .decks
            .iter()
            .filter(|d| owner.map_or(true, |owner| d.user_id == owner))
            .cloned()
            .collect())
    }

    async fn get_deck(&self, access: Access<'_>, id: Uuid) -> Result<Option<Deck>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.decks.iter().find(|d| d.id == id).cloned())
    }

    async fn insert_deck(&self, access: Access<'_>, deck: &NewDeck) -> Result<Deck> {
        self.note(access)?;
        let row = Deck {
            id: Uuid::new_v4(),
            user_id: deck.user_id,
            name: deck.name.clone(),
            commander_name: deck.commander_name.clone(),
            commander_scryfall_id: deck.commander_scryfall_id.clone(),
            commander_image: deck.commander_image.clone(),
            commander_colors: deck.commander_colors.clone(),
            color_code: deck.color_code.clone(),
            format_id: deck.format_id,
            created_at: Some(Utc::now()),
        };
        self.tables.lock().unwrap().decks.push(row.clone());
        Ok(row)
    }

    async fn delete_deck(&self, access: Access<'_>, id: Uuid) -> Result<()> {
        self.note(access)?;
        self.tables.lock().unwrap().decks.retain(|d| d.id != id);
        Ok(())
    }

    async fn decks_missing_color_code(
        &self,
        access: Access<'_>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Deck>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .decks
            .iter()
            .filter(|d| d.color_code.is_none())
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_deck_colors(
        &self,
        access: Access<'_>,
        id: Uuid,
        colors: &[String],
        color_code: &str,
    ) -> Result<()> {
        self.note(access)?;
        if self.fail_color_update == Some(id) {
            return Err(ClientError::Server {
                status: 500,
                message: "write failed".to_string(),
            });
        }
        let mut tables = self.tables.lock().unwrap();
        tables.color_updates.push(id);
        if let Some(deck) = tables.decks.iter_mut().find(|d| d.id == id) {
            deck.commander_colors = Some(colors.to_vec());
            deck.color_code = Some(color_code.to_string());
        }
        Ok(())
    }

    async fn list_matches(&self, access: Access<'_>) -> Result<Vec<Match>> {
        self.note(access)?;
        Ok(self.tables.lock().unwrap().matches.clone())
    }

    async fn get_match(&self, access: Access<'_>, id: Uuid) -> Result<Option<Match>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.matches.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_match(&self, access: Access<'_>, new_match: &NewMatch) -> Result<Match> {
        self.note(access)?;
        let row = Match {
            id: Uuid::new_v4(),
            format_id: new_match.format_id,
            event_id: new_match.event_id,
            created_by: Some(new_match.created_by),
            played_at: new_match.played_at,
            created_at: Some(Utc::now()),
            notes: new_match.notes.clone(),
        };
        self.tables.lock().unwrap().matches.push(row.clone());
        Ok(row)
    }

    async fn list_participants(&self, access: Access<'_>) -> Result<Vec<Participant>> {
        self.note(access)?;
        Ok(self.tables.lock().unwrap().participants.clone())
    }

    async fn insert_participants(
        &self,
        access: Access<'_>,
        rows: &[NewParticipant],
    ) -> Result<Vec<Participant>> {
        self.note(access)?;
        if self.fail_participant_insert {
            return Err(ClientError::Server {
                status: 409,
                message: "participants rejected".to_string(),
            });
        }
        let stored: Vec<Participant> = rows
            .iter()
            .map(|row| Participant {
                match_id: row.match_id,
                user_id: row.user_id,
                deck_id: row.deck_id,
                commander_name: row.commander_name.clone(),
                commander_image: row.commander_image.clone(),
                commander_colors: row.commander_colors.clone(),
                is_winner: row.is_winner,
                kills: row.kills,
                damage_dealt: row.damage_dealt,
                placement: row.placement,
            })
            .collect();
        self.tables
            .lock()
            .unwrap()
            .participants
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn delete_matches(&self, access: Access<'_>, ids: &[Uuid]) -> Result<()> {
        self.note(access)?;
        let mut tables = self.tables.lock().unwrap();
        tables.participants.retain(|p| !ids.contains(&p.match_id));
        tables.matches.retain(|m| !ids.contains(&m.id));
        Ok(())
    }

    async fn get_format(&self, access: Access<'_>, id: Uuid) -> Result<Option<Format>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.formats.iter().find(|f| f.id == id).cloned())
    }

    async fn match_ids_for_format(&self, access: Access<'_>, format_id: Uuid) -> Result<Vec<Uuid>> {
        self.note(access)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .matches
            .iter()
            .filter(|m| m.format_id == Some(format_id))
            .map(|m| m.id)
            .collect())
    }

    async fn delete_format(&self, access: Access<'_>, id: Uuid) -> Result<()> {
        self.note(access)?;
        self.tables.lock().unwrap().formats.retain(|f| f.id != id);
        Ok(())
    }

    async fn delete_auth_user(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.users.retain(|_, user| user.id != id);
        tables.deleted_users.push(id);
        Ok(())
    }

    async fn resend_confirmation(&self, email: &str) -> Result<()> {
        self.tables.lock().unwrap().resent.push(email.to_string());
        Ok(())
    }

    fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!("https://storage.test/{}/{}", bucket, path)
    }
}

/// A card with the given color identity
pub fn card(name: &str, colors: &[&str]) -> CardData {
    CardData {
        name: name.to_string(),
        color_identity: colors.iter().map(|c| c.to_string()).collect(),
        image_uris: None,
    }
}

/// Handler state over an in-memory backend and a card mock
pub fn state_with(
    backend: Arc<MemoryBackend>,
    cards: MockCards,
    config: ServerConfig,
) -> AppState {
    AppState::new(backend, Arc::new(cards), config)
}
