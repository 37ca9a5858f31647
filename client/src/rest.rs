//! REST implementation of the hosted backend
//!
//! Data goes through `/rest/v1/<table>`, identity through `/auth/v1` and
//! public files through `/storage/v1/object/public`. Every request carries
//! the public API key in the `apikey` header; the bearer token depends on the
//! [`Access`] the call is made with.

use std::time::Duration;

use async_trait::async_trait;
use commander_ledger_core::models::{
    tables, Deck, Format, Match, NewDeck, NewMatch, NewParticipant, Participant, Profile,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::{Access, AuthUser, HostedBackend};
use crate::error::{ClientError, Result};
use crate::query::RestQuery;

/// Default timeout for backend requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct IdRow {
    id: Uuid,
}

/// Hosted backend client
#[derive(Debug, Clone)]
pub struct RestBackend {
    /// Project URL, without a trailing slash
    base_url: String,

    /// Public API key
    api_key: String,

    /// Service key for privileged calls
    service_key: Option<String>,

    /// HTTP client
    client: Client,

    /// Request timeout
    timeout: Duration,
}

impl RestBackend {
    /// Create a new client
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            service_key: None,
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Enable [`Access::Service`] calls
    pub fn with_service_key(mut self, key: &str) -> Self {
        self.service_key = Some(key.to_string());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn bearer<'a>(&'a self, access: Access<'a>) -> Result<&'a str> {
        match access {
            Access::Anonymous => Ok(&self.api_key),
            Access::User(token) => Ok(token),
            Access::Service => self
                .service_key
                .as_deref()
                .ok_or_else(|| ClientError::Config("service key is not configured".to_string())),
        }
    }

    fn request(&self, method: Method, path: &str, access: Access<'_>) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "backend request");

        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer(access)?)
            .timeout(self.timeout))
    }

    fn table(&self, method: Method, table: &str, access: Access<'_>) -> Result<RequestBuilder> {
        self.request(method, &format!("/rest/v1/{}", table), access)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await?;
        warn!(status = status.as_u16(), %message, "backend request failed");
        Err(ClientError::from_status(status, message))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        access: Access<'_>,
        table: &str,
        query: RestQuery,
    ) -> Result<Vec<T>> {
        let response = self
            .table(Method::GET, table, access)?
            .query(query.params())
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        access: Access<'_>,
        table: &str,
        query: RestQuery,
    ) -> Result<Option<T>> {
        let rows = self.select(access, table, query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert<B, T>(&self, access: Access<'_>, table: &str, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .table(Method::POST, table, access)?
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert_one<B, T>(&self, access: Access<'_>, table: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self.insert(access, table, body).await?;
        rows.into_iter().next().ok_or_else(|| {
            ClientError::UnexpectedResponse(format!("insert into {} returned no row", table))
        })
    }

    async fn update<B>(
        &self,
        access: Access<'_>,
        table: &str,
        query: RestQuery,
        body: &B,
    ) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        if !query.is_filtered() {
            return Err(ClientError::Config(format!(
                "refusing to update every row of {}",
                table
            )));
        }

        let response = self
            .table(Method::PATCH, table, access)?
            .query(query.params())
            .json(body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, access: Access<'_>, table: &str, query: RestQuery) -> Result<()> {
        if !query.is_filtered() {
            return Err(ClientError::Config(format!(
                "refusing to delete every row of {}",
                table
            )));
        }

        let response = self
            .table(Method::DELETE, table, access)?
            .query(query.params())
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl HostedBackend for RestBackend {
    async fn current_user(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .request(Method::GET, "/auth/v1/user", Access::User(token))?
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_profile(&self, access: Access<'_>, id: Uuid) -> Result<Option<Profile>> {
        let query = RestQuery::new().select("*").eq("id", id);
        self.select_one(access, tables::PROFILES, query).await
    }

    async fn list_profiles(&self, access: Access<'_>) -> Result<Vec<Profile>> {
        self.select(access, tables::PROFILES, RestQuery::new().select("*"))
            .await
    }

    async fn update_profile_avatar(&self, access: Access<'_>, id: Uuid, url: &str) -> Result<()> {
        let query = RestQuery::new().eq("id", id);
        self.update(access, tables::PROFILES, query, &json!({ "avatar_url": url }))
            .await
    }

    async fn list_decks(&self, access: Access<'_>, owner: Option<Uuid>) -> Result<Vec<Deck>> {
        let mut query = RestQuery::new().select("*");
        if let Some(owner) = owner {
            query = query.eq("user_id", owner);
        }
        self.select(access, tables::DECKS, query.order("created_at", false))
            .await
    }

    async fn get_deck(&self, access: Access<'_>, id: Uuid) -> Result<Option<Deck>> {
        let query = RestQuery::new().select("*").eq("id", id);
        self.select_one(access, tables::DECKS, query).await
    }

    async fn insert_deck(&self, access: Access<'_>, deck: &NewDeck) -> Result<Deck> {
        self.insert_one(access, tables::DECKS, deck).await
    }

    async fn delete_deck(&self, access: Access<'_>, id: Uuid) -> Result<()> {
        self.delete(access, tables::DECKS, RestQuery::new().eq("id", id))
            .await
    }

    async fn decks_missing_color_code(
        &self,
        access: Access<'_>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Deck>> {
        let query = RestQuery::new()
            .select("*")
            .is_null("color_code")
            .order("created_at", true)
            .offset(offset)
            .limit(limit);
        self.select(access, tables::DECKS, query).await
    }

    async fn update_deck_colors(
        &self,
        access: Access<'_>,
        id: Uuid,
        colors: &[String],
        color_code: &str,
    ) -> Result<()> {
        let body = json!({
            "commander_colors": colors,
            "color_code": color_code,
        });
        self.update(access, tables::DECKS, RestQuery::new().eq("id", id), &body)
            .await
    }

    async fn list_matches(&self, access: Access<'_>) -> Result<Vec<Match>> {
        let query = RestQuery::new().select("*").order("played_at", false);
        self.select(access, tables::MATCHES, query).await
    }

    async fn get_match(&self, access: Access<'_>, id: Uuid) -> Result<Option<Match>> {
        let query = RestQuery::new().select("*").eq("id", id);
        self.select_one(access, tables::MATCHES, query).await
    }

    async fn insert_match(&self, access: Access<'_>, new_match: &NewMatch) -> Result<Match> {
        self.insert_one(access, tables::MATCHES, new_match).await
    }

    async fn list_participants(&self, access: Access<'_>) -> Result<Vec<Participant>> {
        self.select(access, tables::PARTICIPANTS, RestQuery::new().select("*"))
            .await
    }

    async fn insert_participants(
        &self,
        access: Access<'_>,
        rows: &[NewParticipant],
    ) -> Result<Vec<Participant>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.insert(access, tables::PARTICIPANTS, rows).await
    }

    async fn delete_matches(&self, access: Access<'_>, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        // participants first, they reference the match rows
        self.delete(
            access,
            tables::PARTICIPANTS,
            RestQuery::new().in_list("match_id", ids),
        )
        .await?;
        self.delete(access, tables::MATCHES, RestQuery::new().in_list("id", ids))
            .await
    }

    async fn get_format(&self, access: Access<'_>, id: Uuid) -> Result<Option<Format>> {
        let query = RestQuery::new().select("id,name").eq("id", id);
        self.select_one(access, tables::FORMATS, query).await
    }

    async fn match_ids_for_format(&self, access: Access<'_>, format_id: Uuid) -> Result<Vec<Uuid>> {
        let query = RestQuery::new().select("id").eq("format_id", format_id);
        let rows: Vec<IdRow> = self.select(access, tables::MATCHES, query).await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn delete_format(&self, access: Access<'_>, id: Uuid) -> Result<()> {
        self.delete(access, tables::FORMATS, RestQuery::new().eq("id", id))
            .await
    }

    async fn delete_auth_user(&self, id: Uuid) -> Result<()> {
        let path = format!("/auth/v1/admin/users/{}", id);
        let response = self
            .request(Method::DELETE, &path, Access::Service)?
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn resend_confirmation(&self, email: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "/auth/v1/resend", Access::Anonymous)?
            .json(&json!({ "type": "signup", "email": email }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
