//! Bearer token authentication
//!
//! The token is resolved against the auth API, then the caller's profile row
//! is read for its role. Handlers receive a [`Caller`] and ask it for a
//! [`Capability`] over the row they are about to touch.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use commander_ledger_client::{Access, ClientError};
use commander_ledger_core::{CallerIdentity, Capability};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated caller
#[derive(Debug, Clone)]
pub struct Caller {
    token: String,

    /// Who the caller is
    pub identity: CallerIdentity,
}

impl Caller {
    /// Caller's user id
    pub fn id(&self) -> Uuid {
        self.identity.user_id
    }

    /// Backend access carrying the caller's own token
    pub fn access(&self) -> Access<'_> {
        Access::User(&self.token)
    }

    /// What the caller may do with a row owned by `owner`
    pub fn capability(&self, owner: Option<Uuid>) -> Capability {
        Capability::resolve(Some(&self.identity), owner)
    }

    /// Access for a write the caller is allowed to make
    ///
    /// Administrators act with the service key so row-level security does
    /// not stop them from touching other users' rows.
    pub fn write_access(&self, state: &AppState, capability: Capability) -> Access<'_> {
        if capability.is_admin() && state.has_service_key() {
            Access::Service
        } else {
            self.access()
        }
    }
}

/// Extract the bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve a bearer token to a caller
pub async fn authenticate(state: &AppState, token: &str) -> Result<Caller, ApiError> {
    let user = match state.backend.current_user(token).await {
        Ok(user) => user,
        Err(
            ClientError::Unauthorized(_) | ClientError::Forbidden(_) | ClientError::NotFound(_),
        ) => {
            return Err(ApiError::Unauthorized("invalid or expired token".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let profile_role = match state.backend.get_profile(Access::User(token), user.id).await {
        Ok(profile) => profile.and_then(|profile| profile.role),
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "could not read caller profile");
            None
        }
    };

    let mut identity = CallerIdentity::new(user.id).with_profile_role(profile_role);
    identity.email = user.email;
    identity.app_metadata = user.app_metadata;

    debug!(user_id = %identity.user_id, admin = identity.is_admin(), "authenticated caller");

    Ok(Caller {
        token: token.to_string(),
        identity,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        authenticate(state, token).await
    }
}
