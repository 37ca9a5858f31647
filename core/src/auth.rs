//! Caller capability resolution
//!
//! Every handler that touches an owned row asks the same question: what may
//! this caller do with it? `Capability::resolve` is the only place that
//! answers it, and `CallerIdentity::is_admin` is the only place that decides
//! who is an administrator.

use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role value that marks an administrator
pub const ADMIN_ROLE: &str = "admin";

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Auth user id, also the profile id
    pub user_id: Uuid,

    /// Email on the auth record
    pub email: Option<String>,

    /// Server-controlled metadata from the auth record
    #[serde(default)]
    pub app_metadata: Value,

    /// `role` column of the caller's profile row, if any
    pub profile_role: Option<String>,
}

impl CallerIdentity {
    /// Create an identity with no metadata
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
            app_metadata: Value::Null,
            profile_role: None,
        }
    }

    /// Attach the profile role
    pub fn with_profile_role(mut self, role: Option<String>) -> Self {
        self.profile_role = role;
        self
    }

    /// Whether the caller is an administrator
    ///
    /// Only `app_metadata` and the profile row are consulted. `user_metadata`
    /// is writable by the user and never grants anything.
    pub fn is_admin(&self) -> bool {
        let metadata_role = self
            .app_metadata
            .get("role")
            .and_then(Value::as_str)
            .is_some_and(|role| role.eq_ignore_ascii_case(ADMIN_ROLE));

        let metadata_flag = self
            .app_metadata
            .get("is_admin")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let profile_role = self
            .profile_role
            .as_deref()
            .is_some_and(|role| role.eq_ignore_ascii_case(ADMIN_ROLE));

        metadata_role || metadata_flag || profile_role
    }
}

/// What a caller may do with a particular row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// No standing over the row: unauthenticated, or signed in as someone else
    Anonymous,

    /// The caller owns the row
    Owner,

    /// The caller is an administrator
    Admin,
}

impl Capability {
    /// Resolve a caller against the owner of a row
    ///
    /// Admin wins over ownership. A row without a recorded owner can only be
    /// modified by an administrator.
    pub fn resolve(caller: Option<&CallerIdentity>, owner: Option<Uuid>) -> Self {
        match caller {
            None => Capability::Anonymous,
            Some(caller) if caller.is_admin() => Capability::Admin,
            Some(caller) if owner == Some(caller.user_id) => Capability::Owner,
            Some(_) => Capability::Anonymous,
        }
    }

    /// Whether the caller may modify or delete the row
    pub fn can_modify(self) -> bool {
        matches!(self, Capability::Owner | Capability::Admin)
    }

    /// Whether the caller is an administrator
    pub fn is_admin(self) -> bool {
        self == Capability::Admin
    }
}

/// Compare a configured shared secret with a provided one in constant time
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    constant_time_eq(expected.as_bytes(), provided.as_bytes())
}
