//! Player profiles

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;

/// A row of the profiles table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the auth user
    pub id: Uuid,

    /// Public username
    #[serde(default)]
    pub username: Option<String>,

    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,

    /// Role column, `"admin"` for administrators
    #[serde(default)]
    pub role: Option<String>,
}

impl Profile {
    /// Create a profile with a username
    pub fn new(id: Uuid, username: &str) -> Self {
        Self {
            id,
            username: Some(username.to_string()),
            avatar_url: None,
            role: None,
        }
    }

    /// Name shown in leaderboards, falling back to a short id
    pub fn display_name(&self) -> String {
        match non_blank(self.username.as_deref()) {
            Some(name) => name.to_string(),
            None => short_id(self.id),
        }
    }
}

/// First eight characters of an id, used when a player has no username
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
