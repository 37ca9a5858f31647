//! Games / formats

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A game format matches are played under (Commander, Brawl, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Format id
    pub id: Uuid,

    /// Display name
    pub name: String,
}
