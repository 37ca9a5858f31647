//! # Commander Ledger Core
//!
//! Core data structures and pure functions for Commander Ledger.
//! This crate owns the color identity model, the archetype tables, the row
//! types exchanged with the hosted backend, caller capability resolution and
//! the statistics reductions behind the leaderboards.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod archetypes;
pub mod auth;
pub mod colors;
pub mod config;
pub mod error;
pub mod models;
pub mod stats;

/// Re-export common types for ease of use
pub use archetypes::{archetype_for_code, archetype_for_colors, Archetype};
pub use auth::{CallerIdentity, Capability};
pub use colors::{code_from_colors, normalize_colors, parse_colors, Color, ColorSet};
pub use config::LedgerConfig;
pub use error::{CoreError, Result};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
