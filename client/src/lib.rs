//! Clients for the services Commander Ledger depends on
//!
//! This library provides a typed client for the hosted backend (REST data
//! API, auth API and object storage) and a client for the card data API
//! used to look up commander color identities.

pub mod backend;
pub mod cards;
pub mod error;
pub mod query;
pub mod rest;

pub use backend::{Access, AuthUser, HostedBackend};
pub use cards::{CardData, CardRef, CardSource, ScryfallClient};
pub use error::{ClientError, Result};
pub use query::RestQuery;
pub use rest::RestBackend;
