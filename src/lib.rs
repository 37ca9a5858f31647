//! Commander Ledger - match, deck and player tracking for Commander playgroups
//!
//! Workspace root. The implementation lives in the member crates:
//! - `commander-ledger-core`: color identities, archetypes, row models and statistics
//! - `commander-ledger-client`: clients for the hosted backend and the card data API
//! - `commander-ledger-server`: HTTP API and the commander color backfill job

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
