//! Commander color backfill
//!
//! Decks created before color identities were recorded have no
//! `color_code`. The job takes one page of them, finds each commander's
//! colors (the stored array when present, otherwise the card data API) and
//! writes the canonical colors and code back.
//!
//! Rows are handed out to a fixed number of workers through a shared atomic
//! index. Workers run concurrently on the calling task; a failing row is
//! reported and the others carry on.

use std::sync::atomic::{AtomicUsize, Ordering};

use commander_ledger_client::{Access, CardRef, CardSource, HostedBackend};
use commander_ledger_core::config::BackfillConfig;
use commander_ledger_core::models::Deck;
use commander_ledger_core::ColorSet;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiResult;

/// Requested batch, before clamping
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackfillParams {
    /// Rows to skip
    pub offset: Option<usize>,

    /// Page size
    pub limit: Option<usize>,

    /// Number of workers
    pub concurrency: Option<usize>,

    /// Compute without writing
    pub dry_run: Option<bool>,
}

/// A batch ready to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillJob {
    /// Rows to skip
    pub offset: usize,

    /// Page size
    pub limit: usize,

    /// Number of workers
    pub concurrency: usize,

    /// Compute without writing
    pub dry_run: bool,
}

impl BackfillJob {
    /// Clamp requested values to the configured bounds
    pub fn from_params(params: &BackfillParams, config: &BackfillConfig) -> Self {
        Self {
            offset: params.offset.unwrap_or(0),
            limit: config.clamp_limit(params.limit),
            concurrency: config.clamp_concurrency(params.concurrency),
            dry_run: params.dry_run.unwrap_or(false),
        }
    }
}

/// Where a row's colors came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSource {
    /// The deck's own `commander_colors`
    Stored,

    /// The card data API
    CardApi,
}

/// What happened to one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    /// Colors written
    Updated,

    /// Colors computed, nothing written
    DryRun,

    /// The row could not be processed
    Failed {
        /// Cause
        error: String,
    },
}

/// Result for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// Deck id
    pub deck_id: Uuid,

    /// Deck name
    pub deck_name: String,

    /// Where the colors came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ColorSource>,

    /// Computed code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_code: Option<String>,

    /// What happened
    #[serde(flatten)]
    pub status: RowStatus,
}

/// A row that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// Deck id
    pub deck_id: Uuid,

    /// Cause
    pub error: String,
}

/// Result of one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Rows skipped
    pub offset: usize,

    /// Page size
    pub limit: usize,

    /// Workers used
    pub concurrency: usize,

    /// Whether writes were skipped
    pub dry_run: bool,

    /// Rows in the page
    pub scanned: usize,

    /// Rows written
    pub updated: usize,

    /// Offset for the next page
    ///
    /// Updated rows leave the `color_code IS NULL` set, so the next page
    /// starts after the rows that are still missing a code.
    pub next_offset: usize,

    /// Per-row results, in page order
    pub outcomes: Vec<RowOutcome>,

    /// Rows that failed
    pub errors: Vec<RowError>,
}

/// Run one batch
pub async fn run_backfill(
    backend: &dyn HostedBackend,
    cards: &dyn CardSource,
    job: BackfillJob,
) -> ApiResult<BackfillReport> {
    let rows = backend
        .decks_missing_color_code(Access::Service, job.offset, job.limit)
        .await?;

    info!(
        offset = job.offset,
        rows = rows.len(),
        concurrency = job.concurrency,
        dry_run = job.dry_run,
        "starting color backfill"
    );

    let next = AtomicUsize::new(0);
    let workers = (0..job.concurrency.max(1)).map(|worker| {
        let rows = &rows;
        let next = &next;
        async move {
            let mut done = Vec::new();
            loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(deck) = rows.get(index) else {
                    break;
                };
                debug!(worker, index, deck_id = %deck.id, "processing deck");
                done.push((index, process_row(backend, cards, deck, job.dry_run).await));
            }
            done
        }
    });

    let mut results: Vec<(usize, RowOutcome)> =
        join_all(workers).await.into_iter().flatten().collect();
    results.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<RowOutcome> = results.into_iter().map(|(_, outcome)| outcome).collect();

    let errors: Vec<RowError> = outcomes
        .iter()
        .filter_map(|outcome| match &outcome.status {
            RowStatus::Failed { error } => Some(RowError {
                deck_id: outcome.deck_id,
                error: error.clone(),
            }),
            _ => None,
        })
        .collect();

    let scanned = outcomes.len();
    let updated = outcomes
        .iter()
        .filter(|outcome| outcome.status == RowStatus::Updated)
        .count();

    info!(scanned, updated, failed = errors.len(), "color backfill finished");

    Ok(BackfillReport {
        offset: job.offset,
        limit: job.limit,
        concurrency: job.concurrency,
        dry_run: job.dry_run,
        scanned,
        updated,
        next_offset: job.offset + scanned - updated,
        outcomes,
        errors,
    })
}

fn card_ref(deck: &Deck) -> Option<CardRef> {
    let id = deck
        .commander_scryfall_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let name = deck
        .commander_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match (id, name) {
        (Some(id), _) => Some(CardRef::Id(id.to_string())),
        (None, Some(name)) => Some(CardRef::Name(name.to_string())),
        (None, None) => None,
    }
}

async fn resolve_colors(
    cards: &dyn CardSource,
    deck: &Deck,
) -> Result<(ColorSet, ColorSource), String> {
    if let Some(colors) = deck.stored_colors() {
        return Ok((colors, ColorSource::Stored));
    }

    let card = card_ref(deck).ok_or_else(|| "deck has no commander to look up".to_string())?;
    let data = cards.fetch_card(card).await.map_err(|e| e.to_string())?;
    Ok((data.colors(), ColorSource::CardApi))
}

async fn process_row(
    backend: &dyn HostedBackend,
    cards: &dyn CardSource,
    deck: &Deck,
    dry_run: bool,
) -> RowOutcome {
    let mut outcome = RowOutcome {
        deck_id: deck.id,
        deck_name: deck.name.clone(),
        source: None,
        color_code: None,
        status: RowStatus::DryRun,
    };

    let (colors, source) = match resolve_colors(cards, deck).await {
        Ok(found) => found,
        Err(error) => {
            warn!(deck_id = %deck.id, %error, "could not resolve commander colors");
            outcome.status = RowStatus::Failed { error };
            return outcome;
        }
    };

    let code = colors.code();
    outcome.source = Some(source);
    outcome.color_code = Some(code.clone());

    if dry_run {
        return outcome;
    }

    outcome.status = match backend
        .update_deck_colors(Access::Service, deck.id, &colors.symbols(), &code)
        .await
    {
        Ok(()) => RowStatus::Updated,
        Err(e) => {
            warn!(deck_id = %deck.id, error = %e, "could not write commander colors");
            RowStatus::Failed {
                error: e.to_string(),
            }
        }
    };
    outcome
}
