//! All-or-nothing bet commit.
//!
//! A thin wrapper over the bet store's atomic bulk insert: the store
//! guarantees a partial batch never becomes visible, and this layer
//! never retries a failed batch.

use tracing::info;

use crate::store::BetStore;
use crate::types::{Bet, BetDraft, BetError};

/// Persist the full set of validated drafts as bet rows.
///
/// Single attempt. On success every draft has become exactly one bet,
/// in submission order, with ids and timestamps assigned by the store.
pub async fn commit(store: &dyn BetStore, drafts: &[BetDraft]) -> Result<Vec<Bet>, BetError> {
    if drafts.is_empty() {
        return Ok(Vec::new());
    }

    let bets = store.bulk_create(drafts).await?;

    if bets.len() != drafts.len() {
        // The store broke its bulk-create contract; refuse to report a
        // partial batch as success.
        return Err(BetError::Storage(format!(
            "bulk insert returned {} bets for {} drafts",
            bets.len(),
            drafts.len()
        )));
    }

    info!(count = bets.len(), user_id = drafts[0].user_id, "Bets committed");
    Ok(bets)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
