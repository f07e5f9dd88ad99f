//! Per-line bet validation.
//!
//! Each submitted line is normalized and checked against its game's
//! rules, left to right, so the reported failure is always the first
//! one encountered. Lines have no cross-line dependency; validation
//! never mutates anything outside its own draft.

use tracing::debug;

use crate::store::GameStore;
use crate::types::{BetDraft, BetError, BetSubmission};

/// Validate every line of a submission against the games in `cart_id`.
///
/// Per line: resolve the game, check cart membership, sort the numbers
/// ascending, require exactly `max_number` picks, and require every pick
/// in `1..=range`. Zero never passes; the lower bound is strictly
/// positive. Produces one priced draft per line on success.
pub async fn validate_submission(
    games: &dyn GameStore,
    submission: &BetSubmission,
    cart_id: i64,
    user_id: i64,
) -> Result<Vec<BetDraft>, BetError> {
    if submission.games.is_empty() {
        return Err(BetError::EmptySubmission);
    }

    let mut drafts = Vec::with_capacity(submission.games.len());

    for line in &submission.games {
        let game = games.find(line.game_id).await?.ok_or(BetError::GameNotFound)?;

        if game.cart_id != cart_id {
            return Err(BetError::GameNotInCart {
                game_type: game.game_type,
                cart_id,
            });
        }

        let mut numbers = line.chosen_numbers.clone();
        numbers.sort_unstable();

        if numbers.len() as i64 != game.max_number {
            return Err(BetError::WrongPickCount {
                game_type: game.game_type,
                expected: game.max_number,
            });
        }

        if numbers.iter().any(|&n| n < 1 || n > game.range) {
            return Err(BetError::InvalidNumbers { range: game.range });
        }

        drafts.push(BetDraft {
            chosen_numbers: join_numbers(&numbers),
            game_id: game.id,
            price: game.price,
            user_id,
        });
    }

    debug!(lines = drafts.len(), cart_id, "Submission validated");
    Ok(drafts)
}

/// Render a sorted number set in the canonical `"1, 2, 3"` form.
pub fn join_numbers(numbers: &[i64]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
