//! The bet placement pipeline.
//!
//! One submission flows validate → price → commit, short-circuiting on
//! the first classified failure, so no bet row ever exists for a
//! rejected submission. The post-commit confirmation email is queued
//! fire-and-forget and cannot fail the request.

pub mod committer;
pub mod pricing;
pub mod validator;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::notify::NotifyHandle;
use crate::store::{BetStore, CartStore, GameStore};
use crate::types::{AuthUser, Bet, BetError, BetSubmission};

/// Validates, prices, and commits bet submissions.
///
/// All collaborators are injected; the pipeline holds no mutable state
/// and a submission is processed exactly once.
#[derive(Clone)]
pub struct BetPipeline {
    games: Arc<dyn GameStore>,
    carts: Arc<dyn CartStore>,
    bets: Arc<dyn BetStore>,
    notifier: NotifyHandle,
    default_cart_id: i64,
    request_timeout: Duration,
}

impl BetPipeline {
    pub fn new(
        games: Arc<dyn GameStore>,
        carts: Arc<dyn CartStore>,
        bets: Arc<dyn BetStore>,
        notifier: NotifyHandle,
        default_cart_id: i64,
        request_timeout: Duration,
    ) -> Self {
        Self {
            games,
            carts,
            bets,
            notifier,
            default_cart_id,
            request_timeout,
        }
    }

    /// Place every bet in the submission for `user`, or none of them.
    ///
    /// Lookups and the commit share one request-level timeout; hitting
    /// it is a transient failure and nothing is persisted in that case
    /// unless the commit itself already completed.
    pub async fn place_bets(
        &self,
        user: &AuthUser,
        submission: &BetSubmission,
    ) -> Result<Vec<Bet>, BetError> {
        let cart_id = submission.cart_id.unwrap_or(self.default_cart_id);

        let bets = tokio::time::timeout(self.request_timeout, self.run(user, submission, cart_id))
            .await
            .map_err(|_| BetError::Timeout("placing bets"))??;

        info!(
            user_id = user.id,
            cart_id,
            count = bets.len(),
            "Submission accepted"
        );
        self.notifier.bet_confirmation(user, bets.len());
        Ok(bets)
    }

    async fn run(
        &self,
        user: &AuthUser,
        submission: &BetSubmission,
        cart_id: i64,
    ) -> Result<Vec<Bet>, BetError> {
        let cart = self.carts.find(cart_id).await?.ok_or(BetError::CartNotFound)?;

        let drafts =
            validator::validate_submission(self.games.as_ref(), submission, cart_id, user.id)
                .await?;

        let total = pricing::total_price(&drafts);
        pricing::enforce_minimum(total, &cart)?;

        committer::commit(self.bets.as_ref(), &drafts).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
