//! Persistence collaborators.
//!
//! Defines the repository traits the betting pipeline and HTTP layer
//! depend on, and provides the SQLite implementation in [`sqlite`].
//! The traits double as seams for test doubles: integration tests use
//! an in-memory mock, unit tests use `mockall` automocks.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{AuthUser, Bet, BetDraft, BetError, Cart, Game, NewGame};

/// Game storage: lookups for the bet pipeline plus admin CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Resolve a game by id. `None` when absent.
    async fn find(&self, id: i64) -> Result<Option<Game>, BetError>;

    /// Resolve a game by its unique type label.
    async fn find_by_type(&self, game_type: &str) -> Result<Option<Game>, BetError>;

    /// All games belonging to a cart.
    async fn list_by_cart(&self, cart_id: i64) -> Result<Vec<Game>, BetError>;

    /// Create a game. Fails with `GameTypeTaken` when the type exists.
    async fn create(&self, new: NewGame) -> Result<Game, BetError>;

    /// Replace a game's definition. Fails with `GameTypeTaken` when the
    /// new type belongs to a different game.
    async fn update(&self, id: i64, new: NewGame) -> Result<Game, BetError>;

    /// Delete a game. Fails with `GameNotFound` when absent.
    async fn delete(&self, id: i64) -> Result<(), BetError>;
}

/// Cart lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Cart>, BetError>;
}

/// Bet persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BetStore: Send + Sync {
    /// Persist all drafts in one atomic batch: either every draft becomes
    /// a bet or none do. Returns the created rows with ids and timestamps.
    async fn bulk_create(&self, drafts: &[BetDraft]) -> Result<Vec<Bet>, BetError>;

    /// Resolve a bet by id.
    async fn find(&self, id: i64) -> Result<Option<Bet>, BetError>;

    /// Users whose most recent bet is older than `cutoff`.
    async fn stale_bettors(&self, cutoff: DateTime<Utc>) -> Result<Vec<AuthUser>, BetError>;
}

/// Bearer-token resolution to an authenticated user.
///
/// Token issuance and password flows live outside this service; this is
/// the read-side contract the HTTP extractor consumes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionAuth: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Option<AuthUser>, BetError>;
}
