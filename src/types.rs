//! Shared types for the TGL backend.
//!
//! The domain model (games, carts, bets) plus the wire-level submission
//! types and the domain error enum. Store, betting, and HTTP modules all
//! depend on these without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain model
// ---------------------------------------------------------------------------

/// A bet type definition: how many numbers to pick, from what range,
/// at what unit price. Owned by a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    #[serde(rename = "type")]
    pub game_type: String,
    pub description: String,
    pub color: String,
    /// Highest pickable number, inclusive. The lower bound is always 1.
    pub range: i64,
    /// Exact count of numbers required per bet.
    pub max_number: i64,
    /// Cost of one bet on this game.
    pub price: Decimal,
    /// Owning cart. Not exposed on the wire.
    #[serde(skip_serializing)]
    pub cart_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// A mega-sena-shaped game for tests: pick 6 from 1..=60 at R$ 4,50.
    #[cfg(test)]
    pub fn sample() -> Self {
        use rust_decimal_macros::dec;
        Game {
            id: 2,
            game_type: "Mega-Sena".to_string(),
            description: "Pick 6 numbers from 1 to 60.".to_string(),
            color: "#01AC66".to_string(),
            range: 60,
            max_number: 6,
            price: dec!(4.50),
            cart_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// A minimum-purchase threshold bundling a set of games.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub min_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One persisted wager. `chosen_numbers` is the canonical rendering:
/// ascending, comma-space joined (`"1, 2, 3"`). `price` is a snapshot of
/// the game's price at submission time, never a live reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: i64,
    pub user_id: i64,
    pub game_id: i64,
    pub chosen_numbers: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from a bearer token by the
/// session collaborator.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// Submission (wire input)
// ---------------------------------------------------------------------------

/// One wager line as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetLine {
    pub game_id: i64,
    pub chosen_numbers: Vec<i64>,
}

/// The caller's batch request to create one or more bets in one call.
///
/// `cart_id` is optional; the handler substitutes the configured default
/// when absent. Consumed once, then discarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSubmission {
    #[serde(default)]
    pub cart_id: Option<i64>,
    pub games: Vec<BetLine>,
}

/// A validated, priced line ready for the atomic bulk insert.
#[derive(Debug, Clone)]
pub struct BetDraft {
    pub chosen_numbers: String,
    pub game_id: i64,
    pub price: Decimal,
    pub user_id: i64,
}

/// Payload for creating or replacing a game (admin CRUD).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    #[serde(rename = "type")]
    pub game_type: String,
    pub description: String,
    pub color: String,
    pub range: i64,
    pub max_number: i64,
    pub price: Decimal,
    #[serde(default)]
    pub cart_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Classification of a [`BetError`], mapped to an HTTP status by the
/// HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced resource does not exist (404).
    NotFound,
    /// Business rule violated on well-formed input (409).
    Conflict,
    /// Structurally malformed input (422).
    Invalid,
    /// Missing or unknown bearer token (401).
    Unauthorized,
    /// Authenticated but not allowed (403).
    Forbidden,
    /// Storage or lookup unavailability; caller may retry (503).
    Transient,
}

/// Domain errors for the betting platform.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BetError {
    #[error("game not found. please provide a valid game id and try again.")]
    GameNotFound,

    #[error("cart not found. please provide a valid cart id and try again.")]
    CartNotFound,

    #[error("bet not found. please provide a valid bet id and try again.")]
    BetNotFound,

    #[error("the game {game_type} does not belong to cart {cart_id}.")]
    GameNotInCart { game_type: String, cart_id: i64 },

    #[error("for make a bet to {game_type} you need to provide exactly {expected} numbers.")]
    WrongPickCount { game_type: String, expected: i64 },

    #[error("invalid numbers to the bet. please provide numbers between 1 and {range}.")]
    InvalidNumbers { range: i64 },

    /// Both amounts are pre-formatted as pt-BR currency for display.
    #[error("your total of {total} is below the cart minimum. you need to provide at least {min} to make a game.")]
    BelowMinimum { total: String, min: String },

    #[error("a bet submission must contain at least one game.")]
    EmptySubmission,

    #[error("game type already exists. please insert a valid game type and try again.")]
    GameTypeTaken,

    #[error("authentication required. please provide a valid bearer token.")]
    Unauthorized,

    #[error("you are not allowed to perform this action.")]
    Forbidden,

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("timed out while {0}")]
    Timeout(&'static str),
}

impl BetError {
    /// Classify this error for HTTP mapping and logging.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BetError::GameNotFound | BetError::CartNotFound | BetError::BetNotFound => {
                ErrorKind::NotFound
            }
            BetError::GameNotInCart { .. }
            | BetError::WrongPickCount { .. }
            | BetError::InvalidNumbers { .. }
            | BetError::BelowMinimum { .. }
            | BetError::GameTypeTaken => ErrorKind::Conflict,
            BetError::EmptySubmission => ErrorKind::Invalid,
            BetError::Unauthorized => ErrorKind::Unauthorized,
            BetError::Forbidden => ErrorKind::Forbidden,
            BetError::Storage(_) | BetError::Timeout(_) => ErrorKind::Transient,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
