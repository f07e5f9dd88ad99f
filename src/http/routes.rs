//! Route handlers.
//!
//! All endpoints speak camelCase JSON. Betting goes through the
//! pipeline; game CRUD and lookups go straight to the stores.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::{AdminUser, ApiError, AuthedUser, SharedState};
use crate::types::{BetError, BetSubmission, NewGame};

/// POST /bets/new-bet
///
/// Validates, prices, and atomically commits the submission for the
/// authenticated caller. 201 with the created bets on success.
pub async fn create_bets(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Json(submission): Json<BetSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    let bets = state.pipeline.place_bets(&user, &submission).await?;
    Ok((StatusCode::CREATED, Json(json!({ "bets": bets }))))
}

/// GET /bets/:id
///
/// A caller may read their own bets; admins may read any.
pub async fn get_bet(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let bet = state.bets.find(id).await?.ok_or(BetError::BetNotFound)?;
    if bet.user_id != user.id && !user.is_admin {
        return Err(ApiError(BetError::Forbidden));
    }
    Ok(Json(json!({ "bet": bet })))
}

/// GET /carts/rules
///
/// The default cart's minimum value and its games, for rendering the
/// betting UI. Public.
pub async fn cart_rules(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .carts
        .find(state.default_cart_id)
        .await?
        .ok_or(BetError::CartNotFound)?;
    let games = state.games.list_by_cart(cart.id).await?;

    Ok(Json(json!({
        "rules": {
            "id": cart.id,
            "minValue": cart.min_value,
            "types": games,
        }
    })))
}

/// POST /admin/games
pub async fn create_game(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Json(mut payload): Json<NewGame>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_id = payload.cart_id.unwrap_or(state.default_cart_id);
    state
        .carts
        .find(cart_id)
        .await?
        .ok_or(BetError::CartNotFound)?;
    payload.cart_id = Some(cart_id);

    let game = state.games.create(payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "game": game }))))
}

/// GET /admin/games/:id
pub async fn get_game(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let game = state.games.find(id).await?.ok_or(BetError::GameNotFound)?;
    Ok(Json(json!({ "game": game })))
}

/// PUT /admin/games/:id
pub async fn update_game(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<NewGame>,
) -> Result<impl IntoResponse, ApiError> {
    let game = state.games.update(id, payload).await?;
    Ok(Json(json!({ "game": game })))
}

/// DELETE /admin/games/:id
pub async fn delete_game(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.games.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
