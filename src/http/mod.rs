//! HTTP layer — Axum router, shared state, auth extractors, and the
//! error-to-status mapping.
//!
//! CORS enabled for local development. The router is built by a plain
//! function so tests can drive it with `tower::ServiceExt::oneshot`.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::betting::BetPipeline;
use crate::store::{BetStore, CartStore, GameStore, SessionAuth};
use crate::types::{AuthUser, BetError, ErrorKind};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct AppState {
    pub games: Arc<dyn GameStore>,
    pub carts: Arc<dyn CartStore>,
    pub bets: Arc<dyn BetStore>,
    pub sessions: Arc<dyn SessionAuth>,
    pub pipeline: BetPipeline,
    pub default_cart_id: i64,
}

pub type SharedState = Arc<AppState>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// A [`BetError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub BetError);

impl From<BetError> for ApiError {
    fn from(e: BetError) -> Self {
        ApiError(e)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        let code = match kind {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::Transient => "UNAVAILABLE",
            _ => "BAD_REQUEST",
        };

        if kind == ErrorKind::Transient {
            error!(error = %self.0, "Request failed on storage");
        }

        let body = json!({
            "code": code,
            "status": status.as_u16(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Auth extractors
// ---------------------------------------------------------------------------

/// The bearer-authenticated caller.
pub struct AuthedUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<SharedState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError(BetError::Unauthorized))?;

        let user = state
            .sessions
            .authenticate(token)
            .await?
            .ok_or(ApiError(BetError::Unauthorized))?;
        Ok(AuthedUser(user))
    }
}

/// An authenticated caller who is also an administrator.
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let AuthedUser(user) = AuthedUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError(BetError::Forbidden));
        }
        Ok(AdminUser(user))
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/bets/new-bet", post(routes::create_bets))
        .route("/bets/:id", get(routes::get_bet))
        .route("/carts/rules", get(routes::cart_rules))
        .route("/admin/games", post(routes::create_game))
        .route(
            "/admin/games/:id",
            get(routes::get_game)
                .put(routes::update_game)
                .delete(routes::delete_game),
        )
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: SharedState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    info!(port, "HTTP server listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
