//! TGL — lottery betting platform backend
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the store, starts the notification worker and the stale-bettor
//! reminder, then serves HTTP with graceful shutdown.

use anyhow::Result;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use tgl::betting::BetPipeline;
use tgl::config::AppConfig;
use tgl::http::{self, AppState};
use tgl::notify::{self, mailer::HttpMailer, mailer::LogMailer, reminder, Mailer};
use tgl::store::sqlite::SqliteStore;
use tgl::store::{BetStore, CartStore, GameStore, SessionAuth};

const BANNER: &str = r#"
 _____ ____ _
|_   _/ ___| |
  | || |  _| |
  | || |_| | |___
  |_| \____|_____|

  The Greatest Lottery — betting backend
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;
    init_logging();

    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        database = %cfg.database.url,
        default_cart_id = cfg.betting.default_cart_id,
        mail_enabled = cfg.mail.enabled,
        "TGL starting up"
    );

    // -- Storage ---------------------------------------------------------

    let store = SqliteStore::connect(&cfg.database.url).await?;
    let seed_min = Decimal::from_f64(cfg.betting.seed_min_cart_value)
        .unwrap_or_else(|| Decimal::new(30, 0));
    store
        .ensure_cart(cfg.betting.default_cart_id, seed_min)
        .await?;

    let games: Arc<dyn GameStore> = Arc::new(store.clone());
    let carts: Arc<dyn CartStore> = Arc::new(store.clone());
    let bets: Arc<dyn BetStore> = Arc::new(store.clone());
    let sessions: Arc<dyn SessionAuth> = Arc::new(store.clone());

    // -- Notifications ---------------------------------------------------

    let mailer: Arc<dyn Mailer> = match (
        cfg.mail.enabled,
        cfg.mail.api_url.clone(),
        cfg.mail.api_key_env.as_deref(),
    ) {
        (true, Some(api_url), Some(key_env)) => {
            let api_key = AppConfig::resolve_env(key_env)?;
            info!(api_url = %api_url, "Using HTTP mailer");
            Arc::new(HttpMailer::new(api_url, api_key, cfg.mail.from_address.clone())?)
        }
        (true, _, _) => {
            warn!("Mail enabled but api_url/api_key_env missing — falling back to log mailer");
            Arc::new(LogMailer)
        }
        (false, _, _) => {
            info!("Mail disabled — using log mailer");
            Arc::new(LogMailer)
        }
    };

    let (notifier, rx) = notify::channel();
    notify::spawn_worker(rx, mailer);

    reminder::spawn_reminder(
        bets.clone(),
        notifier.clone(),
        reminder::ReminderConfig {
            after_days: cfg.mail.reminder_after_days,
            interval: Duration::from_secs(cfg.mail.reminder_interval_secs),
            company_email: cfg.mail.company_email.clone(),
        },
    );

    // -- HTTP ------------------------------------------------------------

    let pipeline = BetPipeline::new(
        games.clone(),
        carts.clone(),
        bets.clone(),
        notifier,
        cfg.betting.default_cart_id,
        Duration::from_secs(cfg.server.request_timeout_secs),
    );

    let state = Arc::new(AppState {
        games,
        carts,
        bets,
        sessions,
        pipeline,
        default_cart_id: cfg.betting.default_cart_id,
    });

    http::serve(state, cfg.server.port).await?;

    info!("TGL shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tgl=info"));

    let json_logging = std::env::var("TGL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
