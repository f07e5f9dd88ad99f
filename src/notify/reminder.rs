//! Stale-bettor reminder task.
//!
//! Periodically scans for users whose most recent bet is older than the
//! configured window and queues a reminder email for each. Scan errors
//! are logged and the loop continues; the task holds no other state.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

use super::NotifyHandle;
use crate::store::BetStore;

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub after_days: i64,
    pub interval: std::time::Duration,
    pub company_email: String,
}

/// Spawn the reminder loop. Returns immediately.
pub fn spawn_reminder(bets: Arc<dyn BetStore>, notifier: NotifyHandle, cfg: ReminderConfig) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cfg.interval);
        // The first tick fires immediately; skip it.
        interval.tick().await;

        loop {
            interval.tick().await;
            match run_scan(bets.as_ref(), &notifier, &cfg).await {
                Ok(count) => info!(reminded = count, "Reminder scan complete"),
                Err(e) => error!(error = %e, "Reminder scan failed"),
            }
        }
    });
}

async fn run_scan(
    bets: &dyn BetStore,
    notifier: &NotifyHandle,
    cfg: &ReminderConfig,
) -> Result<usize, crate::types::BetError> {
    let cutoff = Utc::now() - Duration::days(cfg.after_days);
    let users = bets.stale_bettors(cutoff).await?;
    for user in &users {
        notifier.reminder(user, &cfg.company_email);
    }
    Ok(users.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
