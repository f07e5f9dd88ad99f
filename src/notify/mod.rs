//! Transactional email dispatch.
//!
//! Notifications are fire-and-forget: producers push onto an unbounded
//! channel and a background worker drains it through a [`Mailer`].
//! A send failure is logged and never surfaces to the request that
//! produced it.

pub mod mailer;
pub mod reminder;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::AuthUser;

/// One outbound email. Template rendering is out of scope; the body is
/// plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Cloneable producer handle over the notification channel.
#[derive(Clone)]
pub struct NotifyHandle {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotifyHandle {
    /// Queue the post-commit confirmation email. Never blocks; a closed
    /// channel is logged and ignored.
    pub fn bet_confirmation(&self, user: &AuthUser, bet_count: usize) {
        self.dispatch(Notification {
            to: user.email.clone(),
            subject: "TGL - Your bets have been made!".to_string(),
            body: format!(
                "Hello {}, your {} bet(s) have been registered. Good luck!",
                sentence_case(&user.username),
                bet_count,
            ),
        });
    }

    /// Queue the stale-bettor reminder email.
    pub fn reminder(&self, user: &AuthUser, company_email: &str) {
        self.dispatch(Notification {
            to: user.email.clone(),
            subject: format!("TGL - Hello {}", sentence_case(&user.username)),
            body: format!(
                "Hello {}, it's been a while since your last bet. \
                 Come back and play! Questions? Write to {}.",
                sentence_case(&user.username),
                company_email,
            ),
        });
    }

    fn dispatch(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification channel closed; email dropped");
        }
    }
}

/// Create the notification channel. The receiver goes to
/// [`spawn_worker`]; tests may keep it and inspect queued messages.
pub fn channel() -> (NotifyHandle, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotifyHandle { tx }, rx)
}

/// Drain the channel through the mailer on a background task.
///
/// This spawns and returns immediately. Worker exits when every
/// `NotifyHandle` has been dropped.
pub fn spawn_worker(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    mailer: std::sync::Arc<dyn Mailer>,
) {
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            match mailer.send(&notification).await {
                Ok(()) => debug!(
                    to = %notification.to,
                    subject = %notification.subject,
                    mailer = mailer.name(),
                    "Email sent"
                ),
                Err(e) => warn!(
                    to = %notification.to,
                    error = %e,
                    mailer = mailer.name(),
                    "Email delivery failed; dropping"
                ),
            }
        }
        debug!("Notification worker stopped");
    });
}

/// Lowercase the name, then capitalize the first letter, the way the
/// platform greets users ("JOHN doe" -> "John doe").
pub fn sentence_case(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
