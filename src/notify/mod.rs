//! Outbound notifications.
//!
//! Repository writes never wait on delivery: they push a [`Notification`] into the
//! [`Outbox`] and return. A dispatcher task drains the outbox and hands each message
//! to a [`Notifier`], retrying a bounded number of times. Delivery failures are
//! logged and dropped; they never reach the caller of the write.

pub mod smtp;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::AppResult;

const SIGNATURE: &str = "Thank you,\nELPL Team";

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn leave_status(to: &str, start: &str, end: &str, reason: &str, status: &str) -> Self {
        Self::new(
            to,
            format!("Leave Request {status}"),
            format!(
                "Dear Employee,\n\nYour leave request for {start} to {end} (Reason: {reason}) has been {status}.\n\n{SIGNATURE}"
            ),
        )
    }

    pub fn document_ready(to: &str, document_type: &str, url: &str) -> Self {
        Self::new(
            to,
            format!("Your Document is Ready: {document_type}"),
            format!(
                "Dear Employee,\n\nYour requested document, \"{document_type}\", is now available.\n\nYou can view and download it here: {url}\n\n{SIGNATURE}"
            ),
        )
    }

    pub fn document_rejected(to: &str, document_type: &str) -> Self {
        Self::new(
            to,
            format!("Document Request Rejected: {document_type}"),
            format!(
                "Dear Employee,\n\nYour request for \"{document_type}\" has been rejected. Please contact HR for details.\n\n{SIGNATURE}"
            ),
        )
    }

    pub fn timesheet_reminder(to: &str) -> Self {
        Self::new(
            to,
            "Timesheet Reminder: Please submit your daily timesheet",
            format!(
                "Dear Employee,\n\nThis is a friendly reminder to submit your timesheet for today.\n\nPlease log in to the ELPL Portal and fill out your timesheet accurately.\n\n{SIGNATURE}"
            ),
        )
    }
}

/// Delivery channel (SMTP in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Failures are `AppError::Dependency`.
    async fn send(&self, notification: &Notification) -> AppResult<()>;
}

/// Used when no SMTP relay is configured: messages are only logged.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> AppResult<()> {
        info!(
            id = %notification.id,
            to = %notification.to,
            subject = %notification.subject,
            "Notification (delivery disabled)"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a message. Never fails the caller; a stopped dispatcher is only logged.
    pub fn enqueue(&self, notification: Notification) {
        let id = notification.id;
        let to = notification.to.clone();
        match self.tx.send(notification) {
            Ok(()) => debug!(%id, %to, "Notification queued"),
            Err(_) => warn!(%id, %to, "Notification dispatcher stopped; message dropped"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Drain the outbox until every sender is gone.
pub async fn run_dispatcher(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
) {
    while let Some(notification) = rx.recv().await {
        deliver(notifier.as_ref(), &notification, policy).await;
    }
    debug!("Notification dispatcher finished");
}

/// Returns whether the message was delivered.
pub async fn deliver(notifier: &dyn Notifier, notification: &Notification, policy: RetryPolicy) -> bool {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        match notifier.send(notification).await {
            Ok(()) => {
                info!(id = %notification.id, to = %notification.to, subject = %notification.subject, attempt, "Notification sent");
                return true;
            }
            Err(e) if attempt < attempts => {
                warn!(id = %notification.id, to = %notification.to, attempt, error = %e, "Notification failed, retrying");
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                error!(id = %notification.id, to = %notification.to, attempts, error = %e, "Notification dropped after retries");
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Notifier for Flaky {
        async fn send(&self, _: &Notification) -> AppResult<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(AppError::dependency("smtp unavailable"))
            } else {
                Ok(())
            }
        }
    }

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    #[actix_web::test]
    async fn retries_until_delivered() {
        let flaky = Flaky { failures: 2, calls: AtomicU32::new(0) };
        let delivered = deliver(&flaky, &Notification::timesheet_reminder("a@x.com"), quick(3)).await;
        assert!(delivered);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[actix_web::test]
    async fn gives_up_after_max_attempts() {
        let flaky = Flaky { failures: 10, calls: AtomicU32::new(0) };
        let delivered = deliver(&flaky, &Notification::timesheet_reminder("a@x.com"), quick(2)).await;
        assert!(!delivered);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn dispatcher_drains_queue_and_stops_when_outbox_dropped() {
        let (outbox, rx) = Outbox::channel();
        outbox.enqueue(Notification::timesheet_reminder("a@x.com"));
        outbox.enqueue(Notification::timesheet_reminder("b@x.com"));
        drop(outbox);

        let flaky = Arc::new(Flaky { failures: 0, calls: AtomicU32::new(0) });
        run_dispatcher(rx, flaky.clone(), quick(1)).await;
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn enqueue_after_dispatcher_stopped_does_not_panic() {
        let (outbox, rx) = Outbox::channel();
        drop(rx);
        outbox.enqueue(Notification::timesheet_reminder("a@x.com"));
    }

    #[test]
    fn leave_status_message_mentions_dates_and_status() {
        let n = Notification::leave_status("a@x.com", "2026-03-02", "2026-03-03", "trip", "Approved");
        assert_eq!(n.subject, "Leave Request Approved");
        assert!(n.body.contains("2026-03-02 to 2026-03-03"));
        assert!(n.body.contains("has been Approved"));
    }
}
