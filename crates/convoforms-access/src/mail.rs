//! Outgoing email for invitations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use convoforms_postgres::types::WorkspaceRole;

use crate::TRACING_TARGET_MAIL;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),

    #[error("Mail provider is unavailable: {0}")]
    Unavailable(String),
}

/// Invitation to join a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationEmail {
    pub to: String,
    pub workspace_name: String,
    pub inviter_name: String,
    pub role: WorkspaceRole,
    /// Acceptance token to embed in the link.
    pub token: String,
    pub expires_at: jiff::Timestamp,
}

/// Sent after an invitation was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeEmail {
    pub to: String,
    pub workspace_name: String,
    pub role: WorkspaceRole,
}

/// Delivers invitation related email.
///
/// Delivery is best-effort: callers record the outcome but never fail
/// because of it.
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    async fn send_invitation(&self, email: &InvitationEmail) -> Result<(), MailError>;

    async fn send_welcome(&self, email: &WelcomeEmail) -> Result<(), MailError>;
}

/// Mailer that only writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl InvitationMailer for TracingMailer {
    async fn send_invitation(&self, email: &InvitationEmail) -> Result<(), MailError> {
        tracing::info!(
            target: TRACING_TARGET_MAIL,
            to = %email.to,
            workspace = %email.workspace_name,
            inviter = %email.inviter_name,
            role = %email.role,
            expires_at = %email.expires_at,
            "invitation email"
        );
        Ok(())
    }

    async fn send_welcome(&self, email: &WelcomeEmail) -> Result<(), MailError> {
        tracing::info!(
            target: TRACING_TARGET_MAIL,
            to = %email.to,
            workspace = %email.workspace_name,
            role = %email.role,
            "welcome email"
        );
        Ok(())
    }
}

/// A message captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    Invitation(InvitationEmail),
    Welcome(WelcomeEmail),
}

/// Mailer that keeps every message in memory, for tests.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails.
    pub fn failing() -> Self {
        let mailer = Self::new();
        mailer.failing.store(true, Ordering::Relaxed);
        mailer
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn invitations(&self) -> Vec<InvitationEmail> {
        self.sent()
            .into_iter()
            .filter_map(|mail| match mail {
                SentMail::Invitation(email) => Some(email),
                SentMail::Welcome(_) => None,
            })
            .collect()
    }

    pub fn welcomes(&self) -> Vec<WelcomeEmail> {
        self.sent()
            .into_iter()
            .filter_map(|mail| match mail {
                SentMail::Welcome(email) => Some(email),
                SentMail::Invitation(_) => None,
            })
            .collect()
    }

    fn record(&self, mail: SentMail) -> Result<(), MailError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(MailError::Unavailable("recording mailer set to fail".into()));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail);
        Ok(())
    }
}

#[async_trait]
impl InvitationMailer for RecordingMailer {
    async fn send_invitation(&self, email: &InvitationEmail) -> Result<(), MailError> {
        self.record(SentMail::Invitation(email.clone()))
    }

    async fn send_welcome(&self, email: &WelcomeEmail) -> Result<(), MailError> {
        self.record(SentMail::Welcome(email.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welcome() -> WelcomeEmail {
        WelcomeEmail {
            to: "bob@example.com".into(),
            workspace_name: "Acme".into(),
            role: WorkspaceRole::Member,
        }
    }

    #[tokio::test]
    async fn recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::new();
        mailer.send_welcome(&welcome()).await.unwrap();

        assert_eq!(mailer.welcomes(), vec![welcome()]);
        assert!(mailer.invitations().is_empty());
    }

    #[tokio::test]
    async fn failing_mailer_records_nothing() {
        let mailer = RecordingMailer::failing();

        assert!(mailer.send_welcome(&welcome()).await.is_err());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn tracing_mailer_accepts_everything() {
        let mailer: &dyn InvitationMailer = &TracingMailer;
        assert!(mailer.send_welcome(&welcome()).await.is_ok());
    }
}
