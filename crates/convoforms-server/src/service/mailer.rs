use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use convoforms_access::{InvitationMailer, TracingMailer};

/// Shared handle to the mailer used for invitation and welcome email.
#[derive(Clone)]
pub struct MailerService(Arc<dyn InvitationMailer>);

impl MailerService {
    pub fn new(mailer: impl InvitationMailer + 'static) -> Self {
        Self(Arc::new(mailer))
    }

    /// Mailer that only logs outgoing email.
    pub fn tracing() -> Self {
        Self::new(TracingMailer)
    }
}

impl Default for MailerService {
    fn default() -> Self {
        Self::tracing()
    }
}

impl Deref for MailerService {
    type Target = dyn InvitationMailer;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for MailerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerService").finish_non_exhaustive()
    }
}
