//! Mail sink that records instead of delivering.

use std::sync::Mutex;

use crate::domain::ports::{MailError, Mailer, OutboundMail};

/// A `Mailer` that keeps every message in memory.
///
/// Used wherever real delivery is unwanted: tests assert on what would
/// have been sent, and local development can inspect the outbox.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundMail>>,
}

impl RecordingMailer {
    /// An empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Drain the outbox.
    pub fn take(&self) -> Vec<OutboundMail> {
        self.sent
            .lock()
            .map(|mut sent| std::mem::take(&mut *sent))
            .unwrap_or_default()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError::delivery("outbox lock poisoned"))?
            .push(mail);
        Ok(())
    }
}
