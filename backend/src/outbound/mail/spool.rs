//! Fire-and-forget mail delivery on a background thread.

use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use std::thread;

use tracing::warn;

use crate::domain::ports::{MailError, Mailer, OutboundMail};

/// A `Mailer` that hands messages to a background delivery thread.
///
/// Submission never blocks on the wrapped transport. Delivery is
/// at-most-once: a message the inner mailer rejects is logged and dropped,
/// never retried. The thread drains the channel and exits once every
/// handle to the spool is gone.
pub struct SpoolingMailer {
    sender: Sender<OutboundMail>,
}

impl SpoolingMailer {
    /// Spawn the delivery thread around the wrapped transport.
    pub fn new<M>(inner: Arc<M>) -> Self
    where
        M: Mailer + 'static,
    {
        let (sender, receiver) = channel::<OutboundMail>();
        thread::spawn(move || {
            for mail in receiver {
                if let Err(error) = inner.send(mail) {
                    warn!(%error, "background mail delivery failed; message dropped");
                }
            }
        });
        Self { sender }
    }
}

impl Mailer for SpoolingMailer {
    fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        self.sender
            .send(mail)
            .map_err(|_| MailError::delivery("mail delivery thread has stopped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::mail::RecordingMailer;
    use rstest::rstest;
    use std::time::Duration;

    fn mail() -> OutboundMail {
        OutboundMail {
            subject: "spooled".to_owned(),
            sender: "admin@example.test".to_owned(),
            recipients: vec!["ada@example.test".to_owned()],
            text_body: "hello".to_owned(),
            html_body: None,
        }
    }

    #[rstest]
    fn delivers_through_the_background_thread() {
        let inner = Arc::new(RecordingMailer::new());
        let spool = SpoolingMailer::new(inner.clone());

        spool.send(mail()).expect("accepted");

        // The delivery thread races this assertion; poll briefly.
        for _ in 0..50 {
            if !inner.sent().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(inner.sent().len(), 1);
    }
}
