//! User-facing notices.
//!
//! A [`NoticeBus`] is created by the application root and handed to whatever needs to
//! raise a notice. UI surfaces subscribe and render what arrives. Publishing with no
//! subscriber is not an error; the notice is dropped.

use tokio::sync::broadcast;
use tracing::debug;

/// Notices buffered per subscriber before the oldest are dropped.
pub const NOTICE_CAPACITY: usize = 32;

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Transient message.
    Toast(String),
    /// The action requires signing in.
    LoginRequired,
    /// The account has no credits left for the action.
    InsufficientCredits,
}

/// Publish/subscribe channel for [`Notice`]s.
#[derive(Debug, Clone)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Bus with [`NOTICE_CAPACITY`] slots per subscriber.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { tx }
    }

    /// Publish to every current subscriber. Returns how many received it.
    pub fn publish(&self, notice: Notice) -> usize {
        match self.tx.send(notice) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(notice)) => {
                debug!(?notice, "notice.publish: no subscribers");
                0
            }
        }
    }

    /// Receive every notice published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}
