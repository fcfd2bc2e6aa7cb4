//! Entry point for inbound control text.
//!
//! The surface calls [`ControlInbox::on_message`] from whatever thread it
//! runs on. Decoded assignments are queued on a bounded channel and applied
//! to the parameters by the poller at the start of each Ready tick, so
//! edits made while the surface is still loading are held, not lost.

use crate::protocol::{self, ParamAssignment};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Cloneable handle for delivering inbound control strings.
#[derive(Debug, Clone)]
pub struct ControlInbox {
    tx: Sender<ParamAssignment>,
}

impl ControlInbox {
    /// Create an inbox and the receiver the poller drains.
    pub fn channel(capacity: usize) -> (Self, Receiver<ParamAssignment>) {
        let (tx, rx) = bounded(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Decode and queue one message.
    ///
    /// Returns `true` if a parameter edit was queued. Unrecognized text is
    /// dropped (logged at `debug`); a full queue drops the edit with a warning.
    pub fn on_message(&self, text: &str) -> bool {
        let assignment = match protocol::decode(text) {
            Ok(assignment) => assignment,
            Err(e) => {
                tracing::debug!(message = text, error = %e, "ignoring control message");
                return false;
            }
        };
        self.submit(assignment)
    }

    /// Queue an already decoded assignment.
    pub fn submit(&self, assignment: ParamAssignment) -> bool {
        match self.tx.try_send(assignment) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    param = %dropped.param,
                    value = dropped.value,
                    "control inbox full, dropping edit"
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("control inbox closed");
                false
            }
        }
    }

    /// Number of queued, not yet applied edits.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}
