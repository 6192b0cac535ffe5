//! Bridge between asynchronous uploader tasks and the single-threaded
//! controller.
//!
//! Uploader tasks push [`UploadEvent`]s into a bounded channel; the
//! controller drains them on its own turn and applies them to the store.
//! Nothing here blocks the controller thread.

use tokio::sync::mpsc;
use tracing::debug;

use quill_types::UploadEvent;

use crate::attachments::AttachmentStore;

const UPLOAD_CHANNEL_CAPACITY: usize = 256; // bounded: no OOM
/// Events applied per drain call, so a burst of upload traffic never starves
/// input handling.
pub const MAX_EVENTS_PER_TURN: usize = 64;

/// Receiving half, owned by the controller's event loop.
#[derive(Debug)]
pub struct UploadPump {
    rx: mpsc::Receiver<UploadEvent>,
}

/// Sending half, cloned into each uploader task.
#[derive(Debug, Clone)]
pub struct UploadReporter {
    tx: mpsc::Sender<UploadEvent>,
}

impl UploadPump {
    #[must_use]
    pub fn new() -> (Self, UploadReporter) {
        let (tx, rx) = mpsc::channel(UPLOAD_CHANNEL_CAPACITY);
        (Self { rx }, UploadReporter { tx })
    }

    /// Apply queued outcomes to the store, up to the per-turn cap. Returns
    /// the number applied.
    pub fn drain_into(&mut self, store: &mut AttachmentStore) -> usize {
        let mut applied = 0;
        while applied < MAX_EVENTS_PER_TURN {
            match self.rx.try_recv() {
                Ok(event) => {
                    store.apply_event(event);
                    applied += 1;
                }
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        applied
    }
}

impl UploadReporter {
    /// Deliver one outcome, waiting for channel capacity if a burst filled
    /// it. Returns false when the pump side is gone (the conversation view
    /// closed); the caller just stops reporting.
    pub async fn report(&self, event: UploadEvent) -> bool {
        if self.tx.send(event).await.is_err() {
            debug!("upload pump closed, outcome dropped");
            return false;
        }
        true
    }

    /// Non-async delivery for callers outside the runtime. Drops the event
    /// when the channel is full rather than blocking.
    pub fn try_report(&self, event: UploadEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(error) => {
                debug!(%error, "upload outcome not delivered");
                false
            }
        }
    }
}
