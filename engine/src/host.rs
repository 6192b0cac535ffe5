//! Seams toward the embedding host.
//!
//! The controller never reaches into its host; everything it consumes comes
//! through these traits. Hosts implement them over whatever they already
//! have (a view-model, a session handle, a toast surface).

use quill_types::{AttachmentId, Notice, SourceKind};

/// Conversation-level state the controller consults but does not own.
pub trait Host {
    /// True while a response to an earlier message is still streaming.
    fn is_responding(&self) -> bool;

    /// Whether a send is currently allowed. Consulted fresh on every send
    /// attempt; the controller never caches the answer. This is also how
    /// overlapping sends are refused, since the controller holds no queue.
    fn can_send_now(&self) -> bool;

    /// Monotonically increasing token; any observed change forces the draft
    /// buffer empty (e.g. on conversation switch).
    fn clear_signal(&self) -> u64;
}

/// User-visible notification surface.
pub trait NoticeSink {
    fn notify(&mut self, notice: Notice);
}

/// The upload capability. Invocations are fire-and-forget; outcomes come
/// back as [`quill_types::UploadEvent`]s through the upload pump.
pub trait Uploader {
    /// Start uploading a freshly added local file.
    fn begin_upload(&mut self, id: AttachmentId, source: &SourceKind);

    /// Re-drive the upload for an attachment that re-entered the queue.
    fn retry_upload(&mut self, id: AttachmentId);

    /// Check that a remote-url attachment's link actually loads.
    fn validate_link(&mut self, id: AttachmentId, url: &str);
}
