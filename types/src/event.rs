//! Event vocabulary crossing the controller boundary.
//!
//! The host adapts whatever its UI toolkit emits into [`InputEvent`]s and
//! whatever its uploader reports into [`UploadEvent`]s. The controller never
//! sees toolkit event types; these unions carry only the fields it consumes.

use serde::{Deserialize, Serialize};

use crate::{AttachmentId, RemoteFileId, UploadError};

/// The only key the controller distinguishes. Character input reaches the
/// draft through [`InputEvent::TextChanged`], not through key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Other,
}

/// One discrete input-surface event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum InputEvent {
    /// The input control's buffer changed; `text` is the full new value.
    TextChanged { text: String },
    /// A key went down. `composing` reports whether an IME composition
    /// session was active when the key was pressed.
    KeyDown { key: Key, shift: bool, composing: bool },
    /// A key came up. IME state is not sampled here; the controller uses the
    /// flag recorded at key-down time.
    KeyUp { key: Key, shift: bool },
    /// The input control lost focus.
    Blur,
}

/// Outcome of one upload-lifecycle step, delivered asynchronously by the
/// host's uploader and applied to the attachment store on the controller's
/// thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started {
        id: AttachmentId,
    },
    Progress {
        id: AttachmentId,
        percent: u8,
    },
    Succeeded {
        id: AttachmentId,
        remote_file_id: RemoteFileId,
        url: String,
    },
    Failed {
        id: AttachmentId,
        error: UploadError,
    },
    /// A remote-url attachment's image link finished loading.
    LinkLoaded {
        id: AttachmentId,
    },
    /// A remote-url attachment's image link could not be loaded.
    LinkFailed {
        id: AttachmentId,
    },
}

impl UploadEvent {
    /// The attachment this event targets. Used by the store's stale-callback
    /// guard: events for unknown ids are discarded.
    #[must_use]
    pub fn attachment_id(&self) -> AttachmentId {
        match self {
            UploadEvent::Started { id }
            | UploadEvent::Progress { id, .. }
            | UploadEvent::Succeeded { id, .. }
            | UploadEvent::Failed { id, .. }
            | UploadEvent::LinkLoaded { id }
            | UploadEvent::LinkFailed { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InputEvent, Key, UploadEvent};
    use crate::{AttachmentId, UploadError};

    #[test]
    fn input_event_deserializes_captured_stream() {
        let event: InputEvent = serde_json::from_str(
            r#"{"event": "key_down", "key": "enter", "shift": false, "composing": true}"#,
        )
        .expect("valid event");
        assert_eq!(
            event,
            InputEvent::KeyDown {
                key: Key::Enter,
                shift: false,
                composing: true,
            }
        );
    }

    #[test]
    fn upload_event_exposes_target_id() {
        let id = AttachmentId::new(7);
        let event = UploadEvent::Failed {
            id,
            error: UploadError::new("413"),
        };
        assert_eq!(event.attachment_id(), id);
    }
}
