//! Core domain types for Quill.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the controller
//! or its host.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod event;
pub use event::{InputEvent, Key, UploadEvent};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Identity of an attachment, assigned by the store at creation.
///
/// Stable for the attachment's whole lifetime and independent of upload
/// outcome: a failed or retried upload keeps its id, and async results are
/// matched against it (never against list position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(u64);

impl AttachmentId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable reference handed out by the upload service once a local file has
/// been stored. Absence means "not yet durably stored".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteFileId(String);

impl RemoteFileId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Attachment Model
// ============================================================================

/// Where an attachment's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SourceKind {
    /// A file picked on the user's machine; must be uploaded before it can
    /// travel in a message.
    LocalFile { name: String },
    /// A URL pasted or dropped in; usable as-is once the link loads.
    RemoteUrl { url: String },
}

impl SourceKind {
    #[must_use]
    pub fn is_local_file(&self) -> bool {
        matches!(self, SourceKind::LocalFile { .. })
    }
}

/// Per-attachment upload state machine.
///
/// ```text
/// Queued -> Uploading -> Succeeded
///                    \-> Failed -> Queued (retry)
/// ```
/// Removal is terminal from any state and is modeled by the record leaving
/// the store, not by a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum UploadState {
    Queued,
    Uploading { percent: u8 },
    Succeeded,
    Failed,
}

impl UploadState {
    /// True while the uploader still owes us an outcome.
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, UploadState::Queued | UploadState::Uploading { .. })
    }

    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, UploadState::Failed)
    }

    /// Progress as shown to the user.
    #[must_use]
    pub fn progress(self) -> UploadProgress {
        match self {
            UploadState::Queued => UploadProgress::Percent(0),
            UploadState::Uploading { percent } => UploadProgress::Percent(percent.min(100)),
            UploadState::Succeeded => UploadProgress::Percent(100),
            UploadState::Failed => UploadProgress::Failed,
        }
    }
}

/// Display-facing upload progress. The failed case is a tagged variant, not
/// a `-1` sentinel smuggled through an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "progress", content = "percent")]
pub enum UploadProgress {
    Percent(u8),
    Failed,
}

/// Snapshot of one attachment as the display layer and the outgoing payload
/// see it. Owned records live in the store; this is a value copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub source: SourceKind,
    /// Present once available: immediately for remote URLs, after upload for
    /// local files.
    pub url: Option<String>,
    pub remote_file_id: Option<RemoteFileId>,
    pub progress: UploadProgress,
}

// ============================================================================
// Notices
// ============================================================================

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Error,
    Info,
}

/// A user-visible message routed through the host's notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

// ============================================================================
// Prompt Options
// ============================================================================

/// Kind of a host-supplied prompt variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptOptionKind {
    String,
    Paragraph,
    Number,
    Select,
}

/// One prompt variable from the host's prompt configuration. The controller
/// only ever consumes the first `Select` entry; the rest belong to other
/// surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PromptOptionKind,
    #[serde(default)]
    pub options: Vec<String>,
}

impl PromptOption {
    /// The entry that backs the runtime parameter selector, if any.
    #[must_use]
    pub fn first_select(options: &[PromptOption]) -> Option<&PromptOption> {
        options
            .iter()
            .find(|option| option.kind == PromptOptionKind::Select)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a send attempt was refused before reaching the sender.
///
/// Non-fatal: surfaced as a notice, the user corrects and retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Cannot send right now")]
    Unavailable,
    #[error("Attachment limit reached ({limit})")]
    AttachmentLimit { limit: usize },
    #[error("Image attachments are disabled")]
    AttachmentsDisabled,
}

/// A per-attachment upload failure reported by the uploader.
///
/// Never fatal to the composer: the attachment lands in the failed state
/// with a user-triggerable retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upload failed: {message}")]
pub struct UploadError {
    pub message: String,
}

impl UploadError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external sender rejected a dispatched message.
///
/// The controller propagates this untouched; transport-level retry is the
/// sender's concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DispatchError {
    pub message: String,
}

impl DispatchError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A value outside the configured option list was offered to the selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parameter option: {value}")]
pub struct SelectorError {
    pub value: String,
}
