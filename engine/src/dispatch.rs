//! Send coordination: payload assembly handed to the external sender, and
//! the post-dispatch cleanup rules.

use quill_types::{Attachment, DispatchError};

use crate::attachments::AttachmentStore;
use crate::composer::DraftBuffer;

/// The assembled outgoing message. Constructed only behind the send gate;
/// holding one means validation already passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Trimmed draft text. May be empty for an image-only message.
    pub text: String,
    /// Sendable attachments only. Local files without a durable reference
    /// were dropped during assembly.
    pub attachments: Vec<Attachment>,
    /// The selected runtime parameter, when the host configured one.
    pub parameter: Option<String>,
}

/// The external send capability.
///
/// No retry lives on either side of this seam: a failure is surfaced to the
/// caller exactly as the sender produced it.
pub trait Sender {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), DispatchError>;
}

/// Hand the message to the sender and apply the post-dispatch cleanup.
///
/// Cleanup only runs while no local-file attachment is still missing its
/// stored id: such an attachment was dropped from this payload but stays in
/// the tray (and keeps the draft) so the user can resend once it lands. The
/// draft additionally survives while a response is streaming, so the user
/// can queue edits against the next turn.
pub(crate) fn dispatch(
    message: &OutgoingMessage,
    sender: &mut dyn Sender,
    attachments: &mut AttachmentStore,
    draft: &mut DraftBuffer,
    responding: bool,
) -> Result<(), DispatchError> {
    sender.send(message)?;

    if !attachments.has_unsaved_local() {
        if !attachments.is_empty() {
            attachments.clear();
        }
        if !responding {
            draft.clear();
        }
    }

    Ok(())
}
