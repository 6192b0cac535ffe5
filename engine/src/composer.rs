//! The composer state machine: draft text semantics, submit gating, and the
//! glue between the attachment store, the parameter selector, and the send
//! coordinator.

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use quill_types::{
    Attachment, AttachmentId, DispatchError, InputEvent, Key, Notice, PromptOption, SelectorError,
    SourceKind, UploadEvent, ValidationError,
};

use crate::attachments::AttachmentStore;
use crate::config::ComposerOptions;
use crate::dispatch::{self, OutgoingMessage, Sender};
use crate::host::{Host, NoticeSink, Uploader};
use crate::pump::UploadPump;
use crate::selector::ParameterSelector;

/// The draft text buffer.
///
/// The input control owns editing and cursor movement; this buffer mirrors
/// the control's value through unconditional overwrites and owns only the
/// semantics the controller needs (trailing-newline stripping, trimming,
/// the visible character count).
#[derive(Debug, Default, Clone)]
pub struct DraftBuffer {
    text: String,
}

impl DraftBuffer {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Drop one trailing newline, if present. The input control may have
    /// already inserted it by the time a bare Enter key-down is observed.
    pub fn strip_trailing_newline(&mut self) {
        if self.text.ends_with('\n') {
            self.text.pop();
        }
    }

    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// Grapheme count of the trimmed text, for the counter next to the send
    /// control.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.trimmed().graphemes(true).count()
    }
}

/// What one input event asked the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum KeyOutcome {
    /// Nothing beyond internal bookkeeping.
    Inert,
    /// Suppress the control's default handling (newline insertion).
    SuppressDefault,
    /// A send attempt is due.
    Submit,
}

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SendOutcome {
    Sent,
    /// The gate refused; a notice was emitted, nothing else changed.
    Rejected(ValidationError),
    /// The sender refused; the error is the sender's, untouched. Draft and
    /// attachments are left in place.
    Failed(DispatchError),
}

/// Reaction to one input event routed through [`Composer::handle_event`].
#[derive(Debug)]
#[must_use]
pub struct EventReaction {
    /// Whether the host should suppress the control's default handling.
    pub suppress_default: bool,
    /// Present when the event triggered a send attempt.
    pub send: Option<SendOutcome>,
}

/// Read-only view handed to the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerSnapshot {
    pub text: String,
    pub char_count: usize,
    pub attachments: Vec<Attachment>,
    pub can_send: bool,
    pub parameter: Option<ParameterView>,
}

/// Selector portion of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterView {
    pub selected: String,
    pub options: Vec<String>,
    pub open: bool,
}

/// One conversation view's composition state.
///
/// Single-threaded and event-driven: every mutation happens on a discrete
/// event delivered by the host (user input, uploader outcome, host polling).
/// The store is the only writer of attachment records and the composer the
/// only writer of the draft.
#[derive(Debug)]
pub struct Composer {
    draft: DraftBuffer,
    attachments: AttachmentStore,
    selector: Option<ParameterSelector>,
    options: ComposerOptions,
    /// IME state sampled at the most recent key-down. A composition-
    /// confirming Enter must not send, and the key-up that follows it
    /// consults this flag rather than re-sampling.
    composing_at_key_down: bool,
    last_clear_signal: u64,
}

impl Composer {
    #[must_use]
    pub fn new(
        options: ComposerOptions,
        prompt_options: &[PromptOption],
        default_parameter: Option<&str>,
    ) -> Self {
        Self {
            draft: DraftBuffer::default(),
            attachments: AttachmentStore::new(),
            selector: ParameterSelector::from_prompt_options(prompt_options, default_parameter),
            options,
            composing_at_key_down: false,
            last_clear_signal: 0,
        }
    }

    // ------------------------------------------------------------------
    // Input events
    // ------------------------------------------------------------------

    /// Apply one input event to local state without attempting a send.
    ///
    /// [`KeyOutcome::Submit`] tells the caller a send attempt is due; hosts
    /// that use [`Self::handle_event`] get that wired up already.
    pub fn apply_event(&mut self, event: &InputEvent) -> KeyOutcome {
        match event {
            InputEvent::TextChanged { text } => {
                self.draft.set_text(text.clone());
                KeyOutcome::Inert
            }
            InputEvent::KeyDown {
                key,
                shift,
                composing,
            } => {
                // Recorded before any other handling: the key-up decides on
                // the state at key-down time, not its own.
                self.composing_at_key_down = *composing;
                if *key == Key::Enter && !shift {
                    self.draft.strip_trailing_newline();
                    KeyOutcome::SuppressDefault
                } else {
                    KeyOutcome::Inert
                }
            }
            InputEvent::KeyUp { key, shift } => {
                if *key == Key::Enter && !shift && !self.composing_at_key_down {
                    KeyOutcome::Submit
                } else {
                    KeyOutcome::Inert
                }
            }
            InputEvent::Blur => {
                self.composing_at_key_down = false;
                KeyOutcome::Inert
            }
        }
    }

    /// Apply one input event and run the send attempt it may trigger.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        host: &dyn Host,
        sender: &mut dyn Sender,
        notices: &mut dyn NoticeSink,
    ) -> EventReaction {
        match self.apply_event(event) {
            KeyOutcome::Inert => EventReaction {
                suppress_default: false,
                send: None,
            },
            KeyOutcome::SuppressDefault => EventReaction {
                suppress_default: true,
                send: None,
            },
            KeyOutcome::Submit => EventReaction {
                suppress_default: true,
                send: Some(self.send(host, sender, notices)),
            },
        }
    }

    /// Unconditional overwrite of the draft buffer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.set_text(text);
    }

    /// Observe the host's clear signal; any change forces the draft empty,
    /// independent of current content.
    pub fn observe_clear_signal(&mut self, token: u64) {
        if token != self.last_clear_signal {
            self.last_clear_signal = token;
            self.draft.clear();
        }
    }

    /// One per-turn poll of host-owned state.
    pub fn poll_host(&mut self, host: &dyn Host) {
        self.observe_clear_signal(host.clear_signal());
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// The composite send gate. Consulted fresh on every attempt; the host
    /// predicate covers busy states the composer does not track, including
    /// an earlier dispatch still in flight.
    pub fn can_send(&self, host: &dyn Host) -> Result<(), ValidationError> {
        if self.draft.is_blank() && !self.attachments.has_sendable() {
            return Err(ValidationError::EmptyMessage);
        }
        if !host.can_send_now() {
            return Err(ValidationError::Unavailable);
        }
        Ok(())
    }

    /// Attempt to send the current draft.
    ///
    /// A gate refusal emits exactly one notice and has no other side
    /// effects. Otherwise the payload is assembled (trimmed text, sendable
    /// attachments, current parameter) and handed to the coordinator, which
    /// applies the post-dispatch cleanup rules.
    pub fn send(
        &mut self,
        host: &dyn Host,
        sender: &mut dyn Sender,
        notices: &mut dyn NoticeSink,
    ) -> SendOutcome {
        if let Err(reason) = self.can_send(host) {
            notices.notify(Notice::error(reason.to_string()));
            return SendOutcome::Rejected(reason);
        }

        let message = OutgoingMessage {
            text: self.draft.trimmed().to_string(),
            attachments: self.attachments.sendable(),
            parameter: self
                .selector
                .as_ref()
                .map(|selector| selector.selected().to_string()),
        };

        let responding = host.is_responding();
        match dispatch::dispatch(
            &message,
            sender,
            &mut self.attachments,
            &mut self.draft,
            responding,
        ) {
            Ok(()) => {
                debug!(
                    attachments = message.attachments.len(),
                    responding, "message dispatched"
                );
                SendOutcome::Sent
            }
            Err(error) => SendOutcome::Failed(error),
        }
    }

    // ------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------

    /// Add an attachment and start its upload or link validation. Refusals
    /// (vision disabled, tray full) surface as notices and return `None`.
    pub fn add_attachment(
        &mut self,
        source: SourceKind,
        uploader: &mut dyn Uploader,
        notices: &mut dyn NoticeSink,
    ) -> Option<AttachmentId> {
        if !self.options.vision_enabled {
            notices.notify(Notice::error(
                ValidationError::AttachmentsDisabled.to_string(),
            ));
            return None;
        }
        if self.attachments.at_capacity(self.options.attachment_limit) {
            let limit = self.options.attachment_limit;
            notices.notify(Notice::error(
                ValidationError::AttachmentLimit { limit }.to_string(),
            ));
            return None;
        }

        let id = self.attachments.add(source.clone());
        match &source {
            SourceKind::LocalFile { .. } => uploader.begin_upload(id, &source),
            SourceKind::RemoteUrl { url } => uploader.validate_link(id, url),
        }
        Some(id)
    }

    /// Remove regardless of upload state; in-flight outcomes for the id are
    /// discarded from here on.
    pub fn remove_attachment(&mut self, id: AttachmentId) {
        self.attachments.remove(id);
    }

    /// Retry a failed upload. No-op unless the attachment is in the failed
    /// state.
    pub fn retry_attachment(&mut self, id: AttachmentId, uploader: &mut dyn Uploader) {
        if self.attachments.retry(id) {
            uploader.retry_upload(id);
        }
    }

    /// Apply one uploader outcome directly (hosts without the pump).
    pub fn apply_upload_event(&mut self, event: UploadEvent) {
        self.attachments.apply_event(event);
    }

    /// Drain pending uploader outcomes from the pump, bounded per turn.
    pub fn drain_uploads(&mut self, pump: &mut UploadPump) -> usize {
        pump.drain_into(&mut self.attachments)
    }

    // ------------------------------------------------------------------
    // Parameter selector
    // ------------------------------------------------------------------

    /// Explicit user selection of a runtime parameter value.
    pub fn select_parameter(&mut self, value: &str) -> Result<(), SelectorError> {
        match self.selector.as_mut() {
            Some(selector) => selector.select(value),
            None => Err(SelectorError {
                value: value.to_string(),
            }),
        }
    }

    /// The caller's default changed (e.g. conversation switch); reset the
    /// selection to it.
    pub fn sync_parameter_default(&mut self, default: &str) {
        if let Some(selector) = self.selector.as_mut() {
            selector.sync_default(default);
        }
    }

    pub fn toggle_parameter_menu(&mut self) {
        if let Some(selector) = self.selector.as_mut() {
            selector.toggle_open();
        }
    }

    pub fn close_parameter_menu(&mut self) {
        if let Some(selector) = self.selector.as_mut() {
            selector.close();
        }
    }

    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.selector.as_ref().map(ParameterSelector::selected)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn draft_text(&self) -> &str {
        self.draft.text()
    }

    #[must_use]
    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Everything the display layer renders, in one copy.
    #[must_use]
    pub fn snapshot(&self, host: &dyn Host) -> ComposerSnapshot {
        ComposerSnapshot {
            text: self.draft.text().to_string(),
            char_count: self.draft.char_count(),
            attachments: self.attachments.all(),
            can_send: self.can_send(host).is_ok(),
            parameter: self.selector.as_ref().map(|selector| ParameterView {
                selected: selector.selected().to_string(),
                options: selector.options().to_vec(),
                open: selector.is_open(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DraftBuffer;

    #[test]
    fn strip_removes_exactly_one_trailing_newline() {
        let mut draft = DraftBuffer::default();
        draft.set_text("hello\n\n");
        draft.strip_trailing_newline();
        assert_eq!(draft.text(), "hello\n");
        draft.strip_trailing_newline();
        assert_eq!(draft.text(), "hello");
        draft.strip_trailing_newline();
        assert_eq!(draft.text(), "hello");
    }

    #[test]
    fn char_count_ignores_surrounding_whitespace() {
        let mut draft = DraftBuffer::default();
        draft.set_text("  hello  ");
        assert_eq!(draft.char_count(), 5);
    }

    #[test]
    fn char_count_is_grapheme_aware() {
        let mut draft = DraftBuffer::default();
        draft.set_text("e\u{301}x");
        assert_eq!(draft.char_count(), 2);
    }

    #[test]
    fn blank_means_whitespace_only() {
        let mut draft = DraftBuffer::default();
        draft.set_text(" \n\t ");
        assert!(draft.is_blank());
        draft.set_text(" a ");
        assert!(!draft.is_blank());
    }
}
