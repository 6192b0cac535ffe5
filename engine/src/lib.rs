//! Composer and attachment lifecycle controller.
//!
//! One [`Composer`] instance owns the composition state of one conversation
//! view: the draft text and its submit semantics (Enter sends, Shift+Enter
//! breaks the line, a composition-confirming Enter does neither), the
//! attachment tray with its per-item upload lifecycle, the runtime parameter
//! selector, and the gate that decides whether a send is currently legal.
//!
//! The controller is headless and toolkit-agnostic. Hosts adapt their UI
//! events into [`quill_types::InputEvent`]s, implement the collaborator
//! seams ([`Host`], [`Sender`], [`Uploader`], [`NoticeSink`]), and render
//! from [`ComposerSnapshot`]s. All state is ephemeral; nothing survives the
//! conversation view.

mod attachments;
mod composer;
mod config;
mod dismiss;
mod dispatch;
mod host;
mod pump;
mod selector;
mod theme;

pub use attachments::AttachmentStore;
pub use composer::{
    Composer, ComposerSnapshot, DraftBuffer, EventReaction, KeyOutcome, ParameterView, SendOutcome,
};
pub use config::{ComposerOptions, DEFAULT_ATTACHMENT_LIMIT, OptionsError};
pub use dismiss::{DismissGuard, DismissRegistry, WatchId};
pub use dispatch::{OutgoingMessage, Sender};
pub use host::{Host, NoticeSink, Uploader};
pub use pump::{MAX_EVENTS_PER_TURN, UploadPump, UploadReporter};
pub use selector::ParameterSelector;
pub use theme::{ThemeMode, ThemeState, ThemeSubscription};
