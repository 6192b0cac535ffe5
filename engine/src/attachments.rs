//! Attachment store and per-attachment upload lifecycle.
//!
//! The store is the single writer for attachment records. Uploader outcomes
//! arrive asynchronously and may interleave arbitrarily with user edits, so
//! every transition is keyed by [`AttachmentId`] and tolerates targets that
//! no longer exist: a callback for a removed attachment is a silent no-op,
//! never an error, and never resurrects the record.

use tracing::debug;

use quill_types::{Attachment, AttachmentId, RemoteFileId, SourceKind, UploadEvent, UploadState};

#[derive(Debug, Clone)]
struct AttachmentRecord {
    id: AttachmentId,
    source: SourceKind,
    url: Option<String>,
    remote_file_id: Option<RemoteFileId>,
    state: UploadState,
}

impl AttachmentRecord {
    /// Legal to include in an outgoing payload: not failed, and not a local
    /// file that still lacks a durable reference.
    fn is_sendable(&self) -> bool {
        if self.state.is_failed() {
            return false;
        }
        !(self.source.is_local_file() && self.remote_file_id.is_none())
    }

    fn snapshot(&self) -> Attachment {
        Attachment {
            id: self.id,
            source: self.source.clone(),
            url: self.url.clone(),
            remote_file_id: self.remote_file_id.clone(),
            progress: self.state.progress(),
        }
    }
}

/// Owns the attachment list for one composer instance.
#[derive(Debug, Default)]
pub struct AttachmentStore {
    records: Vec<AttachmentRecord>,
    next_id: u64,
}

impl AttachmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new attachment in the queued state and return its id.
    /// Remote URLs carry their url immediately; local files get one from the
    /// uploader on success.
    pub fn add(&mut self, source: SourceKind) -> AttachmentId {
        let id = AttachmentId::new(self.next_id);
        self.next_id += 1;

        let url = match &source {
            SourceKind::RemoteUrl { url } => Some(url.clone()),
            SourceKind::LocalFile { .. } => None,
        };

        self.records.push(AttachmentRecord {
            id,
            source,
            url,
            remote_file_id: None,
            state: UploadState::Queued,
        });
        debug!(%id, "attachment queued");
        id
    }

    /// Remove regardless of state. Terminal: any upload outcome that arrives
    /// for this id afterwards is discarded by the lookup guard.
    pub fn remove(&mut self, id: AttachmentId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        let removed = self.records.len() != before;
        if removed {
            debug!(%id, "attachment removed");
        }
        removed
    }

    /// Re-enter the queue after a failure. Legal from the failed state only;
    /// returns whether the transition happened so the caller knows to
    /// re-drive the uploader.
    pub fn retry(&mut self, id: AttachmentId) -> bool {
        match self.record_mut(id) {
            Some(record) if record.state.is_failed() => {
                record.state = UploadState::Queued;
                debug!(%id, "attachment re-queued for retry");
                true
            }
            Some(_) | None => false,
        }
    }

    /// Drop every attachment. Invoked after a successful send.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn mark_uploading(&mut self, id: AttachmentId) {
        self.transition(id, "uploading", |record| {
            if matches!(record.state, UploadState::Queued) {
                record.state = UploadState::Uploading { percent: 0 };
                true
            } else {
                false
            }
        });
    }

    pub fn set_progress(&mut self, id: AttachmentId, percent: u8) {
        self.transition(id, "progress", |record| {
            if matches!(
                record.state,
                UploadState::Queued | UploadState::Uploading { .. }
            ) {
                record.state = UploadState::Uploading {
                    percent: percent.min(100),
                };
                true
            } else {
                false
            }
        });
    }

    pub fn mark_succeeded(&mut self, id: AttachmentId, remote_file_id: RemoteFileId, url: String) {
        self.transition(id, "succeeded", |record| {
            if record.state.is_pending() {
                record.state = UploadState::Succeeded;
                record.remote_file_id = Some(remote_file_id);
                record.url = Some(url);
                true
            } else {
                false
            }
        });
    }

    pub fn mark_failed(&mut self, id: AttachmentId) {
        self.transition(id, "failed", |record| {
            if record.state.is_pending() {
                record.state = UploadState::Failed;
                true
            } else {
                false
            }
        });
    }

    /// A remote-url attachment's image link loaded; it needs no stored id.
    pub fn link_load_succeeded(&mut self, id: AttachmentId) {
        self.transition(id, "link loaded", |record| {
            if record.state.is_pending() {
                record.state = UploadState::Succeeded;
                true
            } else {
                false
            }
        });
    }

    /// A remote-url attachment's image link failed to load; treated exactly
    /// like an upload failure, retry included.
    pub fn link_load_failed(&mut self, id: AttachmentId) {
        self.mark_failed(id);
    }

    /// Apply one asynchronous uploader outcome.
    pub fn apply_event(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Started { id } => self.mark_uploading(id),
            UploadEvent::Progress { id, percent } => self.set_progress(id, percent),
            UploadEvent::Succeeded {
                id,
                remote_file_id,
                url,
            } => self.mark_succeeded(id, remote_file_id, url),
            UploadEvent::Failed { id, error } => {
                debug!(%id, %error, "upload failed");
                self.mark_failed(id);
            }
            UploadEvent::LinkLoaded { id } => self.link_load_succeeded(id),
            UploadEvent::LinkFailed { id } => self.link_load_failed(id),
        }
    }

    /// True while any attachment is queued or uploading.
    #[must_use]
    pub fn is_any_pending(&self) -> bool {
        self.records.iter().any(|record| record.state.is_pending())
    }

    /// Any local file still waiting for its durable reference, failed
    /// uploads included. While one exists, a successful send leaves the tray
    /// (and the draft) in place.
    #[must_use]
    pub fn has_unsaved_local(&self) -> bool {
        self.records
            .iter()
            .any(|record| record.source.is_local_file() && record.remote_file_id.is_none())
    }

    /// Whether the tray already holds `limit` attachments.
    #[must_use]
    pub fn at_capacity(&self, limit: usize) -> bool {
        self.records.len() >= limit
    }

    #[must_use]
    pub fn has_sendable(&self) -> bool {
        self.records.iter().any(AttachmentRecord::is_sendable)
    }

    /// Snapshots of the attachments legal to include in a payload.
    #[must_use]
    pub fn sendable(&self) -> Vec<Attachment> {
        self.records
            .iter()
            .filter(|record| record.is_sendable())
            .map(AttachmentRecord::snapshot)
            .collect()
    }

    /// Snapshots of every attachment, for the display layer.
    #[must_use]
    pub fn all(&self) -> Vec<Attachment> {
        self.records.iter().map(AttachmentRecord::snapshot).collect()
    }

    #[must_use]
    pub fn state_of(&self, id: AttachmentId) -> Option<UploadState> {
        self.record(id).map(|record| record.state)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, id: AttachmentId) -> Option<&AttachmentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    fn record_mut(&mut self, id: AttachmentId) -> Option<&mut AttachmentRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Shared transition plumbing: look the record up by id, apply, and log
    /// discards. An absent record means the attachment was removed while the
    /// callback was in flight.
    fn transition(
        &mut self,
        id: AttachmentId,
        label: &'static str,
        apply: impl FnOnce(&mut AttachmentRecord) -> bool,
    ) {
        match self.record_mut(id) {
            Some(record) => {
                if !apply(record) {
                    debug!(%id, label, "transition ignored in current state");
                }
            }
            None => {
                debug!(%id, label, "stale callback for removed attachment discarded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AttachmentStore;
    use quill_types::{AttachmentId, RemoteFileId, SourceKind, UploadEvent, UploadState};

    fn local(name: &str) -> SourceKind {
        SourceKind::LocalFile { name: name.into() }
    }

    fn remote(url: &str) -> SourceKind {
        SourceKind::RemoteUrl { url: url.into() }
    }

    #[test]
    fn add_assigns_distinct_stable_ids() {
        let mut store = AttachmentStore::new();
        let a = store.add(local("a.png"));
        let b = store.add(local("b.png"));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remote_url_carries_url_immediately() {
        let mut store = AttachmentStore::new();
        let id = store.add(remote("https://example.com/x.png"));
        let snapshot = store.all().remove(0);
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.url.as_deref(), Some("https://example.com/x.png"));
    }

    #[test]
    fn success_after_removal_does_not_resurrect() {
        let mut store = AttachmentStore::new();
        let id = store.add(local("a.png"));
        store.mark_uploading(id);
        assert!(store.remove(id));

        store.mark_succeeded(id, RemoteFileId::new("f-1"), "https://cdn/x".into());
        assert!(store.is_empty());
        assert_eq!(store.state_of(id), None);
    }

    #[test]
    fn failure_after_removal_is_ignored() {
        let mut store = AttachmentStore::new();
        let id = store.add(local("a.png"));
        store.remove(id);
        store.mark_failed(id);
        assert!(store.is_empty());
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut store = AttachmentStore::new();
        store.add(local("a.png"));
        assert!(!store.remove(AttachmentId::new(99)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn retry_is_legal_only_from_failed() {
        let mut store = AttachmentStore::new();
        let id = store.add(local("a.png"));
        assert!(!store.retry(id));

        store.mark_uploading(id);
        assert!(!store.retry(id));

        store.mark_failed(id);
        assert!(store.retry(id));
        assert_eq!(store.state_of(id), Some(UploadState::Queued));
    }

    #[test]
    fn success_applies_url_and_remote_id() {
        let mut store = AttachmentStore::new();
        let id = store.add(local("a.png"));
        store.mark_uploading(id);
        store.set_progress(id, 60);
        assert_eq!(store.state_of(id), Some(UploadState::Uploading { percent: 60 }));

        store.mark_succeeded(id, RemoteFileId::new("f-9"), "https://cdn/a.png".into());
        let snapshot = store.all().remove(0);
        assert_eq!(snapshot.remote_file_id, Some(RemoteFileId::new("f-9")));
        assert_eq!(snapshot.url.as_deref(), Some("https://cdn/a.png"));
        assert!(!store.is_any_pending());
    }

    #[test]
    fn late_outcome_after_terminal_state_is_ignored() {
        let mut store = AttachmentStore::new();
        let id = store.add(local("a.png"));
        store.mark_uploading(id);
        store.mark_failed(id);

        // A slow success from the original attempt lands after the failure.
        store.mark_succeeded(id, RemoteFileId::new("f-1"), "https://cdn/x".into());
        assert_eq!(store.state_of(id), Some(UploadState::Failed));
    }

    #[test]
    fn local_without_remote_id_is_never_sendable() {
        let mut store = AttachmentStore::new();
        let pending = store.add(local("a.png"));
        store.mark_uploading(pending);
        let done = store.add(local("b.png"));
        store.mark_uploading(done);
        store.mark_succeeded(done, RemoteFileId::new("f-2"), "https://cdn/b.png".into());

        let sendable = store.sendable();
        assert_eq!(sendable.len(), 1);
        assert_eq!(sendable[0].id, done);
        assert!(store.has_unsaved_local());
    }

    #[test]
    fn remote_url_is_sendable_unless_failed() {
        let mut store = AttachmentStore::new();
        let id = store.add(remote("https://example.com/x.png"));
        assert!(store.has_sendable());

        store.link_load_failed(id);
        assert!(!store.has_sendable());

        assert!(store.retry(id));
        assert!(store.has_sendable());
    }

    #[test]
    fn apply_event_routes_to_transitions() {
        let mut store = AttachmentStore::new();
        let id = store.add(local("a.png"));
        store.apply_event(UploadEvent::Started { id });
        store.apply_event(UploadEvent::Progress { id, percent: 30 });
        assert_eq!(store.state_of(id), Some(UploadState::Uploading { percent: 30 }));

        store.apply_event(UploadEvent::Succeeded {
            id,
            remote_file_id: RemoteFileId::new("f-3"),
            url: "https://cdn/a.png".into(),
        });
        assert_eq!(store.state_of(id), Some(UploadState::Succeeded));
    }

    #[test]
    fn clear_empties_the_tray() {
        let mut store = AttachmentStore::new();
        store.add(local("a.png"));
        store.add(remote("https://example.com/b.png"));
        store.clear();
        assert!(store.is_empty());
        assert!(!store.is_any_pending());
    }
}
