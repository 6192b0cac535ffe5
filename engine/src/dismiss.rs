//! Dismiss-on-outside-interaction.
//!
//! Both the parameter selector and the host's options menu close when the
//! user interacts anywhere outside them. The capability is one registry the
//! host feeds global pointer presses into, plus per-surface registrations
//! scoped to the surface's mounted lifetime: dropping the guard tears the
//! watcher down.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identity of one registered watcher, used by the host's hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Watcher {
    id: WatchId,
    /// Taken out while the callback runs so a callback may re-enter the
    /// registry (register, drop a guard) without re-borrow panics.
    on_close: Option<Box<dyn FnMut()>>,
}

#[derive(Default)]
struct Inner {
    watchers: Vec<Watcher>,
    next_id: u64,
}

/// Registry of open surfaces watching for outside interactions.
#[derive(Default)]
pub struct DismissRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl DismissRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a close callback for a surface. The watcher lives until the
    /// returned guard is dropped.
    #[must_use]
    pub fn register(&self, on_close: impl FnMut() + 'static) -> DismissGuard {
        let mut inner = self.inner.borrow_mut();
        let id = WatchId(inner.next_id);
        inner.next_id += 1;
        inner.watchers.push(Watcher {
            id,
            on_close: Some(Box::new(on_close)),
        });
        DismissGuard {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Fan one global pointer press out to the watchers. `hit` answers
    /// whether the press landed inside the given watcher's region; every
    /// watcher it misses has its close callback invoked once.
    pub fn pointer_down(&self, hit: impl Fn(WatchId) -> bool) {
        let ids: Vec<WatchId> = self
            .inner
            .borrow()
            .watchers
            .iter()
            .map(|watcher| watcher.id)
            .collect();

        for id in ids {
            if hit(id) {
                continue;
            }
            // Check the callback out, run it unborrowed, put it back if the
            // watcher still exists.
            let callback = self
                .inner
                .borrow_mut()
                .watchers
                .iter_mut()
                .find(|watcher| watcher.id == id)
                .and_then(|watcher| watcher.on_close.take());
            if let Some(mut callback) = callback {
                callback();
                if let Some(watcher) = self
                    .inner
                    .borrow_mut()
                    .watchers
                    .iter_mut()
                    .find(|watcher| watcher.id == id)
                {
                    watcher.on_close = Some(callback);
                }
            }
        }
    }

    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.inner.borrow().watchers.len()
    }
}

impl fmt::Debug for DismissRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissRegistry")
            .field("watchers", &self.watcher_count())
            .finish()
    }
}

/// Scoped registration: dropping unregisters the watcher.
pub struct DismissGuard {
    inner: Weak<RefCell<Inner>>,
    id: WatchId,
}

impl DismissGuard {
    #[must_use]
    pub fn id(&self) -> WatchId {
        self.id
    }
}

impl Drop for DismissGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .borrow_mut()
                .watchers
                .retain(|watcher| watcher.id != self.id);
        }
    }
}

impl fmt::Debug for DismissGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissGuard").field("id", &self.id).finish()
    }
}
