//! Process-wide theme mode.
//!
//! The options menu offers system/light/dark. The mode is owned by one
//! explicitly initialized state value with subscriptions, not a module-level
//! mutable; teardown is dropping the handles.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ThemeMode::System => "System",
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
        }
    }
}

/// Owning handle for the theme mode. Usually created once at startup and
/// shared with whatever surface offers the toggle.
#[derive(Debug)]
pub struct ThemeState {
    tx: watch::Sender<ThemeMode>,
}

impl ThemeState {
    #[must_use]
    pub fn init() -> Self {
        let (tx, _rx) = watch::channel(ThemeMode::default());
        Self { tx }
    }

    pub fn set(&self, mode: ThemeMode) {
        self.tx.send_replace(mode);
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> ThemeSubscription {
        ThemeSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// One observer of the theme mode. Dropping it is the teardown.
#[derive(Debug, Clone)]
pub struct ThemeSubscription {
    rx: watch::Receiver<ThemeMode>,
}

impl ThemeSubscription {
    #[must_use]
    pub fn current(&self) -> ThemeMode {
        *self.rx.borrow()
    }

    /// Wait for the next change. `None` once the owning state is gone.
    pub async fn changed(&mut self) -> Option<ThemeMode> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::{ThemeMode, ThemeState};

    #[test]
    fn defaults_to_system() {
        let theme = ThemeState::init();
        assert_eq!(theme.mode(), ThemeMode::System);
        assert_eq!(theme.mode().label(), "System");
    }

    #[tokio::test]
    async fn subscribers_observe_set() {
        let theme = ThemeState::init();
        let mut subscription = theme.subscribe();
        assert_eq!(subscription.current(), ThemeMode::System);

        theme.set(ThemeMode::Dark);
        assert_eq!(subscription.changed().await, Some(ThemeMode::Dark));
        assert_eq!(subscription.current(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn subscription_ends_when_state_is_torn_down() {
        let theme = ThemeState::init();
        let mut subscription = theme.subscribe();
        drop(theme);
        assert_eq!(subscription.changed().await, None);
    }
}
