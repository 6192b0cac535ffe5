//! Host-facing composer options.
//!
//! Hosts embed a `[composer]` table in their own configuration file and hand
//! the parsed result to [`crate::Composer`] at construction. Everything has a
//! permissive default so an absent table is valid.

use serde::Deserialize;
use thiserror::Error;

/// Attachments allowed on one message when the host does not say otherwise.
pub const DEFAULT_ATTACHMENT_LIMIT: usize = 3;

// Default value function for serde (usize::default() is 0, which would
// disable attachments entirely)
const fn default_attachment_limit() -> usize {
    DEFAULT_ATTACHMENT_LIMIT
}

/// Static composer settings supplied by the host for one conversation view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComposerOptions {
    /// Whether image attachments are available at all.
    #[serde(default)]
    pub vision_enabled: bool,
    /// Maximum number of attachments on one outgoing message.
    #[serde(default = "default_attachment_limit")]
    pub attachment_limit: usize,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            vision_enabled: false,
            attachment_limit: DEFAULT_ATTACHMENT_LIMIT,
        }
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid composer options: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

impl ComposerOptions {
    /// Parse options from a TOML fragment, e.g. the `[composer]` table body
    /// of a host config file.
    pub fn from_toml_str(raw: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(raw)?)
    }
}
