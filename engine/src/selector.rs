//! Runtime parameter selector: a closed single-choice control bound to a
//! host-supplied option list.

use tracing::warn;

use quill_types::{PromptOption, SelectorError};

/// Selection state for the runtime parameter.
///
/// Invariant: `selected` is always a member of `options`, which is non-empty.
/// The open flag is purely presentational; closing on outside interaction is
/// wired through [`crate::DismissRegistry`] by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSelector {
    options: Vec<String>,
    selected: String,
    open: bool,
}

impl ParameterSelector {
    /// Build a selector over `options`, or `None` when there is nothing to
    /// choose from. A default outside the option list falls back to the
    /// first option.
    #[must_use]
    pub fn new(options: Vec<String>, default: Option<&str>) -> Option<Self> {
        let first = options.first()?.clone();
        let selected = match default {
            Some(value) if options.iter().any(|option| option == value) => value.to_string(),
            Some(value) => {
                warn!(value, "default parameter not in option list, using first option");
                first
            }
            None => first,
        };
        Some(Self {
            options,
            selected,
            open: false,
        })
    }

    /// Build from the host's prompt configuration: the first enumerated
    /// choice entry backs the selector.
    #[must_use]
    pub fn from_prompt_options(
        prompt_options: &[PromptOption],
        default: Option<&str>,
    ) -> Option<Self> {
        let entry = PromptOption::first_select(prompt_options)?;
        Self::new(entry.options.clone(), default)
    }

    /// Explicit user selection. Closes the menu on success.
    pub fn select(&mut self, value: &str) -> Result<(), SelectorError> {
        if !self.options.iter().any(|option| option == value) {
            return Err(SelectorError {
                value: value.to_string(),
            });
        }
        self.selected = value.to_string();
        self.open = false;
        Ok(())
    }

    /// Re-synchronize to a new caller default, overriding any prior user
    /// selection. An explicit reset, not a merge; unknown defaults are
    /// ignored so the closed-choice invariant holds.
    pub fn sync_default(&mut self, default: &str) {
        if self.options.iter().any(|option| option == default) {
            self.selected = default.to_string();
        } else {
            warn!(default, "ignoring default parameter not in option list");
        }
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn selected(&self) -> &str {
        &self.selected
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::ParameterSelector;
    use quill_types::{PromptOption, PromptOptionKind};

    fn selector() -> ParameterSelector {
        ParameterSelector::new(vec!["A".into(), "B".into()], Some("A")).expect("two options")
    }

    #[test]
    fn empty_option_list_yields_no_selector() {
        assert!(ParameterSelector::new(vec![], Some("A")).is_none());
    }

    #[test]
    fn missing_default_falls_back_to_first_option() {
        let selector = ParameterSelector::new(vec!["A".into(), "B".into()], None).expect("some");
        assert_eq!(selector.selected(), "A");
    }

    #[test]
    fn unlisted_default_falls_back_to_first_option() {
        let selector = ParameterSelector::new(vec!["A".into(), "B".into()], Some("Z")).expect("some");
        assert_eq!(selector.selected(), "A");
    }

    #[test]
    fn select_rejects_unknown_value_without_state_change() {
        let mut selector = selector();
        assert!(selector.select("C").is_err());
        assert_eq!(selector.selected(), "A");
    }

    #[test]
    fn select_updates_and_closes_menu() {
        let mut selector = selector();
        selector.toggle_open();
        assert!(selector.is_open());

        selector.select("B").expect("known option");
        assert_eq!(selector.selected(), "B");
        assert!(!selector.is_open());
    }

    #[test]
    fn sync_default_overrides_user_selection() {
        let mut selector = selector();
        selector.select("B").expect("known option");
        selector.sync_default("A");
        assert_eq!(selector.selected(), "A");
    }

    #[test]
    fn sync_default_ignores_unknown_value() {
        let mut selector = selector();
        selector.select("B").expect("known option");
        selector.sync_default("Z");
        assert_eq!(selector.selected(), "B");
    }

    #[test]
    fn built_from_first_select_prompt_entry() {
        let prompt_options = vec![
            PromptOption {
                name: "topic".into(),
                kind: PromptOptionKind::String,
                options: vec![],
            },
            PromptOption {
                name: "model".into(),
                kind: PromptOptionKind::Select,
                options: vec!["fast".into(), "thorough".into()],
            },
        ];
        let selector = ParameterSelector::from_prompt_options(&prompt_options, Some("thorough"))
            .expect("select entry present");
        assert_eq!(selector.selected(), "thorough");
        assert_eq!(selector.options().len(), 2);
    }

    #[test]
    fn no_select_entry_means_no_selector() {
        let prompt_options = vec![PromptOption {
            name: "topic".into(),
            kind: PromptOptionKind::Paragraph,
            options: vec![],
        }];
        assert!(ParameterSelector::from_prompt_options(&prompt_options, None).is_none());
    }
}
