//! UiStore - process-local UI flags, independent of server data.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub sidebar_open: bool,
    pub theme: Theme,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            sidebar_open: true,
            theme: Theme::default(),
        }
    }
}

/// Owned UI flag store. Subscribers are only woken by writes that change a flag.
#[derive(Debug)]
pub struct UiStore {
    state: watch::Sender<UiState>,
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

impl UiStore {
    pub fn new(initial: UiState) -> Self {
        let (state, _) = watch::channel(initial);
        UiStore { state }
    }

    pub fn snapshot(&self) -> UiState {
        *self.state.borrow()
    }

    pub fn sidebar_open(&self) -> bool {
        self.state.borrow().sidebar_open
    }

    pub fn toggle_sidebar(&self) {
        self.state.send_modify(|state| state.sidebar_open = !state.sidebar_open);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.sidebar_open != open;
            state.sidebar_open = open;
            changed
        });
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state.send_if_modified(|state| {
            let changed = state.theme != theme;
            state.theme = theme;
            changed
        });
    }

    /// Receiver that observes every change from now on.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }
}
