pub mod callbacks;
pub mod duplex;
pub mod loopback;
pub mod redirector;

use std::sync::Arc;

use crate::models::error::RedirectError;
use crate::models::state::{RedirectMode, RedirectState};
use crate::traits::redirect_observer::RedirectObserver;

/// State of one mode plus the observer to notify when it changes.
pub(crate) struct StateTracker {
    mode: RedirectMode,
    state: RedirectState,
    observer: Option<Arc<dyn RedirectObserver>>,
}

impl StateTracker {
    pub(crate) fn new(mode: RedirectMode) -> Self {
        Self {
            mode,
            state: RedirectState::Idle,
            observer: None,
        }
    }

    pub(crate) fn state(&self) -> RedirectState {
        self.state
    }

    pub(crate) fn set_observer(&mut self, observer: Option<Arc<dyn RedirectObserver>>) {
        self.observer = observer;
    }

    pub(crate) fn set(&mut self, new_state: RedirectState) {
        if self.state == new_state {
            return;
        }
        log::debug!("{} redirect: {} → {}", self.mode, self.state, new_state);
        self.state = new_state;
        if let Some(ref observer) = self.observer {
            observer.on_state_changed(self.mode, new_state);
        }
    }

    pub(crate) fn report(&self, error: &RedirectError) {
        if let Some(ref observer) = self.observer {
            observer.on_error(self.mode, error);
        }
    }
}
