use crate::models::error::RedirectError;
use crate::models::state::{RedirectMode, RedirectState};

/// Event sink for redirect session notifications.
///
/// Methods run synchronously on the thread that called into the
/// [`Redirector`](crate::Redirector), never on an audio thread.
/// Implementations should marshal to a UI thread if needed.
pub trait RedirectObserver: Send + Sync {
    /// Called on every state transition of either mode.
    fn on_state_changed(&self, mode: RedirectMode, state: RedirectState);

    /// Called when a start, stop, or volume operation fails, before the
    /// error is returned to the caller.
    fn on_error(&self, mode: RedirectMode, error: &RedirectError);
}
