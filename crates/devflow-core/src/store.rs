//! The in-memory store
//!
//! Holds the current [`AppState`] snapshot. `dispatch` runs the reducer under
//! the write lock, so reducer applications never interleave, and publishes the
//! new snapshot to subscribers. Snapshots handed out earlier stay valid and
//! unchanged.

use crate::action::Action;
use crate::state::{reduce, AppState};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

/// Reducer-backed state container
#[derive(Debug)]
pub struct Store {
    state: RwLock<Arc<AppState>>,
    updates: watch::Sender<Arc<AppState>>,
}

impl Store {
    /// Create store in the uninitialized state
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(AppState::new())
    }

    /// Create store holding `state`
    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        let state = Arc::new(state);
        let (updates, _) = watch::channel(Arc::clone(&state));
        Self {
            state: RwLock::new(state),
            updates,
        }
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppState> {
        self.state.read().clone()
    }

    /// Apply an action and return the resulting snapshot
    pub fn dispatch(&self, action: Action) -> Arc<AppState> {
        let name = action.name();
        let next = {
            let mut guard = self.state.write();
            let next = Arc::new(reduce(&guard, action));
            *guard = Arc::clone(&next);
            next
        };
        tracing::debug!(action = name, initialized = next.is_initialized, "reduced");
        self.updates.send_replace(Arc::clone(&next));
        next
    }

    /// Receive every snapshot published after this call
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.updates.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
