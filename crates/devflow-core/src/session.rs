//! Session lifecycle
//!
//! - `LoggedOut → LoggedIn` via [`Dispatcher::login`] (the id must be on some project team)
//! - `LoggedIn → LoggedOut` via [`Dispatcher::logout`] (clears the user only)
//! - `Uninitialized → Initialized` via [`Dispatcher::bootstrap`], at startup,
//!   when a persisted session exists

use crate::action::Action;
use crate::error::CoreError;
use crate::middleware::Dispatcher;
use crate::state::AppState;
use devflow_model::seed::demo_workspace;
use devflow_model::{User, UserId};
use devflow_storage::KeyValueStore;
use std::sync::Arc;

/// Who is using the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No user selected
    LoggedOut,
    /// A user is logged in
    LoggedIn(User),
}

impl SessionState {
    /// Session described by a snapshot
    #[must_use]
    pub fn of(state: &AppState) -> Self {
        state
            .current_user
            .clone()
            .map_or(SessionState::LoggedOut, SessionState::LoggedIn)
    }
}

impl<S: KeyValueStore> Dispatcher<S> {
    /// Seed the demo workspace into an empty store
    ///
    /// Returns whether seeding happened.
    pub fn ensure_seeded(&self) -> Result<bool, CoreError> {
        Ok(self.db().initialize(&demo_workspace(self.clock().now()))?)
    }

    /// Current session
    #[must_use]
    pub fn session(&self) -> SessionState {
        SessionState::of(&self.snapshot())
    }

    /// Load persisted state if a session was stored
    ///
    /// Runs at most once: an initialized store is left alone. Returns whether
    /// the store is initialized afterwards.
    pub fn bootstrap(&self) -> Result<bool, CoreError> {
        if self.snapshot().is_initialized {
            return Ok(true);
        }
        let Some(user_id) = self.db().current_user_id()? else {
            tracing::debug!("no stored session");
            return Ok(false);
        };
        if let Some(action) = self.initial_state_for(&user_id)? {
            self.dispatch(action)?;
            tracing::info!(user = %user_id, "session restored");
            return Ok(true);
        }
        tracing::warn!(user = %user_id, "stored session does not match any team member");
        Ok(false)
    }

    /// Log in as a team member and load their view
    pub fn login(&self, user_id: &UserId) -> Result<Arc<AppState>, CoreError> {
        let action = self
            .initial_state_for(user_id)?
            .ok_or_else(|| CoreError::UnknownUser(user_id.clone()))?;
        self.db().login(user_id)?;
        tracing::info!(user = %user_id, "logged in");
        self.dispatch(action)
    }

    /// Log out; the workspace and notifications stay persisted
    pub fn logout(&self) -> Result<Arc<AppState>, CoreError> {
        self.db().logout()?;
        tracing::info!("logged out");
        self.dispatch(Action::Logout)
    }

    /// Logged-in user or an error
    pub fn require_user(&self) -> Result<User, CoreError> {
        self.snapshot()
            .current_user
            .clone()
            .ok_or(CoreError::NotLoggedIn)
    }

    fn initial_state_for(&self, user_id: &UserId) -> Result<Option<Action>, CoreError> {
        let Some(workspace) = self.db().workspace()? else {
            return Ok(None);
        };
        let Some(current_user) = workspace.team_roster().into_iter().find(|u| &u.id == user_id)
        else {
            return Ok(None);
        };
        let notifications = self.db().notifications_for(user_id)?;
        Ok(Some(Action::SetInitialState {
            workspace,
            notifications,
            current_user,
        }))
    }
}
