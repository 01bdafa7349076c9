//! Application state and the pure reducer
//!
//! `reduce` never mutates its input: it returns a new state that shares every
//! untouched part of the tree with the old one.

use crate::action::Action;
use devflow_model::{Notification, User, Workspace};
use im::Vector;

/// Snapshot of the application state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Whether persisted state has been loaded
    pub is_initialized: bool,
    /// Workspace tree, absent until initialized
    pub workspace: Option<Workspace>,
    /// Notifications, newest first
    pub notifications: Vector<Notification>,
    /// Logged-in user
    pub current_user: Option<User>,
}

impl AppState {
    /// Uninitialized state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unread notification count
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

/// Apply an action, producing the next state
///
/// Unresolved project, phase or task ids leave the state unchanged.
#[must_use]
pub fn reduce(state: &AppState, action: Action) -> AppState {
    match action {
        Action::SetInitialState {
            workspace,
            notifications,
            current_user,
        } => AppState {
            is_initialized: true,
            workspace: Some(workspace),
            notifications: notifications.into_iter().collect(),
            current_user: Some(current_user),
        },

        Action::AddTasks {
            project_id,
            phase_id,
            tasks,
        } => {
            let Some(workspace) = state.workspace.as_ref() else {
                return state.clone();
            };
            let mut next = workspace.clone();
            if !next.add_tasks(&project_id, &phase_id, tasks) {
                tracing::warn!(project = %project_id, phase = %phase_id, "add_tasks: address did not resolve");
                return state.clone();
            }
            AppState {
                workspace: Some(next),
                ..state.clone()
            }
        }

        Action::UpdateTaskStatus {
            project_id,
            phase_id,
            task_id,
            status,
            ..
        } => {
            let Some(workspace) = state.workspace.as_ref() else {
                return state.clone();
            };
            let mut next = workspace.clone();
            if !next.set_task_status(&project_id, &phase_id, &task_id, status) {
                tracing::warn!(
                    project = %project_id,
                    phase = %phase_id,
                    task = %task_id,
                    "update_task_status: address did not resolve"
                );
                return state.clone();
            }
            AppState {
                workspace: Some(next),
                ..state.clone()
            }
        }

        Action::AddNotification(notification) => {
            let mut notifications = state.notifications.clone();
            notifications.push_front(notification);
            AppState {
                notifications,
                ..state.clone()
            }
        }

        // Marks every loaded notification, whoever it addresses.
        Action::MarkNotificationsRead { .. } => {
            if state.current_user.is_none() {
                return state.clone();
            }
            let notifications = state
                .notifications
                .iter()
                .map(|n| Notification {
                    is_read: true,
                    ..n.clone()
                })
                .collect();
            AppState {
                notifications,
                ..state.clone()
            }
        }

        Action::Logout => AppState {
            current_user: None,
            ..state.clone()
        },
    }
}
