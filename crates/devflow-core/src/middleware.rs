//! Write-through dispatch
//!
//! [`Dispatcher`] wraps the store: for mutating actions it persists the change
//! first and only then lets the reducer see the action, so persisted state is
//! never behind in-memory state. A storage failure aborts the action before
//! the reducer runs.
//!
//! Completing a task also produces a notification for the project owner
//! (unless the owner did it themselves).

use crate::action::Action;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::state::AppState;
use crate::store::Store;
use devflow_model::{Notification, ProjectId, TaskStatus, User};
use devflow_storage::{Database, KeyValueStore};
use parking_lot::Mutex;
use std::sync::Arc;

/// Store front-end that persists before reducing
#[derive(Debug)]
pub struct Dispatcher<S> {
    store: Arc<Store>,
    db: Database<S>,
    clock: Arc<dyn Clock>,
    gate: Mutex<()>,
}

impl<S: KeyValueStore> Dispatcher<S> {
    /// Wire a store to a database
    #[must_use]
    pub fn new(store: Arc<Store>, db: Database<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            db,
            clock,
            gate: Mutex::new(()),
        }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Persistence adapter
    #[inline]
    #[must_use]
    pub fn db(&self) -> &Database<S> {
        &self.db
    }

    /// Time source
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppState> {
        self.store.snapshot()
    }

    /// Persist the action's effect, derive side effects, then reduce
    ///
    /// Dispatches are serialized: a persistence write and its reducer
    /// application never interleave with another dispatch.
    pub fn dispatch(&self, action: Action) -> Result<Arc<AppState>, CoreError> {
        let _gate = self.gate.lock();
        let current = self.store.snapshot();

        match &action {
            Action::AddTasks {
                project_id,
                phase_id,
                tasks,
            } => {
                let stored = self.db.add_tasks(project_id, phase_id, tasks)?;
                tracing::info!(project = %project_id, phase = %phase_id, count = tasks.len(), stored, "tasks persisted");
            }
            Action::UpdateTaskStatus {
                project_id,
                phase_id,
                task_id,
                status,
                task_title,
                actor,
            } => {
                let stored = self
                    .db
                    .update_task_status(project_id, phase_id, task_id, *status)?;
                tracing::info!(task = %task_id, status = %status, stored, "status persisted");
                if *status == TaskStatus::Done {
                    self.notify_completion(&current, project_id, task_title, actor)?;
                }
            }
            Action::MarkNotificationsRead { user_id } => {
                if current.current_user.is_some() {
                    self.db.mark_notifications_read(user_id)?;
                }
            }
            Action::SetInitialState { .. } | Action::AddNotification(_) | Action::Logout => {}
        }

        Ok(self.store.dispatch(action))
    }

    /// Notify the project owner that `actor` completed a task
    ///
    /// Reads the pre-mutation tree. Returns the notification when one was produced.
    fn notify_completion(
        &self,
        state: &AppState,
        project_id: &ProjectId,
        task_title: &str,
        actor: &User,
    ) -> Result<Option<Notification>, CoreError> {
        let Some(owner) = state
            .workspace
            .as_ref()
            .and_then(|ws| ws.find_project(project_id))
            .and_then(|project| project.owner())
        else {
            return Ok(None);
        };
        if owner.id == actor.id {
            return Ok(None);
        }

        let notification =
            Notification::task_completed(&actor.name, task_title, owner.id.clone(), self.clock.now());
        self.db.add_notification(&notification)?;
        tracing::info!(owner = %owner.id, actor = %actor.id, "completion notification created");

        let owner_is_viewing = state
            .current_user
            .as_ref()
            .is_some_and(|u| u.id == owner.id);
        if owner_is_viewing {
            self.store
                .dispatch(Action::AddNotification(notification.clone()));
        }
        Ok(Some(notification))
    }
}
