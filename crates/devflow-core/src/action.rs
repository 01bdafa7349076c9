//! Typed actions accepted by the store

use devflow_model::{Notification, PhaseId, ProjectId, Task, TaskId, TaskStatus, User, UserId, Workspace};

/// A state transition request
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Load persisted state; the only way out of the uninitialized state
    SetInitialState {
        /// Workspace tree
        workspace: Workspace,
        /// Notifications visible to the user
        notifications: Vec<Notification>,
        /// Logged-in user
        current_user: User,
    },

    /// Append tasks to a phase
    AddTasks {
        /// Project id
        project_id: ProjectId,
        /// Phase id
        phase_id: PhaseId,
        /// Tasks, appended in order
        tasks: Vec<Task>,
    },

    /// Overwrite a task's status
    UpdateTaskStatus {
        /// Project id
        project_id: ProjectId,
        /// Phase id
        phase_id: PhaseId,
        /// Task id
        task_id: TaskId,
        /// New status
        status: TaskStatus,
        /// Task title as the actor saw it
        task_title: String,
        /// User performing the change
        actor: User,
    },

    /// Prepend a notification (newest first)
    AddNotification(Notification),

    /// Mark notifications read on behalf of a user
    MarkNotificationsRead {
        /// User acknowledging their notifications
        user_id: UserId,
    },

    /// End the session; workspace and notifications stay loaded
    Logout,
}

impl Action {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetInitialState { .. } => "set_initial_state",
            Action::AddTasks { .. } => "add_tasks",
            Action::UpdateTaskStatus { .. } => "update_task_status",
            Action::AddNotification(_) => "add_notification",
            Action::MarkNotificationsRead { .. } => "mark_notifications_read",
            Action::Logout => "logout",
        }
    }

    /// Status-change action
    #[must_use]
    pub fn update_task_status(
        project_id: impl Into<ProjectId>,
        phase_id: impl Into<PhaseId>,
        task: &Task,
        status: TaskStatus,
        actor: &User,
    ) -> Self {
        Action::UpdateTaskStatus {
            project_id: project_id.into(),
            phase_id: phase_id.into(),
            task_id: task.id.clone(),
            status,
            task_title: task.title.clone(),
            actor: actor.clone(),
        }
    }
}
