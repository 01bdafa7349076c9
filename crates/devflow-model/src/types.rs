//! Core entity types
//!
//! The workspace is a single-rooted tree:
//! - `Workspace` owns `Project`s
//! - `Project` owns `Phase`s and its team roster
//! - `Phase` owns `Task`s
//!
//! Users are referenced by id from task assignees and notifications (weak
//! references). Nested sequences are persistent vectors, so cloning a tree is
//! cheap and an update copies only the path it touches.

use crate::ids::{NotificationId, PhaseId, ProjectId, TaskId, UserId, WorkspaceId};
use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};

/// Team member role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Receives completion notifications for the project
    #[serde(rename = "Project Owner")]
    ProjectOwner,
    /// Leads a team
    #[serde(rename = "Team Leader")]
    TeamLeader,
    /// Regular contributor
    #[serde(rename = "Member")]
    Member,
    /// Read-only access
    #[serde(rename = "View-Only")]
    ViewOnly,
}

impl Role {
    /// Every role, in display order
    pub const ALL: [Role; 4] = [
        Role::ProjectOwner,
        Role::TeamLeader,
        Role::Member,
        Role::ViewOnly,
    ];

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Role::ProjectOwner => "Project Owner",
            Role::TeamLeader => "Team Leader",
            Role::Member => "Member",
            Role::ViewOnly => "View-Only",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Task lifecycle status (exactly four states)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started
    #[serde(rename = "To Do")]
    ToDo,
    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,
    /// Completed
    #[serde(rename = "Done")]
    Done,
    /// Waiting on something external
    #[serde(rename = "Blocked")]
    Blocked,
}

impl TaskStatus {
    /// Every status, in board order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
    ];

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Blocked => "Blocked",
        }
    }

    /// Whether the task counts as completed
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a status label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for TaskStatus {
    type Err = UnknownStatus;

    /// Accepts the display label or a compact form (`todo`, `in-progress`, `done`, `blocked`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "todo" => Ok(TaskStatus::ToDo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Avatar URL or reference
    pub avatar: String,
    /// Role on the team
    pub role: Role,
}

impl User {
    /// Create new user
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: String::new(),
            role,
        }
    }

    /// With avatar reference
    #[inline]
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }
}

/// Unit of work inside a phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Current status
    pub status: TaskStatus,
    /// Assigned user (weak reference)
    pub assignee_id: Option<UserId>,
    /// Scheduled start
    pub start_date: DateTime<Utc>,
    /// Due date
    pub due_date: DateTime<Utc>,
    /// Planned duration in days
    pub duration_days: u32,
    /// Ids of tasks this one depends on (stored, never validated)
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Create a to-do task spanning a single instant
    #[must_use]
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::ToDo,
            assignee_id: None,
            start_date: at,
            due_date: at,
            duration_days: 1,
            dependencies: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Assign to a user
    #[inline]
    #[must_use]
    pub fn assigned_to(mut self, user: impl Into<UserId>) -> Self {
        self.assignee_id = Some(user.into());
        self
    }

    /// With schedule
    #[inline]
    #[must_use]
    pub fn scheduled(mut self, start: DateTime<Utc>, due: DateTime<Utc>, duration_days: u32) -> Self {
        self.start_date = start;
        self.due_date = due;
        self.duration_days = duration_days;
        self
    }

    /// With due date only
    #[inline]
    #[must_use]
    pub fn due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = due;
        self
    }

    /// With dependency
    #[inline]
    #[must_use]
    pub fn depends_on(mut self, task_id: impl Into<TaskId>) -> Self {
        self.dependencies.push(task_id.into());
        self
    }

    /// Whether the task is assigned to `user`
    #[inline]
    #[must_use]
    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assignee_id.as_ref() == Some(user)
    }
}

/// Ordered grouping of tasks within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Phase identifier
    pub id: PhaseId,
    /// Phase title
    pub title: String,
    /// Tasks in order
    pub tasks: Vector<Task>,
}

impl Phase {
    /// Create empty phase
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<PhaseId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tasks: Vector::new(),
        }
    }

    /// With task appended
    #[inline]
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push_back(task);
        self
    }

    /// Last task in the phase, if any
    #[inline]
    #[must_use]
    pub fn last_task(&self) -> Option<&Task> {
        self.tasks.last()
    }
}

/// Project: team plus phased work plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier
    pub id: ProjectId,
    /// Project title
    pub title: String,
    /// Description
    pub description: String,
    /// Planned start
    pub start_date: DateTime<Utc>,
    /// Planned end
    pub end_date: DateTime<Utc>,
    /// Team members, unique by id
    pub team: Vector<User>,
    /// Phases in order
    pub phases: Vector<Phase>,
}

impl Project {
    /// Create project without team or phases
    #[must_use]
    pub fn new(
        id: impl Into<ProjectId>,
        title: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            start_date,
            end_date,
            team: Vector::new(),
            phases: Vector::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With team member; a user already on the team is ignored
    #[must_use]
    pub fn with_member(mut self, user: User) -> Self {
        if !self.team.iter().any(|u| u.id == user.id) {
            self.team.push_back(user);
        }
        self
    }

    /// With phase appended
    #[inline]
    #[must_use]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push_back(phase);
        self
    }

    /// First team member holding the project-owner role
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Option<&User> {
        self.team.iter().find(|u| u.role == Role::ProjectOwner)
    }
}

/// Root container of all projects for one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace identifier
    pub id: WorkspaceId,
    /// Display name
    pub name: String,
    /// Projects in order
    pub projects: Vector<Project>,
}

impl Workspace {
    /// Create empty workspace
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<WorkspaceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            projects: Vector::new(),
        }
    }

    /// With project appended
    #[inline]
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push_back(project);
        self
    }
}

/// Notification kinds known to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    /// A task is starting
    TaskStart,
    /// A deadline is close
    DeadlineSoon,
    /// A task is past due
    TaskOverdue,
    /// A task was marked done
    TaskCompleted,
    /// Every task in a phase is done
    PhaseCompleted,
    /// The timeline moved
    TimelineShift,
    /// Daily digest
    DailyPlan,
}

/// Message addressed to a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification identifier
    pub id: NotificationId,
    /// Kind
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Rendered message
    pub message: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Read flag
    pub is_read: bool,
    /// Recipient (weak reference)
    pub user_id: UserId,
}

impl Notification {
    /// Create unread notification with a fresh id
    #[must_use]
    pub fn new(
        kind: NotificationType,
        message: impl Into<String>,
        user_id: impl Into<UserId>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            kind,
            message: message.into(),
            timestamp,
            is_read: false,
            user_id: user_id.into(),
        }
    }

    /// Completion notice sent to a project owner
    #[must_use]
    pub fn task_completed(
        actor_name: &str,
        task_title: &str,
        owner: impl Into<UserId>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            NotificationType::TaskCompleted,
            format!("{actor_name} completed the task: \"{task_title}\""),
            owner,
            timestamp,
        )
    }
}
