//! DevFlow model
//!
//! The workspace tree shared by the store, the persistence layer and the
//! dashboard:
//! - Typed string identifiers
//! - Workspace → Project → Phase → Task entities, team members, notifications
//! - Path-copying tree updates that leave older snapshots intact
//! - The demo dataset used to seed a fresh store

#![warn(unreachable_pub)]

pub mod ids;
pub mod seed;
pub mod tree;
pub mod types;

pub use ids::{NotificationId, PhaseId, ProjectId, TaskId, UserId, WorkspaceId};
pub use types::{
    Notification, NotificationType, Phase, Project, Role, Task, TaskStatus, UnknownStatus, User,
    Workspace,
};
