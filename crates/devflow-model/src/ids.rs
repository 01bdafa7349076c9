//! Identifier newtypes
//!
//! Every entity in the workspace tree is addressed by an opaque string id.
//! Ids are unique within their parent sequence and never change once issued.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an existing identifier
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Workspace identifier
    WorkspaceId
);
string_id!(
    /// Project identifier, unique within a workspace
    ProjectId
);
string_id!(
    /// Phase identifier, unique within a project
    PhaseId
);
string_id!(
    /// Task identifier, unique within a phase
    TaskId
);
string_id!(
    /// User identifier; identity of a team member across projects
    UserId
);
string_id!(
    /// Notification identifier
    NotificationId
);

impl TaskId {
    /// Fresh id for a machine-generated task
    #[must_use]
    pub fn generated() -> Self {
        Self(format!("task-gen-{}", Ulid::new()))
    }
}

impl NotificationId {
    /// Fresh notification id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("notif-{}", Ulid::new()))
    }
}
