//! DevFlow Core - dashboard state engine
//!
//! The part of the dashboard with real logic:
//! - A reducer-backed [`Store`] producing immutable snapshots
//! - A write-through [`Dispatcher`] that persists before reducing and
//!   notifies project owners when tasks complete
//! - The workload [`Dashboard`] aggregation
//! - AI task suggestions scheduled into a phase
//!
//! # Example
//!
//! ```rust,ignore
//! use devflow_core::prelude::*;
//! use devflow_storage::{Database, MemoryStore};
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new(
//!     Arc::new(Store::new()),
//!     Database::new(MemoryStore::new()),
//!     Arc::new(SystemClock),
//! );
//! dispatcher.ensure_seeded()?;
//! dispatcher.login(&"user-3".into())?;
//!
//! let state = dispatcher.snapshot();
//! let dashboard = Dashboard::compute(state.workspace.as_ref(), chrono::Utc::now(), DashboardPolicy::default());
//! println!("{} open tasks", dashboard.totals.assigned_tasks);
//! ```

#![warn(unreachable_pub)]

pub mod action;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod middleware;
pub mod session;
pub mod state;
pub mod store;
pub mod suggest;

pub use action::Action;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DevflowConfig, SuggestConfig};
pub use dashboard::{
    aggregate, classify_due, workload_percent, Dashboard, DashboardCache, DashboardPolicy,
    DashboardTotals, DueBucket, MemberStats,
};
pub use error::{CoreError, SuggestError};
pub use middleware::Dispatcher;
pub use session::SessionState;
pub use state::{reduce, AppState};
pub use store::Store;
pub use suggest::{
    parse_proposals, schedule_proposals, GeminiSuggester, ProposedTask, RawProposal,
    SuggestionRunner, TaskSuggester,
};

impl From<&DevflowConfig> for DashboardPolicy {
    fn from(config: &DevflowConfig) -> Self {
        DashboardPolicy::new(config.due_soon_days, config.workload_damping)
    }
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with DevFlow Core
    pub use crate::{
        Action, AppState, Clock, CoreError, Dashboard, DashboardPolicy, DevflowConfig, Dispatcher,
        SessionState, Store, SuggestionRunner, SystemClock, TaskSuggester,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
