//! Testing utilities for DevFlow workspace
//!
//! Shared fixtures: a pinned clock, a small two-person project, an in-memory
//! dispatcher and scripted task suggesters.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use devflow_core::{Dispatcher, FixedClock, ProposedTask, Store, SuggestError, TaskSuggester};
use devflow_model::{Phase, Project, Role, Task, TaskStatus, User, UserId, Workspace};
use devflow_storage::{Database, MemoryStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const PROJECT: &str = "proj-t";
pub const PHASE: &str = "phase-t";
pub const OWNER: &str = "user-owner";
pub const DEV: &str = "user-dev";
pub const VIEWER: &str = "user-viewer";

/// 2024-09-10 12:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
}

pub fn owner() -> User {
    User::new(OWNER, "Olive", Role::ProjectOwner)
}

pub fn developer() -> User {
    User::new(DEV, "Dev", Role::Member)
}

pub fn viewer() -> User {
    User::new(VIEWER, "Vic", Role::ViewOnly)
}

/// One project owned by [`owner`], with the developer and viewer on the team
///
/// Phase `phase-t` holds:
/// - `t-open`: developer, due tomorrow
/// - `t-late`: developer, due yesterday
/// - `t-done`: developer, done
pub fn project_workspace(now: DateTime<Utc>) -> Workspace {
    let phase = Phase::new(PHASE, "Build")
        .with_task(
            Task::new("t-open", "Write handlers", now)
                .assigned_to(DEV)
                .due(now + Duration::days(1)),
        )
        .with_task(
            Task::new("t-late", "Fix login", now)
                .assigned_to(DEV)
                .due(now - Duration::days(1)),
        )
        .with_task(
            Task::new("t-done", "Set up CI", now)
                .assigned_to(DEV)
                .with_status(TaskStatus::Done)
                .due(now - Duration::days(3)),
        );
    let project = Project::new(PROJECT, "Test Project", now, now + Duration::days(30))
        .with_member(owner())
        .with_member(developer())
        .with_member(viewer())
        .with_phase(phase);
    Workspace::new("ws-t", "Test Workspace").with_project(project)
}

/// Dispatcher over an inspectable in-memory store
pub struct Harness {
    pub dispatcher: Dispatcher<Arc<MemoryStore>>,
    pub kv: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    /// Empty store, clock at [`fixed_now`]
    pub fn empty() -> Self {
        Self::over(Arc::new(MemoryStore::new()))
    }

    /// Empty harness over a given store
    pub fn over(kv: Arc<MemoryStore>) -> Self {
        let clock = Arc::new(FixedClock::new(fixed_now()));
        let dispatcher = Dispatcher::new(
            Arc::new(Store::new()),
            Database::new(Arc::clone(&kv)),
            Arc::clone(&clock) as Arc<dyn devflow_core::Clock>,
        );
        Self {
            dispatcher,
            kv,
            clock,
        }
    }

    /// Store seeded with [`project_workspace`]
    pub fn seeded() -> Self {
        let harness = Self::empty();
        harness
            .dispatcher
            .db()
            .initialize(&project_workspace(fixed_now()))
            .unwrap();
        harness
    }

    /// Seeded store with `user` logged in
    pub fn logged_in(user: &str) -> Self {
        let harness = Self::seeded();
        harness.dispatcher.login(&UserId::from(user)).unwrap();
        harness
    }

    pub fn db(&self) -> &Database<Arc<MemoryStore>> {
        self.dispatcher.db()
    }

    /// Task from the in-memory tree
    pub fn task(&self, id: &str) -> Option<Task> {
        let state = self.dispatcher.snapshot();
        state
            .workspace
            .as_ref()?
            .find_task(&PROJECT.into(), &PHASE.into(), &id.into())
            .cloned()
    }

    /// Task from the persisted tree
    pub fn stored_task(&self, id: &str) -> Option<Task> {
        self.db()
            .workspace()
            .unwrap()?
            .find_task(&PROJECT.into(), &PHASE.into(), &id.into())
            .cloned()
    }
}

/// Returns the same proposals on every call
#[derive(Debug, Default)]
pub struct ScriptedSuggester {
    proposals: Vec<ProposedTask>,
    calls: AtomicUsize,
}

impl ScriptedSuggester {
    pub fn new(proposals: Vec<ProposedTask>) -> Self {
        Self {
            proposals,
            calls: AtomicUsize::new(0),
        }
    }

    /// Proposals with the given durations, titled `Task 1`, `Task 2`, ...
    pub fn with_durations(durations: &[u32]) -> Self {
        Self::new(
            durations
                .iter()
                .enumerate()
                .map(|(i, d)| ProposedTask::new(format!("Task {}", i + 1), "generated", *d))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskSuggester for ScriptedSuggester {
    async fn suggest(
        &self,
        _phase_title: &str,
        _last_task: Option<&Task>,
    ) -> Result<Vec<ProposedTask>, SuggestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.proposals.clone())
    }
}

/// Always fails like a service returning 500
#[derive(Debug, Default)]
pub struct FailingSuggester;

#[async_trait]
impl TaskSuggester for FailingSuggester {
    async fn suggest(
        &self,
        _phase_title: &str,
        _last_task: Option<&Task>,
    ) -> Result<Vec<ProposedTask>, SuggestError> {
        Err(SuggestError::Status {
            status: 500,
            body: "internal error".to_string(),
        })
    }
}

/// Blocks until released, so a request can be observed in flight
#[derive(Debug, Default)]
pub struct GatedSuggester {
    pub started: Notify,
    pub release: Notify,
    proposals: Vec<ProposedTask>,
}

impl GatedSuggester {
    pub fn new(proposals: Vec<ProposedTask>) -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            proposals,
        }
    }
}

#[async_trait]
impl TaskSuggester for GatedSuggester {
    async fn suggest(
        &self,
        _phase_title: &str,
        _last_task: Option<&Task>,
    ) -> Result<Vec<ProposedTask>, SuggestError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.proposals.clone())
    }
}
