//! AI task suggestions
//!
//! An external service proposes tasks for a phase. The engine only consumes
//! the proposals: it normalizes them, schedules them back to back after the
//! phase's last task and appends them through the dispatcher.
//!
//! Any adapter failure degrades to "no tasks suggested".

mod gemini;

pub use gemini::GeminiSuggester;

use crate::action::Action;
use crate::error::{CoreError, SuggestError};
use crate::middleware::Dispatcher;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashSet;
use devflow_model::{PhaseId, ProjectId, Task, TaskId, TaskStatus};
use devflow_storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Title used when a proposal has none
pub const UNTITLED_TASK: &str = "Untitled Task";

/// Longest accepted proposal duration; anything above is treated as missing
pub const MAX_DURATION_DAYS: u32 = 3650;

/// A normalized task proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedTask {
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
    /// Positive duration in days
    pub duration_days: u32,
}

impl ProposedTask {
    /// Create proposal; a zero duration becomes one day
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>, duration_days: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            duration_days: duration_days.max(1),
        }
    }
}

/// A proposal as received from the service, every field untrusted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProposal {
    /// Title, if any
    #[serde(default)]
    pub title: Option<serde_json::Value>,
    /// Description, if any
    #[serde(default)]
    pub description: Option<serde_json::Value>,
    /// Duration in days, if any
    #[serde(default)]
    pub duration_days: Option<serde_json::Value>,
}

impl RawProposal {
    /// Apply defaults: missing title → placeholder, missing description →
    /// empty, missing, non-positive or out-of-range duration → 1 day
    #[must_use]
    pub fn normalize(self) -> ProposedTask {
        let text = |v: Option<serde_json::Value>| match v {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        };
        let duration = self
            .duration_days
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .filter(|d| d.is_finite() && *d >= 1.0 && *d <= f64::from(MAX_DURATION_DAYS))
            .map_or(1, whole_days);
        ProposedTask {
            title: text(self.title).unwrap_or_else(|| UNTITLED_TASK.to_string()),
            description: text(self.description).unwrap_or_default(),
            duration_days: duration,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_days(d: f64) -> u32 {
    d.round() as u32
}

/// Parse a `{ "tasks": [...] }` document into normalized proposals
pub fn parse_proposals(raw: &str) -> Result<Vec<ProposedTask>, SuggestError> {
    #[derive(Deserialize)]
    struct Envelope {
        tasks: Vec<RawProposal>,
    }

    let envelope: Envelope = serde_json::from_str(raw.trim())
        .map_err(|e| SuggestError::MalformedResponse(e.to_string()))?;
    Ok(envelope.tasks.into_iter().map(RawProposal::normalize).collect())
}

/// Source of task proposals for a phase
#[async_trait]
pub trait TaskSuggester: Send + Sync {
    /// Propose tasks for `phase_title`, continuing after `last_task`
    async fn suggest(
        &self,
        phase_title: &str,
        last_task: Option<&Task>,
    ) -> Result<Vec<ProposedTask>, SuggestError>;
}

/// Turn proposals into chained, unassigned to-do tasks
///
/// The first task starts the day after `last_task` is due (or at `today`).
/// Each task is due `duration_days` after its start; the next one starts the
/// day after that. Each task depends on the one before it. A schedule that
/// runs past the representable date range yields no tasks.
#[must_use]
pub fn schedule_proposals(
    proposals: Vec<ProposedTask>,
    last_task: Option<&Task>,
    today: DateTime<Utc>,
) -> Vec<Task> {
    let day = Duration::days(1);
    let Some(mut next_start) = last_task.map_or(Some(today), |t| t.due_date.checked_add_signed(day))
    else {
        tracing::warn!("last task due date out of range, no tasks scheduled");
        return Vec::new();
    };
    let mut previous: Option<TaskId> = last_task.map(|t| t.id.clone());

    let mut tasks = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let start = next_start;
        let Some((due, after)) = start
            .checked_add_signed(Duration::days(i64::from(proposal.duration_days)))
            .and_then(|due| due.checked_add_signed(day).map(|after| (due, after)))
        else {
            tracing::warn!(title = %proposal.title, "schedule out of date range, no tasks scheduled");
            return Vec::new();
        };
        next_start = after;

        let id = TaskId::generated();
        tasks.push(Task {
            id: id.clone(),
            title: proposal.title,
            description: proposal.description,
            status: TaskStatus::ToDo,
            assignee_id: None,
            start_date: start,
            due_date: due,
            duration_days: proposal.duration_days,
            dependencies: previous.replace(id).into_iter().collect(),
        });
    }
    tasks
}

/// Runs suggestion requests with one request in flight per phase
pub struct SuggestionRunner {
    suggester: Arc<dyn TaskSuggester>,
    in_flight: Arc<DashSet<(ProjectId, PhaseId)>>,
}

impl std::fmt::Debug for SuggestionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionRunner")
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

/// Releases a phase's in-flight slot on drop (completion or cancellation)
struct InFlightGuard {
    set: Arc<DashSet<(ProjectId, PhaseId)>>,
    key: (ProjectId, PhaseId),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

impl SuggestionRunner {
    /// Create runner over a suggester
    #[must_use]
    pub fn new(suggester: Arc<dyn TaskSuggester>) -> Self {
        Self {
            suggester,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Whether a request for the phase is pending
    #[must_use]
    pub fn is_pending(&self, project_id: &ProjectId, phase_id: &PhaseId) -> bool {
        self.in_flight
            .contains(&(project_id.clone(), phase_id.clone()))
    }

    /// Ask for tasks for a phase and append them
    ///
    /// Rejects a second request for the same phase while one is pending.
    /// Adapter failures yield an empty list. Dropping the returned future
    /// cancels the request and frees the phase. Returns the tasks appended.
    pub async fn generate_for_phase<S: KeyValueStore>(
        &self,
        dispatcher: &Dispatcher<S>,
        project_id: &ProjectId,
        phase_id: &PhaseId,
    ) -> Result<Vec<Task>, CoreError> {
        let key = (project_id.clone(), phase_id.clone());
        if !self.in_flight.insert(key.clone()) {
            return Err(CoreError::SuggestionInFlight {
                project: project_id.clone(),
                phase: phase_id.clone(),
            });
        }
        let _guard = InFlightGuard {
            set: Arc::clone(&self.in_flight),
            key,
        };

        // Owned copies only: no snapshot is held across the await.
        let Some((phase_title, last_task)) = dispatcher
            .snapshot()
            .workspace
            .as_ref()
            .and_then(|ws| ws.find_phase(project_id, phase_id))
            .map(|phase| (phase.title.clone(), phase.last_task().cloned()))
        else {
            tracing::warn!(project = %project_id, phase = %phase_id, "suggestion for unknown phase");
            return Ok(Vec::new());
        };

        let proposals = match self.suggester.suggest(&phase_title, last_task.as_ref()).await {
            Ok(proposals) => proposals,
            Err(e) => {
                tracing::warn!(phase = %phase_id, error = %e, "task suggestion failed, continuing without tasks");
                Vec::new()
            }
        };
        if proposals.is_empty() {
            return Ok(Vec::new());
        }

        let tasks = schedule_proposals(proposals, last_task.as_ref(), dispatcher.clock().now());
        if tasks.is_empty() {
            return Ok(tasks);
        }
        tracing::info!(phase = %phase_id, count = tasks.len(), "suggested tasks ready");
        dispatcher.dispatch(Action::AddTasks {
            project_id: project_id.clone(),
            phase_id: phase_id.clone(),
            tasks: tasks.clone(),
        })?;
        Ok(tasks)
    }
}
