//! Workload aggregation
//!
//! Pure rollup of the workspace tree into per-member statistics:
//! - done tasks
//! - open (assigned, not done) tasks, split into overdue / due soon / later
//! - a damped workload percentage
//!
//! Recomputed on every read; [`DashboardCache`] only short-circuits when the
//! input is identical to the previous call.

use crate::middleware::Dispatcher;
use chrono::{DateTime, Duration, Utc};
use devflow_model::{User, Workspace};
use devflow_storage::KeyValueStore;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Aggregation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardPolicy {
    /// Open tasks due within `[now, now + window]` count as due soon
    pub due_soon_window: Duration,
    /// Added to the workload denominator so small counts stay below 100%
    pub damping: u32,
}

impl DashboardPolicy {
    /// Policy with a due-soon window in days and a damping term
    ///
    /// A window too large for [`Duration`] saturates.
    #[inline]
    #[must_use]
    pub fn new(due_soon_days: i64, damping: u32) -> Self {
        Self {
            due_soon_window: Duration::try_days(due_soon_days).unwrap_or(if due_soon_days < 0 {
                Duration::MIN
            } else {
                Duration::MAX
            }),
            damping,
        }
    }
}

impl Default for DashboardPolicy {
    fn default() -> Self {
        Self::new(3, 5)
    }
}

/// Where an open task's due date falls relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBucket {
    /// Due strictly before now
    Overdue,
    /// Due in `[now, now + window]`
    DueSoon,
    /// Due after the window
    Later,
}

/// Classify a due date
///
/// A window ending past the representable date range covers every future date.
#[inline]
#[must_use]
pub fn classify_due(due: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> DueBucket {
    if due < now {
        DueBucket::Overdue
    } else if now.checked_add_signed(window).map_or(true, |end| due <= end) {
        DueBucket::DueSoon
    } else {
        DueBucket::Later
    }
}

/// Damped workload: `round(assigned / (assigned + done + damping) * 100)` within `[0, 100]`
#[must_use]
pub fn workload_percent(assigned: u32, done: u32, damping: u32) -> u8 {
    let total = u64::from(assigned) + u64::from(done);
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denominator = (total + u64::from(damping)) as f64;
    percent(f64::from(assigned) / denominator * 100.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// One member's rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    /// Team member
    pub member: User,
    /// Open tasks assigned to the member
    pub assigned_tasks: u32,
    /// Open tasks due within the window
    pub due_soon: u32,
    /// Open tasks past due
    pub overdue: u32,
    /// Completed tasks
    pub done_tasks: u32,
    /// Damped workload percentage
    pub workload: u8,
}

/// Sums across every member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    /// Members in the roster
    pub members: usize,
    /// Open tasks
    pub assigned_tasks: u32,
    /// Open tasks due soon
    pub due_soon: u32,
    /// Open tasks overdue
    pub overdue: u32,
    /// Completed tasks
    pub done_tasks: u32,
}

/// Computed dashboard view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Per-member rows, in roster order
    pub members: Vec<MemberStats>,
    /// Column sums
    pub totals: DashboardTotals,
}

impl Dashboard {
    /// Aggregate a workspace; an absent or empty workspace yields no rows
    #[must_use]
    pub fn compute(workspace: Option<&Workspace>, now: DateTime<Utc>, policy: DashboardPolicy) -> Self {
        let members = workspace
            .map(|ws| aggregate(ws, now, policy))
            .unwrap_or_default();
        let totals = members.iter().fold(
            DashboardTotals {
                members: members.len(),
                ..DashboardTotals::default()
            },
            |acc, m| DashboardTotals {
                assigned_tasks: acc.assigned_tasks + m.assigned_tasks,
                due_soon: acc.due_soon + m.due_soon,
                overdue: acc.overdue + m.overdue,
                done_tasks: acc.done_tasks + m.done_tasks,
                ..acc
            },
        );
        Self { members, totals }
    }

    /// Row for a member
    #[must_use]
    pub fn member(&self, user_id: &str) -> Option<&MemberStats> {
        self.members.iter().find(|m| m.member.id == user_id)
    }
}

/// Per-member statistics over the deduplicated team roster
#[must_use]
pub fn aggregate(workspace: &Workspace, now: DateTime<Utc>, policy: DashboardPolicy) -> Vec<MemberStats> {
    workspace
        .team_roster()
        .into_iter()
        .map(|member| {
            let mut stats = MemberStats {
                member,
                assigned_tasks: 0,
                due_soon: 0,
                overdue: 0,
                done_tasks: 0,
                workload: 0,
            };
            for task in workspace
                .all_tasks()
                .filter(|t| t.is_assigned_to(&stats.member.id))
            {
                if task.status.is_done() {
                    stats.done_tasks += 1;
                    continue;
                }
                stats.assigned_tasks += 1;
                match classify_due(task.due_date, now, policy.due_soon_window) {
                    DueBucket::Overdue => stats.overdue += 1,
                    DueBucket::DueSoon => stats.due_soon += 1,
                    DueBucket::Later => {}
                }
            }
            stats.workload = workload_percent(stats.assigned_tasks, stats.done_tasks, policy.damping);
            stats
        })
        .collect()
}

impl<S: KeyValueStore> Dispatcher<S> {
    /// Dashboard of the current snapshot at the dispatcher's clock
    #[must_use]
    pub fn dashboard(&self, policy: DashboardPolicy) -> Dashboard {
        Dashboard::compute(self.snapshot().workspace.as_ref(), self.clock().now(), policy)
    }
}

type CacheEntry = (Option<Workspace>, DateTime<Utc>, Arc<Dashboard>);

/// Remembers the last computed dashboard
///
/// A hit requires the same workspace and the same `now` as the previous call.
#[derive(Debug, Default)]
pub struct DashboardCache {
    policy: DashboardPolicy,
    last: Mutex<Option<CacheEntry>>,
}

impl DashboardCache {
    /// Create cache for a policy
    #[inline]
    #[must_use]
    pub fn new(policy: DashboardPolicy) -> Self {
        Self {
            policy,
            last: Mutex::new(None),
        }
    }

    /// Dashboard for `workspace` at `now`
    pub fn get(&self, workspace: Option<&Workspace>, now: DateTime<Utc>) -> Arc<Dashboard> {
        let mut last = self.last.lock();
        if let Some((ws, at, dashboard)) = last.as_ref() {
            if *at == now && ws.as_ref() == workspace {
                return Arc::clone(dashboard);
            }
        }
        let dashboard = Arc::new(Dashboard::compute(workspace, now, self.policy));
        *last = Some((workspace.cloned(), now, Arc::clone(&dashboard)));
        dashboard
    }
}
