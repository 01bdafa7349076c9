//! Tree navigation and path-copying updates
//!
//! Updates resolve the whole address before touching anything, so a miss
//! leaves the tree (and every shared chunk) untouched. A hit clones only the
//! project, phase and task on the addressed path.

use crate::ids::{PhaseId, ProjectId, TaskId, UserId};
use crate::types::{Phase, Project, Task, TaskStatus, User, Workspace};
use indexmap::IndexMap;

impl Workspace {
    /// Find project by id
    #[inline]
    #[must_use]
    pub fn find_project(&self, project_id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == project_id)
    }

    /// Find phase by project and phase id
    #[must_use]
    pub fn find_phase(&self, project_id: &ProjectId, phase_id: &PhaseId) -> Option<&Phase> {
        self.find_project(project_id)?
            .phases
            .iter()
            .find(|ph| &ph.id == phase_id)
    }

    /// Find task by full path
    #[must_use]
    pub fn find_task(
        &self,
        project_id: &ProjectId,
        phase_id: &PhaseId,
        task_id: &TaskId,
    ) -> Option<&Task> {
        self.find_phase(project_id, phase_id)?
            .tasks
            .iter()
            .find(|t| &t.id == task_id)
    }

    /// Append tasks to the addressed phase, preserving order
    ///
    /// Returns `false` (tree untouched) when the project or phase does not resolve.
    pub fn add_tasks<I>(&mut self, project_id: &ProjectId, phase_id: &PhaseId, tasks: I) -> bool
    where
        I: IntoIterator<Item = Task>,
    {
        let Some((pi, phi)) = self.locate_phase(project_id, phase_id) else {
            return false;
        };
        let Some(phase) = self
            .projects
            .get_mut(pi)
            .and_then(|project| project.phases.get_mut(phi))
        else {
            return false;
        };
        phase.tasks.extend(tasks);
        true
    }

    /// Overwrite the status of the addressed task
    ///
    /// Returns `false` (tree untouched) when any id on the path does not resolve.
    pub fn set_task_status(
        &mut self,
        project_id: &ProjectId,
        phase_id: &PhaseId,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> bool {
        let Some((pi, phi)) = self.locate_phase(project_id, phase_id) else {
            return false;
        };
        let Some(ti) = self.projects[pi].phases[phi]
            .tasks
            .iter()
            .position(|t| &t.id == task_id)
        else {
            return false;
        };
        let Some(task) = self
            .projects
            .get_mut(pi)
            .and_then(|project| project.phases.get_mut(phi))
            .and_then(|phase| phase.tasks.get_mut(ti))
        else {
            return false;
        };
        task.status = status;
        true
    }

    /// Deduplicated union of every project team, first occurrence wins
    #[must_use]
    pub fn team_roster(&self) -> Vec<User> {
        let mut roster: IndexMap<&UserId, &User> = IndexMap::new();
        for user in self.projects.iter().flat_map(|p| p.team.iter()) {
            roster.entry(&user.id).or_insert(user);
        }
        roster.into_values().cloned().collect()
    }

    /// Look up a user on any project team
    #[must_use]
    pub fn user_by_id(&self, user_id: &UserId) -> Option<&User> {
        self.projects
            .iter()
            .flat_map(|p| p.team.iter())
            .find(|u| &u.id == user_id)
    }

    /// Every task in the tree, in project/phase/task order
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.projects
            .iter()
            .flat_map(|p| p.phases.iter())
            .flat_map(|ph| ph.tasks.iter())
    }

    fn locate_phase(&self, project_id: &ProjectId, phase_id: &PhaseId) -> Option<(usize, usize)> {
        let pi = self.projects.iter().position(|p| &p.id == project_id)?;
        let phi = self.projects[pi]
            .phases
            .iter()
            .position(|ph| &ph.id == phase_id)?;
        Some((pi, phi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample() -> Workspace {
        let at = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let owner = User::new("u1", "Sarah", Role::ProjectOwner);
        let dev = User::new("u2", "Omar", Role::Member);
        Workspace::new("ws", "Test")
            .with_project(
                Project::new("p1", "One", at, at)
                    .with_member(owner.clone())
                    .with_member(dev.clone())
                    .with_phase(
                        Phase::new("ph1", "Plan")
                            .with_task(Task::new("t1", "First", at))
                            .with_task(Task::new("t2", "Second", at)),
                    ),
            )
            .with_project(
                Project::new("p2", "Two", at, at)
                    .with_member(User::new("u2", "Omar (dup)", Role::TeamLeader))
                    .with_member(User::new("u3", "Aisha", Role::Member))
                    .with_phase(Phase::new("ph1", "Build")),
            )
    }

    #[test]
    fn find_task_by_path() {
        let ws = sample();
        let task = ws.find_task(&"p1".into(), &"ph1".into(), &"t2".into());
        assert_eq!(task.map(|t| t.title.as_str()), Some("Second"));
        assert!(ws.find_task(&"p2".into(), &"ph1".into(), &"t2".into()).is_none());
    }

    #[test]
    fn add_tasks_appends_in_order() {
        let mut ws = sample();
        let at = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        let added = ws.add_tasks(
            &"p1".into(),
            &"ph1".into(),
            vec![Task::new("t3", "Third", at), Task::new("t4", "Fourth", at)],
        );
        assert!(added);
        let ids: Vec<_> = ws.find_phase(&"p1".into(), &"ph1".into()).unwrap()
            .tasks
            .iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn add_tasks_to_unknown_phase_is_ignored() {
        let mut ws = sample();
        let before = ws.clone();
        let at = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        assert!(!ws.add_tasks(&"p1".into(), &"missing".into(), vec![Task::new("t9", "X", at)]));
        assert!(!ws.add_tasks(&"missing".into(), &"ph1".into(), vec![Task::new("t9", "X", at)]));
        assert_eq!(ws, before);
    }

    #[test]
    fn set_status_touches_only_the_addressed_task() {
        let mut ws = sample();
        let before = ws.clone();
        assert!(ws.set_task_status(&"p1".into(), &"ph1".into(), &"t1".into(), TaskStatus::Done));
        assert_eq!(
            ws.find_task(&"p1".into(), &"ph1".into(), &"t1".into()).unwrap().status,
            TaskStatus::Done
        );
        assert_eq!(
            ws.find_task(&"p1".into(), &"ph1".into(), &"t2".into()).unwrap().status,
            TaskStatus::ToDo
        );
        // the old snapshot is unaffected
        assert_eq!(
            before.find_task(&"p1".into(), &"ph1".into(), &"t1".into()).unwrap().status,
            TaskStatus::ToDo
        );
        assert_eq!(ws.projects[1], before.projects[1]);
    }

    #[test]
    fn set_status_on_unknown_task_is_ignored() {
        let mut ws = sample();
        let before = ws.clone();
        assert!(!ws.set_task_status(&"p1".into(), &"ph1".into(), &"nope".into(), TaskStatus::Done));
        assert_eq!(ws, before);
    }

    #[test]
    fn roster_dedupes_by_id_first_wins() {
        let roster = sample().team_roster();
        let names: Vec<_> = roster.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Sarah", "Omar", "Aisha"]);
        assert_eq!(roster[1].role, Role::Member);
    }

    #[test]
    fn all_tasks_walks_every_phase() {
        assert_eq!(sample().all_tasks().count(), 2);
    }
}
