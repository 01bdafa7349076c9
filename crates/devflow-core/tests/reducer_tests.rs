#![recursion_limit = "256"]
use devflow_core::{reduce, Action, AppState};
use devflow_model::{
    Notification, NotificationType, PhaseId, ProjectId, Task, TaskId, TaskStatus,
};
use devflow_test_utils::{developer, fixed_now, owner, project_workspace, PHASE, PROJECT};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn loaded(notifications: Vec<Notification>) -> AppState {
    reduce(
        &AppState::new(),
        Action::SetInitialState {
            workspace: project_workspace(fixed_now()),
            notifications,
            current_user: developer(),
        },
    )
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_unknown_task_id_leaves_state_unchanged(
        suffix in "[a-z0-9]{1,10}",
        status in status_strategy(),
    ) {
        let state = loaded(Vec::new());
        let next = reduce(&state, Action::UpdateTaskStatus {
            project_id: ProjectId::from(PROJECT),
            phase_id: PhaseId::from(PHASE),
            task_id: TaskId::from(format!("missing-{suffix}")),
            status,
            task_title: "ghost".to_string(),
            actor: developer(),
        });
        prop_assert_eq!(next, state);
    }

    #[test]
    fn prop_unknown_phase_rejects_new_tasks(phase in "[a-z]{1,12}") {
        let state = loaded(Vec::new());
        let next = reduce(&state, Action::AddTasks {
            project_id: ProjectId::from(PROJECT),
            phase_id: PhaseId::from(format!("nope-{phase}")),
            tasks: vec![Task::new("t-new", "New", fixed_now())],
        });
        prop_assert_eq!(next, state);
    }

    #[test]
    fn prop_status_change_touches_only_the_target(status in status_strategy()) {
        let state = loaded(Vec::new());
        let next = reduce(&state, Action::UpdateTaskStatus {
            project_id: ProjectId::from(PROJECT),
            phase_id: PhaseId::from(PHASE),
            task_id: TaskId::from("t-open"),
            status,
            task_title: "Write handlers".to_string(),
            actor: developer(),
        });

        let before = state.workspace.as_ref().unwrap();
        let after = next.workspace.as_ref().unwrap();
        for (old, new) in before.all_tasks().zip(after.all_tasks()) {
            if old.id == "t-open" {
                prop_assert_eq!(new.status, status);
                prop_assert_eq!(&new.title, &old.title);
            } else {
                prop_assert_eq!(new, old);
            }
        }
    }
}

#[test]
fn earlier_snapshot_survives_later_updates() {
    let state = loaded(Vec::new());
    let next = reduce(
        &state,
        Action::update_task_status(
            PROJECT,
            PHASE,
            &Task::new("t-open", "Write handlers", fixed_now()),
            TaskStatus::Done,
            &developer(),
        ),
    );

    let id = (ProjectId::from(PROJECT), PhaseId::from(PHASE), TaskId::from("t-open"));
    let old = state.workspace.as_ref().unwrap().find_task(&id.0, &id.1, &id.2).unwrap();
    let new = next.workspace.as_ref().unwrap().find_task(&id.0, &id.1, &id.2).unwrap();
    assert_eq!(old.status, TaskStatus::ToDo);
    assert_eq!(new.status, TaskStatus::Done);
}

#[test]
fn appended_tasks_follow_existing_ones() {
    let state = loaded(Vec::new());
    let next = reduce(
        &state,
        Action::AddTasks {
            project_id: PROJECT.into(),
            phase_id: PHASE.into(),
            tasks: vec![
                Task::new("t-a", "A", fixed_now()),
                Task::new("t-b", "B", fixed_now()),
            ],
        },
    );
    let phase = next
        .workspace
        .as_ref()
        .unwrap()
        .find_phase(&PROJECT.into(), &PHASE.into())
        .unwrap();
    let ids: Vec<&str> = phase.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t-open", "t-late", "t-done", "t-a", "t-b"]);
}

#[test]
fn new_notification_goes_first() {
    let older = Notification::new(NotificationType::DailyPlan, "plan", developer().id, fixed_now());
    let state = loaded(vec![older.clone()]);
    let fresh = Notification::new(NotificationType::TaskStart, "start", developer().id, fixed_now());
    let next = reduce(&state, Action::AddNotification(fresh.clone()));

    assert_eq!(next.notifications.len(), 2);
    assert_eq!(next.notifications[0], fresh);
    assert_eq!(next.notifications[1], older);
}

#[test]
fn mark_read_marks_every_loaded_notification_including_other_users() {
    let mine = Notification::new(NotificationType::DeadlineSoon, "soon", developer().id, fixed_now());
    let theirs = Notification::new(NotificationType::TaskOverdue, "late", owner().id, fixed_now());
    let state = loaded(vec![mine, theirs]);
    assert_eq!(state.unread_count(), 2);

    let next = reduce(
        &state,
        Action::MarkNotificationsRead {
            user_id: developer().id,
        },
    );
    assert_eq!(next.unread_count(), 0);
}

#[test]
fn mark_read_without_session_is_ignored() {
    let state = AppState {
        notifications: vec![Notification::new(
            NotificationType::DailyPlan,
            "plan",
            developer().id,
            fixed_now(),
        )]
        .into_iter()
        .collect(),
        ..AppState::new()
    };
    let next = reduce(
        &state,
        Action::MarkNotificationsRead {
            user_id: developer().id,
        },
    );
    assert_eq!(next, state);
}

#[test]
fn logout_keeps_workspace_and_notifications() {
    let note = Notification::new(NotificationType::DailyPlan, "plan", developer().id, fixed_now());
    let state = loaded(vec![note]);
    let next = reduce(&state, Action::Logout);

    assert!(next.current_user.is_none());
    assert!(next.is_initialized);
    assert_eq!(next.workspace, state.workspace);
    assert_eq!(next.notifications, state.notifications);
}
