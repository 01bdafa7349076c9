#![recursion_limit = "256"]
use chrono::Duration;
use devflow_core::{CoreError, ProposedTask, SuggestionRunner};
use devflow_model::{PhaseId, ProjectId, TaskId, TaskStatus};
use devflow_test_utils::{
    fixed_now, FailingSuggester, GatedSuggester, Harness, ScriptedSuggester, DEV, PHASE, PROJECT,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn ids() -> (ProjectId, PhaseId) {
    (ProjectId::from(PROJECT), PhaseId::from(PHASE))
}

#[tokio::test]
async fn proposals_are_chained_after_last_task() {
    let harness = Harness::logged_in(DEV);
    let runner = SuggestionRunner::new(Arc::new(ScriptedSuggester::with_durations(&[2, 3, 1])));
    let (project, phase) = ids();

    let tasks = runner
        .generate_for_phase(&harness.dispatcher, &project, &phase)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 3);

    // the phase's last task (t-done) is due three days before now
    let base = fixed_now() - Duration::days(3);
    let offsets: Vec<(i64, i64)> = tasks
        .iter()
        .map(|t| ((t.start_date - base).num_days(), (t.due_date - base).num_days()))
        .collect();
    assert_eq!(offsets, vec![(1, 3), (4, 7), (8, 9)]);

    assert_eq!(tasks[0].dependencies, vec![TaskId::from("t-done")]);
    assert_eq!(tasks[1].dependencies, vec![tasks[0].id.clone()]);
    assert_eq!(tasks[2].dependencies, vec![tasks[1].id.clone()]);
    for task in &tasks {
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.assignee_id.is_none());
        assert!(task.id.as_str().starts_with("task-gen-"));
    }

    let titles: Vec<String> = harness
        .db()
        .workspace()
        .unwrap()
        .unwrap()
        .find_phase(&project, &phase)
        .unwrap()
        .tasks
        .iter()
        .map(|t| t.title.clone())
        .collect();
    assert_eq!(
        titles,
        ["Write handlers", "Fix login", "Set up CI", "Task 1", "Task 2", "Task 3"]
    );
    assert_eq!(harness.task(tasks[2].id.as_str()), Some(tasks[2].clone()));
}

#[tokio::test]
async fn adapter_failure_yields_no_tasks() {
    let harness = Harness::logged_in(DEV);
    let writes = harness.kv.write_count();
    let before = harness.dispatcher.snapshot();
    let runner = SuggestionRunner::new(Arc::new(FailingSuggester));
    let (project, phase) = ids();

    let tasks = runner
        .generate_for_phase(&harness.dispatcher, &project, &phase)
        .await
        .unwrap();

    assert!(tasks.is_empty());
    assert_eq!(harness.kv.write_count(), writes);
    assert!(Arc::ptr_eq(&before, &harness.dispatcher.snapshot()));
    assert!(!runner.is_pending(&project, &phase));
}

#[tokio::test]
async fn empty_proposal_list_writes_nothing() {
    let harness = Harness::logged_in(DEV);
    let writes = harness.kv.write_count();
    let runner = SuggestionRunner::new(Arc::new(ScriptedSuggester::new(Vec::new())));
    let (project, phase) = ids();

    let tasks = runner
        .generate_for_phase(&harness.dispatcher, &project, &phase)
        .await
        .unwrap();
    assert!(tasks.is_empty());
    assert_eq!(harness.kv.write_count(), writes);
}

#[tokio::test]
async fn unknown_phase_skips_the_service() {
    let harness = Harness::logged_in(DEV);
    let suggester = Arc::new(ScriptedSuggester::with_durations(&[1]));
    let runner = SuggestionRunner::new(Arc::clone(&suggester) as Arc<dyn devflow_core::TaskSuggester>);

    let tasks = runner
        .generate_for_phase(&harness.dispatcher, &PROJECT.into(), &"phase-x".into())
        .await
        .unwrap();
    assert!(tasks.is_empty());
    assert_eq!(suggester.calls(), 0);
}

#[tokio::test]
async fn second_request_for_same_phase_is_rejected() {
    let harness = Arc::new(Harness::logged_in(DEV));
    let gated = Arc::new(GatedSuggester::new(vec![ProposedTask::new("Late task", "", 2)]));
    let runner = Arc::new(SuggestionRunner::new(
        Arc::clone(&gated) as Arc<dyn devflow_core::TaskSuggester>
    ));
    let (project, phase) = ids();

    let first = {
        let harness = Arc::clone(&harness);
        let runner = Arc::clone(&runner);
        let (project, phase) = (project.clone(), phase.clone());
        tokio::spawn(async move {
            runner
                .generate_for_phase(&harness.dispatcher, &project, &phase)
                .await
        })
    };

    gated.started.notified().await;
    assert!(runner.is_pending(&project, &phase));

    let err = runner
        .generate_for_phase(&harness.dispatcher, &project, &phase)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SuggestionInFlight { .. }));

    gated.release.notify_one();
    let tasks = first.await.unwrap().unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(!runner.is_pending(&project, &phase));
}

#[tokio::test]
async fn cancelled_request_frees_the_phase() {
    let harness = Harness::logged_in(DEV);
    let gated = Arc::new(GatedSuggester::new(vec![ProposedTask::new("Retried", "", 1)]));
    let runner = SuggestionRunner::new(Arc::clone(&gated) as Arc<dyn devflow_core::TaskSuggester>);
    let (project, phase) = ids();

    let outcome = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        runner.generate_for_phase(&harness.dispatcher, &project, &phase),
    )
    .await;
    assert!(outcome.is_err());
    assert!(!runner.is_pending(&project, &phase));
    assert_eq!(harness.dispatcher.snapshot(), Harness::logged_in(DEV).dispatcher.snapshot());

    gated.release.notify_one();
    let tasks = runner
        .generate_for_phase(&harness.dispatcher, &project, &phase)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Retried");
}

#[tokio::test]
async fn out_of_range_schedule_appends_nothing() {
    let harness = Harness::logged_in(DEV);
    let writes = harness.kv.write_count();
    let runner = SuggestionRunner::new(Arc::new(ScriptedSuggester::with_durations(&[
        2,
        4_000_000_000,
    ])));
    let (project, phase) = ids();

    let tasks = runner
        .generate_for_phase(&harness.dispatcher, &project, &phase)
        .await
        .unwrap();
    assert!(tasks.is_empty());
    assert_eq!(harness.kv.write_count(), writes);
    assert!(!runner.is_pending(&project, &phase));
}

#[test]
fn generation_future_can_be_spawned() {
    fn assert_send<T: Send>(_: &T) {}

    let harness = Harness::logged_in(DEV);
    let runner = SuggestionRunner::new(Arc::new(ScriptedSuggester::with_durations(&[1])));
    let (project, phase) = ids();
    let future = runner.generate_for_phase(&harness.dispatcher, &project, &phase);
    assert_send(&future);
}
