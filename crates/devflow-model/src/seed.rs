//! Demo dataset used to seed an empty store on first run.

use crate::types::{Phase, Project, Role, Task, TaskStatus, User, Workspace};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// The five demo team members
#[must_use]
pub fn demo_users() -> Vec<User> {
    [
        ("user-1", "Sarah", Role::ProjectOwner),
        ("user-2", "Omar", Role::TeamLeader),
        ("user-3", "Khaled", Role::Member),
        ("user-4", "Aisha", Role::Member),
        ("user-5", "Fatima", Role::ViewOnly),
    ]
    .into_iter()
    .map(|(id, name, role)| {
        User::new(id, name, role)
            .with_avatar(format!("https://i.pravatar.cc/150?u={}", name.to_lowercase()))
    })
    .collect()
}

/// Demo workspace; a few due dates are relative to `now` so every dashboard bucket is populated
#[must_use]
pub fn demo_workspace(now: DateTime<Utc>) -> Workspace {
    let tomorrow = now + Duration::days(1);
    let yesterday = now - Duration::days(1);

    let discovery = Phase::new("phase-1", "Phase 1: Discovery & Planning")
        .with_task(
            Task::new("task-1-1", "Market Research", date(2024, 8, 1))
                .with_description("Analyze competitor landscape and target audience.")
                .with_status(TaskStatus::Done)
                .assigned_to("user-1")
                .scheduled(date(2024, 8, 1), date(2024, 8, 5), 5),
        )
        .with_task(
            Task::new("task-1-2", "Define MVP Features", date(2024, 8, 6))
                .with_description("Finalize the feature list for the first release.")
                .with_status(TaskStatus::Done)
                .assigned_to("user-2")
                .scheduled(date(2024, 8, 6), date(2024, 8, 10), 5)
                .depends_on("task-1-1"),
        );

    let design = Phase::new("phase-2", "Phase 2: UI/UX Design")
        .with_task(
            Task::new("task-2-1", "Create Wireframes", date(2024, 8, 11))
                .with_description("Low-fidelity layouts for all major screens.")
                .with_status(TaskStatus::Done)
                .assigned_to("user-4")
                .scheduled(date(2024, 8, 11), date(2024, 8, 15), 5)
                .depends_on("task-1-2"),
        )
        .with_task(
            Task::new("task-2-2", "High-Fidelity Mockups", date(2024, 8, 16))
                .with_description("Design pixel-perfect mockups in Figma.")
                .with_status(TaskStatus::InProgress)
                .assigned_to("user-4")
                .scheduled(date(2024, 8, 16), now + Duration::days(2), 7)
                .depends_on("task-2-1"),
        )
        .with_task(
            Task::new("task-2-3", "Prototype User Flows", date(2024, 8, 23))
                .with_description("Create an interactive prototype for user testing.")
                .assigned_to("user-3")
                .scheduled(date(2024, 8, 23), now + Duration::days(5), 5)
                .depends_on("task-2-2"),
        );

    let frontend = Phase::new("phase-3", "Phase 3: Frontend Development")
        .with_task(
            Task::new("task-3-1", "Setup Project Structure", date(2024, 8, 28))
                .with_description("Initialize repository and configure build tools.")
                .assigned_to("user-3")
                .scheduled(date(2024, 8, 28), tomorrow, 2)
                .depends_on("task-2-3"),
        )
        .with_task(
            Task::new("task-3-2", "Overdue Task Example", yesterday)
                .with_description("This task is intentionally overdue for demo.")
                .with_status(TaskStatus::InProgress)
                .assigned_to("user-3")
                .scheduled(yesterday, yesterday, 2),
        );

    let project = demo_users().into_iter().fold(
        Project::new(
            "proj-1",
            "NextGen E-commerce Platform",
            date(2024, 8, 1),
            date(2024, 10, 30),
        )
        .with_description("A scalable and modern e-commerce solution for our new client."),
        Project::with_member,
    );

    Workspace::new("ws-1", "Phoenix Digital").with_project(
        project
            .with_phase(discovery)
            .with_phase(design)
            .with_phase(frontend),
    )
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::MIN_UTC, |dt| dt.and_utc())
}
