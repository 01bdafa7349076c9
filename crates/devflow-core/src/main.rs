//! `devflow` command line
//!
//! Drives the dashboard engine over a directory-backed store: session
//! commands, the workload table, status changes, notifications and AI task
//! suggestions.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use devflow_core::{
    Action, Dashboard, DashboardPolicy, DevflowConfig, Dispatcher, GeminiSuggester, SessionState,
    Store, SuggestionRunner, SystemClock,
};
use devflow_model::{PhaseId, ProjectId, TaskId, TaskStatus, UserId};
use devflow_storage::{Database, FileStore, RecordKeys};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info";

fn cli() -> Command {
    Command::new("devflow")
        .version(devflow_core::VERSION)
        .about("DevFlow project dashboard")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value("devflow.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (TOML)"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the storage directory"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("init").about("Seed the demo workspace if storage is empty"))
        .subcommand(Command::new("users").about("List team members"))
        .subcommand(
            Command::new("login")
                .about("Log in as a team member")
                .arg(Arg::new("user").required(true).help("User id")),
        )
        .subcommand(Command::new("logout").about("End the session"))
        .subcommand(Command::new("whoami").about("Show the logged-in user"))
        .subcommand(
            Command::new("dashboard").about("Show team workload").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(
            Command::new("status")
                .about("Change a task's status")
                .arg(Arg::new("project").required(true))
                .arg(Arg::new("phase").required(true))
                .arg(Arg::new("task").required(true))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .help("todo | in-progress | done | blocked"),
                ),
        )
        .subcommand(
            Command::new("notifications")
                .about("List your notifications")
                .arg(
                    Arg::new("mark-read")
                        .long("mark-read")
                        .action(ArgAction::SetTrue)
                        .help("Mark notifications as read"),
                ),
        )
        .subcommand(
            Command::new("suggest")
                .about("Generate tasks for a phase with AI")
                .arg(Arg::new("project").required(true))
                .arg(Arg::new("phase").required(true)),
        )
}

fn arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{name}>"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Logging is up before the config loads; the configured filter is swapped
    // in afterwards unless RUST_LOG is set.
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_overrides = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER)));
    let logs = fmt::layer().with_writer(std::io::stderr);
    if matches.get_flag("log-json") {
        tracing_subscriber::registry().with(filter).with(logs.json()).init();
    } else {
        tracing_subscriber::registry().with(filter).with(logs).init();
    }

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("devflow.toml"));
    let config = DevflowConfig::load(&config_path)?;
    if !env_overrides {
        filter_handle
            .reload(EnvFilter::new(&config.log_filter))
            .context("applying log filter")?;
    }

    let storage_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| config.storage_dir.clone());
    let store = FileStore::open(&storage_dir)
        .with_context(|| format!("opening storage at {}", storage_dir.display()))?;
    let dispatcher = Dispatcher::new(
        Arc::new(Store::new()),
        Database::with_keys(store, RecordKeys::with_prefix(&config.key_prefix)),
        Arc::new(SystemClock),
    );

    let seeded = dispatcher.ensure_seeded()?;
    dispatcher.bootstrap()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            if seeded {
                println!("Seeded demo workspace in {}", storage_dir.display());
            } else {
                println!("Storage already initialized");
            }
        }
        Some(("users", _)) => {
            for user in dispatcher.db().users()? {
                println!("{:<8} {:<10} {}", user.id, user.name, user.role);
            }
        }
        Some(("login", args)) => {
            let user_id = UserId::from(arg(args, "user")?);
            let state = dispatcher.login(&user_id)?;
            if let Some(user) = &state.current_user {
                println!("Logged in as {} ({})", user.name, user.role);
            }
        }
        Some(("logout", _)) => {
            dispatcher.logout()?;
            println!("Logged out");
        }
        Some(("whoami", _)) => match dispatcher.session() {
            SessionState::LoggedIn(user) => println!("{} ({}, {})", user.name, user.id, user.role),
            SessionState::LoggedOut => println!("Not logged in"),
        },
        Some(("dashboard", args)) => {
            dispatcher.require_user()?;
            let dashboard = dispatcher.dashboard(DashboardPolicy::from(&config));
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_dashboard(&dashboard);
            }
        }
        Some(("status", args)) => {
            let actor = dispatcher.require_user()?;
            let project_id = ProjectId::from(arg(args, "project")?);
            let phase_id = PhaseId::from(arg(args, "phase")?);
            let task_id = TaskId::from(arg(args, "task")?);
            let status: TaskStatus = arg(args, "status")?.parse()?;

            let state = dispatcher.snapshot();
            let Some(task) = state
                .workspace
                .as_ref()
                .and_then(|ws| ws.find_task(&project_id, &phase_id, &task_id))
            else {
                println!("No task {task_id} in {project_id}/{phase_id}; nothing changed");
                return Ok(());
            };
            dispatcher.dispatch(Action::update_task_status(
                project_id.clone(),
                phase_id.clone(),
                task,
                status,
                &actor,
            ))?;
            println!("{} is now {status}", task.title);
        }
        Some(("notifications", args)) => {
            let user = dispatcher.require_user()?;
            let state = dispatcher.snapshot();
            if state.notifications.is_empty() {
                println!("No notifications");
            }
            for n in &state.notifications {
                let marker = if n.is_read { " " } else { "*" };
                println!("{marker} {} {}", n.timestamp.format("%Y-%m-%d %H:%M"), n.message);
            }
            if args.get_flag("mark-read") {
                dispatcher.dispatch(Action::MarkNotificationsRead { user_id: user.id })?;
            }
        }
        Some(("suggest", args)) => {
            dispatcher.require_user()?;
            let project_id = ProjectId::from(arg(args, "project")?);
            let phase_id = PhaseId::from(arg(args, "phase")?);
            let runner = SuggestionRunner::new(Arc::new(GeminiSuggester::from_config(&config.suggest)));
            println!("Generating...");
            let tasks = runner
                .generate_for_phase(&dispatcher, &project_id, &phase_id)
                .await?;
            if tasks.is_empty() {
                println!("No tasks were suggested");
            }
            for task in &tasks {
                println!(
                    "+ {} ({} days, {} → {})",
                    task.title,
                    task.duration_days,
                    task.start_date.format("%Y-%m-%d"),
                    task.due_date.format("%Y-%m-%d"),
                );
            }
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>6} {:>9}",
        "Member", "Open", "DueSoon", "Overdue", "Done", "Workload"
    );
    for row in &dashboard.members {
        println!(
            "{:<10} {:>8} {:>8} {:>8} {:>6} {:>8}%",
            row.member.name, row.assigned_tasks, row.due_soon, row.overdue, row.done_tasks, row.workload
        );
    }
    let t = &dashboard.totals;
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>6}",
        "Total", t.assigned_tasks, t.due_soon, t.overdue, t.done_tasks
    );
}
