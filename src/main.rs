use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use studypal_lib::config::Settings;
use studypal_lib::logging::init_logging;
use studypal_lib::planner::{Adaptation, AdaptationQuality, KnowledgeLevel};
use studypal_lib::tasks::Priority;
use studypal_lib::SessionContext;

#[derive(Parser)]
#[command(name = "studypal")]
#[command(about = "Track study performance and adapt study plans", long_about = None)]
struct Cli {
    /// User whose data to work with
    #[arg(long, short, global = true, env = "STUDYPAL_USER", default_value = "default")]
    user: String,
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a quiz score
    Quiz {
        topic: String,
        score: f64,
        #[arg(long, default_value_t = 100.0)]
        max_score: f64,
    },
    /// Record a completed task
    Task {
        task_id: String,
        name: String,
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
    },
    /// Record a study session
    Session {
        minutes: f64,
        /// Topics covered (repeatable)
        #[arg(long = "topic")]
        topics: Vec<String>,
    },
    /// Print the full performance report
    Report {
        /// Planned task count for the completion rate
        #[arg(long)]
        total_tasks: Option<usize>,
    },
    /// Print study recommendations
    Recommend,
    /// Erase all recorded performance data
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Manage the to-do list
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// Create, inspect and adapt study plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
enum TodoCommands {
    Add {
        name: String,
        #[arg(long, default_value_t = 1.0)]
        hours: f64,
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// Mark a task done (also records it as a completed task)
    Complete { id: String },
    Delete { id: String },
    List {
        /// Only show pending tasks
        #[arg(long)]
        pending: bool,
    },
    /// Add the subtasks of a saved plan (latest plan when omitted)
    Import { plan: Option<String> },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Generate and save a new plan
    Create {
        goal: String,
        /// Target date, YYYY-MM-DD
        #[arg(long)]
        deadline: NaiveDate,
        #[arg(long, default_value_t = 2.0)]
        daily_hours: f64,
        #[arg(long, default_value = "beginner")]
        level: KnowledgeLevel,
    },
    List,
    Show { file: String },
    Delete { file: String },
    /// Suggest revisions from the quizzes matching the plan's goal
    Adapt { file: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_adaptation(adaptation: &Adaptation) -> anyhow::Result<()> {
    if let AdaptationQuality::Degraded { reason } = adaptation.quality {
        eprintln!(
            "LOW CONFIDENCE: the generation service did not return structured suggestions ({:?}); showing what was received",
            reason
        );
    }
    print_json(adaptation)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    init_logging(&settings.logging);
    tracing::info!(user = %cli.user, "studypal starting");

    let mut session = SessionContext::open(settings, &cli.user)
        .await
        .with_context(|| format!("failed to open session for '{}'", cli.user))?;

    match cli.command {
        Commands::Quiz { topic, score, max_score } => {
            let entry = session.performance.record_quiz_score(&topic, score, max_score).await?;
            print_json(&entry)?;
        }
        Commands::Task { task_id, name, hours } => {
            let entry = session.performance.record_task_completion(&task_id, &name, hours).await?;
            print_json(&entry)?;
        }
        Commands::Session { minutes, topics } => {
            let entry = session.performance.record_study_session(minutes, topics).await?;
            print_json(&entry)?;
        }
        Commands::Report { total_tasks } => {
            print_json(&session.report(total_tasks))?;
        }
        Commands::Recommend => {
            for line in session.performance.get_recommendations() {
                println!("- {line}");
            }
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear data without --yes");
            }
            session.performance.clear_data().await?;
            println!("Performance data cleared for {}.", session.user_id());
        }
        Commands::Todo { command } => run_todo(&mut session, command).await?,
        Commands::Plan { command } => run_plan(&mut session, command).await?,
    }

    Ok(())
}

async fn run_todo(session: &mut SessionContext, command: TodoCommands) -> anyhow::Result<()> {
    match command {
        TodoCommands::Add { name, hours, priority } => {
            let task = session.todos.add_task(&name, hours, priority).await?;
            print_json(&task)?;
        }
        TodoCommands::Complete { id } => {
            if !session.complete_todo(&id).await? {
                anyhow::bail!("no pending task with id {id}");
            }
            println!("Task {id} completed.");
        }
        TodoCommands::Delete { id } => {
            if !session.todos.delete_task(&id).await? {
                anyhow::bail!("no task with id {id}");
            }
            println!("Task {id} deleted.");
        }
        TodoCommands::List { pending } => {
            if pending {
                print_json(&session.todos.pending())?;
            } else {
                print_json(&session.todos.tasks())?;
            }
            print_json(&session.todos.completion_stats())?;
        }
        TodoCommands::Import { plan } => {
            let stored = match plan {
                Some(file) => session
                    .plans
                    .load(&file)
                    .await?
                    .with_context(|| format!("plan {file} not found"))?,
                None => {
                    session
                        .plans
                        .latest()
                        .await?
                        .context("no saved plans; create one with `plan create`")?
                        .1
                }
            };
            let imported = session.todos.import_from_study_plan(&stored.plan).await?;
            println!("Imported {imported} tasks from study plan.");
        }
    }
    Ok(())
}

async fn run_plan(session: &mut SessionContext, command: PlanCommands) -> anyhow::Result<()> {
    match command {
        PlanCommands::Create { goal, deadline, daily_hours, level } => {
            session.connect()?;
            let today = Local::now().date_naive();
            let (file_name, plan) = session
                .create_plan(&goal, deadline, daily_hours, level, today)
                .await?;
            print_json(&plan)?;
            println!("Saved as {file_name}");
        }
        PlanCommands::List => {
            let plans = session.plans.list().await?;
            if plans.is_empty() {
                println!("No saved plans.");
            }
            for entry in plans {
                println!("{}  {}", entry.label, entry.file_name);
            }
        }
        PlanCommands::Show { file } => {
            let plan = session
                .plans
                .load(&file)
                .await?
                .with_context(|| format!("plan {file} not found"))?;
            print_json(&plan)?;
        }
        PlanCommands::Delete { file } => {
            if !session.plans.delete(&file).await? {
                anyhow::bail!("plan {file} not found");
            }
            println!("Plan {file} deleted.");
        }
        PlanCommands::Adapt { file } => {
            session.connect()?;
            let adaptation = session.adapt_saved_plan(&file).await?;
            print_adaptation(&adaptation)?;
        }
    }
    Ok(())
}
