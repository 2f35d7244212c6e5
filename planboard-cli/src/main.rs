use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use planboard_core::{
    parse_local_to_utc, Engineer, EngineerRef, EngineerService, ExperienceLevel, Milestone,
    MilestoneService, Task, TaskService,
};
use planboard_store::FileStore;

mod home;

#[derive(Parser, Debug)]
#[command(name = "planboard", version, about = "Single-project engineer/task/milestone tracker")]
struct Cli {
    /// Data directory (default: ~/.planboard)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// IANA timezone for date arguments like "2026-05-20 17:00"
    #[arg(long, global = true, default_value = "UTC")]
    tz: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Engineer CRUD
    Engineer {
        #[command(subcommand)]
        command: EngineerCommand,
    },

    /// Task CRUD and lifecycle
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Milestone CRUD and rollups
    Milestone {
        #[command(subcommand)]
        command: MilestoneCommand,
    },

    /// Truncate every table in the data directory
    Reset,
}

#[derive(Subcommand, Debug)]
enum EngineerCommand {
    /// Register an engineer
    Add {
        id: u32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_level, default_value = "beginner")]
        level: ExperienceLevel,
        #[arg(long, default_value_t = 0.0)]
        cost: f64,
    },

    /// Show one engineer (with the task assigned to them, if any)
    Show {
        id: u32,
        #[arg(long)]
        json: bool,
    },

    /// List all engineers
    List {
        #[arg(long)]
        json: bool,
    },

    /// Delete an engineer, clearing any task that references them
    Rm { id: u32 },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Register a task
    Add {
        id: u32,
        #[arg(long)]
        alias: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Deadline, e.g. "2026-05-20 17:00"
        #[arg(long)]
        deadline: Option<String>,
        /// Tasks this one depends on
        #[arg(long = "depends-on", value_delimiter = ',')]
        depends_on: Vec<u32>,
    },

    /// Show one task
    Show {
        id: u32,
        #[arg(long)]
        json: bool,
    },

    /// List all tasks (milestone-flagged records never appear here)
    List {
        #[arg(long)]
        json: bool,
    },

    /// Delete a task
    Rm { id: u32 },

    /// Set the scheduled date (and optionally a forecast date)
    Schedule {
        id: u32,
        date: String,
        #[arg(long)]
        forecast: Option<String>,
    },

    /// Mark work started
    Start {
        id: u32,
        /// Defaults to now
        date: Option<String>,
    },

    /// Mark work complete
    Done {
        id: u32,
        /// Defaults to now
        date: Option<String>,
    },

    /// Assign an engineer to a task
    Assign { id: u32, engineer: u32 },
}

#[derive(Subcommand, Debug)]
enum MilestoneCommand {
    /// Register a milestone
    Add {
        id: u32,
        #[arg(long)]
        alias: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        deadline: Option<String>,
        /// Tasks this milestone depends on
        #[arg(long = "depends-on", value_delimiter = ',')]
        depends_on: Vec<u32>,
    },

    /// Show one milestone with its rollups
    Show {
        id: u32,
        #[arg(long)]
        json: bool,
    },

    /// List all milestones
    List {
        #[arg(long)]
        json: bool,
    },

    /// Delete a milestone and its dependency edges
    Rm { id: u32 },
}

fn parse_level(s: &str) -> Result<ExperienceLevel, String> {
    match s {
        "beginner" => Ok(ExperienceLevel::Beginner),
        "advanced-beginner" => Ok(ExperienceLevel::AdvancedBeginner),
        "intermediate" => Ok(ExperienceLevel::Intermediate),
        "advanced" => Ok(ExperienceLevel::Advanced),
        "expert" => Ok(ExperienceLevel::Expert),
        other => Err(format!(
            "unknown level '{other}' (beginner, advanced-beginner, intermediate, advanced, expert)"
        )),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let dir = home::resolve_data_dir(cli.data_dir.clone())?;
    let mut store = FileStore::open(&dir)?;

    match cli.command {
        Command::Engineer { command } => run_engineer(command, &mut store)?,
        Command::Task { command } => run_task(command, &mut store, &cli.tz)?,
        Command::Milestone { command } => run_milestone(command, &mut store, &cli.tz)?,
        Command::Reset => {
            store.reset()?;
            println!("reset {}", dir.display());
        }
    }

    Ok(())
}

fn run_engineer(command: EngineerCommand, store: &mut FileStore) -> Result<()> {
    let mut svc = EngineerService::new(store);
    match command {
        EngineerCommand::Add { id, name, email, level, cost } => {
            let engineer = Engineer::new(id, name, email).with_level(level).with_cost(cost);
            svc.create(&engineer)?;
            println!("engineer {id} created");
        }
        EngineerCommand::Show { id, json } => {
            let engineer = svc.read(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&engineer)?);
            } else {
                print_engineer(&engineer);
            }
        }
        EngineerCommand::List { json } => {
            let all = svc.read_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                for engineer in &all {
                    print_engineer(engineer);
                }
            }
        }
        EngineerCommand::Rm { id } => {
            svc.delete(id)?;
            println!("engineer {id} deleted");
        }
    }
    Ok(())
}

fn run_task(command: TaskCommand, store: &mut FileStore, tz: &str) -> Result<()> {
    let mut svc = TaskService::new(store);
    match command {
        TaskCommand::Add { id, alias, description, deadline, depends_on } => {
            let mut task = Task::new(id, alias)
                .with_description(description)
                .with_depends_on(depends_on);
            if let Some(raw) = deadline {
                task.deadline = Some(parse_local_to_utc(&raw, tz)?);
            }
            svc.create(&task)?;
            println!("task {id} created");
        }
        TaskCommand::Show { id, json } => {
            let task = fetch_task(&svc, id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                print_task(&task);
            }
        }
        TaskCommand::List { json } => {
            let all = svc.read_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                for task in &all {
                    print_task(task);
                }
            }
        }
        TaskCommand::Rm { id } => {
            svc.delete(id)?;
            println!("task {id} deleted");
        }
        TaskCommand::Schedule { id, date, forecast } => {
            let mut task = fetch_task(&svc, id)?;
            task.scheduled = Some(parse_local_to_utc(&date, tz)?);
            task.forecast = match forecast {
                Some(raw) => Some(parse_local_to_utc(&raw, tz)?),
                None => task.forecast,
            };
            svc.update(&task)?;
            println!("task {id} scheduled for {}", fmt_date(task.scheduled));
        }
        TaskCommand::Start { id, date } => {
            let mut task = fetch_task(&svc, id)?;
            task.start = Some(parse_or_now(date.as_deref(), tz)?);
            svc.update(&task)?;
            println!("task {id} started");
        }
        TaskCommand::Done { id, date } => {
            let mut task = fetch_task(&svc, id)?;
            task.complete = Some(parse_or_now(date.as_deref(), tz)?);
            svc.update(&task)?;
            println!("task {id} complete");
        }
        TaskCommand::Assign { id, engineer } => {
            let mut task = fetch_task(&svc, id)?;
            task.engineer = Some(EngineerRef { id: engineer, name: String::new() });
            svc.update(&task)?;
            println!("task {id} assigned to engineer {engineer}");
        }
    }
    Ok(())
}

fn run_milestone(command: MilestoneCommand, store: &mut FileStore, tz: &str) -> Result<()> {
    let mut svc = MilestoneService::new(store);
    match command {
        MilestoneCommand::Add { id, alias, description, deadline, depends_on } => {
            let mut milestone = Milestone::new(id, alias).with_description(description);
            if let Some(raw) = deadline {
                milestone.deadline = Some(parse_local_to_utc(&raw, tz)?);
            }
            for task_id in depends_on {
                milestone = milestone.with_dependency(task_id);
            }
            svc.create(&milestone)?;
            println!("milestone {id} created");
        }
        MilestoneCommand::Show { id, json } => {
            let milestone = svc
                .read(id)?
                .with_context(|| format!("record {id} is a plain task, not a milestone"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&milestone)?);
            } else {
                print_milestone(&milestone);
            }
        }
        MilestoneCommand::List { json } => {
            let all = svc.read_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                for milestone in &all {
                    print_milestone(milestone);
                }
            }
        }
        MilestoneCommand::Rm { id } => {
            svc.delete(id)?;
            println!("milestone {id} deleted");
        }
    }
    Ok(())
}

fn fetch_task(svc: &TaskService<'_, FileStore>, id: u32) -> Result<Task> {
    svc.read(id)?
        .with_context(|| format!("record {id} is milestone-flagged, not a plain task"))
}

fn parse_or_now(raw: Option<&str>, tz: &str) -> Result<DateTime<Utc>> {
    match raw {
        Some(s) => parse_local_to_utc(s, tz),
        None => Ok(Utc::now()),
    }
}

fn fmt_date(d: Option<DateTime<Utc>>) -> String {
    d.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_engineer(e: &Engineer) {
    let task = e
        .task
        .as_ref()
        .map(|t| format!("{} ({})", t.alias, t.id))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<4} {:<20} {:<18} cost {:<8} task {}",
        e.id,
        e.name,
        e.level.as_str(),
        e.cost,
        task
    );
}

fn print_task(t: &Task) {
    let engineer = t
        .engineer
        .as_ref()
        .map(|e| format!("{} ({})", e.name, e.id))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<4} {:<20} {:<12} scheduled {:<16} forecast {:<16} engineer {}",
        t.id,
        t.alias,
        t.status.as_str(),
        fmt_date(t.scheduled),
        fmt_date(t.forecast),
        engineer
    );
}

fn print_milestone(m: &Milestone) {
    let completion = m
        .completion_percentage
        .map(|p| format!("{p:.0}%"))
        .unwrap_or_else(|| "-".to_string());
    let deps: Vec<String> = m.dependencies.iter().map(|d| format!("{}:{}", d.id, d.alias)).collect();
    println!(
        "#{:<4} {:<20} {:<12} done {:<5} forecast {:<16} deps [{}]",
        m.id,
        m.alias,
        m.status.as_str(),
        completion,
        fmt_date(m.forecast),
        deps.join(", ")
    );
}
