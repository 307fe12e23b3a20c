use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use std::path::PathBuf;
use taskpad::{FileStorage, SqliteStorage, Storage, Task, TaskId, TaskStore};

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "Taskpad CLI - local task list with durable key-value persistence")]
#[command(version)]
struct Cli {
    /// Path to the store directory (default: platform data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Persistence backend
    #[arg(long, value_enum, default_value_t = Backend::Sqlite)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Sqlite,
    File,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new pending task
    Add {
        /// Task title
        title: String,
    },

    /// List tasks, newest first
    List,

    /// Mark the task at the given list position as done
    Done { position: usize },

    /// Mark the task at the given list position as pending again
    Todo { position: usize },

    /// Delete the task at the given list position
    Remove { position: usize },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let store_path = match cli.store_path {
        Some(path) => path,
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskpad"),
    };
    std::fs::create_dir_all(&store_path).context("Failed to create store directory")?;

    match cli.backend {
        Backend::Sqlite => {
            let storage = SqliteStorage::open(store_path.join("taskpad.db"))?;
            run(TaskStore::open(storage)?, cli.command)
        }
        Backend::File => {
            let storage = FileStorage::open(&store_path)?;
            run(TaskStore::open(storage)?, cli.command)
        }
    }
}

fn run<S: Storage>(store: TaskStore<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Add { title } => {
            let tasks = store.add(title)?;
            println!("Added. {} task(s) total.", tasks.len());
        }
        Commands::List => {
            print_tasks(&store.tasks());
        }
        Commands::Done { position } => {
            let id = id_at(&store.tasks(), position)?;
            let tasks = store.set_status(&id, true)?;
            print_tasks(&tasks);
        }
        Commands::Todo { position } => {
            let id = id_at(&store.tasks(), position)?;
            let tasks = store.set_status(&id, false)?;
            print_tasks(&tasks);
        }
        Commands::Remove { position } => {
            let id = id_at(&store.tasks(), position)?;
            let tasks = store.remove(&id)?;
            println!("Removed. {} task(s) left.", tasks.len());
        }
    }

    Ok(())
}

/// Resolve a 1-based list position (as printed by `list`) to a task id
fn id_at(tasks: &[Task], position: usize) -> Result<TaskId> {
    let index = position
        .checked_sub(1)
        .ok_or_else(|| eyre!("Positions start at 1"))?;
    tasks
        .get(index)
        .map(Task::id)
        .ok_or_else(|| eyre!("No task at position {} ({} task(s) listed)", position, tasks.len()))
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    for (i, task) in tasks.iter().enumerate() {
        let marker = if task.status { "[x]".green() } else { "[ ]".normal() };
        let title = if task.status {
            task.title.strikethrough().green()
        } else {
            task.title.normal()
        };
        println!("{:>3}. {} {} {}", i + 1, marker, title, task.timestamp.dimmed());
    }
}
