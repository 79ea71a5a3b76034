use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use todo_list::config::Config;
use todo_list::{JsonFileStore, NewTask, Priority, Task, TaskId, TaskManager};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Keep a to-do list in a JSON file")]
struct Cli {
    /// Task store to use instead of the configured one
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Configuration file (defaults to ./todo.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value_t = Priority::Low)]
        priority: Priority,
        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    /// List all tasks
    List,
    /// Change the title or description of a task
    Edit {
        id: TaskId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a task after confirmation
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Mark a task completed, or active again
    Toggle { id: TaskId },
}

fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

fn main() -> ExitCode {
    let args = Cli::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<todo_list::Error>() {
                Some(inner) if inner.is_validation() => eprintln!("warning: {}", inner),
                _ => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref())?;
    init_tracing(&config, args.verbose)?;

    let path = args.file.unwrap_or(config.store_path);
    debug!(path = %path.display(), "Opening task store");
    let mut manager = TaskManager::open(JsonFileStore::new(path))?;

    match args.command {
        Commands::Add {
            title,
            description,
            priority,
            due,
        } => {
            let draft = NewTask::new(title)
                .description(description)
                .priority(priority)
                .due_date(due);
            let task = manager.add(draft)?;
            println!("Task added with ID {}", task.id());
        }
        Commands::List => {
            if manager.tasks().is_empty() {
                println!("No tasks.");
            }
            for task in manager.tasks() {
                print!("{}", render(task));
            }
        }
        Commands::Edit {
            id,
            title,
            description,
        } => {
            let current = manager.get(id).ok_or(todo_list::Error::TaskNotFound(id))?;
            let title = title.unwrap_or_else(|| current.title().to_string());
            let description = description.unwrap_or_else(|| current.description().to_string());
            manager.edit(id, &title, &description)?;
            println!("Task {} updated", id);
        }
        Commands::Delete { id, yes } => {
            let task = manager.get(id).ok_or(todo_list::Error::TaskNotFound(id))?;
            if !yes && !confirm_delete(task)? {
                println!("Deletion cancelled");
                return Ok(());
            }
            manager.delete(id)?;
            println!("Task {} deleted", id);
        }
        Commands::Toggle { id } => {
            let task = manager.toggle_completion(id)?;
            let state = if task.is_completed() {
                "completed"
            } else {
                "active"
            };
            println!("Task {} marked {}", id, state);
        }
    };

    Ok(())
}

fn init_tracing(config: &Config, verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => config.log_level()?,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn confirm_delete(task: &Task) -> anyhow::Result<bool> {
    print!(
        "Are you sure you want to delete task '{}'? [y/N] ",
        task.title()
    );
    io::stdout().flush().context("cannot write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("cannot read confirmation")?;
    println!();
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn render(task: &Task) -> String {
    let mark = if task.is_completed() { 'x' } else { ' ' };
    let mut line = format!("{:>3} [{}] {} ({}", task.id(), mark, task.title(), task.priority());
    if let Some(due) = task.due_date() {
        let _ = write!(line, ", due {}", due);
    }
    line.push_str(")\n");
    if !task.description().is_empty() {
        let _ = writeln!(line, "        {}", task.description());
    }
    line
}
