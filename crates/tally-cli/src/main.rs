use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tally_core::config::TallyConfig;
use tally_core::model::Project;
use tally_core::project;
use tally_core::report::{format_duration, truncate};
use tally_core::storage::SqliteStorage;

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Track AI coding-agent working time and prompt history",
    version
)]
enum Cli {
    /// Show AI working time statistics for a project
    Stats {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
        /// Path to database (default: XDG data dir)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Show recent prompt history for a project
    History {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
        /// Path to database (default: XDG data dir)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Number of prompts to show
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .compact()
        .init();

    match Cli::parse() {
        Cli::Stats { project, db } => run_stats(project, db),
        Cli::History { project, db, limit } => run_history(project, db, limit),
    }
}

/// Open the database and look up the project for the directory,
/// without creating anything.
fn open_project(
    project_dir: Option<PathBuf>,
    db: Option<PathBuf>,
) -> Result<(SqliteStorage, Option<Project>, PathBuf)> {
    let dir = match project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("get current directory")?,
    };
    let config = TallyConfig::load(Some(&dir)).unwrap_or_default();
    let db_path = config.db_path(db.as_deref())?;
    tracing::debug!("using database at {}", db_path.display());
    let storage = SqliteStorage::open(&db_path)
        .with_context(|| format!("open database at {}", db_path.display()))?;
    let found = project::find(&storage, &dir).context("find project")?;
    Ok((storage, found, dir))
}

fn print_unknown_project(dir: &Path) {
    println!("No project found for {}", dir.display());
    println!("Run an AI agent in this directory first to start tracking.");
}

fn run_stats(project_dir: Option<PathBuf>, db: Option<PathBuf>) -> Result<()> {
    let (storage, found, dir) = open_project(project_dir, db)?;
    let Some(proj) = found else {
        print_unknown_project(&dir);
        return Ok(());
    };

    let stats = storage.project_stats(proj.id).context("query stats")?;

    match proj.display_origin() {
        Some(origin) => println!(
            "{} {} ({origin})",
            "Project:".bold(),
            proj.short_name()
        ),
        None => println!("{} {}", "Project:".bold(), proj.short_name()),
    }
    if let Some(origin) = &proj.git_origin {
        println!("{}            {origin}", "Git origin:".dimmed());
    }
    println!("{}              {}", "Sessions:".dimmed(), stats.sessions);
    println!(
        "{}         {}",
        "Total prompts:".dimmed(),
        stats.total_prompts
    );
    println!(
        "{} {}",
        "Total AI working time:".dimmed(),
        format_duration(stats.total_seconds)
    );
    if let Some(avg) = stats.average_seconds() {
        println!(
            "{}    {}",
            "Average per prompt:".dimmed(),
            format_duration(avg)
        );
    }
    if let Some(period) = stats.period() {
        println!("{}           {period}", "Time period:".dimmed());
    }

    Ok(())
}

fn run_history(project_dir: Option<PathBuf>, db: Option<PathBuf>, limit: usize) -> Result<()> {
    let (storage, found, dir) = open_project(project_dir, db)?;
    let Some(proj) = found else {
        print_unknown_project(&dir);
        return Ok(());
    };

    let rows = storage
        .prompt_history(proj.id, limit)
        .context("query history")?;
    if rows.is_empty() {
        println!("No prompts recorded yet.");
        return Ok(());
    }

    // Column widths: #, Time, Duration.
    println!(
        "{}",
        format!("{:<5}  {:<19}  {:<10}  {}", "#", "Time", "Duration", "Prompt").bold()
    );
    println!(
        "{}  {}  {}  {}",
        "-".repeat(5),
        "-".repeat(19),
        "-".repeat(10),
        "-".repeat(47)
    );

    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:<5}  {:<19}  {:<10}  {}",
            i + 1,
            row.submitted_at,
            row.display_duration(),
            truncate(&row.prompt_text, 60)
        );
    }

    Ok(())
}
