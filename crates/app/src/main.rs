use std::fmt;

use clap::{Args, Parser, Subcommand};
use classroom_core::model::{ClassId, ContainerProgress, StatusFilter, StudentId, TeacherId};
use classroom_core::stats::SkillInsight;
use services::{AppServices, Clock, StudentDashboard};
use storage::seed::seed_demo;

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Student progress reports over a classroom database.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database URL or file path.
    #[arg(
        long = "db",
        global = true,
        env = "CLASSROOM_DB_URL",
        default_value = "sqlite://classroom.sqlite3"
    )]
    db_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Per-unit progress for a student.
    Progress {
        #[arg(long)]
        student: StudentId,
        /// Defaults to the student's first class.
        #[arg(long)]
        class: Option<ClassId>,
        /// all, locked, completed, in-progress or not-started.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[command(flatten)]
        output: Output,
    },
    /// Points, level, streak and lesson totals for a student.
    Dashboard {
        #[arg(long)]
        student: StudentId,
        #[command(flatten)]
        output: Output,
    },
    /// Per-skill accuracy for a student.
    Skills {
        #[arg(long)]
        student: StudentId,
        #[command(flatten)]
        output: Output,
    },
    /// Create a class and print its join code.
    CreateClass {
        #[arg(long)]
        teacher: TeacherId,
        #[arg(long)]
        name: String,
    },
    /// Enroll a student with a class code.
    Join {
        #[arg(long)]
        student: StudentId,
        #[arg(long)]
        code: String,
    },
    /// Write demo data.
    Seed,
}

#[derive(Args, Clone, Copy)]
struct Output {
    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn print_progress(rows: &[ContainerProgress]) {
    if rows.is_empty() {
        println!("No units match.");
        return;
    }
    for row in rows {
        println!(
            "{:<24} {:>3}%  {}/{}  {}",
            row.container_id.as_str(),
            row.percent_complete,
            row.completed_count,
            row.total_count,
            row.status
        );
    }
}

fn print_dashboard(dashboard: &StudentDashboard) {
    let stats = &dashboard.stats;
    let student = &dashboard.student;
    println!("[{}] {} ({})", student.initials(), student.full_name(), student.id());
    match &dashboard.class_id {
        Some(class_id) => println!("Class:     {class_id}"),
        None => println!("Class:     none"),
    }
    match &dashboard.level {
        Some(level) => println!("Level:     {} {}", level.level, level.title),
        None => println!("Level:     -"),
    }
    println!("Points:    {}", stats.total_points);
    println!(
        "Lessons:   {} completed, {} in progress, {} total ({}%)",
        stats.lessons_completed,
        stats.lessons_in_progress,
        stats.total_lessons,
        stats.progress_percent
    );
    println!("Accuracy:  {}%", stats.accuracy_percent);
    println!("Streak:    {} days", stats.streak_days);
}

fn print_skills(insights: &[SkillInsight]) {
    if insights.is_empty() {
        println!("No tagged attempts yet.");
        return;
    }
    for insight in insights {
        println!(
            "{:<24} {}/{}  {}",
            insight.skill_tag,
            insight.correct,
            insight.total,
            insight.band.as_str()
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let clock = Clock::default_clock();
    let app = AppServices::new_sqlite(&db_url, clock).await?;
    log::debug!("opened {db_url}");

    match cli.command {
        Command::Progress {
            student,
            class,
            status,
            output,
        } => {
            let progress = app.progress();
            let class_id = match class {
                Some(id) => id,
                None => progress.active_class(&student).await?,
            };
            let rows = progress
                .progress_filtered(&student, &class_id, status)
                .await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_progress(&rows);
            }
        }
        Command::Dashboard { student, output } => {
            let dashboard = app.dashboard().load(&student).await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_dashboard(&dashboard);
            }
        }
        Command::Skills { student, output } => {
            let insights = app.skills().insights(&student).await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            } else {
                print_skills(&insights);
            }
        }
        Command::CreateClass { teacher, name } => {
            let class = app.classes().create_class(&teacher, &name).await?;
            println!("Created {} ({}) with code {}", class.name, class.id, class.teacher_code);
        }
        Command::Join { student, code } => {
            let class = app.classes().join_class(&student, &code).await?;
            println!("{student} joined {} ({})", class.name, class.id);
        }
        Command::Seed => {
            let summary = seed_demo(app.storage(), clock.now()).await?;
            println!(
                "Seeded {} lessons, {} results, {} sessions and {} attempts into {db_url}",
                summary.lessons, summary.results, summary.sessions, summary.attempts
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
