use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manage lessons, students and lesson rosters.
#[derive(Debug, Parser)]
#[command(name = "classroom", version)]
pub struct Cli {
    /// SQLite database file (created and migrated on first use).
    #[arg(long, env = "CLASSROOM_DB", default_value = "classroom.sqlite3", global = true)]
    pub db: PathBuf,

    /// trace|debug|info|warn|error; defaults per build mode.
    #[arg(long, env = "CLASSROOM_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "CLASSROOM_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a lesson with an empty roster.
    CreateLesson {
        #[arg(long)]
        name: String,
        /// `YYYY-MM-DD` or RFC 3339 timestamp.
        #[arg(long)]
        start_date: String,
        /// Must be after the start date.
        #[arg(long)]
        end_date: String,
    },
    /// List lessons by start date.
    Lessons,
    /// Show one lesson.
    Lesson { id: String },
    /// Add students to a lesson roster.
    Assign {
        #[arg(long)]
        lesson_id: String,
        #[arg(required = true)]
        student_ids: Vec<String>,
    },
    CreateStudent {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    Students,
    Student { id: String },
    /// Print core linkage information.
    Ping,
}
