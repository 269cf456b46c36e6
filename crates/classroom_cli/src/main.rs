//! Command-line driver for the classroom API.
//!
//! # Responsibility
//! - Resolve database and logging configuration from flags/env.
//! - Run one API operation and print its JSON view.
//! - Report failures as `error[CODE]: message` with exit status 1.

mod cli;

use anyhow::Context;
use clap::Parser;
use classroom_api::{ApiError, SqliteClassroomApi};
use classroom_core::{default_log_level, init_logging};
use cli::{Cli, Command};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)
            .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;
    }

    Ok(match run(&cli.db, cli.command)? {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    })
}

/// Runs one subcommand. Only subcommands that touch data open the database.
fn run(db: &Path, command: Command) -> anyhow::Result<Result<(), ApiError>> {
    let outcome = match command {
        Command::Ping => {
            println!("classroom_core ping={}", classroom_api::ping());
            println!("classroom_core version={}", classroom_api::core_version());
            Ok(())
        }
        Command::CreateLesson {
            name,
            start_date,
            end_date,
        } => with_api(db, |api| {
            render(api.create_lesson(&name, &start_date, &end_date))
        })?,
        Command::Lessons => with_api(db, |api| render(api.lessons()))?,
        Command::Lesson { id } => with_api(db, |api| render(api.lesson(&id)))?,
        Command::Assign {
            lesson_id,
            student_ids,
        } => with_api(db, |api| {
            render(api.assign_students_to_lesson(&lesson_id, student_ids.as_slice()))
        })?,
        Command::CreateStudent {
            first_name,
            last_name,
        } => with_api(db, |api| {
            render(api.create_student(&first_name, &last_name))
        })?,
        Command::Students => with_api(db, |api| render(api.students()))?,
        Command::Student { id } => with_api(db, |api| render(api.student(&id)))?,
    };
    Ok(outcome)
}

/// Opens the database, then runs `f`; an open failure is reported like any
/// other API failure.
fn with_api(
    db: &Path,
    f: impl FnOnce(&SqliteClassroomApi) -> anyhow::Result<Result<(), ApiError>>,
) -> anyhow::Result<Result<(), ApiError>> {
    match SqliteClassroomApi::open(db) {
        Ok(api) => f(&api),
        Err(err) => Ok(Err(err)),
    }
}

/// Prints a successful view as pretty JSON; API failures are passed back.
fn render<T: Serialize>(result: Result<T, ApiError>) -> anyhow::Result<Result<(), ApiError>> {
    match result {
        Ok(view) => {
            let json = serde_json::to_string_pretty(&view).context("failed to encode output")?;
            println!("{json}");
            Ok(Ok(()))
        }
        Err(err) => Ok(Err(err)),
    }
}

fn report(err: &ApiError) -> ExitCode {
    eprintln!("error[{}]: {}", err.code, err.message);
    ExitCode::FAILURE
}
