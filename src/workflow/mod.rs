//! Sequencing of the `create`, `restore` and `delete` actions.
//!
//! Every step is awaited before the next one starts and the first error ends
//! the run. The one exception is a restore tool exiting non-zero: that is
//! logged and recorded in the [`RunReport`], and the run carries on.
//!
//! There is no locking. Two runs against the same config race on the
//! target database and principal names.

#[cfg(test)]
mod fakes;
mod mysql;
pub mod ownership;
mod postgres;

pub use mysql::MysqlWorkflow;
pub use postgres::PostgresWorkflow;

use crate::config::DatabaseEngine;
use crate::error::{DbSwapError, Result};
use crate::process::{Invocation, ProcessRunner};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Restore,
    Delete,
    Create,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Restore => write!(f, "restore"),
            Action::Delete => write!(f, "delete"),
            Action::Create => write!(f, "create"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub backup_dir: PathBuf,
    /// Stamped into the artifact file name.
    pub timestamp: NaiveDateTime,
    pub swap: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub program: &'static str,
    pub code: Option<i32>,
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} returned {}", self.program, code),
            None => write!(f, "{} was terminated by a signal", self.program),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub engine: DatabaseEngine,
    pub action: Action,
    pub artifact: Option<PathBuf>,
    /// Final name of the database the action created or removed.
    pub database: Option<String>,
    pub restore_failure: Option<ProcessFailure>,
}

impl RunReport {
    fn new(engine: DatabaseEngine, action: Action) -> Self {
        Self {
            engine,
            action,
            artifact: None,
            database: None,
            restore_failure: None,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.engine, self.action)?;
        if let Some(database) = &self.database {
            write!(f, " database={}", database)?;
        }
        if let Some(artifact) = &self.artifact {
            write!(f, " artifact={}", artifact.display())?;
        }
        if let Some(failure) = &self.restore_failure {
            write!(f, " restore_failure=\"{}\"", failure)?;
        }
        Ok(())
    }
}

/// A dump that does not exit cleanly ends the run.
async fn run_backup(runner: &dyn ProcessRunner, invocation: &Invocation) -> Result<()> {
    let output = runner.run(invocation).await?;
    if !output.success() {
        let failure = ProcessFailure {
            program: invocation.program,
            code: output.code,
        };
        error!("Command failed: {}", failure);
        return Err(DbSwapError::Process {
            program: failure.program.to_string(),
            code: failure.code,
        });
    }
    debug!("{} wrote {} byte(s) to stdout", invocation.program, output.stdout.len());
    Ok(())
}

/// A restore that exits non-zero is only logged; the caller decides what
/// follows. Failing to start the tool at all is still an error.
async fn run_restore(
    runner: &dyn ProcessRunner,
    invocation: &Invocation,
) -> Result<Option<ProcessFailure>> {
    let output = runner.run(invocation).await?;
    if !output.success() {
        let failure = ProcessFailure {
            program: invocation.program,
            code: output.code,
        };
        error!("Command failed: {}. Continuing with remaining steps", failure);
        return Ok(Some(failure));
    }
    debug!("{} wrote {} byte(s) to stdout", invocation.program, output.stdout.len());
    Ok(None)
}
