use crate::backup::BACKUP_DIR;
use crate::config::{self, DatabaseEngine};
use crate::database::{create_mysql_admin, create_postgres_admin};
use crate::error::Result;
use crate::process::SystemRunner;
use crate::workflow::{Action, MysqlWorkflow, PostgresWorkflow, RunContext, RunReport};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "dbswap",
    version,
    about = "Back up, restore and promote MySQL / PostgreSQL databases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub engine: EngineCommand,
}

#[derive(Debug, Subcommand)]
pub enum EngineCommand {
    /// Manage a MySQL restore target
    Mysql(RunArgs),
    /// Manage a PostgreSQL restore target
    Postgres(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Database configuration file (INI with [backup] and [restore])
    #[arg(long, value_name = "PATH")]
    pub configfile: PathBuf,

    /// Action to perform
    #[arg(long, value_enum)]
    pub action: Action,

    /// Restore into <db>_restore and rename it to the new user afterwards
    #[arg(long, overrides_with = "no_swap")]
    swap: bool,

    #[arg(long, overrides_with = "swap")]
    no_swap: bool,

    /// Verbose output from the dump/restore tools and debug logging
    #[arg(long, overrides_with = "no_verbose")]
    verbose: bool,

    #[arg(long, overrides_with = "verbose")]
    no_verbose: bool,
}

impl RunArgs {
    pub fn swap(&self) -> bool {
        self.swap && !self.no_swap
    }

    pub fn verbose(&self) -> bool {
        self.verbose && !self.no_verbose
    }
}

impl Cli {
    pub fn engine(&self) -> DatabaseEngine {
        match self.engine {
            EngineCommand::Mysql(_) => DatabaseEngine::MySQL,
            EngineCommand::Postgres(_) => DatabaseEngine::PostgreSQL,
        }
    }

    pub fn args(&self) -> &RunArgs {
        match &self.engine {
            EngineCommand::Mysql(args) | EngineCommand::Postgres(args) => args,
        }
    }
}

pub async fn run(cli: &Cli, timestamp: NaiveDateTime) -> Result<RunReport> {
    let args = cli.args();
    let config = config::load_from(&args.configfile)?;
    let ctx = RunContext {
        backup_dir: PathBuf::from(BACKUP_DIR),
        timestamp,
        swap: args.swap(),
        verbose: args.verbose(),
    };

    info!(
        "Running {} action '{}' (swap: {}, verbose: {})",
        cli.engine(),
        args.action,
        ctx.swap,
        ctx.verbose
    );

    match cli.engine() {
        DatabaseEngine::MySQL => {
            let admin = create_mysql_admin(&config.restore.connection);
            MysqlWorkflow::new(&config, admin, Box::new(SystemRunner), ctx)
                .run(args.action)
                .await
        }
        DatabaseEngine::PostgreSQL => {
            let admin = create_postgres_admin(&config.restore.connection);
            let backup_admin = create_postgres_admin(&config.backup.connection);
            PostgresWorkflow::new(&config, admin, backup_admin, Box::new(SystemRunner), ctx)
                .run(args.action)
                .await
        }
    }
}
