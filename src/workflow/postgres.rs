//! PostgreSQL create, restore and delete.
//!
//! `create` and `restore` run against the `[restore]` server. `delete` runs
//! against the `[backup]` server with the backup credentials, which is not
//! where `create` and `restore` put the objects. Existing deployments rely
//! on this; to delete on the restore host, point `[backup]` at it.

use super::ownership::fix_ownership;
use super::{run_backup, run_restore, Action, RunContext, RunReport};
use crate::backup::{artifact_path, log_fingerprint, prepare_backup_dir};
use crate::config::{DatabaseEngine, ManagerConfig};
use crate::database::PostgresAdmin;
use crate::error::{DbSwapError, Result};
use crate::process::{commands, ProcessRunner};
use tracing::{info, info_span, Instrument};

/// `<backup db>_restore` under swap, otherwise the configured `db_new`.
pub fn target_database(config: &ManagerConfig, swap: bool) -> Result<String> {
    if swap {
        return Ok(format!("{}_restore", config.backup.database));
    }
    config.restore.new_database.clone().ok_or_else(|| {
        DbSwapError::Config(
            "Missing key 'db_new' in section [restore] (required unless --swap is given)"
                .to_string(),
        )
    })
}

pub struct PostgresWorkflow<'a> {
    config: &'a ManagerConfig,
    admin: Box<dyn PostgresAdmin>,
    /// Connected with the `[backup]` credentials; only `delete` uses it.
    backup_admin: Box<dyn PostgresAdmin>,
    runner: Box<dyn ProcessRunner>,
    ctx: RunContext,
}

impl<'a> PostgresWorkflow<'a> {
    pub fn new(
        config: &'a ManagerConfig,
        admin: Box<dyn PostgresAdmin>,
        backup_admin: Box<dyn PostgresAdmin>,
        runner: Box<dyn ProcessRunner>,
        ctx: RunContext,
    ) -> Self {
        Self {
            config,
            admin,
            backup_admin,
            runner,
            ctx,
        }
    }

    pub async fn run(&self, action: Action) -> Result<RunReport> {
        let target = target_database(self.config, self.ctx.swap)?;
        let span = info_span!(
            "workflow",
            engine = self.admin.engine_name(),
            %action,
            swap = self.ctx.swap,
            database = %target
        );
        async {
            match action {
                Action::Create => self.create(target).await,
                Action::Restore => self.restore(target).await,
                Action::Delete => self.delete(target).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn create(&self, target: String) -> Result<RunReport> {
        let restore = &self.config.restore;
        self.admin.create_user(&restore.new_user, &restore.new_password).await?;
        self.admin.create_database(&target, &restore.new_user).await?;

        let mut report = RunReport::new(DatabaseEngine::PostgreSQL, Action::Create);
        report.database = Some(target);
        Ok(report)
    }

    async fn restore(&self, target: String) -> Result<RunReport> {
        let backup = &self.config.backup;
        let restore = &self.config.restore;
        let artifact = artifact_path(
            &self.ctx.backup_dir,
            DatabaseEngine::PostgreSQL,
            &backup.database,
            self.ctx.timestamp,
        );
        let mut report = RunReport::new(DatabaseEngine::PostgreSQL, Action::Restore);

        prepare_backup_dir(&self.ctx.backup_dir)?;
        info!("Backing up database \"{}\"...", backup.database);
        let dump = commands::pg_dump(
            &backup.connection,
            &backup.database,
            &artifact,
            self.ctx.verbose,
        );
        run_backup(self.runner.as_ref(), &dump).await?;
        log_fingerprint(&artifact)?;
        report.artifact = Some(artifact.clone());

        self.admin.create_user(&restore.new_user, &restore.new_password).await?;
        self.admin.create_database(&target, &restore.new_user).await?;

        info!("Restoring database \"{}\"...", target);
        let load = commands::pg_restore(&restore.connection, &target, &artifact, self.ctx.verbose);
        report.restore_failure = run_restore(self.runner.as_ref(), &load).await?;

        // Only the restored copy moves into the new slot; whatever database
        // currently serves as active is left alone.
        let database = if self.ctx.swap {
            info!("Swapping new databases...");
            self.admin.rename_database(&target, &restore.new_user).await?;
            restore.new_user.clone()
        } else {
            target
        };

        fix_ownership(self.admin.as_ref(), &database, &restore.new_user).await?;
        report.database = Some(database);
        Ok(report)
    }

    async fn delete(&self, target: String) -> Result<RunReport> {
        self.backup_admin.terminate_connections(&target).await?;
        self.backup_admin.drop_database(&target).await?;
        self.backup_admin.drop_user(&self.config.restore.new_user).await?;

        let mut report = RunReport::new(DatabaseEngine::PostgreSQL, Action::Delete);
        report.database = Some(target);
        Ok(report)
    }
}
