use super::{run_backup, run_restore, Action, RunContext, RunReport};
use crate::backup::{artifact_path, log_fingerprint, prepare_backup_dir};
use crate::config::{DatabaseEngine, ManagerConfig};
use crate::database::AdminClient;
use crate::error::Result;
use crate::process::{commands, ProcessRunner};
use tracing::{info, info_span, warn, Instrument};

/// MySQL has no swap, ownership fix-up or delete: the restored database is
/// simply named after the new user.
pub struct MysqlWorkflow<'a> {
    config: &'a ManagerConfig,
    admin: Box<dyn AdminClient>,
    runner: Box<dyn ProcessRunner>,
    ctx: RunContext,
}

impl<'a> MysqlWorkflow<'a> {
    pub fn new(
        config: &'a ManagerConfig,
        admin: Box<dyn AdminClient>,
        runner: Box<dyn ProcessRunner>,
        ctx: RunContext,
    ) -> Self {
        Self {
            config,
            admin,
            runner,
            ctx,
        }
    }

    pub async fn run(&self, action: Action) -> Result<RunReport> {
        if self.ctx.swap {
            warn!("--swap has no effect for MySQL and is ignored");
        }
        let span = info_span!(
            "workflow",
            engine = self.admin.engine_name(),
            %action,
            database = %self.config.restore.new_user
        );
        async {
            match action {
                Action::Create => self.create().await,
                Action::Restore => self.restore().await,
                Action::Delete => {
                    warn!("The delete action is not implemented for MySQL; nothing to do");
                    Ok(RunReport::new(DatabaseEngine::MySQL, Action::Delete))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn create(&self) -> Result<RunReport> {
        let restore = &self.config.restore;
        self.admin.create_user(&restore.new_user, &restore.new_password).await?;
        self.admin.create_database(&restore.new_user, &restore.new_user).await?;

        let mut report = RunReport::new(DatabaseEngine::MySQL, Action::Create);
        report.database = Some(restore.new_user.clone());
        Ok(report)
    }

    async fn restore(&self) -> Result<RunReport> {
        let backup = &self.config.backup;
        let restore = &self.config.restore;
        let artifact = artifact_path(
            &self.ctx.backup_dir,
            DatabaseEngine::MySQL,
            &backup.database,
            self.ctx.timestamp,
        );
        let mut report = RunReport::new(DatabaseEngine::MySQL, Action::Restore);

        prepare_backup_dir(&self.ctx.backup_dir)?;
        info!("Backing up database \"{}\"...", backup.database);
        let dump = commands::mysqldump(
            &backup.connection,
            &backup.database,
            &artifact,
            self.ctx.verbose,
        );
        run_backup(self.runner.as_ref(), &dump).await?;
        log_fingerprint(&artifact)?;
        report.artifact = Some(artifact.clone());

        self.admin.create_user(&restore.new_user, &restore.new_password).await?;
        self.admin.create_database(&restore.new_user, &restore.new_user).await?;

        info!("Restoring database \"{}\"...", restore.new_user);
        let load = commands::mysql_restore(
            &restore.connection,
            &restore.new_user,
            &artifact,
            self.ctx.verbose,
        );
        report.restore_failure = run_restore(self.runner.as_ref(), &load).await?;

        report.database = Some(restore.new_user.clone());
        Ok(report)
    }
}
