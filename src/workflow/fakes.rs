//! In-memory stand-ins for the admin client and process runner. Both append
//! to a shared call log so tests can assert the exact order of steps.

use super::RunContext;
use crate::config::{BackupSide, ConnectionConfig, ManagerConfig, RestoreSide};
use crate::database::{AdminClient, CatalogSession, PostgresAdmin};
use crate::error::{DbSwapError, Result};
use crate::process::{Invocation, ProcessOutput, ProcessRunner};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &CallLog, call: String) {
    log.lock().unwrap().push(call);
}

pub fn sample_config() -> ManagerConfig {
    ManagerConfig {
        backup: BackupSide {
            connection: ConnectionConfig {
                host: "prod.local".to_string(),
                port: 5432,
                username: "backup_admin".to_string(),
                password: "backup_pw".to_string(),
            },
            database: "shop".to_string(),
        },
        restore: RestoreSide {
            connection: ConnectionConfig {
                host: "staging.local".to_string(),
                port: 5432,
                username: "restore_admin".to_string(),
                password: "restore_pw".to_string(),
            },
            new_user: "alice".to_string(),
            new_password: "alice_pw".to_string(),
            new_database: Some("shop_new".to_string()),
        },
    }
}

pub fn context(backup_dir: &Path, swap: bool) -> RunContext {
    RunContext {
        backup_dir: backup_dir.to_path_buf(),
        timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap(),
        swap,
        verbose: false,
    }
}

pub struct RecordingAdmin {
    log: CallLog,
    server: Option<&'static str>,
    fail_on: Option<&'static str>,
    catalog: Vec<Vec<String>>,
    queries: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingAdmin {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            server: None,
            fail_on: None,
            catalog: Vec::new(),
            queries: Arc::default(),
        }
    }

    /// A second admin on the same call log whose calls are recorded as
    /// `<server>:<operation>(..)`.
    pub fn on_server(&self, server: &'static str) -> Self {
        Self {
            server: Some(server),
            ..Self::new(&self.log)
        }
    }

    /// The named operation is recorded and then returns a database error.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Rows handed back to successive catalog queries, one entry per query.
    pub fn with_catalog(mut self, rows: Vec<Vec<String>>) -> Self {
        self.catalog = rows;
        self
    }

    /// `(query, owner)` pairs sent to catalog sessions, in order.
    pub fn queries(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        self.queries.clone()
    }

    fn call(&self, operation: &str, args: String) -> Result<()> {
        match self.server {
            Some(server) => record(&self.log, format!("{}:{}({})", server, operation, args)),
            None => record(&self.log, format!("{}({})", operation, args)),
        }
        if self.fail_on == Some(operation) {
            return Err(DbSwapError::Database(format!("{} rejected", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminClient for RecordingAdmin {
    async fn create_user(&self, name: &str, _password: &str) -> Result<()> {
        self.call("create_user", name.to_string())
    }

    async fn create_database(&self, name: &str, grantee: &str) -> Result<()> {
        self.call("create_database", format!("{}, {}", name, grantee))
    }

    fn engine_name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl PostgresAdmin for RecordingAdmin {
    async fn terminate_connections(&self, database: &str) -> Result<usize> {
        self.call("terminate_connections", database.to_string())?;
        Ok(0)
    }

    async fn drop_database(&self, database: &str) -> Result<()> {
        self.call("drop_database", database.to_string())
    }

    async fn drop_user(&self, name: &str) -> Result<()> {
        self.call("drop_user", name.to_string())
    }

    async fn rename_database(&self, from: &str, to: &str) -> Result<()> {
        self.call("rename_database", format!("{}, {}", from, to))
    }

    async fn open_catalog(&self, database: &str) -> Result<Box<dyn CatalogSession>> {
        self.call("open_catalog", database.to_string())?;
        Ok(Box::new(RecordingCatalog {
            log: self.log.clone(),
            fail_on: self.fail_on,
            rows: self.catalog.clone(),
            queries: self.queries.clone(),
            issued: 0,
        }))
    }
}

pub struct RecordingCatalog {
    log: CallLog,
    fail_on: Option<&'static str>,
    rows: Vec<Vec<String>>,
    queries: Arc<Mutex<Vec<(String, String)>>>,
    issued: usize,
}

#[async_trait]
impl CatalogSession for RecordingCatalog {
    async fn generate_statements(&mut self, query: &str, owner: &str) -> Result<Vec<String>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), owner.to_string()));
        let rows = self.rows.get(self.issued).cloned().unwrap_or_default();
        self.issued += 1;
        Ok(rows)
    }

    async fn execute(&mut self, statement: &str) -> Result<()> {
        record(&self.log, format!("execute({})", statement));
        if self.fail_on == Some("execute") {
            return Err(DbSwapError::Database("permission denied".to_string()));
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        record(&self.log, "close_catalog".to_string());
        Ok(())
    }
}

pub struct RecordingRunner {
    log: CallLog,
    exit_codes: HashMap<&'static str, i32>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl RecordingRunner {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            exit_codes: HashMap::new(),
            invocations: Arc::default(),
        }
    }

    pub fn exit_code(mut self, program: &'static str, code: i32) -> Self {
        self.exit_codes.insert(program, code);
        self
    }

    pub fn invocations(&self) -> Arc<Mutex<Vec<Invocation>>> {
        self.invocations.clone()
    }
}

/// Where a dump tool would write its output.
fn dump_target(invocation: &Invocation) -> Option<PathBuf> {
    let mut args = invocation.args.iter();
    while let Some(arg) = args.next() {
        if arg == "-f" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--result-file=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        record(&self.log, format!("run({})", invocation.program));
        self.invocations.lock().unwrap().push(invocation.clone());

        let code = self.exit_codes.get(invocation.program).copied().unwrap_or(0);
        if code == 0 {
            if let Some(path) = dump_target(invocation) {
                fs::write(path, b"-- dump")?;
            }
        }

        Ok(ProcessOutput {
            code: Some(code),
            stdout: Vec::new(),
        })
    }
}
