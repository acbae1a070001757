use crate::error::{DbSwapError, Result};
use async_trait::async_trait;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use which::which;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
    /// Set on the child only; the parent environment is never modified.
    pub env: Vec<(String, String)>,
    pub stdin: Option<PathBuf>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.starts_with("--password=") {
                write!(f, " --password=***")?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        if let Some(path) = &self.stdin {
            write!(f, " < {}", path.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Spawns the real client tools found on `PATH`. Stderr is inherited so
/// progress from `-v` reaches the terminal as the tools write it.
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let program = which(invocation.program).map_err(|e| {
            DbSwapError::ProcessSpawn(format!(
                "{} executable not found in PATH ({}). Please ensure the database client tools are installed.",
                invocation.program, e
            ))
        })?;
        debug!("Running {} ({})", invocation, program.display());

        let mut command = Command::new(&program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        match &invocation.stdin {
            Some(path) => {
                let file = File::open(path)?;
                command.stdin(Stdio::from(file));
            }
            None => {
                command.stdin(Stdio::null());
            }
        }

        let output = command.output().await.map_err(|e| {
            DbSwapError::ProcessSpawn(format!("Failed to execute {}: {}", invocation.program, e))
        })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
        })
    }
}
