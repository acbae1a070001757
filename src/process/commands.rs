//! Argument vectors for the dump and restore client tools.

use super::runner::Invocation;
use crate::config::ConnectionConfig;
use std::path::Path;

pub fn mysqldump(
    conn: &ConnectionConfig,
    database: &str,
    dest: &Path,
    verbose: bool,
) -> Invocation {
    let mut args = vec![
        format!("--host={}", conn.host),
        format!("--port={}", conn.port),
        format!("--user={}", conn.username),
        format!("--password={}", conn.password),
        format!("--result-file={}", dest.display()),
        "--routines".to_string(),
        "--triggers".to_string(),
        "--events".to_string(),
        "--single-transaction".to_string(),
        "--no-create-db".to_string(),
        database.to_string(),
    ];
    if verbose {
        args.push("-v".to_string());
    }

    Invocation {
        program: "mysqldump",
        args,
        env: Vec::new(),
        stdin: None,
    }
}

pub fn mysql_restore(
    conn: &ConnectionConfig,
    database: &str,
    source: &Path,
    verbose: bool,
) -> Invocation {
    let mut args = vec![
        format!("--host={}", conn.host),
        format!("--port={}", conn.port),
        format!("--user={}", conn.username),
        format!("--password={}", conn.password),
        format!("--database={}", database),
    ];
    if verbose {
        args.push("-v".to_string());
    }

    Invocation {
        program: "mysql",
        args,
        env: Vec::new(),
        stdin: Some(source.to_path_buf()),
    }
}

/// Custom-format (`-Fc`) dump so `pg_restore` can skip ownership on load.
pub fn pg_dump(conn: &ConnectionConfig, database: &str, dest: &Path, verbose: bool) -> Invocation {
    let mut args = vec![
        format!("--dbname={}", database),
        format!("--host={}", conn.host),
        format!("--port={}", conn.port),
        format!("--username={}", conn.username),
        "-Fc".to_string(),
        "-f".to_string(),
        dest.display().to_string(),
    ];
    if verbose {
        args.push("-v".to_string());
    }

    Invocation {
        program: "pg_dump",
        args,
        env: pg_env(conn),
        stdin: None,
    }
}

pub fn pg_restore(
    conn: &ConnectionConfig,
    database: &str,
    source: &Path,
    verbose: bool,
) -> Invocation {
    let mut args = vec![
        "--no-owner".to_string(),
        format!("--dbname={}", database),
        format!("--host={}", conn.host),
        format!("--port={}", conn.port),
        format!("--username={}", conn.username),
    ];
    if verbose {
        args.push("-v".to_string());
    }
    args.push(source.display().to_string());

    Invocation {
        program: "pg_restore",
        args,
        env: pg_env(conn),
        stdin: None,
    }
}

fn pg_env(conn: &ConnectionConfig) -> Vec<(String, String)> {
    vec![("PGPASSWORD".to_string(), conn.password.clone())]
}
