use crate::config::DatabaseEngine;
use crate::error::Result;
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;

pub const BACKUP_DIR: &str = "./backups";

/// `backup-<YYYYMMDD-HHMMSS>-<db>.<ext>`
pub fn artifact_file_name(
    engine: DatabaseEngine,
    database: &str,
    timestamp: NaiveDateTime,
) -> String {
    format!(
        "backup-{}-{}.{}",
        timestamp.format("%Y%m%d-%H%M%S"),
        database,
        engine.artifact_extension()
    )
}

pub fn artifact_path(
    backup_dir: &Path,
    engine: DatabaseEngine,
    database: &str,
    timestamp: NaiveDateTime,
) -> PathBuf {
    backup_dir.join(artifact_file_name(engine, database, timestamp))
}

pub fn prepare_backup_dir(backup_dir: &Path) -> Result<()> {
    if !backup_dir.exists() {
        info!("Creating backup directory: {:?}", backup_dir);
        fs::create_dir_all(backup_dir)?;
    }
    Ok(())
}

pub fn calculate_sha256(file_path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};

    let file = File::open(file_path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Logs size and digest of a freshly written artifact.
pub fn log_fingerprint(file_path: &Path) -> Result<()> {
    let size = fs::metadata(file_path)?.len();
    let hash = calculate_sha256(file_path)?;
    info!(
        "Backup written to {}: {:.2} MB, sha256 {}",
        file_path.display(),
        size as f64 / 1024.0 / 1024.0,
        hash
    );
    Ok(())
}
