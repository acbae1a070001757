pub mod artifact;

pub use artifact::{artifact_path, log_fingerprint, prepare_backup_dir, BACKUP_DIR};
