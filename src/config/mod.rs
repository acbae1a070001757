mod types;

pub use types::*;

use crate::error::{DbSwapError, Result};
use ini::{Ini, ParseOption, Properties};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const BACKUP_SECTION: &str = "backup";

const RESTORE_SECTION: &str = "restore";

/// Values are taken verbatim: surrounding quotes and backslashes are part of
/// the value, which matters for passwords.
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

pub fn parse_str(content: &str) -> Result<Ini> {
    Ok(Ini::load_from_str_opt(content, parse_options())?)
}

pub fn load_from(path: &Path) -> Result<ManagerConfig> {
    if !path.exists() {
        return Err(DbSwapError::Config(format!(
            "Config file not found at {}",
            path.display()
        )));
    }

    info!("Loading configuration from {:?}", path);
    let content = fs::read_to_string(path)?;
    let ini = parse_str(&content)?;
    let config = from_ini(&ini)?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

pub fn from_ini(ini: &Ini) -> Result<ManagerConfig> {
    let backup = section(ini, BACKUP_SECTION)?;
    let restore = section(ini, RESTORE_SECTION)?;

    Ok(ManagerConfig {
        backup: BackupSide {
            connection: connection(backup, BACKUP_SECTION)?,
            database: required(backup, BACKUP_SECTION, "db")?,
        },
        restore: RestoreSide {
            connection: connection(restore, RESTORE_SECTION)?,
            new_user: required(restore, RESTORE_SECTION, "user_new")?,
            new_password: required(restore, RESTORE_SECTION, "password_new")?,
            new_database: lookup(restore, "db_new")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        },
    })
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties> {
    ini.section(Some(name))
        .ok_or_else(|| DbSwapError::Config(format!("Missing section [{}]", name)))
}

/// Option names match regardless of case; section names do not.
fn lookup<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}

fn required(props: &Properties, section: &str, key: &str) -> Result<String> {
    lookup(props, key)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| {
            DbSwapError::Config(format!("Missing key '{}' in section [{}]", key, section))
        })
}

fn connection(props: &Properties, section: &str) -> Result<ConnectionConfig> {
    let port = required(props, section, "port")?;
    let port = port.parse::<u16>().map_err(|e| {
        DbSwapError::Config(format!(
            "Invalid port '{}' in section [{}]: {}",
            port, section, e
        ))
    })?;

    Ok(ConnectionConfig {
        host: required(props, section, "host")?,
        port,
        username: required(props, section, "user")?,
        password: required(props, section, "password")?,
    })
}
