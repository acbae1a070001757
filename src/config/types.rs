use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    MySQL,
    PostgreSQL,
}

impl DatabaseEngine {
    /// Database the administrative connection attaches to.
    pub fn system_database(&self) -> &'static str {
        match self {
            DatabaseEngine::MySQL => "mysql",
            DatabaseEngine::PostgreSQL => "postgres",
        }
    }

    pub fn artifact_extension(&self) -> &'static str {
        match self {
            DatabaseEngine::MySQL => "sql",
            DatabaseEngine::PostgreSQL => "dump",
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseEngine::MySQL => write!(f, "MySQL"),
            DatabaseEngine::PostgreSQL => write!(f, "PostgreSQL"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The `[backup]` section: the server and database that get dumped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSide {
    pub connection: ConnectionConfig,
    pub database: String,
}

/// The `[restore]` section: the server receiving the dump, plus the
/// principal (and optionally the database name) to create there.
#[derive(Clone, PartialEq, Eq)]
pub struct RestoreSide {
    pub connection: ConnectionConfig,
    pub new_user: String,
    pub new_password: String,
    pub new_database: Option<String>,
}

impl fmt::Debug for RestoreSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoreSide")
            .field("connection", &self.connection)
            .field("new_user", &self.new_user)
            .field("new_password", &"***")
            .field("new_database", &self.new_database)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub backup: BackupSide,
    pub restore: RestoreSide,
}
