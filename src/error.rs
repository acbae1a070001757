use std::fmt;
use std::io;

#[derive(Debug)]
pub enum DbSwapError {
    Config(String),
    Database(String),
    Process { program: String, code: Option<i32> },
    ProcessSpawn(String),
    Io(io::Error),
}

impl fmt::Display for DbSwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbSwapError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DbSwapError::Database(msg) => write!(f, "Database error: {}", msg),
            DbSwapError::Process { program, code: Some(code) } => {
                write!(f, "{} failed with return code {}", program, code)
            }
            DbSwapError::Process { program, code: None } => {
                write!(f, "{} was terminated by a signal", program)
            }
            DbSwapError::ProcessSpawn(msg) => write!(f, "Could not start process: {}", msg),
            DbSwapError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for DbSwapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbSwapError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DbSwapError {
    fn from(err: io::Error) -> Self {
        DbSwapError::Io(err)
    }
}

impl From<ini::ParseError> for DbSwapError {
    fn from(err: ini::ParseError) -> Self {
        DbSwapError::Config(format!("Invalid config: {}", err))
    }
}

impl From<mysql_async::Error> for DbSwapError {
    fn from(err: mysql_async::Error) -> Self {
        DbSwapError::Database(err.to_string())
    }
}

impl From<sqlx::Error> for DbSwapError {
    fn from(err: sqlx::Error) -> Self {
        DbSwapError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbSwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_display() {
        let err = DbSwapError::Process {
            program: "pg_dump".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "pg_dump failed with return code 1");

        let err = DbSwapError::Process {
            program: "mysql".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "mysql was terminated by a signal");
    }
}
