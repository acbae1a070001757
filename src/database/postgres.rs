use super::driver::{AdminClient, CatalogSession, PostgresAdmin};
use super::quote::{pg_ident, pg_literal};
use crate::config::{ConnectionConfig, DatabaseEngine};
use crate::error::{DbSwapError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::{debug, info};

fn create_user_statements(name: &str, password: &str) -> Vec<String> {
    vec![format!(
        "CREATE USER {} WITH PASSWORD {};",
        pg_ident(name),
        pg_literal(password)
    )]
}

/// Connect is revoked from PUBLIC straight after creation so only the
/// grantee (and superusers) can reach the new database.
fn create_database_statements(name: &str, grantee: &str) -> Vec<String> {
    let database = pg_ident(name);
    vec![
        format!("CREATE DATABASE {};", database),
        format!("REVOKE CONNECT ON DATABASE {} FROM PUBLIC;", database),
        format!(
            "GRANT ALL PRIVILEGES ON DATABASE {} TO {};",
            database,
            pg_ident(grantee)
        ),
    ]
}

const TERMINATE_BACKENDS: &str = "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
     WHERE pid <> pg_backend_pid() AND datname = $1";

/// `IF EXISTS` keeps a repeated delete from failing.
fn drop_database_statements(name: &str) -> Vec<String> {
    vec![format!("DROP DATABASE IF EXISTS {};", pg_ident(name))]
}

fn drop_user_statements(name: &str) -> Vec<String> {
    vec![format!("DROP USER IF EXISTS {};", pg_ident(name))]
}

fn rename_database_statements(from: &str, to: &str) -> Vec<String> {
    vec![format!(
        "ALTER DATABASE {} RENAME TO {};",
        pg_ident(from),
        pg_ident(to)
    )]
}

pub struct PostgresAdminClient {
    connection: ConnectionConfig,
}

impl PostgresAdminClient {
    pub fn new(connection: &ConnectionConfig) -> Self {
        Self {
            connection: connection.clone(),
        }
    }

    fn options(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.connection.host)
            .port(self.connection.port)
            .username(&self.connection.username)
            .password(&self.connection.password)
            .database(database)
            .disable_statement_logging()
    }

    async fn connect(&self, database: &str) -> Result<PgConnection> {
        debug!(
            "Connecting to PostgreSQL {}:{} database {}",
            self.connection.host, self.connection.port, database
        );
        PgConnection::connect_with(&self.options(database))
            .await
            .map_err(DbSwapError::from)
    }

    /// Runs each statement on its own in autocommit mode. `CREATE DATABASE`
    /// and friends refuse to run inside a transaction block, so statements
    /// go out over the simple query protocol without an explicit BEGIN.
    async fn execute_all(&self, statements: &[String], secret: bool) -> Result<()> {
        let mut conn = self.connect(DatabaseEngine::PostgreSQL.system_database()).await?;
        for statement in statements {
            if !secret {
                debug!("Executing: {}", statement);
            }
            conn.execute(statement.as_str()).await?;
        }
        conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl AdminClient for PostgresAdminClient {
    async fn create_user(&self, name: &str, password: &str) -> Result<()> {
        info!("Creating user \"{}\"...", name);
        self.execute_all(&create_user_statements(name, password), true)
            .await
    }

    async fn create_database(&self, name: &str, grantee: &str) -> Result<()> {
        info!("Creating database \"{}\"...", name);
        self.execute_all(&create_database_statements(name, grantee), false)
            .await
    }

    fn engine_name(&self) -> &'static str {
        "PostgreSQL"
    }
}

#[async_trait]
impl PostgresAdmin for PostgresAdminClient {
    async fn terminate_connections(&self, database: &str) -> Result<usize> {
        info!("Terminating connections to database \"{}\"...", database);
        let mut conn = self.connect(DatabaseEngine::PostgreSQL.system_database()).await?;
        let rows = sqlx::query(TERMINATE_BACKENDS)
            .bind(database)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;
        debug!("Signalled {} backend(s)", rows.len());
        Ok(rows.len())
    }

    async fn drop_database(&self, database: &str) -> Result<()> {
        info!("Deleting database \"{}\"...", database);
        self.execute_all(&drop_database_statements(database), false)
            .await
    }

    async fn drop_user(&self, name: &str) -> Result<()> {
        info!("Deleting user \"{}\"...", name);
        self.execute_all(&drop_user_statements(name), false).await
    }

    async fn rename_database(&self, from: &str, to: &str) -> Result<()> {
        info!("Renaming database \"{}\" to \"{}\"...", from, to);
        self.execute_all(&rename_database_statements(from, to), false)
            .await
    }

    async fn open_catalog(&self, database: &str) -> Result<Box<dyn CatalogSession>> {
        let conn = self.connect(database).await?;
        Ok(Box::new(PgCatalogSession { conn }))
    }
}

struct PgCatalogSession {
    conn: PgConnection,
}

#[async_trait]
impl CatalogSession for PgCatalogSession {
    async fn generate_statements(&mut self, query: &str, owner: &str) -> Result<Vec<String>> {
        let statements: Vec<String> = sqlx::query_scalar(query)
            .bind(owner)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(statements)
    }

    async fn execute(&mut self, statement: &str) -> Result<()> {
        self.conn.execute(statement).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}
