use super::driver::AdminClient;
use super::quote::{mysql_account, mysql_ident, mysql_literal};
use crate::config::{ConnectionConfig, DatabaseEngine};
use crate::error::{DbSwapError, Result};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder};
use tracing::{debug, info};

fn create_user_statements(name: &str, password: &str) -> Vec<String> {
    let account = mysql_account(name);
    vec![
        format!("CREATE USER {};", account),
        format!("ALTER USER {} IDENTIFIED BY {};", account, mysql_literal(password)),
    ]
}

/// MySQL has no database owner, so the new user gets an explicit grant.
fn create_database_statements(name: &str, grantee: &str) -> Vec<String> {
    let database = mysql_ident(name);
    vec![
        format!(
            "CREATE DATABASE {} CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci;",
            database
        ),
        format!(
            "GRANT ALL PRIVILEGES ON {}.* TO {};",
            database,
            mysql_account(grantee)
        ),
    ]
}

pub struct MysqlAdminClient {
    connection: ConnectionConfig,
}

impl MysqlAdminClient {
    pub fn new(connection: &ConnectionConfig) -> Self {
        Self {
            connection: connection.clone(),
        }
    }

    fn opts(&self) -> Opts {
        OptsBuilder::default()
            .ip_or_hostname(&self.connection.host)
            .tcp_port(self.connection.port)
            .user(Some(&self.connection.username))
            .pass(Some(&self.connection.password))
            .db_name(Some(DatabaseEngine::MySQL.system_database()))
            .into()
    }

    async fn get_conn(&self) -> Result<Conn> {
        debug!(
            "Connecting to MySQL {}:{}",
            self.connection.host, self.connection.port
        );
        Conn::new(self.opts()).await.map_err(DbSwapError::from)
    }

    async fn execute_all(&self, statements: &[String], secret: bool) -> Result<()> {
        let mut conn = self.get_conn().await?;
        for statement in statements {
            if !secret {
                debug!("Executing: {}", statement);
            }
            conn.query_drop(statement.as_str()).await?;
        }
        conn.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl AdminClient for MysqlAdminClient {
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
        "MySQL"
    }
}
