mod driver;
mod mysql;
mod postgres;
pub mod quote;

pub use driver::{AdminClient, CatalogSession, PostgresAdmin};
pub use mysql::MysqlAdminClient;
pub use postgres::PostgresAdminClient;

use crate::config::ConnectionConfig;

pub fn create_mysql_admin(connection: &ConnectionConfig) -> Box<dyn AdminClient> {
    Box::new(MysqlAdminClient::new(connection))
}

pub fn create_postgres_admin(connection: &ConnectionConfig) -> Box<dyn PostgresAdmin> {
    Box::new(PostgresAdminClient::new(connection))
}
