use crate::error::Result;
use async_trait::async_trait;

/// Administrative operations shared by both engines. Every call opens its own
/// connection to the engine's system database; nothing is pooled.
#[async_trait]
pub trait AdminClient: Send + Sync {
    async fn create_user(&self, name: &str, password: &str) -> Result<()>;
    async fn create_database(&self, name: &str, grantee: &str) -> Result<()>;
    fn engine_name(&self) -> &'static str;
}

#[async_trait]
pub trait PostgresAdmin: AdminClient {
    /// Returns the number of backends that were signalled.
    async fn terminate_connections(&self, database: &str) -> Result<usize>;
    async fn drop_database(&self, database: &str) -> Result<()>;
    async fn drop_user(&self, name: &str) -> Result<()>;
    async fn rename_database(&self, from: &str, to: &str) -> Result<()>;
    async fn open_catalog(&self, database: &str) -> Result<Box<dyn CatalogSession>>;
}

/// A connection to one database used to read generated statements out of the
/// system catalogs and run them back one at a time.
#[async_trait]
pub trait CatalogSession: Send {
    async fn generate_statements(&mut self, query: &str, owner: &str) -> Result<Vec<String>>;
    async fn execute(&mut self, statement: &str) -> Result<()>;
    async fn close(self: Box<Self>) -> Result<()>;
}
