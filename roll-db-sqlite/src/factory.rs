use async_trait::async_trait;

use roll_core::db::repository::{RepositoryError, RollRepository};
use roll_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`roll_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use roll_core::db::RepositoryRegistry;
/// use roll_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and run
    /// migrations.
    ///
    /// Accepted connection-string values:
    /// * A bare file path — e.g. `"property_records.db"`.  The file is
    ///   created if it does not exist.
    /// * `":memory:"` — an ephemeral in-memory database (useful for tests).
    ///
    /// CSV seeding is deliberately not part of repository construction; the
    /// caller decides whether to run the importer on the fresh repository.
    async fn create(&self, config: &DbConfig) -> Result<Box<dyn RollRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
