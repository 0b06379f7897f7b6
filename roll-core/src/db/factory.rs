use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{RepositoryError, RollRepository};

/// Which backend to open and where to find it.
///
/// `connection_string` is opaque to the registry; only the factory named by
/// `backend` interprets it.  For the `"sqlite"` backend it is a file path,
/// a sqlx URL, or `":memory:"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Constructor for one storage backend.
///
/// A backend crate exports a unit struct implementing this trait; the server
/// binary registers it at startup.  `create` must hand back a repository
/// that is ready for queries, so migrations belong inside it.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name the registry dispatches on, e.g. `"sqlite"`.
    fn backend_name(&self) -> &'static str;

    async fn create(&self, config: &DbConfig) -> Result<Box<dyn RollRepository>, RepositoryError>;
}

/// Maps backend names to their factories.
///
/// The server builds one of these at boot, registers every compiled-in
/// backend, then calls [`RepositoryRegistry::create`] with the configured
/// [`DbConfig`].  Handlers never see the registry; they get the finished
/// repository handle through application state.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory under its own [`RepositoryFactory::backend_name`].
    /// Registering the same name twice keeps the later factory.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Open a repository through the factory named in `config`.
    ///
    /// Returns [`RepositoryError::Configuration`] when `config.backend`
    /// names no registered factory; any other error comes from the factory
    /// itself.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn RollRepository>, RepositoryError> {
        let factory = self.factories.get(config.backend.as_str()).ok_or_else(|| {
            // Sort so the error text is stable regardless of hash order.
            let mut known: Vec<_> = self.factories.keys().copied().collect();
            known.sort_unstable();
            RepositoryError::Configuration(format!(
                "no backend named '{}' is registered (known: {:?})",
                config.backend, known
            ))
        })?;

        factory.create(config).await
    }
}
