//! Repository construction and backend selection.
//!
//! Everything above the storage layer holds an `Arc<dyn FullRepository>` and
//! never names a concrete backend. The types here own that choice:
//! [`RepositoryType`] enumerates the compiled-in backends,
//! [`RepositoryFactory`] resolves a type plus optional connection settings
//! into a live repository, and [`RepositoryBuilder`] layers environment and
//! file configuration on top for callers that want the fluent form.

use std::path::Path;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

/// Which storage backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Diesel-backed Postgres storage. Only constructible when the
    /// `postgres-repo` feature is compiled in.
    Postgres,
    /// In-memory storage for tests and single-process runs.
    Local,
}

impl std::str::FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Pick a backend from the environment.
    ///
    /// An explicit `REPOSITORY_TYPE` wins; values that do not parse fall back
    /// to [`RepositoryType::Local`]. Without it, the presence of
    /// `DATABASE_URL` or `PG_DATABASE_URL` implies Postgres.
    pub fn from_env() -> Self {
        if let Ok(explicit) = std::env::var("REPOSITORY_TYPE") {
            return explicit.parse().unwrap_or(Self::Local);
        }

        let has_database_url = ["DATABASE_URL", "PG_DATABASE_URL"]
            .iter()
            .any(|name| std::env::var(name).is_ok());

        if has_database_url {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Turns configuration into repository instances.
///
/// ```ignore
/// use khatma_rust::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).await?;
/// assert!(repo.health_check().await?);
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Construct the repository for `repo_type`.
    ///
    /// Postgres needs `postgres_config`; passing `None`, or selecting
    /// Postgres in a build without the `postgres-repo` feature, yields a
    /// configuration error.
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            #[cfg(feature = "postgres-repo")]
            RepositoryType::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    RepositoryError::configuration("Postgres repository requires PostgresConfig")
                })?;
                let repo: Arc<dyn FullRepository> = Self::create_postgres(config).await?;
                Ok(repo)
            }
            #[cfg(not(feature = "postgres-repo"))]
            RepositoryType::Postgres => {
                let _ = postgres_config;
                Err(feature_disabled())
            }
        }
    }

    /// Open a Postgres connection pool and wrap the repository for sharing.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        PostgresRepository::new(config.clone()).map(Arc::new)
    }

    /// Construct the in-memory backend.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Resolve the backend from environment variables and construct it.
    ///
    /// Resolution follows [`RepositoryType::from_env`]. When the resolved
    /// type is Postgres, connection settings are read from the environment
    /// as well.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config =
                        PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
                    Self::create(RepositoryType::Postgres, Some(&config)).await
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Self::create(RepositoryType::Postgres, None).await
                }
            }
        }
    }

    /// Load a `repository.toml` file and construct the backend it names.
    pub async fn from_config_file<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(path)?;
        Self::from_parsed_config(&config).await
    }

    /// Like [`Self::from_config_file`], searching the standard locations.
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        Self::from_parsed_config(&RepositoryConfig::from_default_location()?).await
    }

    async fn from_parsed_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        // Local resolves to None here; Postgres resolves to parsed settings
        // or to the config module's feature and validation errors.
        let postgres = config.to_postgres_config()?;
        Self::create(repo_type, postgres.as_ref()).await
    }
}

/// Fluent configuration for repository creation.
///
/// ```ignore
/// use khatma_rust::db::{RepositoryBuilder, RepositoryType};
///
/// let repo = RepositoryBuilder::new()
///     .repository_type(RepositoryType::Local)
///     .build()
///     .await?;
/// ```
pub struct RepositoryBuilder {
    repo_type: RepositoryType,
    #[cfg(feature = "postgres-repo")]
    postgres_config: Option<PostgresConfig>,
}

impl RepositoryBuilder {
    /// Start a builder seeded from the environment.
    pub fn new() -> Self {
        Self {
            repo_type: RepositoryType::from_env(),
            #[cfg(feature = "postgres-repo")]
            postgres_config: None,
        }
    }

    /// Override the backend type.
    pub fn repository_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    /// Supply explicit Postgres connection settings.
    #[cfg(feature = "postgres-repo")]
    pub fn postgres_config(mut self, config: PostgresConfig) -> Self {
        self.postgres_config = Some(config);
        self
    }

    /// Re-resolve the backend, and its settings when Postgres, from the
    /// environment.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.repo_type = RepositoryType::from_env();

        if self.repo_type == RepositoryType::Postgres {
            #[cfg(feature = "postgres-repo")]
            {
                let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
                self.postgres_config = Some(config);
            }
            #[cfg(not(feature = "postgres-repo"))]
            return Err(feature_disabled());
        }

        Ok(self)
    }

    /// Adopt the backend and settings named in a `repository.toml` file.
    pub fn from_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self, RepositoryError> {
        let config = RepositoryConfig::from_file(path)?;
        self.adopt(config)
    }

    /// Adopt configuration found in the standard `repository.toml` locations.
    pub fn from_default_config(self) -> Result<Self, RepositoryError> {
        let config = RepositoryConfig::from_default_location()?;
        self.adopt(config)
    }

    fn adopt(mut self, config: RepositoryConfig) -> Result<Self, RepositoryError> {
        self.repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        #[cfg(feature = "postgres-repo")]
        {
            self.postgres_config = config.to_postgres_config()?;
        }
        #[cfg(not(feature = "postgres-repo"))]
        {
            // Surfaces the disabled-feature error when the file names Postgres.
            config.to_postgres_config()?;
        }

        Ok(self)
    }

    /// Construct the repository described by this builder.
    pub async fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "postgres-repo")]
        let postgres = self.postgres_config;
        #[cfg(not(feature = "postgres-repo"))]
        let postgres: Option<PostgresConfig> = None;

        RepositoryFactory::create(self.repo_type, postgres.as_ref()).await
    }
}

impl Default for RepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "postgres-repo"))]
fn feature_disabled() -> RepositoryError {
    RepositoryError::configuration("Postgres repository feature not enabled")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::HealthCheckRepository;

    #[test]
    fn test_type_parsing_accepts_aliases() {
        assert_eq!(
            "postgres".parse::<RepositoryType>().unwrap(),
            RepositoryType::Postgres
        );
        assert_eq!(
            "Pg".parse::<RepositoryType>().unwrap(),
            RepositoryType::Postgres
        );
        assert_eq!(
            "LOCAL".parse::<RepositoryType>().unwrap(),
            RepositoryType::Local
        );
        assert!("sqlite".parse::<RepositoryType>().is_err());
    }

    #[tokio::test]
    async fn test_create_local_is_healthy() {
        let local = RepositoryFactory::create_local();
        let healthy = local.health_check().await.unwrap();
        assert!(healthy);
    }

    #[tokio::test]
    async fn test_builder_builds_local() {
        let built = RepositoryBuilder::new()
            .repository_type(RepositoryType::Local)
            .build()
            .await
            .unwrap();

        let healthy = built.health_check().await.unwrap();
        assert!(healthy);
    }
}
