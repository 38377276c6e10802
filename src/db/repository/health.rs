//! Backend reachability checks.

use async_trait::async_trait;

use super::error::RepositoryResult;

/// Liveness probe for a storage backend, consumed by the HTTP health
/// endpoint and by factory smoke tests.
#[async_trait]
pub trait HealthCheckRepository: Send + Sync {
    /// Returns `Ok(true)` when the backend answered the probe and
    /// `Ok(false)` when it answered but reported itself degraded.
    /// Transport failures surface as `Err`.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
