//! TTL-cached health checks over the storage and backend probes.

use crate::backend::TransformBackend;
use crate::storage::RunStore;
use crate::utils::{now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How long a computed [`HealthStatus`] stays valid.
pub const DEFAULT_HEALTH_TTL: Duration = Duration::from_secs(300);

/// The observed state of one liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    /// The collaborator answered the probe.
    Connected,
    /// The probe failed.
    Disconnected,
}

impl ProbeState {
    fn from_probe<E>(result: &Result<(), E>) -> Self {
        if result.is_ok() {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// The rolled-up health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    /// Both probes connected.
    Healthy,
    /// At least one probe disconnected.
    Unhealthy,
}

/// A snapshot of the system's liveness, recomputed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Healthy iff both probes connected.
    pub overall: OverallHealth,
    /// Storage probe result.
    pub storage: ProbeState,
    /// Backend probe result.
    pub backend: ProbeState,
    /// When the probes ran.
    pub observed_at: Timestamp,
}

impl HealthStatus {
    /// Returns true if both probes were connected.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.overall == OverallHealth::Healthy
    }
}

/// Time-bounded memoization of the combined liveness check.
///
/// The cached snapshot lives behind an async mutex that is held across the
/// probes, so a status and its timestamp always update atomically as a
/// pair, and concurrent `check()` calls during a miss collapse into a
/// single in-flight probe run whose result every waiter shares.
///
/// Construct one at process start and hand it by `Arc` to whichever
/// component serves liveness checks.
pub struct HealthCache {
    storage: Arc<dyn RunStore>,
    backend: Arc<dyn TransformBackend>,
    ttl: chrono::Duration,
    cached: Mutex<Option<HealthStatus>>,
}

impl HealthCache {
    /// Creates a cache with the default 300 second TTL.
    #[must_use]
    pub fn new(storage: Arc<dyn RunStore>, backend: Arc<dyn TransformBackend>) -> Self {
        Self::with_ttl(storage, backend, DEFAULT_HEALTH_TTL)
    }

    /// Creates a cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(
        storage: Arc<dyn RunStore>,
        backend: Arc<dyn TransformBackend>,
        ttl: Duration,
    ) -> Self {
        Self {
            storage,
            backend,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            cached: Mutex::new(None),
        }
    }

    /// Returns the current health status, probing only when the cached
    /// snapshot has expired.
    ///
    /// Within the TTL window the cached value is returned unchanged (same
    /// `observed_at`, no probes performed). On expiry both probes run
    /// concurrently and independently: a failure in one downgrades only
    /// that probe's field and never raises out of this method.
    pub async fn check(&self) -> HealthStatus {
        let mut cached = self.cached.lock().await;

        if let Some(status) = cached.as_ref() {
            if now_utc().signed_duration_since(status.observed_at) < self.ttl {
                debug!("health status served from cache");
                return status.clone();
            }
        }

        let (storage_probe, backend_probe) =
            tokio::join!(self.storage.ping(), self.backend.ping());

        if let Err(err) = &storage_probe {
            warn!(error = %err, "storage health probe failed");
        }
        if let Err(err) = &backend_probe {
            warn!(error = %err, "backend health probe failed");
        }

        let storage = ProbeState::from_probe(&storage_probe);
        let backend = ProbeState::from_probe(&backend_probe);
        let overall = if storage == ProbeState::Connected && backend == ProbeState::Connected {
            OverallHealth::Healthy
        } else {
            OverallHealth::Unhealthy
        };

        let status = HealthStatus {
            overall,
            storage,
            backend,
            observed_at: now_utc(),
        };
        *cached = Some(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRunStore, ScriptedBackend};

    fn cache(
        store: &Arc<MockRunStore>,
        backend: &Arc<ScriptedBackend>,
        ttl: Duration,
    ) -> HealthCache {
        HealthCache::with_ttl(
            Arc::clone(store) as Arc<dyn RunStore>,
            Arc::clone(backend) as Arc<dyn TransformBackend>,
            ttl,
        )
    }

    #[tokio::test]
    async fn test_healthy_when_both_probes_connect() {
        let store = Arc::new(MockRunStore::new());
        let backend = Arc::new(ScriptedBackend::new());
        let cache = cache(&store, &backend, DEFAULT_HEALTH_TTL);

        let status = cache.check().await;
        assert!(status.is_healthy());
        assert_eq!(status.storage, ProbeState::Connected);
        assert_eq!(status.backend, ProbeState::Connected);
    }

    #[tokio::test]
    async fn test_cached_within_ttl_without_reprobing() {
        let store = Arc::new(MockRunStore::new());
        let backend = Arc::new(ScriptedBackend::new());
        let cache = cache(&store, &backend, Duration::from_secs(60));

        let first = cache.check().await;
        let second = cache.check().await;

        assert_eq!(first, second);
        assert_eq!(first.observed_at, second.observed_at);
        assert_eq!(store.ping_count(), 1);
        assert_eq!(backend.ping_count(), 1);
    }

    #[tokio::test]
    async fn test_recomputed_after_expiry_with_later_timestamp() {
        let store = Arc::new(MockRunStore::new());
        let backend = Arc::new(ScriptedBackend::new());
        let cache = cache(&store, &backend, Duration::from_millis(20));

        let first = cache.check().await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        let second = cache.check().await;

        assert!(second.observed_at > first.observed_at);
        assert_eq!(store.ping_count(), 2);
        assert_eq!(backend.ping_count(), 2);
    }

    #[tokio::test]
    async fn test_probes_are_independent() {
        let store = Arc::new(MockRunStore::new());
        store.set_healthy(false);
        let backend = Arc::new(ScriptedBackend::new());
        let cache = cache(&store, &backend, DEFAULT_HEALTH_TTL);

        let status = cache.check().await;
        assert_eq!(status.overall, OverallHealth::Unhealthy);
        assert_eq!(status.storage, ProbeState::Disconnected);
        // The storage outage did not block or fail the backend probe.
        assert_eq!(status.backend, ProbeState::Connected);
        assert_eq!(backend.ping_count(), 1);
    }

    #[tokio::test]
    async fn test_whole_snapshot_recomputed_on_refresh() {
        let store = Arc::new(MockRunStore::new());
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_healthy(false);
        let cache = cache(&store, &backend, Duration::from_millis(10));

        let first = cache.check().await;
        assert_eq!(first.overall, OverallHealth::Unhealthy);

        backend.set_healthy(true);
        tokio::time::sleep(Duration::from_millis(30)).await;

        let second = cache.check().await;
        assert_eq!(second.overall, OverallHealth::Healthy);
        assert_eq!(second.backend, ProbeState::Connected);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_probe_run() {
        let store = Arc::new(MockRunStore::new());
        let backend = Arc::new(ScriptedBackend::new());
        let cache = Arc::new(cache(&store, &backend, Duration::from_secs(60)));

        let (a, b) = tokio::join!(
            {
                let cache = Arc::clone(&cache);
                async move { cache.check().await }
            },
            {
                let cache = Arc::clone(&cache);
                async move { cache.check().await }
            }
        );

        assert_eq!(a, b);
        assert_eq!(store.ping_count(), 1);
        assert_eq!(backend.ping_count(), 1);
    }

    #[test]
    fn test_wire_values_match_expected_casing() {
        let status = HealthStatus {
            overall: OverallHealth::Healthy,
            storage: ProbeState::Connected,
            backend: ProbeState::Disconnected,
            observed_at: now_utc(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["overall"], "healthy");
        assert_eq!(json["storage"], "connected");
        assert_eq!(json["backend"], "disconnected");
    }
}
