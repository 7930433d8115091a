use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::future::Cache;
use sea_orm::DatabaseConnection;
use tracing::debug;
use uuid::Uuid;

use crate::config::{CacheConfig, ListingLimits};
use crate::models::reports::DashboardSummary;
use crate::models::voting::VotingResultsView;
use crate::store::Page;

#[derive(Clone)]
pub struct AppState {
    pub database: Arc<DatabaseConnection>,
    pub cache: Arc<PortalCache>,
    pub limits: ListingLimits,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(database: DatabaseConnection, cache: Arc<PortalCache>, limits: ListingLimits) -> Self {
        assert!(limits.max_page_size > 0, "Listing limits must be configured");
        Self {
            database: Arc::new(database),
            cache,
            limits,
            start_time: Instant::now(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Clamps a requested window to the configured page sizes.
    pub fn page(&self, limit: Option<u64>, offset: Option<u64>) -> Page {
        let limit = limit
            .unwrap_or(self.limits.default_page_size)
            .clamp(1, self.limits.max_page_size);
        Page::new(limit, offset.unwrap_or(0).min(i64::MAX as u64))
    }
}

pub struct PortalCache {
    /// Single entry keyed by `()`
    pub dashboard: Cache<(), Arc<DashboardSummary>>,
    /// Bumped by every invalidation so a summary computed across a write is not kept
    dashboard_generation: AtomicU64,
    /// Results of closed votings, which no longer change
    pub voting_results: Cache<Uuid, Arc<VotingResultsView>>,
}

impl PortalCache {
    pub fn new(config: &CacheConfig) -> Self {
        let dashboard = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.dashboard_ttl_seconds))
            .build();

        let voting_results = Cache::builder()
            .max_capacity(config.results_max_capacity)
            .time_to_live(Duration::from_secs(config.results_ttl_seconds))
            .time_to_idle(Duration::from_secs(config.results_ttl_seconds / 2 + 1))
            .build();

        Self {
            dashboard,
            dashboard_generation: AtomicU64::new(0),
            voting_results,
        }
    }

    /// Drops the cached dashboard after any write that feeds it.
    pub async fn invalidate_dashboard(&self) {
        self.dashboard_generation.fetch_add(1, Ordering::SeqCst);
        self.dashboard.invalidate(&()).await;
    }

    /// Returns the cached dashboard or computes and caches a fresh one.
    ///
    /// When an invalidation lands while `compute` runs, the fresh summary is
    /// still returned to this caller but dropped from the cache.
    pub async fn dashboard_or_compute<F, Fut, E>(&self, compute: F) -> Result<Arc<DashboardSummary>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DashboardSummary, E>>,
    {
        if let Some(cached) = self.dashboard.get(&()).await {
            debug!("Dashboard served from cache");
            return Ok(cached);
        }

        let generation = self.dashboard_generation.load(Ordering::SeqCst);
        let summary = Arc::new(compute().await?);
        self.dashboard.insert((), Arc::clone(&summary)).await;
        if self.dashboard_generation.load(Ordering::SeqCst) != generation {
            debug!("Dashboard changed during computation, not cached");
            self.dashboard.invalidate(&()).await;
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_config() -> CacheConfig {
        CacheConfig {
            dashboard_ttl_seconds: 30,
            results_max_capacity: 16,
            results_ttl_seconds: 60,
        }
    }

    fn summary(total_members: u64) -> DashboardSummary {
        DashboardSummary {
            membership: crate::models::reports::MembershipStats {
                total_members,
                by_status: vec![],
                by_department: vec![],
            },
            finance: crate::models::reports::FinanceStats {
                requests_by_status: vec![],
                total_support_paid: rust_decimal::Decimal::ZERO,
                unpaid_fees: 0,
                unpaid_fees_amount: rust_decimal::Decimal::ZERO,
            },
            voting: crate::models::reports::VotingStats {
                by_status: vec![],
                average_quorum_percentage: None,
            },
            generated_at: 0,
        }
    }

    #[tokio::test]
    async fn dashboard_invalidation_clears_entry() {
        let cache = PortalCache::new(&cache_config());
        cache.dashboard.insert((), Arc::new(summary(3))).await;
        assert!(cache.dashboard.get(&()).await.is_some());
        cache.invalidate_dashboard().await;
        assert!(cache.dashboard.get(&()).await.is_none());
    }

    #[tokio::test]
    async fn computed_dashboard_is_reused() {
        let cache = PortalCache::new(&cache_config());
        let first = cache
            .dashboard_or_compute(|| async { Ok::<_, ()>(summary(3)) })
            .await
            .unwrap();
        let second = cache
            .dashboard_or_compute(|| async { Ok::<_, ()>(summary(99)) })
            .await
            .unwrap();
        assert_eq!(first.membership.total_members, 3);
        assert_eq!(second.membership.total_members, 3);
    }

    #[tokio::test]
    async fn write_during_computation_discards_summary() {
        let cache = PortalCache::new(&cache_config());
        let stale = cache
            .dashboard_or_compute(|| async {
                cache.invalidate_dashboard().await;
                Ok::<_, ()>(summary(3))
            })
            .await
            .unwrap();
        assert_eq!(stale.membership.total_members, 3);
        assert!(cache.dashboard.get(&()).await.is_none());

        let fresh = cache
            .dashboard_or_compute(|| async { Ok::<_, ()>(summary(4)) })
            .await
            .unwrap();
        assert_eq!(fresh.membership.total_members, 4);
    }

    #[tokio::test]
    async fn failed_computation_caches_nothing() {
        let cache = PortalCache::new(&cache_config());
        let result = cache
            .dashboard_or_compute(|| async { Err::<DashboardSummary, _>("database down") })
            .await;
        assert_eq!(result.unwrap_err(), "database down");
        assert!(cache.dashboard.get(&()).await.is_none());
    }

    #[test]
    fn page_is_clamped() {
        let limits = ListingLimits {
            default_page_size: 20,
            max_page_size: 100,
        };
        let database = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(database, Arc::new(PortalCache::new(&cache_config())), limits);
        assert_eq!(state.page(None, None), Page::new(20, 0));
        assert_eq!(state.page(Some(0), Some(5)), Page::new(1, 5));
        assert_eq!(state.page(Some(10_000), None).limit, 100);
    }
}
