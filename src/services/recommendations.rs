use std::sync::Arc;
use std::time::Duration;

use crate::{
    models::{TrackId, UserId},
    services::{
        blend::blend,
        offline::{OfflineStore, UsageStats},
        online::{OnlineAggregator, OnlineRecs},
    },
};

/// Resolves offline, online and blended recommendations
///
/// Constructed once at startup and shared by request handlers. None of the
/// resolve operations fail: every upstream or lookup problem degrades to an
/// empty or partial list.
#[derive(Clone)]
pub struct RecommendationService {
    offline: Arc<OfflineStore>,
    online: OnlineAggregator,
    online_timeout: Duration,
}

impl RecommendationService {
    pub fn new(offline: Arc<OfflineStore>, online: OnlineAggregator, online_timeout: Duration) -> Self {
        Self {
            offline,
            online,
            online_timeout,
        }
    }

    pub fn resolve_offline(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        self.offline.get(user_id, k)
    }

    pub async fn resolve_online(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        self.online.aggregate(user_id, k).await
    }

    /// Interleaves online and offline recommendations, online first
    ///
    /// Waits for both branches. The online branch is bounded by the configured
    /// timeout and counts as empty when it runs past it.
    pub async fn resolve_blended(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        let (offline, online) = tokio::join!(
            async { self.resolve_offline(user_id, k) },
            self.bounded_online(user_id, k)
        );

        let blended = blend(&online.tracks, &offline, k);

        tracing::info!(
            user_id,
            k,
            online = online.tracks.len(),
            offline = offline.len(),
            blended = blended.len(),
            degraded = !online.degradations.is_empty(),
            "Blended recommendations resolved"
        );

        blended
    }

    pub fn stats(&self) -> UsageStats {
        self.offline.stats()
    }

    async fn bounded_online(&self, user_id: UserId, k: usize) -> OnlineRecs {
        match tokio::time::timeout(self.online_timeout, self.online.resolve(user_id, k)).await {
            Ok(recs) => recs,
            Err(_) => {
                tracing::error!(
                    user_id,
                    branch = "online",
                    timeout_ms = self.online_timeout.as_millis() as u64,
                    "Online recommendations timed out"
                );
                OnlineRecs::timed_out()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Collaborator, UpstreamError},
        models::{DefaultRecord, PersonalRecord, ScoredCandidate},
        services::{
            offline::TableSource,
            providers::{FeaturesProvider, MockEventsProvider, MockFeaturesProvider},
        },
    };

    fn offline_store() -> Arc<OfflineStore> {
        let mut store = OfflineStore::new();
        store.load(TableSource::Personal(
            [10, 11, 12]
                .into_iter()
                .map(|track_id| PersonalRecord {
                    user_id: 1,
                    track_id,
                    score: 1.0,
                })
                .collect(),
        ));
        store.load(TableSource::Default(vec![
            DefaultRecord { track_id: 90, rank: 1 },
            DefaultRecord { track_id: 91, rank: 2 },
        ]));
        Arc::new(store)
    }

    fn service(events: MockEventsProvider, features: Arc<dyn FeaturesProvider>) -> RecommendationService {
        let online = OnlineAggregator::new(Arc::new(events), features, 3, Duration::from_secs(1));
        RecommendationService::new(offline_store(), online, Duration::from_millis(200))
    }

    fn events_ok(events: Vec<TrackId>) -> MockEventsProvider {
        let mut mock = MockEventsProvider::new();
        mock.expect_recent_events()
            .returning(move |_, _| Ok(events.clone()));
        mock
    }

    fn features_ok(pairs: Vec<(TrackId, f64)>) -> Arc<dyn FeaturesProvider> {
        let mut mock = MockFeaturesProvider::new();
        mock.expect_similar_items().returning(move |_, _| {
            Ok(pairs
                .iter()
                .map(|&(track_id, score)| ScoredCandidate::new(track_id, score))
                .collect())
        });
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_blended_interleaves_online_first() {
        let svc = service(events_ok(vec![5]), features_ok(vec![(20, 0.9), (21, 0.8), (11, 0.7)]));

        // online [20, 21, 11], offline [10, 11, 12]
        assert_eq!(svc.resolve_blended(1, 10).await, vec![20, 10, 21, 11, 12]);
        assert_eq!(svc.stats().request_personal_count, 1);
    }

    #[tokio::test]
    async fn test_blended_truncates_to_k() {
        let svc = service(events_ok(vec![5]), features_ok(vec![(20, 0.9), (21, 0.8)]));
        assert_eq!(svc.resolve_blended(1, 3).await, vec![20, 10, 21]);
    }

    #[tokio::test]
    async fn test_blended_falls_back_to_offline_when_events_fail() {
        let mut events = MockEventsProvider::new();
        events.expect_recent_events().returning(|_, _| {
            Err(UpstreamError::Status {
                collaborator: Collaborator::Events,
                status: 502,
            })
        });
        let svc = service(events, features_ok(vec![(20, 0.9)]));

        assert!(svc.resolve_online(42, 5).await.is_empty());
        assert_eq!(svc.resolve_blended(42, 5).await, vec![90, 91]);
        assert_eq!(svc.stats().request_default_count, 1);
    }

    /// Never answers within any reasonable bound
    struct StalledFeatures;

    #[async_trait::async_trait]
    impl FeaturesProvider for StalledFeatures {
        async fn similar_items(
            &self,
            _track_id: TrackId,
            _k: usize,
        ) -> Result<Vec<ScoredCandidate>, UpstreamError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_online_timeout_does_not_block_blend() {
        let events = events_ok(vec![5]);
        let online = OnlineAggregator::new(
            Arc::new(events),
            Arc::new(StalledFeatures),
            3,
            Duration::from_secs(60),
        );
        let svc = RecommendationService::new(offline_store(), online, Duration::from_millis(50));

        let started = std::time::Instant::now();
        let blended = svc.resolve_blended(1, 10).await;

        assert_eq!(blended, vec![10, 11, 12]);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_resolve_offline_for_unknown_user_uses_default() {
        let svc = service(events_ok(vec![]), features_ok(vec![]));

        assert_eq!(svc.resolve_offline(777, 1), vec![90]);
        let stats = svc.stats();
        assert_eq!(stats.request_default_count, 1);
        assert_eq!(stats.request_personal_count, 0);
    }
}
