use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{Collaborator, UpstreamError},
    models::{ScoredCandidate, TrackId, UserId},
    services::{
        dedup::dedup_ids,
        providers::{EventsProvider, FeaturesProvider},
    },
};

/// Why the online branch returned less than it could have
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// Events store failed; the whole online branch is empty
    EventsUnavailable(UpstreamError),
    /// One similarity lookup failed; only its contribution is missing
    SimilarItemsUnavailable {
        track_id: TrackId,
        error: UpstreamError,
    },
    /// The online branch as a whole ran past its time bound
    Timeout,
}

/// Online recommendations together with any degradation that shaped them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnlineRecs {
    pub tracks: Vec<TrackId>,
    pub degradations: Vec<Degradation>,
}

impl OnlineRecs {
    pub fn timed_out() -> Self {
        Self {
            tracks: Vec::new(),
            degradations: vec![Degradation::Timeout],
        }
    }
}

/// Builds real-time recommendations from recent events and item similarity
#[derive(Clone)]
pub struct OnlineAggregator {
    events: Arc<dyn EventsProvider>,
    features: Arc<dyn FeaturesProvider>,
    recent_events_limit: usize,
    call_timeout: Duration,
}

impl OnlineAggregator {
    pub fn new(
        events: Arc<dyn EventsProvider>,
        features: Arc<dyn FeaturesProvider>,
        recent_events_limit: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            events,
            features,
            recent_events_limit,
            call_timeout,
        }
    }

    /// The `n` most recent tracks of a user, bounded by the per-call timeout
    pub async fn recent_events(&self, user_id: UserId, n: usize) -> Result<Vec<TrackId>, UpstreamError> {
        match tokio::time::timeout(self.call_timeout, self.events.recent_events(user_id, n)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                collaborator: Collaborator::Events,
            }),
        }
    }

    /// Up to `k` tracks similar to `track_id`, bounded by the per-call timeout
    pub async fn similar_items(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, UpstreamError> {
        match tokio::time::timeout(self.call_timeout, self.features.similar_items(track_id, k)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                collaborator: Collaborator::Features,
            }),
        }
    }

    /// Online recommendations for a user; never fails
    pub async fn aggregate(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        self.resolve(user_id, k).await.tracks
    }

    /// Online recommendations with the degradations encountered on the way
    pub async fn resolve(&self, user_id: UserId, k: usize) -> OnlineRecs {
        let events = match self.recent_events(user_id, self.recent_events_limit).await {
            Ok(events) => events,
            Err(error) => {
                tracing::error!(
                    user_id,
                    branch = "online",
                    collaborator = %error.collaborator(),
                    error = %error,
                    "Failed to fetch events"
                );
                return OnlineRecs {
                    tracks: Vec::new(),
                    degradations: vec![Degradation::EventsUnavailable(error)],
                };
            }
        };

        if events.is_empty() {
            tracing::debug!(user_id, "No recent events, online branch is empty");
            return OnlineRecs::default();
        }

        // One task per event; handles are joined in event order so the
        // concatenation below does not depend on completion order.
        let mut tasks = Vec::with_capacity(events.len());
        for track_id in events {
            let aggregator = self.clone();
            let task = tokio::spawn(async move { aggregator.similar_items(track_id, k).await });
            tasks.push((track_id, task));
        }

        let mut combined = Vec::new();
        let mut degradations = Vec::new();

        for (track_id, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(UpstreamError::Transport {
                    collaborator: Collaborator::Features,
                    message: e.to_string(),
                }),
            };

            match result {
                Ok(candidates) => combined.extend(candidates),
                Err(error) => {
                    tracing::error!(
                        user_id,
                        track_id,
                        branch = "online",
                        collaborator = %error.collaborator(),
                        error = %error,
                        "Failed to fetch similar items"
                    );
                    degradations.push(Degradation::SimilarItemsUnavailable { track_id, error });
                }
            }
        }

        if !degradations.is_empty() {
            tracing::warn!(
                user_id,
                failed = degradations.len(),
                candidates = combined.len(),
                "Partial similar items failure"
            );
        }

        OnlineRecs {
            tracks: rank_candidates(combined, k),
            degradations,
        }
    }
}

/// Orders candidates by score, best first, and keeps the first `k` distinct tracks
///
/// The sort is stable: equal scores keep their position in `candidates`.
/// Candidates with a non-finite score are dropped.
pub fn rank_candidates(mut candidates: Vec<ScoredCandidate>, k: usize) -> Vec<TrackId> {
    let before = candidates.len();
    candidates.retain(|candidate| candidate.score.is_finite());
    if candidates.len() != before {
        tracing::warn!(
            dropped = before - candidates.len(),
            "Dropped candidates with non-finite scores"
        );
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut ranked = dedup_ids(candidates.into_iter().map(|candidate| candidate.track_id));
    ranked.truncate(k);
    ranked
}
