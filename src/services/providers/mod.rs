/// External collaborators of the online branch
///
/// The events store supplies a user's most recent interactions and the
/// features store supplies item-to-item similarity. Both are consulted per
/// request; neither is trusted to be available.
use crate::{
    error::UpstreamError,
    models::{ScoredCandidate, TrackId, UserId},
};

pub mod events_store;
pub mod features_store;

pub use events_store::EventsStoreClient;
pub use features_store::FeaturesStoreClient;

/// Source of recent user interactions
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EventsProvider: Send + Sync {
    /// Up to `n` track ids the user interacted with, most recent first
    async fn recent_events(&self, user_id: UserId, n: usize) -> Result<Vec<TrackId>, UpstreamError>;
}

/// Source of item-similarity results
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeaturesProvider: Send + Sync {
    /// Up to `k` tracks similar to `track_id`, in collaborator order
    async fn similar_items(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, UpstreamError>;
}
