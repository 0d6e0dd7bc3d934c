/// HTTP client for the features store
///
/// `POST {base}/similar_items?track_id=..&k=..` answers column-oriented
/// `{"track_id_2": [...], "score": [...]}`.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{Collaborator, UpstreamError},
    models::{ScoredCandidate, SimilarItemsResponse, TrackId},
    services::providers::FeaturesProvider,
};

const COLLABORATOR: Collaborator = Collaborator::Features;

#[derive(Clone)]
pub struct FeaturesStoreClient {
    http_client: HttpClient,
    api_url: String,
    timeout: Duration,
}

impl FeaturesStoreClient {
    pub fn new(http_client: HttpClient, api_url: String, timeout: Duration) -> Self {
        Self {
            http_client,
            api_url,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl FeaturesProvider for FeaturesStoreClient {
    async fn similar_items(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, UpstreamError> {
        let url = format!("{}/similar_items", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .query(&[("track_id", track_id.to_string()), ("k", k.to_string())])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(COLLABORATOR, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                collaborator: COLLABORATOR,
                status: response.status().as_u16(),
            });
        }

        let body: SimilarItemsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(COLLABORATOR, e))?;
        let candidates = body.into_candidates();

        tracing::debug!(
            track_id,
            candidates = candidates.len(),
            collaborator = %COLLABORATOR,
            "Similar items fetched"
        );

        Ok(candidates)
    }
}
