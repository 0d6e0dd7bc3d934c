/// HTTP client for the events store
///
/// `POST {base}/get?user_id=..&k=..` answers `{"events": [track_id, ...]}`.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{Collaborator, UpstreamError},
    models::{EventsResponse, TrackId, UserId},
    services::providers::EventsProvider,
};

const COLLABORATOR: Collaborator = Collaborator::Events;

#[derive(Clone)]
pub struct EventsStoreClient {
    http_client: HttpClient,
    api_url: String,
    timeout: Duration,
}

impl EventsStoreClient {
    pub fn new(http_client: HttpClient, api_url: String, timeout: Duration) -> Self {
        Self {
            http_client,
            api_url,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl EventsProvider for EventsStoreClient {
    async fn recent_events(&self, user_id: UserId, n: usize) -> Result<Vec<TrackId>, UpstreamError> {
        let url = format!("{}/get", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .query(&[("user_id", user_id.to_string()), ("k", n.to_string())])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(COLLABORATOR, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                collaborator: COLLABORATOR,
                status: response.status().as_u16(),
            });
        }

        let body: EventsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(COLLABORATOR, e))?;

        tracing::debug!(
            user_id,
            events = body.events.len(),
            collaborator = %COLLABORATOR,
            "Recent events fetched"
        );

        Ok(body.events)
    }
}
