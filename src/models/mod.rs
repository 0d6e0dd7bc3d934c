use serde::{Deserialize, Serialize};

/// Opaque user identifier
pub type UserId = i64;

/// Opaque track identifier, the unit of recommendation
pub type TrackId = i64;

/// A candidate track with the similarity score it was found with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub track_id: TrackId,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(track_id: TrackId, score: f64) -> Self {
        Self { track_id, score }
    }
}

// ============================================================================
// Offline tables
// ============================================================================

/// One row of the personal recommendations table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonalRecord {
    pub user_id: UserId,
    pub track_id: TrackId,
    pub score: f64,
}

/// One row of the default (top tracks) table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultRecord {
    pub track_id: TrackId,
    pub rank: i64,
}

// ============================================================================
// Collaborator wire types
// ============================================================================

/// Events store response: most recent track ids, newest first
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<TrackId>,
}

/// Features store response for `/similar_items`, column oriented
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarItemsResponse {
    #[serde(default)]
    pub track_id_2: Vec<TrackId>,
    #[serde(default)]
    pub score: Vec<f64>,
}

impl SimilarItemsResponse {
    /// Zips the columns into candidates, keeping collaborator order
    ///
    /// A trailing entry without a counterpart in the other column is ignored.
    pub fn into_candidates(self) -> Vec<ScoredCandidate> {
        self.track_id_2
            .into_iter()
            .zip(self.score)
            .map(|(track_id, score)| ScoredCandidate::new(track_id, score))
            .collect()
    }
}

// ============================================================================
// API types
// ============================================================================

/// Response body of every recommendations endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecsResponse {
    pub recs: Vec<TrackId>,
}
