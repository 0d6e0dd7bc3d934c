use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::{
    error::{LookupError, TableKind},
    models::{DefaultRecord, PersonalRecord, TrackId, UserId},
    services::dedup::dedup_ids,
};

/// Records to populate one of the offline tables with
#[derive(Debug, Clone)]
pub enum TableSource {
    /// Rows grouped by user; row order within a user is rank order
    Personal(Vec<PersonalRecord>),
    /// Rows ordered by their explicit `rank` field
    Default(Vec<DefaultRecord>),
}

impl TableSource {
    pub fn kind(&self) -> TableKind {
        match self {
            TableSource::Personal(_) => TableKind::Personal,
            TableSource::Default(_) => TableKind::Default,
        }
    }
}

/// Which table answered an offline lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OfflineSource {
    Personal,
    /// The user had no personal entry
    Default,
}

/// Result of a successful offline lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineRecs {
    pub tracks: Vec<TrackId>,
    pub source: OfflineSource,
}

/// Snapshot of how often each offline table served a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UsageStats {
    pub request_personal_count: u64,
    pub request_default_count: u64,
}

#[derive(Debug, Default)]
struct UsageCounters {
    personal: AtomicU64,
    default: AtomicU64,
}

/// Precomputed personal and default recommendations
///
/// Tables are filled once through [`OfflineStore::load`] before the store is
/// shared; afterwards only the usage counters change.
#[derive(Debug, Default)]
pub struct OfflineStore {
    personal: Option<HashMap<UserId, Vec<TrackId>>>,
    default: Option<Vec<TrackId>>,
    counters: UsageCounters,
}

impl OfflineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates one table, replacing anything previously loaded into it
    ///
    /// Returns the number of tracks held by the table afterwards.
    pub fn load(&mut self, source: TableSource) -> usize {
        let kind = source.kind();
        tracing::info!(table = %kind, "Loading recommendations");

        match source {
            TableSource::Personal(records) => {
                let mut table: HashMap<UserId, Vec<TrackId>> = HashMap::new();
                for record in records {
                    table.entry(record.user_id).or_default().push(record.track_id);
                }
                for tracks in table.values_mut() {
                    *tracks = dedup_ids(tracks.iter().copied());
                }

                let total: usize = table.values().map(Vec::len).sum();
                tracing::info!(users = table.len(), tracks = total, "Loaded personal recommendations");
                self.personal = Some(table);
                total
            }
            TableSource::Default(mut records) => {
                records.sort_by_key(|record| record.rank);
                let tracks = dedup_ids(records.into_iter().map(|record| record.track_id));

                let total = tracks.len();
                tracing::info!(tracks = total, "Loaded default recommendations");
                self.default = Some(tracks);
                total
            }
        }
    }

    /// Reports the first table that was never loaded
    pub fn validate(&self) -> Result<(), LookupError> {
        if self.personal.is_none() {
            return Err(LookupError::TableNotLoaded(TableKind::Personal));
        }
        if self.default.is_none() {
            return Err(LookupError::TableNotLoaded(TableKind::Default));
        }
        Ok(())
    }

    /// Looks up up to `k` tracks for a user, falling back to the default list
    ///
    /// Increments the counter of whichever table answered. Failures are not counted.
    pub fn lookup(&self, user_id: UserId, k: usize) -> Result<OfflineRecs, LookupError> {
        let personal = self
            .personal
            .as_ref()
            .ok_or(LookupError::TableNotLoaded(TableKind::Personal))?;

        if let Some(tracks) = personal.get(&user_id) {
            self.counters.personal.fetch_add(1, Ordering::Relaxed);
            return Ok(OfflineRecs {
                tracks: tracks.iter().take(k).copied().collect(),
                source: OfflineSource::Personal,
            });
        }

        let default = self
            .default
            .as_ref()
            .ok_or(LookupError::TableNotLoaded(TableKind::Default))?;

        self.counters.default.fetch_add(1, Ordering::Relaxed);
        Ok(OfflineRecs {
            tracks: default.iter().take(k).copied().collect(),
            source: OfflineSource::Default,
        })
    }

    /// Offline recommendations for a user; never fails
    ///
    /// Lookup failures are logged and resolve to an empty list.
    pub fn get(&self, user_id: UserId, k: usize) -> Vec<TrackId> {
        match self.lookup(user_id, k) {
            Ok(recs) => {
                tracing::debug!(
                    user_id,
                    source = ?recs.source,
                    count = recs.tracks.len(),
                    "Offline recommendations resolved"
                );
                recs.tracks
            }
            Err(e) => {
                tracing::error!(user_id, branch = "offline", error = %e, "No recommendations found");
                Vec::new()
            }
        }
    }

    /// Current usage counters; also written to the log
    pub fn stats(&self) -> UsageStats {
        let stats = UsageStats {
            request_personal_count: self.counters.personal.load(Ordering::Relaxed),
            request_default_count: self.counters.default.load(Ordering::Relaxed),
        };

        tracing::info!("Stats for recommendations");
        tracing::info!("{:<30} {}", "request_personal_count", stats.request_personal_count);
        tracing::info!("{:<30} {}", "request_default_count", stats.request_default_count);

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn personal(rows: &[(UserId, TrackId)]) -> TableSource {
        TableSource::Personal(
            rows.iter()
                .map(|&(user_id, track_id)| PersonalRecord {
                    user_id,
                    track_id,
                    score: 1.0,
                })
                .collect(),
        )
    }

    fn default(rows: &[(TrackId, i64)]) -> TableSource {
        TableSource::Default(
            rows.iter()
                .map(|&(track_id, rank)| DefaultRecord { track_id, rank })
                .collect(),
        )
    }

    fn loaded_store() -> OfflineStore {
        let mut store = OfflineStore::new();
        store.load(personal(&[(1, 30), (1, 10), (1, 20), (2, 40)]));
        store.load(default(&[(7, 3), (5, 1), (6, 2)]));
        store
    }

    #[test]
    fn test_personal_user_gets_personal_list_truncated() {
        let store = loaded_store();

        assert_eq!(store.get(1, 2), vec![30, 10]);
        assert_eq!(store.stats().request_personal_count, 1);
        assert_eq!(store.stats().request_default_count, 0);
    }

    #[test]
    fn test_unknown_user_gets_default_list_by_rank() {
        let store = loaded_store();

        let recs = store.lookup(99, 10).unwrap();
        assert_eq!(recs.tracks, vec![5, 6, 7]);
        assert_eq!(recs.source, OfflineSource::Default);
        assert_eq!(store.stats().request_default_count, 1);
        assert_eq!(store.stats().request_personal_count, 0);
    }

    #[test]
    fn test_k_larger_than_list_returns_everything() {
        let store = loaded_store();
        assert_eq!(store.get(2, 100), vec![40]);
    }

    #[test]
    fn test_personal_groups_non_contiguous_rows_and_drops_repeats() {
        let mut store = OfflineStore::new();
        store.load(personal(&[(1, 10), (2, 50), (1, 11), (1, 10)]));
        store.load(default(&[]));

        assert_eq!(store.get(1, 10), vec![10, 11]);
    }

    #[test]
    fn test_missing_default_table_is_internal_error_and_not_counted() {
        let mut store = OfflineStore::new();
        store.load(personal(&[(1, 10)]));

        assert_eq!(
            store.lookup(42, 5),
            Err(LookupError::TableNotLoaded(TableKind::Default))
        );
        assert!(store.get(42, 5).is_empty());
        assert_eq!(store.stats(), UsageStats::default());

        // personal users are still served
        assert_eq!(store.get(1, 5), vec![10]);
    }

    #[test]
    fn test_missing_personal_table_is_internal_error() {
        let mut store = OfflineStore::new();
        store.load(default(&[(1, 1)]));

        assert_eq!(
            store.lookup(1, 5),
            Err(LookupError::TableNotLoaded(TableKind::Personal))
        );
        assert!(store.get(1, 5).is_empty());
        assert_eq!(store.stats(), UsageStats::default());
    }

    #[test]
    fn test_validate_reports_unloaded_tables() {
        let mut store = OfflineStore::new();
        assert_eq!(
            store.validate(),
            Err(LookupError::TableNotLoaded(TableKind::Personal))
        );

        store.load(personal(&[]));
        assert_eq!(
            store.validate(),
            Err(LookupError::TableNotLoaded(TableKind::Default))
        );

        store.load(default(&[]));
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_counters_under_concurrent_lookups() {
        let store = Arc::new(loaded_store());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.get(if i % 2 == 0 { 1 } else { 99 }, 3);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.request_personal_count, 400);
        assert_eq!(stats.request_default_count, 400);
    }
}
