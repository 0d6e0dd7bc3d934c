use crate::{models::TrackId, services::dedup::dedup_ids};

/// Blends online and offline recommendations into one list of at most `k` tracks
///
/// Positions are interleaved pairwise with the online track first, then the
/// longer list's tail is appended. Duplicates keep their first position.
pub fn blend(online: &[TrackId], offline: &[TrackId], k: usize) -> Vec<TrackId> {
    let paired = online.len().min(offline.len());

    let mut merged = Vec::with_capacity(online.len() + offline.len());
    for (on, off) in online.iter().zip(offline.iter()) {
        merged.push(*on);
        merged.push(*off);
    }
    merged.extend_from_slice(&online[paired..]);
    merged.extend_from_slice(&offline[paired..]);

    let mut blended = dedup_ids(merged);
    blended.truncate(k);
    blended
}
