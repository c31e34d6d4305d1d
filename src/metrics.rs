//! Prometheus counters for playlist loading, exposed on /metrics

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

use crate::models::{MediaKind, PlaylistStats};

lazy_static! {
    /// Playlists loaded successfully, by source (url, file, text)
    pub static ref PLAYLISTS_LOADED: IntCounterVec = register_int_counter_vec!(
        "playlists_loaded_total",
        "Total number of playlists loaded",
        &["source"]
    )
    .unwrap();

    /// Entries emitted by the parser, by media kind
    pub static ref PLAYLIST_ENTRIES: IntCounterVec = register_int_counter_vec!(
        "playlist_entries_total",
        "Total number of playlist entries classified",
        &["kind"]
    )
    .unwrap();

    /// Failed loads, by error reason
    pub static ref PLAYLIST_LOAD_FAILURES: IntCounterVec = register_int_counter_vec!(
        "playlist_load_failures_total",
        "Total number of failed playlist loads",
        &["reason"]
    )
    .unwrap();
}

pub fn record_load(source: &str, stats: &PlaylistStats) {
    PLAYLISTS_LOADED.with_label_values(&[source]).inc();

    for kind in MediaKind::ALL {
        let count = match kind {
            MediaKind::Channel => stats.channel_count,
            MediaKind::Movie => stats.movie_count,
            MediaKind::Series => stats.series_count,
        };
        PLAYLIST_ENTRIES
            .with_label_values(&[kind.as_str()])
            .inc_by(count as u64);
    }
}

pub fn record_failure(reason: &str) {
    PLAYLIST_LOAD_FAILURES.with_label_values(&[reason]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_load_counts_entries() {
        let stats = PlaylistStats {
            total_items: 3,
            channel_count: 2,
            movie_count: 1,
            series_count: 0,
            group_count: 2,
        };

        let before = PLAYLIST_ENTRIES.with_label_values(&["channel"]).get();
        record_load("metrics-test", &stats);

        assert!(PLAYLISTS_LOADED.with_label_values(&["metrics-test"]).get() >= 1);
        assert!(PLAYLIST_ENTRIES.with_label_values(&["channel"]).get() >= before + 2);
    }
}
