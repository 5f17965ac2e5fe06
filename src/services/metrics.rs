//! Prometheus counters, registered in the default registry and exposed on `/metrics`

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    pub static ref PLAYLIST_ENTRIES_PARSED: IntCounter = register_int_counter!(
        "world_tv_playlist_entries_parsed_total",
        "Playlist entries parsed into channel records"
    )
    .unwrap();

    pub static ref PLAYLIST_ENTRIES_SKIPPED: IntCounter = register_int_counter!(
        "world_tv_playlist_entries_skipped_total",
        "Playlist entries dropped as malformed or missing a stream URL"
    )
    .unwrap();

    pub static ref CHANNEL_QUERIES: IntCounterVec = register_int_counter_vec!(
        "world_tv_channel_queries_total",
        "Channel list queries served, by data source",
        &["source"]
    )
    .unwrap();
}

/// Count one list query against `source` (`directory`, `sqlite`, `memory`)
pub fn record_query(source: &str) {
    CHANNEL_QUERIES.with_label_values(&[source]).inc();
}

pub fn record_parse(parsed: usize, skipped: usize) {
    PLAYLIST_ENTRIES_PARSED.inc_by(parsed as u64);
    PLAYLIST_ENTRIES_SKIPPED.inc_by(skipped as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_gathered() {
        record_query("directory");
        record_parse(3, 1);

        let families = prometheus::gather();
        let names: Vec<_> = families.iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.contains(&"world_tv_channel_queries_total".to_string()));
        assert!(names.contains(&"world_tv_playlist_entries_parsed_total".to_string()));
        assert!(PLAYLIST_ENTRIES_PARSED.get() >= 3);
    }
}
