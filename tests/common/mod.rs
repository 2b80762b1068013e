//! Common test utilities for integration tests.

#![allow(dead_code)]

use compaction_policy::{
    config::keys, CandidateFile, Configuration, FileId, StoreCompactionPolicy, StoreFacts,
    StoreSnapshot,
};

pub const HOUR: i64 = 3_600_000;
pub const DAY: i64 = 24 * HOUR;

/// Configuration with the ratio floor at one byte and periodic majors off, so
/// small byte counts exercise the ratio test directly.
pub fn plain_config() -> Configuration {
    Configuration::new()
        .with(keys::COMPACTION_MIN_SIZE, 1)
        .with(keys::MAJOR_COMPACTION_PERIOD, 0)
}

pub fn facts() -> StoreFacts {
    StoreFacts::new(128 * 1024 * 1024)
        .with_region("region-a")
        .with_column_family("cf")
}

pub fn open(conf: &Configuration) -> StoreCompactionPolicy {
    StoreCompactionPolicy::open(conf, facts()).expect("policy should resolve")
}

/// Files with ids `0..` and the given sizes, all stamped at time zero.
pub fn sized(sizes: &[u64]) -> Vec<CandidateFile> {
    sizes
        .iter()
        .enumerate()
        .map(|(id, size)| CandidateFile::new(FileId::new(id as u64), *size))
        .collect()
}

pub fn snapshot(sizes: &[u64]) -> StoreSnapshot {
    StoreSnapshot::new(sized(sizes), 0)
}

pub fn ids(raw: &[u64]) -> Vec<FileId> {
    raw.iter().copied().map(FileId::new).collect()
}
