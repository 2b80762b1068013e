//! Read-only descriptors handed to the planners by the storage layer.

use std::fmt;

/// Stable identifier of a store file; the final tie-break in every ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u64);

impl FileId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One store file eligible for selection.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateFile {
    id: FileId,
    size: u64,
    max_timestamp: i64,
    historical: bool,
    locality: f64,
    major_compacted: bool,
}

impl CandidateFile {
    /// Live, fully local file of `size` bytes with a zero max timestamp.
    pub fn new(id: FileId, size: u64) -> Self {
        Self {
            id,
            size,
            max_timestamp: 0,
            historical: false,
            locality: 1.0,
            major_compacted: false,
        }
    }

    /// Set the newest cell timestamp, in epoch milliseconds.
    pub fn with_max_timestamp(mut self, max_timestamp: i64) -> Self {
        self.max_timestamp = max_timestamp;
        self
    }

    /// Set the fraction of blocks local to this server.
    pub fn with_locality(mut self, locality: f64) -> Self {
        self.locality = locality;
        self
    }

    /// Mark the file as holding historical (non-live) data.
    pub fn historical(mut self) -> Self {
        self.historical = true;
        self
    }

    /// Mark the file as the output of a major compaction.
    pub fn major_compacted(mut self) -> Self {
        self.major_compacted = true;
        self
    }

    /// Identifier.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Newest cell timestamp.
    pub fn max_timestamp(&self) -> i64 {
        self.max_timestamp
    }

    /// Whether the file holds historical data.
    pub fn is_historical(&self) -> bool {
        self.historical
    }

    /// Block locality ratio in `[0, 1]`.
    pub fn locality(&self) -> f64 {
        self.locality
    }

    /// Whether the file came out of a major compaction.
    pub fn is_major_compacted(&self) -> bool {
        self.major_compacted
    }
}

/// Consistent view of one store for a single selection cycle.
///
/// Callers copy the file list under the store lock and leave out files that
/// are already being compacted; the planners never lock anything themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSnapshot {
    files: Vec<CandidateFile>,
    now_ms: i64,
    off_peak: bool,
    last_major_compaction_ms: Option<i64>,
    jitter_seed: Option<u64>,
}

impl StoreSnapshot {
    /// Snapshot of `files` taken at `now_ms`.
    pub fn new(files: Vec<CandidateFile>, now_ms: i64) -> Self {
        Self {
            files,
            now_ms,
            off_peak: false,
            last_major_compaction_ms: None,
            jitter_seed: None,
        }
    }

    /// Whether the store is currently inside its off-peak window.
    pub fn with_off_peak(mut self, off_peak: bool) -> Self {
        self.off_peak = off_peak;
        self
    }

    /// When the store was last major compacted.
    pub fn with_last_major_compaction(mut self, at_ms: i64) -> Self {
        self.last_major_compaction_ms = Some(at_ms);
        self
    }

    /// Override the per-store jitter seed.
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// Candidate files.
    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    /// Selection time, epoch milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    /// Whether off-peak limits apply.
    pub fn is_off_peak(&self) -> bool {
        self.off_peak
    }

    /// Last major compaction time, if known.
    pub fn last_major_compaction_ms(&self) -> Option<i64> {
        self.last_major_compaction_ms
    }

    /// Jitter seed override.
    pub fn jitter_seed(&self) -> Option<u64> {
        self.jitter_seed
    }

    /// Oldest max timestamp across the files.
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.files.iter().map(CandidateFile::max_timestamp).min()
    }

    /// Total bytes across the files.
    pub fn total_bytes(&self) -> u64 {
        self.files
            .iter()
            .fold(0u64, |acc, file| acc.saturating_add(file.size()))
    }
}
