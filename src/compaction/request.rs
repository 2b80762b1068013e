//! Selection outcome handed to the (external) compaction executor.

use super::file::{CandidateFile, FileId};
use crate::window::{CompactionWindow, TierAssignment};

/// Whether the merge purges obsolete data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompactionKind {
    /// Merges a subset of files.
    Minor,
    /// Rewrites every file, dropping deletes and expired cells.
    Major,
}

/// Execution pool a request should be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThrottleClass {
    /// Total input below the throttle point.
    Small,
    /// Total input at or above the throttle point.
    Large,
}

impl ThrottleClass {
    /// Classify `total_bytes` against `throttle_point`.
    pub fn classify(total_bytes: u64, throttle_point: u64) -> Self {
        if total_bytes >= throttle_point {
            Self::Large
        } else {
            Self::Small
        }
    }
}

/// Why a major compaction was chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MajorReason {
    /// The jittered major-compaction period has elapsed.
    Periodic {
        /// Milliseconds since the last major compaction (or oldest file).
        elapsed_ms: i64,
        /// Jittered period that was exceeded.
        period_ms: i64,
    },
    /// A single-file store whose blocks are mostly remote.
    LowLocality {
        /// Locality of the file.
        locality: f64,
        /// Configured threshold it fell below.
        threshold: f64,
    },
}

/// Lower bound of one output file of a date-tiered compaction.
///
/// Boundaries are ordered ascending; output file `i` receives cells with
/// timestamps in `[boundaries[i], boundaries[i + 1])`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputBoundary {
    /// Inclusive lower timestamp bound.
    pub lower_bound: i64,
    /// Storage tier for the file, when tiering is enabled.
    pub tier: Option<TierAssignment>,
}

/// Files to merge and how to run the merge.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactionRequest {
    files: Vec<FileId>,
    kind: CompactionKind,
    major_reason: Option<MajorReason>,
    throttle: ThrottleClass,
    off_peak: bool,
    total_bytes: u64,
    window: Option<CompactionWindow>,
    boundaries: Vec<OutputBoundary>,
}

impl CompactionRequest {
    pub(crate) fn minor(files: &[&CandidateFile], off_peak: bool, throttle_point: u64) -> Self {
        Self::new(files, CompactionKind::Minor, None, off_peak, throttle_point)
    }

    pub(crate) fn major(
        files: &[&CandidateFile],
        reason: MajorReason,
        off_peak: bool,
        throttle_point: u64,
    ) -> Self {
        Self::new(
            files,
            CompactionKind::Major,
            Some(reason),
            off_peak,
            throttle_point,
        )
    }

    fn new(
        files: &[&CandidateFile],
        kind: CompactionKind,
        major_reason: Option<MajorReason>,
        off_peak: bool,
        throttle_point: u64,
    ) -> Self {
        let total_bytes = files
            .iter()
            .fold(0u64, |acc, file| acc.saturating_add(file.size()));
        Self {
            files: files.iter().map(|file| file.id()).collect(),
            kind,
            major_reason,
            throttle: ThrottleClass::classify(total_bytes, throttle_point),
            off_peak,
            total_bytes,
            window: None,
            boundaries: Vec::new(),
        }
    }

    pub(crate) fn with_window(mut self, window: CompactionWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub(crate) fn with_boundaries(mut self, boundaries: Vec<OutputBoundary>) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Selected files, in the order the policy considered them.
    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always `false` for requests returned by a planner.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Minor or major.
    pub fn kind(&self) -> CompactionKind {
        self.kind
    }

    /// Shorthand for `kind() == CompactionKind::Major`.
    pub fn is_major(&self) -> bool {
        self.kind == CompactionKind::Major
    }

    /// Trigger of a major compaction.
    pub fn major_reason(&self) -> Option<MajorReason> {
        self.major_reason
    }

    /// Execution pool.
    pub fn throttle(&self) -> ThrottleClass {
        self.throttle
    }

    /// Whether off-peak limits were used.
    pub fn is_off_peak(&self) -> bool {
        self.off_peak
    }

    /// Combined size of the selected files.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Window the files were selected from (date-tiered minor only).
    pub fn window(&self) -> Option<CompactionWindow> {
        self.window
    }

    /// Output boundaries (date-tiered only), ascending.
    pub fn boundaries(&self) -> &[OutputBoundary] {
        &self.boundaries
    }
}
