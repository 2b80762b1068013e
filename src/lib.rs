#![deny(missing_docs)]
//! Compaction configuration and file-selection policy for LSM column-family stores.
//!
//! A store (one column family's immutable data files within one region) owns a
//! [`CompactionPolicyConfig`] resolved from a flat key/value
//! [`ConfigurationSource`] plus a few runtime [`StoreFacts`]. Each selection
//! cycle hands a [`StoreSnapshot`] of candidate files to a
//! [`CompactionPlanner`], which answers with the files to merge next (if any),
//! whether the merge is minor or major, and how it should be throttled.
//!
//! The date-tiered planner additionally partitions files into exponentially
//! widening time windows and tags its output with hot/warm/cold storage
//! policies.

mod observability;

/// Configuration sources, key names, and the resolved per-store policy config.
pub mod config;

/// Candidate descriptors, selection policies, and planners.
pub mod compaction;

/// Off-peak hour ranges.
pub mod offpeak;

/// Time-window partitioning and storage tiering for date-tiered compaction.
pub mod window;

/// Per-store policy handle supporting live reloads.
pub mod store;

pub use crate::{
    compaction::{
        CandidateFile, CompactionKind, CompactionPlanner, CompactionPlannerKind,
        CompactionRequest, CompactionStrategy, FileId, MajorReason, OutputBoundary,
        SelectionPolicy, StoreSnapshot, ThrottleClass,
    },
    config::{
        CompactionPolicyConfig, ConfigError, Configuration, ConfigurationSource, StoreFacts,
    },
    offpeak::OffPeakHours,
    store::StoreCompactionPolicy,
    window::{CompactionWindow, StorageTier, TierAssignment, WindowFactory},
};
