//! File selection: which store files to merge next, and how.

mod date_tiered;
mod exploring;
mod file;
mod major;
mod planner;
mod ratio;
mod request;

pub use date_tiered::DateTieredPlanner;
pub use file::{CandidateFile, FileId, StoreSnapshot};
pub use planner::{
    CompactionPlanner, CompactionPlannerKind, CompactionStrategy, SelectionPolicy,
    SizeTieredPlanner,
};
pub use request::{CompactionKind, CompactionRequest, MajorReason, OutputBoundary, ThrottleClass};
