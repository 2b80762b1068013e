//! Logging infrastructure for compaction-policy observability.
//!
//! The crate uses `tracing` for structured logging. All events use target
//! "compaction_policy" and include an `event` field for filtering.
//!
//! ## Library Integration
//!
//! The crate never initializes a global subscriber. Applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: module/subsystem (e.g., "config", "selection", "window")
//! - Use `%` for Display, `?` for Debug formatting
//! - Selection runs once per cycle per store; keep per-file detail at debug level

/// Target for all compaction-policy log events.
pub(crate) const POLICY_TARGET: &str = "compaction_policy";

/// Macro for info-level log events.
///
/// # Example
/// ```ignore
/// log_info!(
///     component = "config",
///     event = "compaction_config_resolved",
///     region = %facts.region,
///     min_files = cfg.min_files_to_compact(),
/// );
/// ```
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::POLICY_TARGET, $($field)*)
    };
}

/// Macro for debug-level log events.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::POLICY_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::POLICY_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
