//! Configuration key names.
//!
//! Keys follow the dotted naming used by region servers so existing site
//! configuration can be fed in unchanged.

/// Ratio used by the size-tiered ratio test.
pub const COMPACTION_RATIO: &str = "hbase.hstore.compaction.ratio";
/// Ratio used by the ratio test during off-peak hours.
pub const COMPACTION_RATIO_OFFPEAK: &str = "hbase.hstore.compaction.ratio.offpeak";
/// Legacy name for [`COMPACTION_MIN_FILES`].
pub const COMPACTION_MIN_FILES_OLD: &str = "hbase.hstore.compactionThreshold";
/// Lower bound on the number of files in a minor compaction.
pub const COMPACTION_MIN_FILES: &str = "hbase.hstore.compaction.min";
/// Files at or below this size pass the ratio test unconditionally.
pub const COMPACTION_MIN_SIZE: &str = "hbase.hstore.compaction.min.size";
/// Upper bound on the number of files in a minor compaction.
pub const COMPACTION_MAX_FILES: &str = "hbase.hstore.compaction.max";
/// Upper bound on bytes considered by a minor compaction.
pub const COMPACTION_MAX_SIZE: &str = "hbase.hstore.compaction.max.size";
/// Upper bound on bytes considered by an off-peak minor compaction.
pub const COMPACTION_MAX_SIZE_OFFPEAK: &str = "hbase.hstore.compaction.max.size.offpeak";
/// First hour (0-23) of the off-peak window.
pub const OFFPEAK_START_HOUR: &str = "hbase.offpeak.start.hour";
/// Hour (0-23) at which the off-peak window ends.
pub const OFFPEAK_END_HOUR: &str = "hbase.offpeak.end.hour";
/// Block locality below which a single-file store is major compacted.
pub const MIN_LOCALITY_TO_FORCE_COMPACT: &str = "hbase.hstore.min.locality.to.skip.major.compact";
/// Byte threshold separating small and large compactions.
pub const COMPACTION_THROTTLE: &str = "hbase.regionserver.thread.compaction.throttle";
/// Period between periodic major compactions, in milliseconds. Zero disables them.
pub const MAJOR_COMPACTION_PERIOD: &str = "hbase.hregion.majorcompaction";
/// Fraction of the major-compaction period used to spread stores apart.
pub const MAJOR_COMPACTION_JITTER: &str = "hbase.hregion.majorcompaction.jitter";
/// Whether compactions split output into live and historical files.
pub const HISTORICAL_COMPACTION_FILES: &str = "hbase.enable.historical.compaction.files";
/// Store-wide selection strategy (`ratio`, `exploring`, `date_tiered`).
pub const STORE_COMPACTION_POLICY: &str = "hbase.hstore.defaultengine.compactionpolicy.class";

/// Files older than this are never compacted by the date-tiered planner.
pub const DATE_TIERED_MAX_AGE_MILLIS: &str =
    "hbase.hstore.compaction.date.tiered.max.storefile.age.millis";
/// Minimum number of files in the incoming window before it is compacted.
pub const DATE_TIERED_INCOMING_WINDOW_MIN: &str =
    "hbase.hstore.compaction.date.tiered.incoming.window.min";
/// Policy applied to files inside one window (`ratio` or `exploring`).
pub const DATE_TIERED_WINDOW_POLICY: &str =
    "hbase.hstore.compaction.date.tiered.window.policy.class";
/// Whether a window's minor compaction writes a single output file.
pub const DATE_TIERED_SINGLE_OUTPUT_FOR_MINOR: &str =
    "hbase.hstore.compaction.date.tiered.single.output.for.minor.compaction";
/// Registered window factory name (`exponential`, `fixed`, or a custom one).
pub const DATE_TIERED_WINDOW_FACTORY: &str =
    "hbase.hstore.compaction.date.tiered.window.factory.class";
/// Width of the incoming window, in milliseconds.
pub const DATE_TIERED_BASE_WINDOW_MILLIS: &str =
    "hbase.hstore.compaction.date.tiered.base.window.millis";
/// Windows per tier before the width is multiplied by this same factor.
pub const DATE_TIERED_WINDOWS_PER_TIER: &str =
    "hbase.hstore.compaction.date.tiered.windows.per.tier";
/// Age past which windows stop widening.
pub const DATE_TIERED_MAX_TIER_AGE_MILLIS: &str =
    "hbase.hstore.compaction.date.tiered.max.tier.age.millis";
/// Whether output files are tagged with a hot/warm/cold storage policy.
pub const DATE_TIERED_STORAGE_POLICY_ENABLE: &str =
    "hbase.hstore.compaction.date.tiered.storage.policy.enable";
/// Windows younger than this are hot.
pub const DATE_TIERED_HOT_WINDOW_AGE_MILLIS: &str =
    "hbase.hstore.compaction.date.tiered.hot.window.age.millis";
/// Storage policy for hot windows.
pub const DATE_TIERED_HOT_WINDOW_STORAGE_POLICY: &str =
    "hbase.hstore.compaction.date.tiered.hot.window.storage.policy";
/// Windows younger than this (and not hot) are warm.
pub const DATE_TIERED_WARM_WINDOW_AGE_MILLIS: &str =
    "hbase.hstore.compaction.date.tiered.warm.window.age.millis";
/// Storage policy for warm windows.
pub const DATE_TIERED_WARM_WINDOW_STORAGE_POLICY: &str =
    "hbase.hstore.compaction.date.tiered.warm.window.storage.policy";
/// Storage policy for windows older than the warm age.
pub const DATE_TIERED_COLD_WINDOW_STORAGE_POLICY: &str =
    "hbase.hstore.compaction.date.tiered.cold.window.storage.policy";
