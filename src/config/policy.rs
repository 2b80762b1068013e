//! Resolved compaction configuration for one store.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    error::ConfigError,
    keys,
    resolve::{Origin, Resolution, ResolvedSetting},
    source::ConfigurationSource,
};
use crate::{
    compaction::{CompactionStrategy, SelectionPolicy},
    observability::log_info,
    offpeak::OffPeakHours,
    window::{TierPolicy, WindowFactory, WindowFactoryRegistry, WindowSettings},
};

/// Runtime facts about the store that owns the config.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreFacts {
    /// Current memstore flush-size threshold, in bytes.
    pub memstore_flush_size: u64,
    /// Whether compactions split output into live and historical files. `None`
    /// defers to the `hbase.enable.historical.compaction.files` key.
    pub historical_files: Option<bool>,
    /// Encoded region name, for diagnostics only.
    pub region: String,
    /// Column family name, for diagnostics only.
    pub column_family: String,
}

impl StoreFacts {
    /// Facts for a store flushing at `memstore_flush_size` bytes.
    pub fn new(memstore_flush_size: u64) -> Self {
        Self {
            memstore_flush_size,
            ..Self::default()
        }
    }

    /// Attach the region name.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Attach the column family name.
    pub fn with_column_family(mut self, column_family: impl Into<String>) -> Self {
        self.column_family = column_family.into();
        self
    }

    /// Override whether historical-file splitting is enabled.
    pub fn with_historical_files(mut self, enabled: bool) -> Self {
        self.historical_files = Some(enabled);
        self
    }

    /// Per-store seed used to spread periodic major compactions.
    ///
    /// CRC-32 of `region \0 column_family`, so the seed is the same across
    /// restarts and toolchain upgrades.
    pub fn jitter_seed(&self) -> u64 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(self.region.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.column_family.as_bytes());
        u64::from(hasher.finalize())
    }
}

/// Date-tiered tunables.
#[derive(Clone, Debug)]
pub struct DateTieredConfig {
    max_store_file_age_millis: i64,
    incoming_window_min: usize,
    window_policy: SelectionPolicy,
    single_output_for_minor_compaction: bool,
    window_factory: WindowFactory,
    tiering: TierPolicy,
}

impl DateTieredConfig {
    /// Files whose max timestamp is older than this are never compacted.
    pub fn max_store_file_age_millis(&self) -> i64 {
        self.max_store_file_age_millis
    }

    /// Files needed in the incoming window before it is compacted.
    pub fn incoming_window_min(&self) -> usize {
        self.incoming_window_min
    }

    /// Selection policy applied inside one window.
    pub fn window_policy(&self) -> SelectionPolicy {
        self.window_policy
    }

    /// Whether a window's minor compaction writes a single output file.
    pub fn single_output_for_minor_compaction(&self) -> bool {
        self.single_output_for_minor_compaction
    }

    /// Factory laying out the windows.
    pub fn window_factory(&self) -> &WindowFactory {
        &self.window_factory
    }

    /// Hot/warm/cold storage-policy assignment.
    pub fn tiering(&self) -> &TierPolicy {
        &self.tiering
    }
}

/// Compaction configuration for one store.
///
/// Every value is read once from a [`ConfigurationSource`] when the store opens
/// and is immutable afterwards, except [`min_files_to_compact`], which online
/// configuration changes update in place through
/// [`set_min_files_to_compact`]. A configuration reload builds a fresh value
/// instead of mutating this one.
///
/// [`min_files_to_compact`]: Self::min_files_to_compact
/// [`set_min_files_to_compact`]: Self::set_min_files_to_compact
#[derive(Debug)]
pub struct CompactionPolicyConfig {
    min_compact_size: u64,
    max_compact_size: u64,
    off_peak_max_compact_size: u64,
    min_files_to_compact: AtomicUsize,
    max_files_to_compact: usize,
    compaction_ratio: f64,
    off_peak_compaction_ratio: f64,
    throttle_point: u64,
    major_compaction_period: u64,
    major_compaction_jitter: f64,
    min_locality_to_force_compact: f64,
    historical_files: bool,
    store_strategy: CompactionStrategy,
    off_peak_hours: OffPeakHours,
    date_tiered: DateTieredConfig,
    region: String,
    column_family: String,
    jitter_seed: u64,
    settings: Vec<ResolvedSetting>,
}

impl CompactionPolicyConfig {
    /// Resolve the config from `source` using the built-in window factories.
    pub fn from_source<S>(source: &S, facts: &StoreFacts) -> Result<Self, ConfigError>
    where
        S: ConfigurationSource + ?Sized,
    {
        Self::from_source_with_registry(source, facts, &WindowFactoryRegistry::default())
    }

    /// Resolve the config from `source`, looking window factories up in `registry`.
    pub fn from_source_with_registry<S>(
        source: &S,
        facts: &StoreFacts,
        registry: &WindowFactoryRegistry,
    ) -> Result<Self, ConfigError>
    where
        S: ConfigurationSource + ?Sized,
    {
        let res = Resolution::run(source, facts)?;

        // Historical splitting writes two files per compaction, so a floor of two
        // would let the outputs qualify again immediately.
        let historical_files = facts
            .historical_files
            .unwrap_or_else(|| res.bool(keys::HISTORICAL_COMPACTION_FILES));
        let mut min_files_to_compact = to_count(res.long(keys::COMPACTION_MIN_FILES).max(2));
        if historical_files {
            min_files_to_compact += 1;
        }

        let store_strategy = CompactionStrategy::from_name(res.str(keys::STORE_COMPACTION_POLICY))?;
        let window_policy = SelectionPolicy::from_name(res.str(keys::DATE_TIERED_WINDOW_POLICY))?;
        let window_settings = WindowSettings {
            base_window_millis: res.long(keys::DATE_TIERED_BASE_WINDOW_MILLIS),
            windows_per_tier: res.long(keys::DATE_TIERED_WINDOWS_PER_TIER),
            max_tier_age_millis: res.long(keys::DATE_TIERED_MAX_TIER_AGE_MILLIS),
        };
        let window_factory =
            registry.build(res.str(keys::DATE_TIERED_WINDOW_FACTORY), &window_settings)?;
        let tiering = TierPolicy::new(
            res.long(keys::DATE_TIERED_HOT_WINDOW_AGE_MILLIS),
            res.long(keys::DATE_TIERED_WARM_WINDOW_AGE_MILLIS),
        )
        .enabled(res.bool(keys::DATE_TIERED_STORAGE_POLICY_ENABLE))
        .with_storage_policies(
            res.str(keys::DATE_TIERED_HOT_WINDOW_STORAGE_POLICY),
            res.str(keys::DATE_TIERED_WARM_WINDOW_STORAGE_POLICY),
            res.str(keys::DATE_TIERED_COLD_WINDOW_STORAGE_POLICY),
        );

        let config = Self {
            min_compact_size: to_size(res.long(keys::COMPACTION_MIN_SIZE)),
            max_compact_size: to_size(res.long(keys::COMPACTION_MAX_SIZE)),
            off_peak_max_compact_size: to_size(res.long(keys::COMPACTION_MAX_SIZE_OFFPEAK)),
            min_files_to_compact: AtomicUsize::new(min_files_to_compact),
            max_files_to_compact: to_count(res.long(keys::COMPACTION_MAX_FILES)),
            compaction_ratio: res.float(keys::COMPACTION_RATIO),
            off_peak_compaction_ratio: res.float(keys::COMPACTION_RATIO_OFFPEAK),
            throttle_point: to_size(res.long(keys::COMPACTION_THROTTLE)),
            major_compaction_period: to_size(res.long(keys::MAJOR_COMPACTION_PERIOD)),
            major_compaction_jitter: res.float(keys::MAJOR_COMPACTION_JITTER),
            min_locality_to_force_compact: res.float(keys::MIN_LOCALITY_TO_FORCE_COMPACT),
            historical_files,
            store_strategy,
            off_peak_hours: OffPeakHours::new(
                res.long(keys::OFFPEAK_START_HOUR),
                res.long(keys::OFFPEAK_END_HOUR),
            ),
            date_tiered: DateTieredConfig {
                max_store_file_age_millis: res.long(keys::DATE_TIERED_MAX_AGE_MILLIS),
                incoming_window_min: to_count(res.long(keys::DATE_TIERED_INCOMING_WINDOW_MIN)),
                window_policy,
                single_output_for_minor_compaction: res
                    .bool(keys::DATE_TIERED_SINGLE_OUTPUT_FOR_MINOR),
                window_factory,
                tiering,
            },
            region: facts.region.clone(),
            column_family: facts.column_family.clone(),
            jitter_seed: facts.jitter_seed(),
            settings: res.into_settings(),
        };
        config.log_resolved();
        Ok(config)
    }

    fn log_resolved(&self) {
        let configured = self
            .settings
            .iter()
            .filter(|setting| setting.origin == Origin::Configured)
            .count();
        log_info!(
            component = "config",
            event = "compaction_config_resolved",
            region = %self.region,
            column_family = %self.column_family,
            min_compact_size = self.min_compact_size,
            max_compact_size = self.max_compact_size,
            off_peak_max_compact_size = self.off_peak_max_compact_size,
            min_files_to_compact = self.min_files_to_compact(),
            max_files_to_compact = self.max_files_to_compact,
            compaction_ratio = self.compaction_ratio,
            off_peak_compaction_ratio = self.off_peak_compaction_ratio,
            throttle_point = self.throttle_point,
            major_compaction_period = self.major_compaction_period,
            major_compaction_jitter = self.major_compaction_jitter,
            min_locality_to_force_compact = self.min_locality_to_force_compact,
            strategy = ?self.store_strategy,
            date_tiered_max_age = self.date_tiered.max_store_file_age_millis,
            date_tiered_incoming_window_min = self.date_tiered.incoming_window_min,
            date_tiered_window_policy = ?self.date_tiered.window_policy,
            date_tiered_single_output = self.date_tiered.single_output_for_minor_compaction,
            date_tiered_window_factory = ?self.date_tiered.window_factory,
            configured_keys = configured,
        );
    }

    /// Files at or below this size pass the ratio test unconditionally.
    pub fn min_compact_size(&self) -> u64 {
        self.min_compact_size
    }

    /// Upper bound on bytes included in a minor compaction.
    pub fn max_compact_size(&self) -> u64 {
        self.max_compact_size
    }

    /// Upper bound on bytes included in an off-peak minor compaction.
    pub fn off_peak_max_compact_size(&self) -> u64 {
        self.off_peak_max_compact_size
    }

    /// Size ceiling for the current period.
    pub fn max_compact_size_for(&self, off_peak: bool) -> u64 {
        if off_peak {
            self.off_peak_max_compact_size
        } else {
            self.max_compact_size
        }
    }

    /// Lower bound on the number of files in a minor compaction. Always at least 2.
    pub fn min_files_to_compact(&self) -> usize {
        self.min_files_to_compact.load(Ordering::Relaxed)
    }

    /// Update the minimum file count in place; values below 2 are raised to 2.
    pub fn set_min_files_to_compact(&self, threshold: usize) {
        self.min_files_to_compact
            .store(threshold.max(2), Ordering::Relaxed);
    }

    /// Upper bound on the number of files in a minor compaction.
    pub fn max_files_to_compact(&self) -> usize {
        self.max_files_to_compact
    }

    /// Ratio used by the ratio test.
    pub fn compaction_ratio(&self) -> f64 {
        self.compaction_ratio
    }

    /// Ratio used by the ratio test during off-peak hours.
    pub fn off_peak_compaction_ratio(&self) -> f64 {
        self.off_peak_compaction_ratio
    }

    /// Ratio for the current period.
    pub fn ratio_for(&self, off_peak: bool) -> f64 {
        if off_peak {
            self.off_peak_compaction_ratio
        } else {
            self.compaction_ratio
        }
    }

    /// Byte threshold separating small and large compactions.
    pub fn throttle_point(&self) -> u64 {
        self.throttle_point
    }

    /// Milliseconds between periodic major compactions; zero disables them.
    pub fn major_compaction_period(&self) -> u64 {
        self.major_compaction_period
    }

    /// Fraction of the period by which each store's trigger is randomized.
    pub fn major_compaction_jitter(&self) -> f64 {
        self.major_compaction_jitter
    }

    /// Locality below which a single-file store is major compacted.
    pub fn min_locality_to_force_compact(&self) -> f64 {
        self.min_locality_to_force_compact
    }

    /// Whether compactions split output into live and historical files.
    pub fn historical_files_enabled(&self) -> bool {
        self.historical_files
    }

    /// Store-wide selection strategy.
    pub fn store_strategy(&self) -> CompactionStrategy {
        self.store_strategy
    }

    /// Configured off-peak hours.
    pub fn off_peak_hours(&self) -> OffPeakHours {
        self.off_peak_hours
    }

    /// Date-tiered tunables.
    pub fn date_tiered(&self) -> &DateTieredConfig {
        &self.date_tiered
    }

    /// Region label.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Column family label.
    pub fn column_family(&self) -> &str {
        &self.column_family
    }

    /// Per-store jitter seed derived from the region and column family.
    pub fn jitter_seed(&self) -> u64 {
        self.jitter_seed
    }

    /// Every resolved key with its value and origin, in resolution order.
    pub fn resolved_settings(&self) -> &[ResolvedSetting] {
        &self.settings
    }
}

fn to_size(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
