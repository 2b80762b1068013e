//! Ordered default-resolution pipeline.
//!
//! Every tunable is one [`Step`]: a key, the type it is read as, and a fallback
//! evaluated when the key is absent. Steps run in declaration order and a
//! fallback may read any value resolved before it, so derived defaults
//! (off-peak max size from max size, throttle point from max files and flush
//! size) are visible in one table instead of nested conditionals.

use super::{
    error::{ConfigError, ValueKind},
    keys,
    policy::StoreFacts,
    source::ConfigurationSource,
};

pub(crate) const DEFAULT_MIN_FILES: i64 = 3;
pub(crate) const DEFAULT_MAX_FILES: i64 = 10;
pub(crate) const DEFAULT_RATIO: f64 = 1.2;
pub(crate) const DEFAULT_OFFPEAK_RATIO: f64 = 5.0;
/// One week.
pub(crate) const DEFAULT_MAJOR_PERIOD_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;
pub(crate) const DEFAULT_MAJOR_JITTER: f64 = 0.5;
pub(crate) const DEFAULT_INCOMING_WINDOW_MIN: i64 = 6;
/// Six hours.
pub(crate) const DEFAULT_BASE_WINDOW_MILLIS: i64 = 6 * 60 * 60 * 1000;
pub(crate) const DEFAULT_WINDOWS_PER_TIER: i64 = 4;
/// One day.
pub(crate) const DEFAULT_HOT_WINDOW_AGE_MILLIS: i64 = 24 * 60 * 60 * 1000;
/// One week.
pub(crate) const DEFAULT_WARM_WINDOW_AGE_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Typed value produced by one resolution step.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// Integer value (ints are widened).
    Long(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String or strategy name.
    Str(String),
}

/// Whether a resolved value was configured or fell back to its default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Read from the configuration source.
    Configured,
    /// Produced by the step's fallback.
    Default,
}

/// One entry of the resolution trace kept on every policy config.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSetting {
    /// Configuration key.
    pub key: &'static str,
    /// Resolved value.
    pub value: ConfigValue,
    /// Where the value came from.
    pub origin: Origin,
}

type Fallback = fn(&Resolution<'_>) -> ConfigValue;

pub(crate) struct Step {
    key: &'static str,
    kind: ValueKind,
    fallback: Fallback,
}

const fn step(key: &'static str, kind: ValueKind, fallback: Fallback) -> Step {
    Step {
        key,
        kind,
        fallback,
    }
}

/// Resolution order. A fallback must only read keys listed above it.
pub(crate) const STEPS: &[Step] = &[
    step(keys::COMPACTION_MAX_SIZE, ValueKind::Long, |_| {
        ConfigValue::Long(i64::MAX)
    }),
    step(keys::COMPACTION_MAX_SIZE_OFFPEAK, ValueKind::Long, |r| {
        ConfigValue::Long(r.long(keys::COMPACTION_MAX_SIZE))
    }),
    step(keys::COMPACTION_MIN_SIZE, ValueKind::Long, |r| {
        ConfigValue::Long(clamp_to_long(r.facts().memstore_flush_size))
    }),
    step(keys::COMPACTION_MIN_FILES_OLD, ValueKind::Int, |_| {
        ConfigValue::Long(DEFAULT_MIN_FILES)
    }),
    step(keys::COMPACTION_MIN_FILES, ValueKind::Int, |r| {
        ConfigValue::Long(r.long(keys::COMPACTION_MIN_FILES_OLD))
    }),
    step(keys::COMPACTION_MAX_FILES, ValueKind::Int, |_| {
        ConfigValue::Long(DEFAULT_MAX_FILES)
    }),
    step(keys::COMPACTION_RATIO, ValueKind::Float, |_| {
        ConfigValue::Float(DEFAULT_RATIO)
    }),
    step(keys::COMPACTION_RATIO_OFFPEAK, ValueKind::Float, |_| {
        ConfigValue::Float(DEFAULT_OFFPEAK_RATIO)
    }),
    step(keys::COMPACTION_THROTTLE, ValueKind::Long, |r| {
        let flush = clamp_to_long(r.facts().memstore_flush_size);
        ConfigValue::Long(
            2i64.saturating_mul(r.long(keys::COMPACTION_MAX_FILES))
                .saturating_mul(flush),
        )
    }),
    step(keys::MAJOR_COMPACTION_PERIOD, ValueKind::Long, |_| {
        ConfigValue::Long(DEFAULT_MAJOR_PERIOD_MILLIS)
    }),
    step(keys::MAJOR_COMPACTION_JITTER, ValueKind::Float, |_| {
        ConfigValue::Float(DEFAULT_MAJOR_JITTER)
    }),
    step(keys::MIN_LOCALITY_TO_FORCE_COMPACT, ValueKind::Float, |_| {
        ConfigValue::Float(0.0)
    }),
    step(keys::HISTORICAL_COMPACTION_FILES, ValueKind::Bool, |_| {
        ConfigValue::Bool(false)
    }),
    step(keys::STORE_COMPACTION_POLICY, ValueKind::Name, |_| {
        ConfigValue::Str("ratio".to_owned())
    }),
    step(keys::OFFPEAK_START_HOUR, ValueKind::Int, |_| ConfigValue::Long(-1)),
    step(keys::OFFPEAK_END_HOUR, ValueKind::Int, |_| ConfigValue::Long(-1)),
    step(keys::DATE_TIERED_MAX_AGE_MILLIS, ValueKind::Long, |_| {
        ConfigValue::Long(i64::MAX)
    }),
    step(keys::DATE_TIERED_INCOMING_WINDOW_MIN, ValueKind::Int, |_| {
        ConfigValue::Long(DEFAULT_INCOMING_WINDOW_MIN)
    }),
    step(keys::DATE_TIERED_WINDOW_POLICY, ValueKind::Name, |_| {
        ConfigValue::Str("exploring".to_owned())
    }),
    step(keys::DATE_TIERED_SINGLE_OUTPUT_FOR_MINOR, ValueKind::Bool, |_| {
        ConfigValue::Bool(true)
    }),
    step(keys::DATE_TIERED_WINDOW_FACTORY, ValueKind::Name, |_| {
        ConfigValue::Str("exponential".to_owned())
    }),
    step(keys::DATE_TIERED_BASE_WINDOW_MILLIS, ValueKind::Long, |_| {
        ConfigValue::Long(DEFAULT_BASE_WINDOW_MILLIS)
    }),
    step(keys::DATE_TIERED_WINDOWS_PER_TIER, ValueKind::Int, |_| {
        ConfigValue::Long(DEFAULT_WINDOWS_PER_TIER)
    }),
    step(keys::DATE_TIERED_MAX_TIER_AGE_MILLIS, ValueKind::Long, |_| {
        ConfigValue::Long(i64::MAX)
    }),
    step(keys::DATE_TIERED_STORAGE_POLICY_ENABLE, ValueKind::Bool, |_| {
        ConfigValue::Bool(false)
    }),
    step(keys::DATE_TIERED_HOT_WINDOW_AGE_MILLIS, ValueKind::Long, |_| {
        ConfigValue::Long(DEFAULT_HOT_WINDOW_AGE_MILLIS)
    }),
    step(keys::DATE_TIERED_HOT_WINDOW_STORAGE_POLICY, ValueKind::Str, |_| {
        ConfigValue::Str("ALL_SSD".to_owned())
    }),
    step(keys::DATE_TIERED_WARM_WINDOW_AGE_MILLIS, ValueKind::Long, |_| {
        ConfigValue::Long(DEFAULT_WARM_WINDOW_AGE_MILLIS)
    }),
    step(keys::DATE_TIERED_WARM_WINDOW_STORAGE_POLICY, ValueKind::Str, |_| {
        ConfigValue::Str("ONE_SSD".to_owned())
    }),
    step(keys::DATE_TIERED_COLD_WINDOW_STORAGE_POLICY, ValueKind::Str, |_| {
        ConfigValue::Str("HOT".to_owned())
    }),
];

fn clamp_to_long(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Values resolved so far, in step order.
pub(crate) struct Resolution<'a> {
    facts: &'a StoreFacts,
    settings: Vec<ResolvedSetting>,
}

impl<'a> Resolution<'a> {
    /// Run every step against `source`.
    pub(crate) fn run<S>(source: &S, facts: &'a StoreFacts) -> Result<Self, ConfigError>
    where
        S: ConfigurationSource + ?Sized,
    {
        let mut resolution = Self {
            facts,
            settings: Vec::with_capacity(STEPS.len()),
        };
        for step in STEPS {
            let configured = read(source, step.key, step.kind)?;
            let (value, origin) = match configured {
                Some(value) => (value, Origin::Configured),
                None => ((step.fallback)(&resolution), Origin::Default),
            };
            resolution.settings.push(ResolvedSetting {
                key: step.key,
                value,
                origin,
            });
        }
        Ok(resolution)
    }

    pub(crate) fn facts(&self) -> &StoreFacts {
        self.facts
    }

    fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.settings
            .iter()
            .find(|setting| setting.key == key)
            .map(|setting| &setting.value)
    }

    #[cfg(test)]
    pub(crate) fn origin(&self, key: &str) -> Option<Origin> {
        self.settings
            .iter()
            .find(|setting| setting.key == key)
            .map(|setting| setting.origin)
    }

    pub(crate) fn long(&self, key: &str) -> i64 {
        match self.value(key) {
            Some(ConfigValue::Long(value)) => *value,
            other => {
                debug_assert!(false, "`{key}` resolved as {other:?}, expected a long");
                0
            }
        }
    }

    pub(crate) fn float(&self, key: &str) -> f64 {
        match self.value(key) {
            Some(ConfigValue::Float(value)) => *value,
            other => {
                debug_assert!(false, "`{key}` resolved as {other:?}, expected a float");
                0.0
            }
        }
    }

    pub(crate) fn bool(&self, key: &str) -> bool {
        match self.value(key) {
            Some(ConfigValue::Bool(value)) => *value,
            other => {
                debug_assert!(false, "`{key}` resolved as {other:?}, expected a bool");
                false
            }
        }
    }

    pub(crate) fn str(&self, key: &str) -> &str {
        match self.value(key) {
            Some(ConfigValue::Str(value)) => value,
            other => {
                debug_assert!(false, "`{key}` resolved as {other:?}, expected a string");
                ""
            }
        }
    }

    pub(crate) fn into_settings(self) -> Vec<ResolvedSetting> {
        self.settings
    }
}

fn read<S>(source: &S, key: &str, kind: ValueKind) -> Result<Option<ConfigValue>, ConfigError>
where
    S: ConfigurationSource + ?Sized,
{
    Ok(match kind {
        ValueKind::Int => source.get_int(key)?.map(|v| ConfigValue::Long(v.into())),
        ValueKind::Long => source.get_long(key)?.map(ConfigValue::Long),
        ValueKind::Float => source.get_float(key)?.map(ConfigValue::Float),
        ValueKind::Bool => source.get_bool(key)?.map(ConfigValue::Bool),
        ValueKind::Str => source.get_str(key).map(ConfigValue::Str),
        ValueKind::Name => source
            .get_str(key)
            .map(|name| ConfigValue::Str(name.trim().to_owned())),
    })
}
