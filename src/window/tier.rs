//! Hot/warm/cold storage-policy assignment for compaction windows.

use std::fmt;

/// Storage tier a window's output belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageTier {
    /// Recent data.
    Hot,
    /// Data older than the hot age.
    Warm,
    /// Data older than the warm age.
    Cold,
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
        })
    }
}

/// Tier plus the storage-policy label the placement layer should apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierAssignment {
    /// Assigned tier.
    pub tier: StorageTier,
    /// Normalized storage-policy label for the tier.
    pub storage_policy: String,
}

/// Maps a window's age to a storage tier.
///
/// Purely advisory: assignments are attached to compaction output and never
/// influence which files are selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierPolicy {
    enabled: bool,
    hot_window_age_millis: i64,
    warm_window_age_millis: i64,
    hot_storage_policy: String,
    warm_storage_policy: String,
    cold_storage_policy: String,
}

impl TierPolicy {
    /// Enabled policy with the given age boundaries and default labels.
    pub fn new(hot_window_age_millis: i64, warm_window_age_millis: i64) -> Self {
        Self {
            enabled: true,
            hot_window_age_millis,
            warm_window_age_millis,
            hot_storage_policy: "ALL_SSD".to_owned(),
            warm_storage_policy: "ONE_SSD".to_owned(),
            cold_storage_policy: "HOT".to_owned(),
        }
    }

    /// Policy that never assigns a tier.
    pub fn disabled() -> Self {
        Self::new(0, 0).enabled(false)
    }

    /// Toggle assignment.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replace the storage-policy labels. Labels are trimmed and upper-cased.
    pub fn with_storage_policies(mut self, hot: &str, warm: &str, cold: &str) -> Self {
        self.hot_storage_policy = normalize_label(hot);
        self.warm_storage_policy = normalize_label(warm);
        self.cold_storage_policy = normalize_label(cold);
        self
    }

    /// Whether tiers are assigned at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Windows younger than this are hot.
    pub fn hot_window_age_millis(&self) -> i64 {
        self.hot_window_age_millis
    }

    /// Windows younger than this, and not hot, are warm.
    pub fn warm_window_age_millis(&self) -> i64 {
        self.warm_window_age_millis
    }

    /// Label configured for `tier`.
    pub fn storage_policy(&self, tier: StorageTier) -> &str {
        match tier {
            StorageTier::Hot => &self.hot_storage_policy,
            StorageTier::Warm => &self.warm_storage_policy,
            StorageTier::Cold => &self.cold_storage_policy,
        }
    }

    /// Tier of a window starting at `window_start`, aged against `now`.
    ///
    /// A window is as old as its oldest edge, so a wide window whose newest
    /// data is recent still lands in the tier of its start. Returns `None`
    /// when assignment is disabled.
    pub fn assign(&self, window_start: i64, now: i64) -> Option<TierAssignment> {
        if !self.enabled {
            return None;
        }
        let age = now.saturating_sub(window_start).max(0);
        let tier = if age < self.hot_window_age_millis {
            StorageTier::Hot
        } else if age < self.warm_window_age_millis {
            StorageTier::Warm
        } else {
            StorageTier::Cold
        };
        Some(TierAssignment {
            tier,
            storage_policy: self.storage_policy(tier).to_owned(),
        })
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}
