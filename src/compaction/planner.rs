//! Planner interface and the size-tiered planner.

use std::sync::Arc;

use super::{
    date_tiered::DateTieredPlanner,
    exploring::select_exploring,
    file::{CandidateFile, StoreSnapshot},
    major::major_trigger,
    ratio::{order_by_age, order_by_size, select_by_ratio, SelectionLimits},
    request::CompactionRequest,
};
use crate::{
    config::{normalize_strategy_name, CompactionPolicyConfig, ConfigError},
    observability::{log_debug, log_info},
};

/// Abstract compaction planner interface to support selectable strategies.
pub trait CompactionPlanner {
    /// Examine the snapshot and return the next compaction, if any.
    fn plan(&self, snapshot: &StoreSnapshot) -> Option<CompactionRequest>;
}

/// How files are picked out of an ordered candidate list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionPolicy {
    /// Skip leading files that fail the ratio test, then cap by count and size.
    #[default]
    RatioBased,
    /// Best balanced contiguous run.
    Exploring,
}

impl SelectionPolicy {
    /// Resolve a configured policy name (`ratio`, `exploring`, or their class names).
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match normalize_strategy_name(name).as_str() {
            "ratio" | "ratiobased" => Ok(Self::RatioBased),
            "exploring" => Ok(Self::Exploring),
            _ => Err(ConfigError::UnknownPolicy(name.to_owned())),
        }
    }

    pub(crate) fn select<'a>(
        self,
        ordered: &[&'a CandidateFile],
        limits: &SelectionLimits,
    ) -> Vec<&'a CandidateFile> {
        match self {
            Self::RatioBased => select_by_ratio(ordered, limits),
            Self::Exploring => select_exploring(ordered, limits),
        }
    }
}

/// Available compaction strategies selectable via configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompactionStrategy {
    /// Whole-store size-tiered selection with the given policy.
    SizeTiered(SelectionPolicy),
    /// Time-windowed selection; the window policy comes from the date-tiered config.
    DateTiered,
}

impl Default for CompactionStrategy {
    fn default() -> Self {
        Self::SizeTiered(SelectionPolicy::RatioBased)
    }
}

impl CompactionStrategy {
    /// Resolve a configured strategy name.
    ///
    /// Selection policy names stand for size-tiered selection with that policy;
    /// `date_tiered` selects the date-tiered planner.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        if normalize_strategy_name(name) == "datetiered" {
            return Ok(Self::DateTiered);
        }
        SelectionPolicy::from_name(name).map(Self::SizeTiered)
    }

    /// Build a concrete planner for the selected strategy.
    pub fn build(self, config: Arc<CompactionPolicyConfig>) -> CompactionPlannerKind {
        match self {
            Self::SizeTiered(policy) => {
                CompactionPlannerKind::SizeTiered(SizeTieredPlanner::new(config, policy))
            }
            Self::DateTiered => CompactionPlannerKind::DateTiered(DateTieredPlanner::new(config)),
        }
    }
}

/// Planner enum used to keep a concrete planner instance around even as strategy becomes pluggable.
#[derive(Clone, Debug)]
pub enum CompactionPlannerKind {
    /// Size-tiered planner implementation.
    SizeTiered(SizeTieredPlanner),
    /// Date-tiered planner implementation.
    DateTiered(DateTieredPlanner),
}

impl CompactionPlanner for CompactionPlannerKind {
    fn plan(&self, snapshot: &StoreSnapshot) -> Option<CompactionRequest> {
        match self {
            Self::SizeTiered(planner) => planner.plan(snapshot),
            Self::DateTiered(planner) => planner.plan(snapshot),
        }
    }
}

/// Whole-store size-tiered planner.
///
/// A due major compaction takes every file; otherwise the selection policy
/// runs over the files ordered largest first.
#[derive(Clone, Debug)]
pub struct SizeTieredPlanner {
    config: Arc<CompactionPolicyConfig>,
    policy: SelectionPolicy,
}

impl SizeTieredPlanner {
    /// Planner using `policy` under `config`.
    pub fn new(config: Arc<CompactionPolicyConfig>, policy: SelectionPolicy) -> Self {
        Self { config, policy }
    }

    /// Selection policy in use.
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }
}

impl CompactionPlanner for SizeTieredPlanner {
    fn plan(&self, snapshot: &StoreSnapshot) -> Option<CompactionRequest> {
        let cfg = &*self.config;
        let off_peak = snapshot.is_off_peak();

        if let Some(reason) = major_trigger(cfg, snapshot) {
            let files = order_by_age(snapshot.files());
            let request = CompactionRequest::major(&files, reason, off_peak, cfg.throttle_point());
            log_info!(
                component = "selection",
                event = "major_compaction_selected",
                region = %cfg.region(),
                column_family = %cfg.column_family(),
                reason = ?reason,
                files = request.len(),
                total_bytes = request.total_bytes(),
                throttle = ?request.throttle(),
            );
            return Some(request);
        }

        let limits = SelectionLimits::new(cfg, off_peak);
        let ordered = order_by_size(snapshot.files());
        let selected = self.policy.select(&ordered, &limits);
        if selected.is_empty() {
            log_debug!(
                component = "selection",
                event = "no_compaction_selected",
                region = %cfg.region(),
                column_family = %cfg.column_family(),
                candidates = snapshot.files().len(),
                off_peak,
            );
            return None;
        }
        let request = CompactionRequest::minor(&selected, off_peak, cfg.throttle_point());
        log_debug!(
            component = "selection",
            event = "minor_compaction_selected",
            region = %cfg.region(),
            column_family = %cfg.column_family(),
            policy = ?self.policy,
            files = request.len(),
            total_bytes = request.total_bytes(),
            throttle = ?request.throttle(),
            off_peak,
        );
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compaction::{
            file::FileId,
            request::{CompactionKind, MajorReason, ThrottleClass},
        },
        config::{keys, Configuration, StoreFacts},
    };

    fn config(conf: Configuration) -> Arc<CompactionPolicyConfig> {
        let conf = conf
            .with(keys::COMPACTION_MIN_SIZE, 1)
            .with(keys::MAJOR_COMPACTION_PERIOD, 0);
        Arc::new(CompactionPolicyConfig::from_source(&conf, &StoreFacts::new(64)).expect("config"))
    }

    fn snapshot(sizes: &[u64]) -> StoreSnapshot {
        let files = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| CandidateFile::new(FileId::new(i as u64), *size))
            .collect();
        StoreSnapshot::new(files, 1_000)
    }

    fn planner(conf: Configuration) -> CompactionPlannerKind {
        let cfg = config(conf);
        cfg.store_strategy().build(cfg)
    }

    #[test]
    fn names_resolve_to_strategies() {
        assert_eq!(
            CompactionStrategy::from_name("exploring"),
            Ok(CompactionStrategy::SizeTiered(SelectionPolicy::Exploring))
        );
        assert_eq!(
            CompactionStrategy::from_name(
                "org.apache.hadoop.hbase.regionserver.compactions.DateTieredCompactionPolicy"
            ),
            Ok(CompactionStrategy::DateTiered)
        );
        assert_eq!(
            CompactionStrategy::from_name("ratio"),
            Ok(CompactionStrategy::default())
        );
        assert_eq!(
            CompactionStrategy::from_name("stripe"),
            Err(ConfigError::UnknownPolicy("stripe".into()))
        );
        assert_eq!(
            SelectionPolicy::from_name("ExploringCompactionPolicy"),
            Ok(SelectionPolicy::Exploring)
        );
    }

    #[test]
    fn minor_selection_reports_throttle_class() {
        let planner = planner(Configuration::new().with(keys::COMPACTION_THROTTLE, 30));
        let request = planner.plan(&snapshot(&[10, 10, 10, 50])).expect("request");
        assert_eq!(request.kind(), CompactionKind::Minor);
        assert_eq!(request.files(), &[FileId::new(0), FileId::new(1), FileId::new(2)]);
        assert_eq!(request.total_bytes(), 30);
        assert_eq!(request.throttle(), ThrottleClass::Large);

        let planner = self::planner(Configuration::new().with(keys::COMPACTION_THROTTLE, 31));
        let request = planner.plan(&snapshot(&[10, 10, 10, 50])).expect("request");
        assert_eq!(request.throttle(), ThrottleClass::Small);
    }

    #[test]
    fn empty_store_plans_nothing() {
        let planner = planner(Configuration::new());
        assert!(planner.plan(&snapshot(&[])).is_none());
    }

    #[test]
    fn major_takes_priority_over_minor() {
        let planner = planner(Configuration::new().with(keys::MIN_LOCALITY_TO_FORCE_COMPACT, 0.5));
        let lone = CandidateFile::new(FileId::new(7), 10).with_locality(0.1);
        let request = planner
            .plan(&StoreSnapshot::new(vec![lone], 0))
            .expect("major");
        assert!(request.is_major());
        assert_eq!(request.files(), &[FileId::new(7)]);
        assert!(matches!(
            request.major_reason(),
            Some(MajorReason::LowLocality { .. })
        ));
    }

    #[test]
    fn exploring_store_policy_is_used_when_configured() {
        let planner = planner(Configuration::new().with(keys::STORE_COMPACTION_POLICY, "exploring"));
        assert!(matches!(
            &planner,
            CompactionPlannerKind::SizeTiered(p) if p.policy() == SelectionPolicy::Exploring
        ));
        let request = planner.plan(&snapshot(&[400, 10, 11, 12])).expect("request");
        assert_eq!(request.len(), 3);
        assert!(!request.files().contains(&FileId::new(0)));
    }
}
