//! Per-store policy handle.
//!
//! Holds the resolved config behind a read-write lock so a configuration reload
//! can swap it wholesale. Selections clone the current `Arc` up front and keep
//! using it even if a reload lands mid-cycle.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    compaction::{CompactionPlanner, CompactionRequest, StoreSnapshot},
    config::{CompactionPolicyConfig, ConfigError, ConfigurationSource, StoreFacts},
    observability::{log_info, log_warn},
    window::WindowFactoryRegistry,
};

/// Compaction policy of one store.
#[derive(Debug)]
pub struct StoreCompactionPolicy {
    facts: StoreFacts,
    registry: WindowFactoryRegistry,
    config: RwLock<Arc<CompactionPolicyConfig>>,
}

impl StoreCompactionPolicy {
    /// Resolve the store's config from `source` with the built-in window factories.
    pub fn open<S>(source: &S, facts: StoreFacts) -> Result<Self, ConfigError>
    where
        S: ConfigurationSource + ?Sized,
    {
        Self::open_with_registry(source, facts, WindowFactoryRegistry::default())
    }

    /// Resolve the store's config, looking window factories up in `registry`.
    pub fn open_with_registry<S>(
        source: &S,
        facts: StoreFacts,
        registry: WindowFactoryRegistry,
    ) -> Result<Self, ConfigError>
    where
        S: ConfigurationSource + ?Sized,
    {
        let config = CompactionPolicyConfig::from_source_with_registry(source, &facts, &registry)?;
        Ok(Self {
            facts,
            registry,
            config: RwLock::new(Arc::new(config)),
        })
    }

    /// Config currently in effect.
    pub fn config(&self) -> Arc<CompactionPolicyConfig> {
        Arc::clone(&self.config.read())
    }

    /// Store facts the config was resolved against.
    pub fn facts(&self) -> &StoreFacts {
        &self.facts
    }

    /// Re-resolve the config from `source` and swap it in.
    ///
    /// On error the previous config stays in effect.
    pub fn reload<S>(&self, source: &S) -> Result<Arc<CompactionPolicyConfig>, ConfigError>
    where
        S: ConfigurationSource + ?Sized,
    {
        let config = match CompactionPolicyConfig::from_source_with_registry(
            source,
            &self.facts,
            &self.registry,
        ) {
            Ok(config) => Arc::new(config),
            Err(err) => {
                log_warn!(
                    component = "store",
                    event = "compaction_config_reload_failed",
                    region = %self.facts.region,
                    column_family = %self.facts.column_family,
                    error = %err,
                );
                return Err(err);
            }
        };
        *self.config.write() = Arc::clone(&config);
        log_info!(
            component = "store",
            event = "compaction_config_reloaded",
            region = %self.facts.region,
            column_family = %self.facts.column_family,
        );
        Ok(config)
    }

    /// Update the live min-files tunable on the current config.
    pub fn set_min_files_to_compact(&self, threshold: usize) {
        self.config.read().set_min_files_to_compact(threshold);
    }

    /// Run one selection cycle with the configured strategy.
    pub fn select(&self, snapshot: &StoreSnapshot) -> Option<CompactionRequest> {
        let config = self.config();
        config.store_strategy().build(Arc::clone(&config)).plan(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compaction::{CandidateFile, FileId},
        config::{keys, Configuration},
    };

    fn facts() -> StoreFacts {
        StoreFacts::new(64)
            .with_region("r1")
            .with_column_family("cf")
    }

    fn base() -> Configuration {
        Configuration::new()
            .with(keys::COMPACTION_MIN_SIZE, 1)
            .with(keys::MAJOR_COMPACTION_PERIOD, 0)
    }

    fn snapshot(count: u64) -> StoreSnapshot {
        let files = (0..count)
            .map(|id| CandidateFile::new(FileId::new(id), 10))
            .collect();
        StoreSnapshot::new(files, 0)
    }

    #[test]
    fn reload_swaps_config_but_keeps_old_handles() {
        let policy = StoreCompactionPolicy::open(&base(), facts()).expect("policy");
        let before = policy.config();
        assert!(policy.select(&snapshot(3)).is_some());

        let reloaded = policy
            .reload(&base().with(keys::COMPACTION_MIN_FILES, 4))
            .expect("reload");
        assert_eq!(reloaded.min_files_to_compact(), 4);
        assert_eq!(before.min_files_to_compact(), 3);
        assert!(policy.select(&snapshot(3)).is_none());
        assert_eq!(policy.facts().region, "r1");
    }

    #[test]
    fn failed_reload_keeps_previous_config() {
        let policy = StoreCompactionPolicy::open(&base(), facts()).expect("policy");
        let err = policy
            .reload(&base().with(keys::COMPACTION_RATIO, "steep"))
            .expect_err("malformed ratio");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(policy.config().compaction_ratio(), 1.2);
    }

    #[test]
    fn setter_applies_to_live_config() {
        let policy = StoreCompactionPolicy::open(&base(), facts()).expect("policy");
        policy.set_min_files_to_compact(5);
        assert_eq!(policy.config().min_files_to_compact(), 5);
        assert!(policy.select(&snapshot(4)).is_none());
        assert_eq!(policy.select(&snapshot(5)).map(|r| r.len()), Some(5));
    }
}
