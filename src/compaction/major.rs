//! Periodic and locality-driven major compaction triggers.

use super::{
    file::{CandidateFile, StoreSnapshot},
    request::MajorReason,
};
use crate::{config::CompactionPolicyConfig, observability::log_debug};

/// Decide whether the whole store should be major compacted now.
///
/// A store with exactly one live file whose locality is below the configured
/// threshold is always due. Otherwise the store is due once more than the
/// jittered period has passed since the last major compaction, falling back
/// to the oldest file timestamp when that time is unknown. A lone live file
/// that already is a major-compaction output is left alone.
pub(crate) fn major_trigger(
    cfg: &CompactionPolicyConfig,
    snapshot: &StoreSnapshot,
) -> Option<MajorReason> {
    let files = snapshot.files();
    if files.is_empty() {
        return None;
    }
    let live: Vec<&CandidateFile> = files.iter().filter(|file| !file.is_historical()).collect();
    let single = match live.as_slice() {
        [only] => Some(*only),
        _ => None,
    };

    let threshold = cfg.min_locality_to_force_compact();
    if let Some(file) = single {
        if file.locality() < threshold {
            return Some(MajorReason::LowLocality {
                locality: file.locality(),
                threshold,
            });
        }
    }

    if cfg.major_compaction_period() == 0 {
        return None;
    }
    let seed = snapshot.jitter_seed().unwrap_or_else(|| cfg.jitter_seed());
    let period_ms = effective_period(
        cfg.major_compaction_period(),
        cfg.major_compaction_jitter(),
        seed,
    );
    let last = snapshot
        .last_major_compaction_ms()
        .or_else(|| snapshot.oldest_timestamp())?;
    let elapsed_ms = snapshot.now_ms().saturating_sub(last);
    if elapsed_ms <= period_ms {
        return None;
    }
    if let Some(file) = single.filter(|file| file.is_major_compacted()) {
        log_debug!(
            component = "selection",
            event = "periodic_major_skipped",
            file = %file.id(),
            elapsed_ms,
            period_ms,
        );
        return None;
    }
    Some(MajorReason::Periodic {
        elapsed_ms,
        period_ms,
    })
}

/// Period randomized by up to `jitter` of itself, deterministically per `seed`.
///
/// The result lies in `[period - period * jitter, period + period * jitter]`.
pub(crate) fn effective_period(period_ms: u64, jitter: f64, seed: u64) -> i64 {
    let period = i64::try_from(period_ms).unwrap_or(i64::MAX);
    let jitter = if jitter.is_finite() {
        jitter.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let jitter_ms = (period as f64 * jitter).round() as i64;
    if jitter_ms == 0 {
        return period;
    }
    let rnd = fastrand::Rng::with_seed(seed).f64();
    let offset = (2.0 * jitter_ms as f64 * rnd).round() as i64;
    period.saturating_add(jitter_ms).saturating_sub(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compaction::file::FileId,
        config::{keys, Configuration, StoreFacts},
    };

    const DAY: i64 = 86_400_000;

    fn config(conf: Configuration) -> CompactionPolicyConfig {
        CompactionPolicyConfig::from_source(&conf, &StoreFacts::new(1)).expect("config")
    }

    fn file(id: u64, ts: i64) -> CandidateFile {
        CandidateFile::new(FileId::new(id), 100).with_max_timestamp(ts)
    }

    #[test]
    fn jitter_stays_within_bounds_and_is_seeded() {
        let period = 7 * DAY as u64;
        for seed in 0..64 {
            let effective = effective_period(period, 0.5, seed);
            assert!(effective >= 7 * DAY / 2 && effective <= 7 * DAY * 3 / 2);
            assert_eq!(effective, effective_period(period, 0.5, seed));
        }
        assert_eq!(effective_period(period, 0.0, 9), 7 * DAY);
        assert_eq!(effective_period(period, f64::NAN, 9), 7 * DAY);
    }

    #[test]
    fn periodic_major_after_period_elapses() {
        let cfg = config(Configuration::new().with(keys::MAJOR_COMPACTION_JITTER, 0.0));
        let files = vec![file(1, 0), file(2, DAY)];

        let early = StoreSnapshot::new(files.clone(), 7 * DAY);
        assert_eq!(major_trigger(&cfg, &early), None);

        let late = StoreSnapshot::new(files.clone(), 7 * DAY + 1);
        assert_eq!(
            major_trigger(&cfg, &late),
            Some(MajorReason::Periodic {
                elapsed_ms: 7 * DAY + 1,
                period_ms: 7 * DAY,
            })
        );

        // A recorded major compaction resets the clock.
        let recent = StoreSnapshot::new(files, 8 * DAY).with_last_major_compaction(2 * DAY);
        assert_eq!(major_trigger(&cfg, &recent), None);
    }

    #[test]
    fn zero_period_disables_periodic_major() {
        let cfg = config(Configuration::new().with(keys::MAJOR_COMPACTION_PERIOD, 0));
        let snapshot = StoreSnapshot::new(vec![file(1, 0), file(2, 0)], 365 * DAY);
        assert_eq!(major_trigger(&cfg, &snapshot), None);
    }

    #[test]
    fn low_locality_single_file_forces_major() {
        let cfg = config(Configuration::new().with(keys::MIN_LOCALITY_TO_FORCE_COMPACT, 0.5));
        let lone = file(1, DAY).with_locality(0.1).major_compacted();
        let snapshot = StoreSnapshot::new(vec![lone], DAY);
        assert_eq!(
            major_trigger(&cfg, &snapshot),
            Some(MajorReason::LowLocality {
                locality: 0.1,
                threshold: 0.5,
            })
        );

        let local = StoreSnapshot::new(vec![file(1, DAY).with_locality(0.9)], DAY);
        assert_eq!(major_trigger(&cfg, &local), None);
    }

    #[test]
    fn historical_files_do_not_count_towards_single_file_rules() {
        let cfg = config(
            Configuration::new()
                .with(keys::MIN_LOCALITY_TO_FORCE_COMPACT, 0.5)
                .with(keys::MAJOR_COMPACTION_JITTER, 0.0),
        );
        let files = vec![
            file(1, DAY).with_locality(0.2),
            file(2, 0).historical(),
        ];
        let snapshot = StoreSnapshot::new(files, DAY);
        assert!(matches!(
            major_trigger(&cfg, &snapshot),
            Some(MajorReason::LowLocality { .. })
        ));
    }

    #[test]
    fn single_major_output_is_not_recompacted_periodically() {
        let cfg = config(Configuration::new().with(keys::MAJOR_COMPACTION_JITTER, 0.0));
        let snapshot = StoreSnapshot::new(vec![file(1, 0).major_compacted()], 30 * DAY);
        assert_eq!(major_trigger(&cfg, &snapshot), None);

        let snapshot = StoreSnapshot::new(vec![file(1, 0)], 30 * DAY);
        assert!(matches!(
            major_trigger(&cfg, &snapshot),
            Some(MajorReason::Periodic { .. })
        ));
    }

    #[test]
    fn empty_store_never_majors() {
        let cfg = config(Configuration::new().with(keys::MIN_LOCALITY_TO_FORCE_COMPACT, 1.0));
        assert_eq!(major_trigger(&cfg, &StoreSnapshot::new(Vec::new(), DAY)), None);
    }
}
