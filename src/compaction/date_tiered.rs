//! Date-tiered planner: compaction scoped to time windows.
//!
//! Files never merge across window boundaries. Minor compactions pick the
//! newest window with enough files; major compactions rewrite everything but
//! split output at the window boundaries so the time layout survives.

use std::sync::Arc;

use super::{
    file::{CandidateFile, StoreSnapshot},
    major::major_trigger,
    ratio::{order_by_age, SelectionLimits},
    request::{CompactionRequest, MajorReason, OutputBoundary},
    CompactionPlanner,
};
use crate::{
    config::CompactionPolicyConfig,
    observability::{log_debug, log_info},
    window::{CompactionWindow, WindowGroup, WindowKind, WindowPartition},
};

/// Time-windowed planner.
#[derive(Clone, Debug)]
pub struct DateTieredPlanner {
    config: Arc<CompactionPolicyConfig>,
}

impl DateTieredPlanner {
    /// Planner using `config`'s date-tiered settings.
    pub fn new(config: Arc<CompactionPolicyConfig>) -> Self {
        Self { config }
    }

    /// Partition `snapshot` into windows using the configured factory and max age.
    pub fn partition<'a>(&self, snapshot: &'a StoreSnapshot) -> WindowPartition<'a, CandidateFile> {
        let dt = self.config.date_tiered();
        WindowPartition::build(
            snapshot.files(),
            CandidateFile::max_timestamp,
            dt.window_factory(),
            snapshot.now_ms(),
            dt.max_store_file_age_millis(),
        )
    }

    fn plan_major(
        &self,
        snapshot: &StoreSnapshot,
        partition: &WindowPartition<'_, CandidateFile>,
        reason: MajorReason,
    ) -> CompactionRequest {
        let cfg = &*self.config;
        let tiering = cfg.date_tiered().tiering();
        let now = snapshot.now_ms();
        let boundaries = partition
            .oldest_first()
            .enumerate()
            .map(|(index, group)| OutputBoundary {
                lower_bound: if index == 0 {
                    i64::MIN
                } else {
                    group.window().start()
                },
                tier: match group.kind() {
                    WindowKind::Terminal => None,
                    WindowKind::Incoming | WindowKind::Regular => {
                        tiering.assign(group.window().start(), now)
                    }
                },
            })
            .collect::<Vec<_>>();
        let files = order_by_age(snapshot.files());
        let request = CompactionRequest::major(
            &files,
            reason,
            snapshot.is_off_peak(),
            cfg.throttle_point(),
        )
        .with_boundaries(boundaries);
        log_info!(
            component = "selection",
            event = "date_tiered_major_selected",
            region = %cfg.region(),
            column_family = %cfg.column_family(),
            reason = ?reason,
            files = request.len(),
            windows = partition.len(),
            total_bytes = request.total_bytes(),
            throttle = ?request.throttle(),
        );
        request
    }

    fn plan_window(
        &self,
        snapshot: &StoreSnapshot,
        group: &WindowGroup<'_, CandidateFile>,
        limits: SelectionLimits,
    ) -> Option<CompactionRequest> {
        let cfg = &*self.config;
        let dt = cfg.date_tiered();
        // The incoming floor never exceeds the count ceiling; the cap trims the rest.
        let required = match group.kind() {
            WindowKind::Incoming => dt.incoming_window_min().min(limits.max_files),
            WindowKind::Regular | WindowKind::Terminal => cfg.min_files_to_compact(),
        }
        .max(2);
        if group.files().len() < required {
            return None;
        }
        let ordered = order_by_age(group.files().iter().copied());
        let selected = dt
            .window_policy()
            .select(&ordered, &limits.with_min_files(required));
        if selected.is_empty() {
            return None;
        }
        let window = group.window();
        let boundaries = self.minor_boundaries(window, snapshot.now_ms());
        Some(
            CompactionRequest::minor(&selected, snapshot.is_off_peak(), cfg.throttle_point())
                .with_window(window)
                .with_boundaries(boundaries),
        )
    }

    fn minor_boundaries(&self, window: CompactionWindow, now: i64) -> Vec<OutputBoundary> {
        let dt = self.config.date_tiered();
        let tiering = dt.tiering();
        let tier = tiering.assign(window.start(), now);
        if dt.single_output_for_minor_compaction() {
            return vec![OutputBoundary {
                lower_bound: i64::MIN,
                tier,
            }];
        }
        // Data below the window is at least as old as the window itself.
        vec![
            OutputBoundary {
                lower_bound: i64::MIN,
                tier: tier.clone(),
            },
            OutputBoundary {
                lower_bound: window.start(),
                tier,
            },
        ]
    }
}

impl CompactionPlanner for DateTieredPlanner {
    fn plan(&self, snapshot: &StoreSnapshot) -> Option<CompactionRequest> {
        let cfg = &*self.config;
        let partition = self.partition(snapshot);

        if let Some(reason) = major_trigger(cfg, snapshot) {
            return Some(self.plan_major(snapshot, &partition, reason));
        }

        let limits = SelectionLimits::new(cfg, snapshot.is_off_peak());
        for group in partition.groups() {
            if let Some(request) = self.plan_window(snapshot, group, limits) {
                log_debug!(
                    component = "selection",
                    event = "date_tiered_minor_selected",
                    region = %cfg.region(),
                    column_family = %cfg.column_family(),
                    window = %group.window(),
                    kind = ?group.kind(),
                    files = request.len(),
                    total_bytes = request.total_bytes(),
                    throttle = ?request.throttle(),
                );
                return Some(request);
            }
        }
        log_debug!(
            component = "selection",
            event = "no_compaction_selected",
            region = %cfg.region(),
            column_family = %cfg.column_family(),
            candidates = snapshot.files().len(),
            windows = partition.len(),
        );
        None
    }
}
