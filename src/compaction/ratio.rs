//! Size-tiered ratio test and the limits shared by every selection policy.

use std::cmp::Reverse;

use super::file::CandidateFile;
use crate::{config::CompactionPolicyConfig, observability::log_warn};

/// Count, ratio, and size bounds for one selection pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SelectionLimits {
    pub(crate) min_files: usize,
    pub(crate) max_files: usize,
    pub(crate) ratio: f64,
    pub(crate) min_compact_size: u64,
    pub(crate) max_compact_size: u64,
}

impl SelectionLimits {
    /// Limits for the current period.
    pub(crate) fn new(cfg: &CompactionPolicyConfig, off_peak: bool) -> Self {
        Self {
            min_files: cfg.min_files_to_compact(),
            max_files: cfg.max_files_to_compact(),
            ratio: cfg.ratio_for(off_peak),
            min_compact_size: cfg.min_compact_size(),
            max_compact_size: cfg.max_compact_size_for(off_peak),
        }
    }

    /// Same limits with a different file-count floor.
    pub(crate) fn with_min_files(mut self, min_files: usize) -> Self {
        self.min_files = min_files;
        self
    }

    /// Files at or below the min compact size skip the ratio test and the ceiling.
    pub(crate) fn is_exempt(&self, file: &CandidateFile) -> bool {
        file.size() <= self.min_compact_size
    }

    /// `false` when no selection can satisfy both count bounds.
    ///
    /// Operators are expected to keep `max_files >= min_files`; debug builds
    /// assert it, release builds select nothing.
    pub(crate) fn check_consistent(&self) -> bool {
        let consistent = self.max_files >= self.min_files;
        debug_assert!(
            consistent,
            "max files to compact ({}) below min files to compact ({})",
            self.max_files, self.min_files
        );
        if !consistent {
            log_warn!(
                component = "selection",
                event = "inconsistent_file_limits",
                min_files = self.min_files,
                max_files = self.max_files,
            );
        }
        consistent
    }
}

/// Largest first, ties broken by ascending id.
pub(crate) fn order_by_size<'a, I>(files: I) -> Vec<&'a CandidateFile>
where
    I: IntoIterator<Item = &'a CandidateFile>,
{
    let mut ordered: Vec<&'a CandidateFile> = files.into_iter().collect();
    ordered.sort_by_key(|file| (Reverse(file.size()), file.id()));
    ordered
}

/// Oldest first, ties broken by ascending id.
pub(crate) fn order_by_age<'a, I>(files: I) -> Vec<&'a CandidateFile>
where
    I: IntoIterator<Item = &'a CandidateFile>,
{
    let mut ordered: Vec<&'a CandidateFile> = files.into_iter().collect();
    ordered.sort_by_key(|file| (file.max_timestamp(), file.id()));
    ordered
}

/// Remove files above the size ceiling that are not exempt.
pub(crate) fn drop_oversized<'a>(
    files: &[&'a CandidateFile],
    limits: &SelectionLimits,
) -> Vec<&'a CandidateFile> {
    files
        .iter()
        .copied()
        .filter(|file| file.size() <= limits.max_compact_size || limits.is_exempt(file))
        .collect()
}

/// Drop non-exempt files from the front until their combined size fits the ceiling.
pub(crate) fn fit_ceiling<'a>(
    files: Vec<&'a CandidateFile>,
    limits: &SelectionLimits,
) -> Vec<&'a CandidateFile> {
    let counted: u128 = files
        .iter()
        .filter(|file| !limits.is_exempt(file))
        .map(|file| u128::from(file.size()))
        .sum();
    let mut excess = counted.saturating_sub(u128::from(limits.max_compact_size));
    files
        .into_iter()
        .filter(|file| {
            if excess == 0 || limits.is_exempt(file) {
                return true;
            }
            excess = excess.saturating_sub(u128::from(file.size()));
            false
        })
        .collect()
}

pub(crate) fn total_size(files: &[&CandidateFile]) -> u128 {
    files.iter().map(|file| u128::from(file.size())).sum()
}

/// Classic size-tiered selection over `ordered` (larger or older files first).
///
/// A leading file is skipped while its size exceeds
/// `max(min_compact_size, ratio * sum of the next max_files - 1 files)` and
/// enough files remain. The survivors are capped at `max_files` by dropping
/// from the front, then trimmed to the size ceiling. Anything shorter than
/// `min_files` is rejected.
pub(crate) fn select_by_ratio<'a>(
    ordered: &[&'a CandidateFile],
    limits: &SelectionLimits,
) -> Vec<&'a CandidateFile> {
    if !limits.check_consistent() {
        return Vec::new();
    }
    let candidates = drop_oversized(ordered, limits);
    let count = candidates.len();
    if count < limits.min_files || count == 0 {
        return Vec::new();
    }

    let span = limits.max_files.saturating_sub(1);
    let mut start = 0;
    while count - start >= limits.min_files {
        let file = candidates[start];
        let tail_end = count.min(start + 1 + span);
        let smaller = total_size(&candidates[start + 1..tail_end]);
        let threshold = (limits.min_compact_size as f64).max(limits.ratio * smaller as f64);
        if (file.size() as f64) <= threshold {
            break;
        }
        start += 1;
    }

    let mut selected = &candidates[start..];
    if selected.len() > limits.max_files {
        selected = &selected[selected.len() - limits.max_files..];
    }
    let selected = fit_ceiling(selected.to_vec(), limits);
    if selected.len() < limits.min_files.max(1) {
        return Vec::new();
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compaction::file::FileId;

    fn files(sizes: &[u64]) -> Vec<CandidateFile> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| CandidateFile::new(FileId::new(i as u64), *size))
            .collect()
    }

    fn limits() -> SelectionLimits {
        SelectionLimits {
            min_files: 3,
            max_files: 10,
            ratio: 1.2,
            min_compact_size: 1,
            max_compact_size: u64::MAX,
        }
    }

    fn sizes(selected: &[&CandidateFile]) -> Vec<u64> {
        selected.iter().map(|file| file.size()).collect()
    }

    #[test]
    fn oversized_leading_file_is_skipped() {
        let store = files(&[10, 10, 10, 50]);
        let ordered = order_by_size(&store);
        let selected = select_by_ratio(&ordered, &limits());
        assert_eq!(sizes(&selected), vec![10, 10, 10]);
    }

    #[test]
    fn every_small_file_passes_the_ratio_test() {
        let store = files(&[1_000, 5, 900, 3]);
        let ordered = order_by_size(&store);
        let limits = SelectionLimits {
            min_compact_size: 1_000,
            ..limits()
        };
        assert_eq!(select_by_ratio(&ordered, &limits).len(), 4);
    }

    #[test]
    fn too_few_survivors_select_nothing() {
        let store = files(&[100, 10, 10]);
        let ordered = order_by_size(&store);
        assert!(select_by_ratio(&ordered, &limits()).is_empty());
    }

    #[test]
    fn count_cap_drops_largest() {
        let store = files(&[20, 19, 18, 17, 16, 15, 14, 13, 12, 11, 10, 9]);
        let ordered = order_by_size(&store);
        let selected = select_by_ratio(&ordered, &limits());
        assert_eq!(selected.len(), 10);
        assert_eq!(sizes(&selected)[0], 18);
    }

    #[test]
    fn ceiling_drops_largest_non_exempt_files() {
        let store = files(&[40, 30, 30, 20, 2, 2]);
        let ordered = order_by_size(&store);
        let limits = SelectionLimits {
            min_compact_size: 2,
            max_compact_size: 60,
            ratio: 10.0,
            ..limits()
        };
        let selected = select_by_ratio(&ordered, &limits);
        assert_eq!(sizes(&selected), vec![30, 20, 2, 2]);
    }

    #[test]
    fn files_above_ceiling_are_never_candidates() {
        let store = files(&[500, 10, 10, 10]);
        let ordered = order_by_size(&store);
        let limits = SelectionLimits {
            max_compact_size: 100,
            ratio: 100.0,
            ..limits()
        };
        assert_eq!(sizes(&select_by_ratio(&ordered, &limits)), vec![10, 10, 10]);
    }

    #[test]
    fn ties_order_by_id() {
        let store = files(&[5, 5, 7]);
        let ordered = order_by_size(&store);
        let ids: Vec<u64> = ordered.iter().map(|f| f.id().raw()).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn age_order_puts_oldest_first() {
        let store = vec![
            CandidateFile::new(FileId::new(3), 1).with_max_timestamp(30),
            CandidateFile::new(FileId::new(1), 1).with_max_timestamp(10),
            CandidateFile::new(FileId::new(2), 1).with_max_timestamp(10),
        ];
        let ids: Vec<u64> = order_by_age(&store).iter().map(|f| f.id().raw()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
