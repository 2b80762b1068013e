//! Exploring selection: best contiguous run of files that is internally balanced.

use super::{
    file::CandidateFile,
    ratio::{drop_oversized, total_size, SelectionLimits},
};

/// Try every contiguous run of `[min_files, max_files]` files in `ordered` and
/// keep the best one whose files are all within `ratio` of the rest.
///
/// More files win; equal counts prefer fewer bytes; the earliest run wins a
/// full tie. Runs whose combined size stays below the min compact size skip
/// the balance check, and runs whose non-exempt bytes exceed the ceiling are
/// ignored.
pub(crate) fn select_exploring<'a>(
    ordered: &[&'a CandidateFile],
    limits: &SelectionLimits,
) -> Vec<&'a CandidateFile> {
    if !limits.check_consistent() {
        return Vec::new();
    }
    let candidates = drop_oversized(ordered, limits);
    let min_files = limits.min_files.max(1);
    if candidates.len() < min_files {
        return Vec::new();
    }

    let mut best: Option<(usize, usize, u128)> = None;
    for start in 0..candidates.len() {
        let longest = limits.max_files.min(candidates.len() - start);
        for len in min_files..=longest {
            let run = &candidates[start..start + len];
            let size = total_size(run);
            if non_exempt_size(run, limits) > u128::from(limits.max_compact_size) {
                continue;
            }
            if size >= u128::from(limits.min_compact_size) && !in_ratio(run, size, limits.ratio) {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, best_len, best_size)) => {
                    len > best_len || (len == best_len && size < best_size)
                }
            };
            if better {
                best = Some((start, len, size));
            }
        }
    }

    best.map(|(start, len, _)| candidates[start..start + len].to_vec())
        .unwrap_or_default()
}

fn non_exempt_size(run: &[&CandidateFile], limits: &SelectionLimits) -> u128 {
    run.iter()
        .filter(|file| !limits.is_exempt(file))
        .map(|file| u128::from(file.size()))
        .sum()
}

fn in_ratio(run: &[&CandidateFile], total: u128, ratio: f64) -> bool {
    if run.len() < 2 {
        return true;
    }
    run.iter().all(|file| {
        let single = u128::from(file.size());
        single as f64 <= (total - single) as f64 * ratio
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compaction::{file::FileId, ratio::order_by_age};

    fn store(sizes: &[u64]) -> Vec<CandidateFile> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                CandidateFile::new(FileId::new(i as u64), *size).with_max_timestamp(i as i64)
            })
            .collect()
    }

    fn limits() -> SelectionLimits {
        SelectionLimits {
            min_files: 3,
            max_files: 5,
            ratio: 1.2,
            min_compact_size: 1,
            max_compact_size: u64::MAX,
        }
    }

    fn ids(selected: &[&CandidateFile]) -> Vec<u64> {
        selected.iter().map(|file| file.id().raw()).collect()
    }

    #[test]
    fn prefers_longest_balanced_run() {
        // The 400-byte outlier cannot sit in any balanced run.
        let files = store(&[400, 10, 11, 12, 13, 14]);
        let ordered = order_by_age(&files);
        assert_eq!(ids(&select_exploring(&ordered, &limits())), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn equal_length_runs_prefer_fewer_bytes() {
        let files = store(&[50, 50, 50, 400, 10, 10, 10]);
        let ordered = order_by_age(&files);
        assert_eq!(ids(&select_exploring(&ordered, &limits())), vec![4, 5, 6]);
    }

    #[test]
    fn nothing_balanced_selects_nothing() {
        let files = store(&[1_000, 100, 10, 1]);
        let ordered = order_by_age(&files);
        assert!(select_exploring(&ordered, &limits()).is_empty());
    }

    #[test]
    fn runs_are_capped_at_max_files() {
        let files = store(&[7; 9]);
        let ordered = order_by_age(&files);
        assert_eq!(select_exploring(&ordered, &limits()).len(), 5);
    }

    #[test]
    fn ceiling_excludes_heavy_runs() {
        let files = store(&[30, 30, 30, 5, 5, 5]);
        let ordered = order_by_age(&files);
        let limits = SelectionLimits {
            max_compact_size: 40,
            ..limits()
        };
        assert_eq!(ids(&select_exploring(&ordered, &limits)), vec![3, 4, 5]);
    }
}
