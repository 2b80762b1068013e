//! Operator-configured off-peak hour ranges.

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Hour-of-day range `[start, end)` during which compaction may be more aggressive.
///
/// Ranges may wrap midnight (`22..6`). A range with an hour outside `0..24`,
/// or with equal start and end, is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OffPeakHours {
    range: Option<(u8, u8)>,
}

impl OffPeakHours {
    /// Build from configured hours; invalid input disables off-peak.
    pub fn new(start_hour: i64, end_hour: i64) -> Self {
        let valid = |hour: i64| (0..24).contains(&hour);
        if !valid(start_hour) || !valid(end_hour) || start_hour == end_hour {
            return Self::disabled();
        }
        // Both hours were checked against 0..24.
        Self {
            range: Some((start_hour as u8, end_hour as u8)),
        }
    }

    /// Never off-peak.
    pub const fn disabled() -> Self {
        Self { range: None }
    }

    /// Whether a valid range is configured.
    pub fn is_enabled(&self) -> bool {
        self.range.is_some()
    }

    /// Whether `hour` (0-23) falls inside the range.
    pub fn is_off_peak_hour(&self, hour: u8) -> bool {
        match self.range {
            None => false,
            Some((start, end)) if start < end => (start..end).contains(&hour),
            Some((start, end)) => hour >= start || hour < end,
        }
    }

    /// Whether the UTC hour of `now_ms` (epoch milliseconds) falls inside the range.
    pub fn is_off_peak_at(&self, now_ms: i64) -> bool {
        let hour = now_ms.div_euclid(MILLIS_PER_HOUR).rem_euclid(24);
        self.is_off_peak_hour(hour as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_range() {
        let hours = OffPeakHours::new(1, 5);
        assert!(hours.is_enabled());
        assert!(!hours.is_off_peak_hour(0));
        assert!(hours.is_off_peak_hour(1));
        assert!(hours.is_off_peak_hour(4));
        assert!(!hours.is_off_peak_hour(5));
    }

    #[test]
    fn range_wrapping_midnight() {
        let hours = OffPeakHours::new(22, 3);
        assert!(hours.is_off_peak_hour(23));
        assert!(hours.is_off_peak_hour(0));
        assert!(hours.is_off_peak_hour(2));
        assert!(!hours.is_off_peak_hour(3));
        assert!(!hours.is_off_peak_hour(12));
    }

    #[test]
    fn invalid_ranges_disable_off_peak() {
        for (start, end) in [(-1, -1), (-1, 4), (3, 24), (6, 6)] {
            let hours = OffPeakHours::new(start, end);
            assert!(!hours.is_enabled());
            assert!((0..24).all(|h| !hours.is_off_peak_hour(h)));
        }
    }

    #[test]
    fn epoch_millis_resolve_to_utc_hour() {
        let hours = OffPeakHours::new(2, 4);
        let day = 24 * MILLIS_PER_HOUR;
        assert!(hours.is_off_peak_at(10 * day + 2 * MILLIS_PER_HOUR));
        assert!(hours.is_off_peak_at(10 * day + 3 * MILLIS_PER_HOUR + 59_999));
        assert!(!hours.is_off_peak_at(10 * day + 4 * MILLIS_PER_HOUR));
        // Negative epochs still map onto 0..24.
        assert!(hours.is_off_peak_at(-day + 2 * MILLIS_PER_HOUR));
    }
}
