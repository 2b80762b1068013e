//! Time-window partitioning used by date-tiered compaction.
//!
//! Files are bucketed by their max timestamp into non-overlapping windows laid
//! out by a [`CompactionWindowFactory`], newest first. Files older than the
//! configured max age fall into a single terminal window that is never
//! compacted or tiered.

mod factory;
mod tier;

use std::fmt;

pub use factory::{
    CompactionWindowFactory, ExponentialWindowFactory, FixedWindowFactory, WindowFactory,
    WindowFactoryBuilder, WindowFactoryRegistry, WindowSettings,
};
pub use tier::{StorageTier, TierAssignment, TierPolicy};

/// Half-open time interval `[start, end)` in epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompactionWindow {
    start: i64,
    end: i64,
}

impl CompactionWindow {
    /// Window covering `[start, end)`.
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Inclusive lower bound.
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Exclusive upper bound.
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Width in milliseconds.
    pub const fn width(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether `timestamp` falls inside the window.
    pub const fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

impl fmt::Display for CompactionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Role of a window within a partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowKind {
    /// Newest window; also claims timestamps at or past its end.
    Incoming,
    /// Any other window younger than the max age.
    Regular,
    /// Everything older than the max age; never compacted or tiered.
    Terminal,
}

/// Files claimed by one window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowGroup<'a, T> {
    window: CompactionWindow,
    kind: WindowKind,
    files: Vec<&'a T>,
}

impl<'a, T> WindowGroup<'a, T> {
    /// The window's bounds (clipped to the max-age cutoff).
    pub fn window(&self) -> CompactionWindow {
        self.window
    }

    /// Role of the window.
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Claimed files, newest first.
    pub fn files(&self) -> &[&'a T] {
        &self.files
    }

    /// Whether `timestamp` would be claimed by this window.
    pub fn claims(&self, timestamp: i64) -> bool {
        match self.kind {
            WindowKind::Incoming => timestamp >= self.window.start,
            WindowKind::Regular | WindowKind::Terminal => self.window.contains(timestamp),
        }
    }
}

/// Files partitioned into windows.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowPartition<'a, T> {
    groups: Vec<WindowGroup<'a, T>>,
    terminal: Option<WindowGroup<'a, T>>,
}

impl<'a, T> WindowPartition<'a, T> {
    /// Bucket `items` by `timestamp` into windows laid out by `factory`.
    ///
    /// Only windows holding at least one file are kept. Files with equal
    /// timestamps keep their input order.
    pub fn build<F>(
        items: &'a [T],
        timestamp: F,
        factory: &dyn CompactionWindowFactory,
        now: i64,
        max_age_millis: i64,
    ) -> Self
    where
        F: Fn(&T) -> i64,
    {
        let cutoff = now.saturating_sub(max_age_millis.max(0));
        let mut ordered: Vec<&'a T> = items.iter().collect();
        ordered.sort_by_key(|item| std::cmp::Reverse(timestamp(*item)));

        let mut groups = Vec::new();
        let mut rest: &[&'a T] = &ordered;
        let mut window = factory.incoming_window(now);
        let mut kind = WindowKind::Incoming;
        let mut lower = window.start().max(cutoff);
        while let Some(newest) = rest.first() {
            if timestamp(*newest) < cutoff {
                break;
            }
            let clipped = CompactionWindow::new(window.start().max(cutoff), window.end());
            lower = clipped.start();
            let claimed = rest
                .iter()
                .take_while(|item| timestamp(**item) >= clipped.start())
                .count();
            if claimed > 0 {
                groups.push(WindowGroup {
                    window: clipped,
                    kind,
                    files: rest[..claimed].to_vec(),
                });
                rest = &rest[claimed..];
            }
            if clipped.start() <= cutoff {
                break;
            }
            let earlier = factory.earlier_window(&window, now);
            if earlier.start() >= window.start() {
                // Saturated at the bottom of the time axis.
                break;
            }
            window = earlier;
            kind = WindowKind::Regular;
        }

        let terminal = (!rest.is_empty()).then(|| WindowGroup {
            window: CompactionWindow::new(i64::MIN, lower),
            kind: WindowKind::Terminal,
            files: rest.to_vec(),
        });
        Self { groups, terminal }
    }

    /// Non-terminal windows, newest first.
    pub fn groups(&self) -> &[WindowGroup<'a, T>] {
        &self.groups
    }

    /// Files past the max age, if any.
    pub fn terminal(&self) -> Option<&WindowGroup<'a, T>> {
        self.terminal.as_ref()
    }

    /// All windows including the terminal one, oldest first.
    pub fn oldest_first(&self) -> impl Iterator<Item = &WindowGroup<'a, T>> {
        self.terminal.iter().chain(self.groups.iter().rev())
    }

    /// Number of windows holding files, terminal included.
    pub fn len(&self) -> usize {
        self.groups.len() + usize::from(self.terminal.is_some())
    }

    /// Returns `true` when no files were partitioned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
