//! Window factories: how the time axis is cut into compaction windows.

use std::{collections::HashMap, fmt, sync::Arc};

use super::CompactionWindow;
use crate::config::{normalize_strategy_name, ConfigError};

/// Produces the incoming window and walks backwards through older windows.
///
/// Implementations must return windows that tile the time axis: the window
/// returned by [`earlier_window`](Self::earlier_window) ends where its input
/// starts.
pub trait CompactionWindowFactory: fmt::Debug + Send + Sync {
    /// Window containing `now`.
    fn incoming_window(&self, now: i64) -> CompactionWindow;

    /// Window immediately before `window`.
    fn earlier_window(&self, window: &CompactionWindow, now: i64) -> CompactionWindow;
}

/// Raw tunables handed to registered factory builders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSettings {
    /// Width of the incoming window, in milliseconds.
    pub base_window_millis: i64,
    /// Windows per tier; also the width multiplier between tiers.
    pub windows_per_tier: i64,
    /// Age past which windows stop widening.
    pub max_tier_age_millis: i64,
}

/// Exponentially widening windows aligned to multiples of their width.
///
/// The incoming window is `base_window_millis` wide. Walking back, a window
/// keeps its width until it sits on a multiple of `windows_per_tier` times its
/// width, then the width is multiplied by `windows_per_tier`. Widening stops
/// once a window would start before `now - max_tier_age_millis`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExponentialWindowFactory {
    base_window_millis: i64,
    windows_per_tier: i64,
    max_tier_age_millis: i64,
}

impl ExponentialWindowFactory {
    /// Create a factory. Non-positive widths and tier counts are raised to 1.
    pub fn new(base_window_millis: i64, windows_per_tier: i64, max_tier_age_millis: i64) -> Self {
        Self {
            base_window_millis: base_window_millis.max(1),
            windows_per_tier: windows_per_tier.max(1),
            max_tier_age_millis,
        }
    }

    fn from_settings(settings: &WindowSettings) -> Self {
        Self::new(
            settings.base_window_millis,
            settings.windows_per_tier,
            settings.max_tier_age_millis,
        )
    }
}

impl CompactionWindowFactory for ExponentialWindowFactory {
    fn incoming_window(&self, now: i64) -> CompactionWindow {
        aligned(self.base_window_millis, now.div_euclid(self.base_window_millis))
    }

    fn earlier_window(&self, window: &CompactionWindow, now: i64) -> CompactionWindow {
        let width = window.width().max(1);
        let position = window.start().div_euclid(width);
        let cutoff = now.saturating_sub(self.max_tier_age_millis.max(0));
        match width.checked_mul(self.windows_per_tier) {
            Some(wider)
                if position.rem_euclid(self.windows_per_tier) == 0
                    && window.start().saturating_sub(wider) >= cutoff =>
            {
                aligned(wider, position.div_euclid(self.windows_per_tier) - 1)
            }
            _ => aligned(width, position.saturating_sub(1)),
        }
    }
}

/// Equal-width windows aligned to multiples of the width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedWindowFactory {
    window_millis: i64,
}

impl FixedWindowFactory {
    /// Create a factory. Non-positive widths are raised to 1.
    pub fn new(window_millis: i64) -> Self {
        Self {
            window_millis: window_millis.max(1),
        }
    }
}

impl CompactionWindowFactory for FixedWindowFactory {
    fn incoming_window(&self, now: i64) -> CompactionWindow {
        aligned(self.window_millis, now.div_euclid(self.window_millis))
    }

    fn earlier_window(&self, window: &CompactionWindow, _now: i64) -> CompactionWindow {
        CompactionWindow::new(
            window.start().saturating_sub(self.window_millis),
            window.start(),
        )
    }
}

fn aligned(width: i64, position: i64) -> CompactionWindow {
    CompactionWindow::new(
        width.saturating_mul(position),
        width.saturating_mul(position.saturating_add(1)),
    )
}

/// Window factory selected by configuration.
#[derive(Clone, Debug)]
pub enum WindowFactory {
    /// Exponentially widening windows.
    Exponential(ExponentialWindowFactory),
    /// Equal-width windows.
    Fixed(FixedWindowFactory),
    /// Factory supplied through [`WindowFactoryRegistry::register`].
    Custom(Arc<dyn CompactionWindowFactory>),
}

impl CompactionWindowFactory for WindowFactory {
    fn incoming_window(&self, now: i64) -> CompactionWindow {
        match self {
            Self::Exponential(factory) => factory.incoming_window(now),
            Self::Fixed(factory) => factory.incoming_window(now),
            Self::Custom(factory) => factory.incoming_window(now),
        }
    }

    fn earlier_window(&self, window: &CompactionWindow, now: i64) -> CompactionWindow {
        match self {
            Self::Exponential(factory) => factory.earlier_window(window, now),
            Self::Fixed(factory) => factory.earlier_window(window, now),
            Self::Custom(factory) => factory.earlier_window(window, now),
        }
    }
}

/// Builds a [`WindowFactory`] from the configured window settings.
pub type WindowFactoryBuilder = fn(&WindowSettings) -> WindowFactory;

/// Name-to-builder table consulted when a config resolves its window factory.
///
/// Starts out with `exponential` and `fixed`; callers add their own factories
/// with [`register`](Self::register) before building configs.
#[derive(Clone, Debug)]
pub struct WindowFactoryRegistry {
    builders: HashMap<String, WindowFactoryBuilder>,
}

impl Default for WindowFactoryRegistry {
    fn default() -> Self {
        let mut registry = Self {
            builders: HashMap::new(),
        };
        registry.register("exponential", |settings| {
            WindowFactory::Exponential(ExponentialWindowFactory::from_settings(settings))
        });
        registry.register("fixed", |settings| {
            WindowFactory::Fixed(FixedWindowFactory::new(settings.base_window_millis))
        });
        registry
    }
}

impl WindowFactoryRegistry {
    /// Register `builder` under `name`, returning the builder it replaced.
    pub fn register(
        &mut self,
        name: &str,
        builder: WindowFactoryBuilder,
    ) -> Option<WindowFactoryBuilder> {
        self.builders
            .insert(normalize_strategy_name(name), builder)
    }

    /// Whether a builder answers to `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.builders
            .contains_key(&normalize_strategy_name(name))
    }

    /// Build the factory registered under `name`.
    pub fn build(
        &self,
        name: &str,
        settings: &WindowSettings,
    ) -> Result<WindowFactory, ConfigError> {
        self.builders
            .get(&normalize_strategy_name(name))
            .map(|builder| builder(settings))
            .ok_or_else(|| ConfigError::UnknownWindowFactory(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3_600_000;

    fn walk(factory: &dyn CompactionWindowFactory, now: i64, count: usize) -> Vec<CompactionWindow> {
        let mut windows = vec![factory.incoming_window(now)];
        while windows.len() < count {
            let next = factory.earlier_window(windows.last().expect("window"), now);
            windows.push(next);
        }
        windows
    }

    #[test]
    fn exponential_windows_tile_and_widen() {
        let factory = ExponentialWindowFactory::new(HOUR, 4, i64::MAX);
        let now = 1_000 * HOUR + 17;
        let windows = walk(&factory, now, 24);

        assert!(windows[0].contains(now));
        assert_eq!(windows[0].width(), HOUR);
        for pair in windows.windows(2) {
            assert_eq!(pair[1].end(), pair[0].start(), "{pair:?}");
            assert!(pair[1].width() >= pair[0].width());
            assert_eq!(pair[1].start().rem_euclid(pair[1].width()), 0);
        }
        let widths: Vec<i64> = windows.iter().map(CompactionWindow::width).collect();
        assert!(widths.contains(&(4 * HOUR)));
        assert!(widths.contains(&(16 * HOUR)));
        // At most `windows_per_tier` windows of any width above the base.
        for width in [4 * HOUR, 16 * HOUR] {
            assert!(widths.iter().filter(|w| **w == width).count() <= 4);
        }
    }

    #[test]
    fn exponential_windows_stop_widening_past_max_tier_age() {
        let factory = ExponentialWindowFactory::new(HOUR, 2, 8 * HOUR);
        let now = 1_024 * HOUR;
        let windows = walk(&factory, now, 40);
        for window in &windows {
            if window.start() < now - 8 * HOUR {
                assert!(window.width() <= 8 * HOUR, "{window:?}");
            }
        }
        let last = windows.last().expect("window");
        assert_eq!(last.width(), windows[windows.len() - 2].width());
    }

    #[test]
    fn fixed_windows_keep_width() {
        let factory = FixedWindowFactory::new(HOUR);
        let windows = walk(&factory, 10 * HOUR + 5, 5);
        assert_eq!(windows[0], CompactionWindow::new(10 * HOUR, 11 * HOUR));
        assert_eq!(windows[4], CompactionWindow::new(6 * HOUR, 7 * HOUR));
    }

    #[test]
    fn negative_timestamps_align_downwards() {
        let factory = FixedWindowFactory::new(HOUR);
        assert_eq!(
            factory.incoming_window(-1),
            CompactionWindow::new(-HOUR, 0)
        );
    }

    #[derive(Debug)]
    struct Daily;

    impl CompactionWindowFactory for Daily {
        fn incoming_window(&self, now: i64) -> CompactionWindow {
            FixedWindowFactory::new(24 * HOUR).incoming_window(now)
        }

        fn earlier_window(&self, window: &CompactionWindow, now: i64) -> CompactionWindow {
            FixedWindowFactory::new(24 * HOUR).earlier_window(window, now)
        }
    }

    #[test]
    fn registry_resolves_builtin_and_custom_names() {
        let settings = WindowSettings {
            base_window_millis: HOUR,
            windows_per_tier: 4,
            max_tier_age_millis: i64::MAX,
        };
        let mut registry = WindowFactoryRegistry::default();
        assert!(matches!(
            registry.build("ExponentialCompactionWindowFactory", &settings),
            Ok(WindowFactory::Exponential(_))
        ));
        assert!(matches!(
            registry.build("fixed", &settings),
            Ok(WindowFactory::Fixed(_))
        ));
        assert_eq!(
            registry.build("daily", &settings).err(),
            Some(ConfigError::UnknownWindowFactory("daily".into()))
        );

        assert!(registry
            .register("daily", |_| WindowFactory::Custom(Arc::new(Daily)))
            .is_none());
        assert!(registry.contains("Daily"));
        let factory = registry.build("daily", &settings).expect("custom factory");
        assert_eq!(factory.incoming_window(HOUR).width(), 24 * HOUR);
    }
}
