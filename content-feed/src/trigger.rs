//! When to ask for the next page of a progressively displayed listing.
//!
//! A sentinel element sits after the last rendered item. Whatever observes
//! it (an `IntersectionObserver` in the browser, a terminal pager, a test)
//! reports a [`SentinelEntry`]; [`LoadTrigger`] decides whether that entry
//! warrants a load.

/// Distance from the viewport, in layout units, at which loading starts.
pub const DEFAULT_ROOT_MARGIN: f64 = 400.0;

/// Observation of the boundary sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentinelEntry {
    pub is_intersecting: bool,
    /// Remaining distance between the viewport's bottom edge and the
    /// sentinel; zero or negative once it is on screen.
    pub distance_to_viewport: f64,
}

impl SentinelEntry {
    pub fn visible() -> Self {
        Self {
            is_intersecting: true,
            distance_to_viewport: 0.0,
        }
    }

    pub fn at_distance(distance_to_viewport: f64) -> Self {
        Self {
            is_intersecting: distance_to_viewport <= 0.0,
            distance_to_viewport,
        }
    }

    /// Entry derived from raw scroll metrics, for hosts that only report
    /// scroll position.
    pub fn from_scroll(scroll_top: f64, viewport_height: f64, content_height: f64) -> Self {
        Self::at_distance(content_height - (scroll_top + viewport_height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadTrigger {
    root_margin: f64,
}

impl Default for LoadTrigger {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN,
        }
    }
}

impl LoadTrigger {
    pub fn new(root_margin: f64) -> Self {
        Self {
            root_margin: root_margin.max(0.0),
        }
    }

    pub fn root_margin(&self) -> f64 {
        self.root_margin
    }

    pub fn should_load(&self, entry: SentinelEntry) -> bool {
        entry.is_intersecting || entry.distance_to_viewport <= self.root_margin
    }
}
