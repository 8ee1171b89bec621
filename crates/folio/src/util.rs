//! Utility helpers
//!
//! Stateless checks shared across the behavior layer plus the debounce and
//! throttle wrappers around the scheduler.

use std::fmt;
use std::sync::LazyLock;

use folio_dom::{DOMRect, MediaFeature, Window};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scheduler::{Scheduler, Task, TaskHandle};

/// Default mobile breakpoint (px)
pub const MOBILE_BREAKPOINT: u32 = 768;
/// Default tablet breakpoint (px)
pub const TABLET_BREAKPOINT: u32 = 1024;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Device class derived from viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceType {
    /// Classify `width` against explicit breakpoints
    pub fn classify(width: u32, mobile_breakpoint: u32, tablet_breakpoint: u32) -> Self {
        if width < mobile_breakpoint {
            Self::Mobile
        } else if width < tablet_breakpoint {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a viewport width with the default breakpoints
pub fn device_type(width: u32) -> DeviceType {
    DeviceType::classify(width, MOBILE_BREAKPOINT, TABLET_BREAKPOINT)
}

/// `local@domain.tld` format check
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Whether any part of `rect` lies within the viewport grown by `margin`
pub fn is_in_viewport(rect: &DOMRect, viewport: &DOMRect, margin: f64) -> bool {
    rect.touches(&viewport.expanded(margin))
}

/// Read a media feature, treating hosts without `matchMedia` as "no preference"
pub fn media_matches(window: &Window, feature: MediaFeature) -> bool {
    window.features.match_media && window.match_media(feature.query())
}

pub fn prefers_reduced_motion(window: &Window) -> bool {
    media_matches(window, MediaFeature::ReducedMotion)
}

pub fn prefers_dark_scheme(window: &Window) -> bool {
    media_matches(window, MediaFeature::ColorScheme)
}

/// Trailing-edge debounce: each trigger cancels the pending task and
/// re-arms the quiet window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    pending: Option<TaskHandle>,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn trigger(&mut self, scheduler: &mut Scheduler, task: Task) -> TaskHandle {
        self.cancel(scheduler);
        let handle = scheduler.schedule(self.window_ms, task);
        self.pending = Some(handle);
        handle
    }

    /// Forget the pending handle once its task has run
    pub fn settle(&mut self) {
        self.pending = None;
    }

    pub fn cancel(&mut self, scheduler: &mut Scheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Throttle admitting at most one call per window. The first call of a
/// window runs at once; callers use [`Throttle::remaining`] to schedule a
/// trailing run for calls rejected inside the window.
#[derive(Debug, Clone)]
pub struct Throttle {
    window_ms: u64,
    last: Option<u64>,
}

impl Throttle {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms, last: None }
    }

    /// Returns true if a call at `now` may run
    pub fn admit(&mut self, now: u64) -> bool {
        match self.last {
            Some(last) if now < last + self.window_ms => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Time left in the current window at `now`, zero once it has elapsed
    pub fn remaining(&self, now: u64) -> u64 {
        self.last
            .map_or(0, |last| (last + self.window_ms).saturating_sub(now))
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_boundaries() {
        assert_eq!(device_type(0), DeviceType::Mobile);
        assert_eq!(device_type(767), DeviceType::Mobile);
        assert_eq!(device_type(768), DeviceType::Tablet);
        assert_eq!(device_type(1023), DeviceType::Tablet);
        assert_eq!(device_type(1024), DeviceType::Desktop);
    }

    #[test]
    fn test_throttle_remaining_window() {
        let mut throttle = Throttle::new(100);
        assert_eq!(throttle.remaining(0), 0);
        assert!(throttle.admit(10));
        assert_eq!(throttle.remaining(40), 70);
        assert_eq!(throttle.remaining(110), 0);
        assert_eq!(throttle.remaining(500), 0);
    }

    #[test]
    fn test_validate_email_examples() {
        assert!(validate_email("a@b.co"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.co"));
        assert!(!validate_email("a@@b.co"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_is_in_viewport_with_margin() {
        let viewport = DOMRect::from_xywh(0.0, 1000.0, 800.0, 600.0);
        let below = DOMRect::from_xywh(0.0, 1700.0, 100.0, 100.0);
        assert!(!is_in_viewport(&below, &viewport, 0.0));
        assert!(is_in_viewport(&below, &viewport, 200.0));
    }

    #[test]
    fn test_media_reads_require_match_media() {
        let mut window = Window::new("https://example.com/");
        window.media.reduced_motion = true;
        assert!(prefers_reduced_motion(&window));
        window.features.match_media = false;
        assert!(!prefers_reduced_motion(&window));
    }

    #[test]
    fn test_throttle_window() {
        let mut throttle = Throttle::new(100);
        assert!(throttle.admit(0));
        assert!(!throttle.admit(50));
        assert!(!throttle.admit(99));
        assert!(throttle.admit(100));
    }

    #[test]
    fn test_debounce_cancels_previous() {
        let mut scheduler = Scheduler::new();
        let mut debouncer = Debouncer::new(250);

        let first = debouncer.trigger(&mut scheduler, Task::ResizeSettled);
        scheduler.advance(100);
        let second = debouncer.trigger(&mut scheduler, Task::ResizeSettled);

        assert!(!scheduler.is_pending(first));
        assert!(scheduler.is_pending(second));
        assert_eq!(scheduler.len(), 1);
    }
}
