//! Window
//!
//! Viewport, scroll offset, media preferences, network information,
//! history and the optional analytics data layer.

use serde_json::Value;

use crate::{DOMRect, DomError, ScrollBehavior};

/// Color scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// User media preferences (`prefers-*` queries)
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaPreferences {
    pub color_scheme: ColorScheme,
    pub reduced_motion: bool,
}

/// Effective connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectiveType {
    Slow2G,
    TwoG,
    ThreeG,
    #[default]
    FourG,
}

impl EffectiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow2G => "slow-2g",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
        }
    }
}

/// Network information (`navigator.connection`)
#[derive(Debug, Clone)]
pub struct NetworkInformation {
    pub effective_type: EffectiveType,
    /// Mbps
    pub downlink: f64,
    /// Round-trip time in ms
    pub rtt: u32,
    pub save_data: bool,
}

impl Default for NetworkInformation {
    fn default() -> Self {
        Self {
            effective_type: EffectiveType::FourG,
            downlink: 10.0,
            rtt: 50,
            save_data: false,
        }
    }
}

impl NetworkInformation {
    /// Estimate effective type from RTT and downlink
    pub fn estimate_effective_type(&self) -> EffectiveType {
        if self.rtt >= 2000 || self.downlink < 0.05 {
            EffectiveType::Slow2G
        } else if self.rtt >= 1400 || self.downlink < 0.07 {
            EffectiveType::TwoG
        } else if self.rtt >= 270 || self.downlink < 1.5 {
            EffectiveType::ThreeG
        } else {
            EffectiveType::FourG
        }
    }
}

/// Document visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
}

/// Platform features the host exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFeatures {
    pub intersection_observer: bool,
    pub match_media: bool,
    pub service_worker: bool,
    pub smooth_scroll: bool,
}

impl Default for WindowFeatures {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            match_media: true,
            service_worker: true,
            smooth_scroll: true,
        }
    }
}

impl WindowFeatures {
    /// A host exposing none of the optional APIs
    pub fn legacy() -> Self {
        Self {
            intersection_observer: false,
            match_media: false,
            service_worker: false,
            smooth_scroll: false,
        }
    }
}

/// Session history
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    pub fn new(url: &str) -> Self {
        Self {
            entries: vec![url.to_string()],
            index: 0,
        }
    }

    /// Push an entry, dropping any forward entries
    pub fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url.to_string());
        self.index = self.entries.len() - 1;
    }

    /// Replace the current entry
    pub fn replace(&mut self, url: &str) {
        self.entries[self.index] = url.to_string();
    }

    /// Step back; returns the new current URL
    pub fn back(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].as_str())
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Service worker registrations
#[derive(Debug, Clone, Default)]
pub struct ServiceWorkerContainer {
    registrations: Vec<String>,
    /// When set, every registration fails with this reason
    pub unavailable: Option<String>,
}

impl ServiceWorkerContainer {
    pub fn register(&mut self, url: &str) -> Result<(), DomError> {
        if let Some(reason) = &self.unavailable {
            return Err(DomError::ServiceWorker {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        if !self.registrations.iter().any(|r| r == url) {
            tracing::debug!("Service worker registered: {}", url);
            self.registrations.push(url.to_string());
        }
        Ok(())
    }

    pub fn registrations(&self) -> &[String] {
        &self.registrations
    }
}

/// Browser window hosting the document
#[derive(Debug, Clone)]
pub struct Window {
    pub inner_width: u32,
    pub inner_height: u32,
    scroll_y: f64,
    last_scroll_behavior: ScrollBehavior,
    pub media: MediaPreferences,
    /// `None` when the host lacks the network information API
    pub network: Option<NetworkInformation>,
    pub visibility: VisibilityState,
    pub features: WindowFeatures,
    pub history: History,
    /// Analytics sink (`window.dataLayer`); absent unless a tag manager installed it
    pub data_layer: Option<Vec<Value>>,
    pub service_workers: ServiceWorkerContainer,
}

impl Window {
    /// Desktop-sized window at the top of the page
    pub fn new(url: &str) -> Self {
        Self {
            inner_width: 1280,
            inner_height: 800,
            scroll_y: 0.0,
            last_scroll_behavior: ScrollBehavior::Auto,
            media: MediaPreferences::default(),
            network: Some(NetworkInformation::default()),
            visibility: VisibilityState::Visible,
            features: WindowFeatures::default(),
            history: History::new(url),
            data_layer: None,
            service_workers: ServiceWorkerContainer::default(),
        }
    }

    /// Current location (top of the history stack)
    pub fn location(&self) -> &str {
        self.history.current()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.inner_width = width;
        self.inner_height = height;
    }

    /// Vertical scroll offset (`window.scrollY`)
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: f64, behavior: ScrollBehavior) {
        self.scroll_y = y.max(0.0);
        self.last_scroll_behavior = behavior;
    }

    pub fn last_scroll_behavior(&self) -> ScrollBehavior {
        self.last_scroll_behavior
    }

    /// Visible area in document coordinates
    pub fn viewport(&self) -> DOMRect {
        DOMRect::from_xywh(
            0.0,
            self.scroll_y,
            self.inner_width as f64,
            self.inner_height as f64,
        )
    }

    /// Evaluate a media query against the window.
    ///
    /// Understands `prefers-color-scheme`, `prefers-reduced-motion`,
    /// `min-width` and `max-width`, joined with `and`. Anything else is
    /// reported as not matching.
    pub fn match_media(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let mut matched_any = false;
        for condition in query.split(" and ") {
            let condition = condition.trim().trim_start_matches('(').trim_end_matches(')');
            let Some((feature, value)) = condition.split_once(':') else {
                return false;
            };
            let value = value.trim();
            let ok = match feature.trim() {
                "prefers-color-scheme" => match value {
                    "dark" => self.media.color_scheme == ColorScheme::Dark,
                    "light" => self.media.color_scheme == ColorScheme::Light,
                    _ => false,
                },
                "prefers-reduced-motion" => match value {
                    "reduce" => self.media.reduced_motion,
                    "no-preference" => !self.media.reduced_motion,
                    _ => false,
                },
                "min-width" => parse_px(value).is_some_and(|px| self.inner_width as f64 >= px),
                "max-width" => parse_px(value).is_some_and(|px| self.inner_width as f64 <= px),
                _ => false,
            };
            if !ok {
                return false;
            }
            matched_any = true;
        }
        matched_any
    }

    /// Push a value into the data layer, if one is installed
    pub fn push_data_layer(&mut self, value: Value) -> bool {
        match &mut self.data_layer {
            Some(layer) => {
                layer.push(value);
                true
            }
            None => false,
        }
    }
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_media_preferences() {
        let mut window = Window::new("https://example.com/");
        assert!(!window.match_media("(prefers-color-scheme: dark)"));
        assert!(window.match_media("(prefers-reduced-motion: no-preference)"));

        window.media.color_scheme = ColorScheme::Dark;
        window.media.reduced_motion = true;
        assert!(window.match_media("(prefers-color-scheme: dark)"));
        assert!(window.match_media("(prefers-reduced-motion: reduce)"));
    }

    #[test]
    fn test_match_media_widths() {
        let mut window = Window::new("https://example.com/");
        window.resize(700, 900);
        assert!(window.match_media("(max-width: 767px)"));
        assert!(!window.match_media("(min-width: 768px)"));
        assert!(window.match_media("(min-width: 320px) and (max-width: 767px)"));
        assert!(!window.match_media("(orientation: portrait)"));
    }

    #[test]
    fn test_scroll_clamps_at_zero() {
        let mut window = Window::new("https://example.com/");
        window.scroll_to(-40.0, ScrollBehavior::Smooth);
        assert_eq!(window.scroll_y(), 0.0);
        assert_eq!(window.last_scroll_behavior(), ScrollBehavior::Smooth);
    }

    #[test]
    fn test_history_push_truncates_forward() {
        let mut history = History::new("/a");
        history.push("/b");
        history.push("/c");
        assert_eq!(history.back(), Some("/b"));
        history.push("/d");
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), "/d");
    }

    #[test]
    fn test_data_layer_is_optional() {
        let mut window = Window::new("https://example.com/");
        assert!(!window.push_data_layer(serde_json::json!({"event": "x"})));
        window.data_layer = Some(Vec::new());
        assert!(window.push_data_layer(serde_json::json!({"event": "x"})));
    }

    #[test]
    fn test_effective_type_estimate() {
        let slow = NetworkInformation { rtt: 2500, ..Default::default() };
        assert_eq!(slow.estimate_effective_type(), EffectiveType::Slow2G);
        assert_eq!(NetworkInformation::default().estimate_effective_type(), EffectiveType::FourG);
    }
}
