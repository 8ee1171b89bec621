//! Behavior-layer configuration

use serde::{Deserialize, Serialize};

use crate::util::DeviceType;
use crate::{Error, Result};

/// Feature switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Entrance animations for `[data-animate]`
    pub animations: bool,
    /// Deferred `img[data-src]` loading
    pub lazy_loading: bool,
    /// Register the service worker when the host supports it
    pub service_worker: bool,
    /// Push events into the data layer when present
    pub analytics: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            animations: true,
            lazy_loading: true,
            service_worker: true,
            analytics: true,
        }
    }
}

/// Configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Widths below this are mobile
    pub mobile_breakpoint: u32,
    /// Widths below this (and at least mobile) are tablet
    pub tablet_breakpoint: u32,
    /// Extra offset added to the header height when probing sections
    pub section_offset: u32,
    pub scroll_throttle_ms: u64,
    pub resize_debounce_ms: u64,
    /// Delay before focusing the first chat input after opening
    pub chat_focus_delay_ms: u64,
    pub transport_min_delay_ms: u64,
    pub transport_max_delay_ms: u64,
    /// Seed for the simulated transport; random when unset
    pub transport_seed: Option<u64>,
    pub chat_auto_close_ms: u64,
    pub chat_name_min_len: usize,
    pub chat_message_min_len: usize,
    pub toast_duration_ms: u64,
    /// Exit transition before a dismissed toast leaves the document
    pub toast_exit_ms: u64,
    /// Distance below the viewport at which lazy images start loading
    pub lazy_load_margin_px: u32,
    pub header_scroll_threshold: u32,
    pub back_to_top_threshold: u32,
    pub service_worker_url: String,
    pub features: FeatureFlags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768,
            tablet_breakpoint: 1024,
            section_offset: 20,
            scroll_throttle_ms: 100,
            resize_debounce_ms: 250,
            chat_focus_delay_ms: 300,
            transport_min_delay_ms: 1000,
            transport_max_delay_ms: 2000,
            transport_seed: None,
            chat_auto_close_ms: 3000,
            chat_name_min_len: 2,
            chat_message_min_len: 10,
            toast_duration_ms: 4000,
            toast_exit_ms: 300,
            lazy_load_margin_px: 200,
            header_scroll_threshold: 50,
            back_to_top_threshold: 300,
            service_worker_url: "/sw.js".to_string(),
            features: FeatureFlags::default(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<()> {
        if self.mobile_breakpoint == 0 || self.tablet_breakpoint <= self.mobile_breakpoint {
            return Err(Error::InvalidConfig(format!(
                "breakpoints must satisfy 0 < mobile ({}) < tablet ({})",
                self.mobile_breakpoint, self.tablet_breakpoint
            )));
        }
        if self.transport_min_delay_ms > self.transport_max_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "transport delay range is empty ({}..={})",
                self.transport_min_delay_ms, self.transport_max_delay_ms
            )));
        }
        if self.scroll_throttle_ms == 0 {
            return Err(Error::InvalidConfig("scroll throttle window must be positive".into()));
        }
        if !self.service_worker_url.starts_with('/') {
            return Err(Error::InvalidConfig(format!(
                "service worker URL must be root-relative: {}",
                self.service_worker_url
            )));
        }
        Ok(())
    }

    /// Classify a viewport width with the configured breakpoints
    pub fn device_type(&self, width: u32) -> DeviceType {
        DeviceType::classify(width, self.mobile_breakpoint, self.tablet_breakpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_override() {
        let config = Config::from_json(r#"{"chat_auto_close_ms": 500, "features": {"analytics": false}}"#).unwrap();
        assert_eq!(config.chat_auto_close_ms, 500);
        assert!(!config.features.analytics);
        assert!(config.features.animations);
        assert_eq!(config.mobile_breakpoint, 768);
    }

    #[test]
    fn test_rejects_empty_delay_range() {
        let err = Config::from_json(r#"{"transport_min_delay_ms": 5, "transport_max_delay_ms": 1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_breakpoints() {
        let config = Config {
            tablet_breakpoint: 700,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Config::from_json("{"), Err(Error::ConfigParse(_))));
    }
}
