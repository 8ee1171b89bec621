//! Widget state manager
//!
//! Owns the navigation and chat flags, scroll position, current section
//! and device class. The nav/chat mutators here are the only writers of
//! the two flags; every mutation is reconciled through a [`View`]
//! immediately.

use folio_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::util::DeviceType;
use crate::view::{FocusTarget, View};

/// Section id used when no section contains the probe point
pub const DEFAULT_SECTION: &str = "home";

/// Observable widget state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    pub is_nav_open: bool,
    pub is_chat_open: bool,
    pub current_section: String,
    pub scroll_position: u32,
    pub device_type: DeviceType,
}

impl WidgetState {
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            is_nav_open: false,
            is_chat_open: false,
            current_section: DEFAULT_SECTION.to_string(),
            scroll_position: 0,
            device_type,
        }
    }
}

/// Scroll offsets past which header and back-to-top change state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollThresholds {
    pub header: u32,
    pub back_to_top: u32,
}

impl Default for ScrollThresholds {
    fn default() -> Self {
        Self {
            header: 50,
            back_to_top: 300,
        }
    }
}

/// State machine for the nav and chat widgets
#[derive(Debug, Clone)]
pub struct StateManager {
    state: WidgetState,
    thresholds: ScrollThresholds,
    scroll_locked: bool,
    /// Control that opened the chat panel
    chat_opener: Option<NodeId>,
}

impl StateManager {
    pub fn new(device_type: DeviceType, thresholds: ScrollThresholds) -> Self {
        Self {
            state: WidgetState::new(device_type),
            thresholds,
            scroll_locked: false,
            chat_opener: None,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn toggle_nav(&mut self, view: &mut dyn View) {
        if self.state.is_nav_open {
            self.close_nav(view);
        } else {
            self.open_nav(view);
        }
    }

    /// Open the nav; the page scroll is locked only on mobile.
    pub fn open_nav(&mut self, view: &mut dyn View) {
        self.state.is_nav_open = true;
        view.set_nav_open(true);
        if self.state.device_type == DeviceType::Mobile && !self.scroll_locked {
            self.scroll_locked = true;
            view.set_scroll_lock(true);
        }
    }

    pub fn close_nav(&mut self, view: &mut dyn View) {
        self.state.is_nav_open = false;
        view.set_nav_open(false);
        if self.scroll_locked {
            self.scroll_locked = false;
            view.set_scroll_lock(false);
        }
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    pub fn toggle_chat(&mut self, view: &mut dyn View, opener: Option<NodeId>) {
        if self.state.is_chat_open {
            self.close_chat(view);
        } else {
            self.open_chat(view, opener);
        }
    }

    /// Open the chat panel. Returns true if it was closed before.
    ///
    /// Focusing the first field is deferred; the caller schedules it.
    pub fn open_chat(&mut self, view: &mut dyn View, opener: Option<NodeId>) -> bool {
        let changed = !self.state.is_chat_open;
        self.state.is_chat_open = true;
        view.set_chat_open(true);
        if changed {
            self.chat_opener = opener;
        }
        changed
    }

    /// Close the chat panel and hand focus back to whatever opened it.
    /// Returns true if it was open before.
    pub fn close_chat(&mut self, view: &mut dyn View) -> bool {
        let changed = self.state.is_chat_open;
        self.state.is_chat_open = false;
        view.set_chat_open(false);
        if changed {
            let target = self
                .chat_opener
                .take()
                .map_or(FocusTarget::ChatToggle, FocusTarget::Node);
            if !view.focus(target) && target != FocusTarget::ChatToggle {
                view.focus(FocusTarget::ChatToggle);
            }
        }
        changed
    }

    // ------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------

    /// Record a new device class. Leaving mobile forces the nav closed.
    pub fn set_device_type(&mut self, view: &mut dyn View, device_type: DeviceType) {
        if self.state.device_type != device_type {
            tracing::debug!("Device type: {} -> {}", self.state.device_type, device_type);
        }
        self.state.device_type = device_type;
        view.set_device_type(device_type);
        if device_type != DeviceType::Mobile && self.state.is_nav_open {
            self.close_nav(view);
        }
    }

    pub fn set_scroll_position(&mut self, view: &mut dyn View, position: u32) {
        self.state.scroll_position = position;
        view.set_header_scrolled(position > self.thresholds.header);
        view.set_back_to_top_visible(position > self.thresholds.back_to_top);
    }

    /// Record the active section. Returns true if it changed.
    pub fn set_current_section(&mut self, view: &mut dyn View, id: &str) -> bool {
        let changed = self.state.current_section != id;
        if changed {
            self.state.current_section = id.to_string();
        }
        view.set_active_section(id);
        changed
    }

    /// Drop the scroll lock on teardown, leaving the nav flag as is
    pub fn release_scroll_lock(&mut self, view: &mut dyn View) {
        if self.scroll_locked {
            self.scroll_locked = false;
            view.set_scroll_lock(false);
        }
    }

    /// Project the whole state onto `view`
    pub fn sync(&self, view: &mut dyn View) {
        view.set_device_type(self.state.device_type);
        view.set_nav_open(self.state.is_nav_open);
        view.set_scroll_lock(self.scroll_locked);
        view.set_chat_open(self.state.is_chat_open);
        view.set_active_section(&self.state.current_section);
        view.set_header_scrolled(self.state.scroll_position > self.thresholds.header);
        view.set_back_to_top_visible(self.state.scroll_position > self.thresholds.back_to_top);
    }
}
