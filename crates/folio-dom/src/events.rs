//! DOM Events
//!
//! UI, window and media-query events delivered to the behavior layer.

use crate::NodeId;

/// Event types the host delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Submit,
    Input,
    Blur,
    KeyDown,
    Scroll,
    Resize,
    VisibilityChange,
    /// Media-query or connection change
    Change,
    Error,
    UnhandledRejection,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Input => "input",
            Self::Blur => "blur",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::VisibilityChange => "visibilitychange",
            Self::Change => "change",
            Self::Error => "error",
            Self::UnhandledRejection => "unhandledrejection",
        }
    }

    /// Whether events of this type propagate from a node up to the window
    pub fn bubbles(&self) -> bool {
        matches!(self, Self::Click | Self::Submit | Self::Input | Self::KeyDown)
    }
}

/// Media features the page can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFeature {
    /// `(prefers-color-scheme: dark)`
    ColorScheme,
    /// `(prefers-reduced-motion: reduce)`
    ReducedMotion,
}

impl MediaFeature {
    pub fn query(&self) -> &'static str {
        match self {
            Self::ColorScheme => "(prefers-color-scheme: dark)",
            Self::ReducedMotion => "(prefers-reduced-motion: reduce)",
        }
    }
}

/// Anything a listener can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Document,
    Node(NodeId),
    MediaQuery(MediaFeature),
    /// `navigator.connection`
    Connection,
}

impl EventTarget {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }
}

/// Dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub target: EventTarget,
    /// `key` for keyboard events
    pub key: Option<String>,
    /// Error message / rejection reason
    pub message: Option<String>,
    /// Error stack, when the host has one
    pub stack: Option<String>,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create a plain event
    pub fn new(event_type: EventType, target: EventTarget) -> Self {
        Self {
            event_type,
            target,
            key: None,
            message: None,
            stack: None,
            cancelable: matches!(event_type, EventType::Click | EventType::Submit | EventType::KeyDown),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn click(node: NodeId) -> Self {
        Self::new(EventType::Click, EventTarget::Node(node))
    }

    pub fn submit(form: NodeId) -> Self {
        Self::new(EventType::Submit, EventTarget::Node(form))
    }

    pub fn input(node: NodeId) -> Self {
        Self::new(EventType::Input, EventTarget::Node(node))
    }

    pub fn blur(node: NodeId) -> Self {
        Self::new(EventType::Blur, EventTarget::Node(node))
    }

    /// Keyboard event targeted at the document
    pub fn key_down(key: &str) -> Self {
        let mut event = Self::new(EventType::KeyDown, EventTarget::Document);
        event.key = Some(key.to_string());
        event
    }

    pub fn scroll() -> Self {
        Self::new(EventType::Scroll, EventTarget::Window)
    }

    pub fn resize() -> Self {
        Self::new(EventType::Resize, EventTarget::Window)
    }

    pub fn visibility_change() -> Self {
        Self::new(EventType::VisibilityChange, EventTarget::Document)
    }

    pub fn media_change(feature: MediaFeature) -> Self {
        Self::new(EventType::Change, EventTarget::MediaQuery(feature))
    }

    pub fn connection_change() -> Self {
        Self::new(EventType::Change, EventTarget::Connection)
    }

    /// Uncaught runtime error
    pub fn error(message: &str, stack: Option<&str>) -> Self {
        let mut event = Self::new(EventType::Error, EventTarget::Window);
        event.message = Some(message.to_string());
        event.stack = stack.map(str::to_string);
        event
    }

    /// Unhandled promise rejection
    pub fn unhandled_rejection(reason: &str) -> Self {
        let mut event = Self::new(EventType::UnhandledRejection, EventTarget::Window);
        event.message = Some(reason.to_string());
        event
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut scroll = Event::scroll();
        scroll.prevent_default();
        assert!(!scroll.is_default_prevented());

        let mut submit = Event::submit(NodeId(3));
        submit.prevent_default();
        assert!(submit.is_default_prevented());
    }

    #[test]
    fn test_error_event_payload() {
        let event = Event::error("boom", Some("at chat.send"));
        assert_eq!(event.event_type, EventType::Error);
        assert_eq!(event.target, EventTarget::Window);
        assert_eq!(event.message.as_deref(), Some("boom"));
        assert_eq!(event.stack.as_deref(), Some("at chat.send"));
    }
}
