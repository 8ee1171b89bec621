//! Listener registry
//!
//! Every listener the behavior layer attaches is recorded here as a
//! `(target, event type, handler)` triple. Dispatch looks handlers up by
//! target and type; teardown drains the registry, after which no event
//! reaches application code.

use folio_dom::{EventTarget, EventType, MediaFeature};

/// Application code a listener runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    NavToggle,
    /// In-page `.nav-link`
    NavLink,
    ChatToggle,
    ChatClose,
    ChatSubmit,
    NewsletterSubmit,
    /// `form[data-validate]` submit
    FormSubmit,
    /// Clears field errors while typing
    FieldInput,
    /// Validates a field when it loses focus
    FieldBlur,
    BackToTop,
    /// `[data-action]` element
    Action,
    /// Outside-click dismissal of the nav
    DocumentClick,
    KeyDown,
    Scroll,
    Resize,
    VisibilityChange,
    ColorSchemeChange,
    ReducedMotionChange,
    ConnectionChange,
    RuntimeError,
    UnhandledRejection,
}

/// Listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub id: u64,
    pub target: EventTarget,
    pub event_type: EventType,
    pub handler: Handler,
}

/// Ordered listener storage
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its id
    pub fn add(&mut self, target: EventTarget, event_type: EventType, handler: Handler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            target,
            event_type,
            handler,
        });
        id
    }

    /// Register a media-query change listener
    pub fn add_media(&mut self, feature: MediaFeature, handler: Handler) -> u64 {
        self.add(EventTarget::MediaQuery(feature), EventType::Change, handler)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    /// Handlers attached to `target` for `event_type`, in registration order
    pub fn matching(&self, target: EventTarget, event_type: EventType) -> Vec<Handler> {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.event_type == event_type)
            .map(|l| l.handler)
            .collect()
    }

    /// Remove and return every listener
    pub fn drain(&mut self) -> Vec<Listener> {
        std::mem::take(&mut self.listeners)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of media-query listeners
    pub fn media_listener_count(&self) -> usize {
        self.listeners
            .iter()
            .filter(|l| matches!(l.target, EventTarget::MediaQuery(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_preserves_order() {
        let mut registry = ListenerRegistry::new();
        registry.add(EventTarget::Window, EventType::Scroll, Handler::Scroll);
        registry.add(EventTarget::Document, EventType::Click, Handler::DocumentClick);
        registry.add(EventTarget::Document, EventType::Click, Handler::Action);

        assert_eq!(
            registry.matching(EventTarget::Document, EventType::Click),
            vec![Handler::DocumentClick, Handler::Action]
        );
        assert!(registry.matching(EventTarget::Window, EventType::Resize).is_empty());
    }

    #[test]
    fn test_remove_and_drain() {
        let mut registry = ListenerRegistry::new();
        let id = registry.add(EventTarget::Window, EventType::Resize, Handler::Resize);
        registry.add_media(MediaFeature::ReducedMotion, Handler::ReducedMotionChange);
        assert_eq!(registry.media_listener_count(), 1);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));

        let drained = registry.drain();
        assert_eq!(drained.len(), 1);
        assert!(registry.is_empty());
    }
}
