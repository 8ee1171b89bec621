//! View boundary
//!
//! The state manager projects widget state through this trait and never
//! touches markup itself. `DomView` is the projection onto the live
//! document; every method is idempotent.

use folio_dom::{Document, NodeId};

use crate::cache::ElementCache;
use crate::util::DeviceType;

/// Where focus should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// First field of the chat form
    ChatInput,
    /// The chat toggle button
    ChatToggle,
    /// A specific control (e.g. the one that opened a panel)
    Node(NodeId),
}

/// Reconciliation surface for widget state
pub trait View {
    fn set_nav_open(&mut self, open: bool);
    fn set_scroll_lock(&mut self, locked: bool);
    fn set_chat_open(&mut self, open: bool);
    fn set_active_section(&mut self, id: &str);
    fn set_device_type(&mut self, device: DeviceType);
    fn set_header_scrolled(&mut self, scrolled: bool);
    fn set_back_to_top_visible(&mut self, visible: bool);
    /// Returns false if the target could not take focus
    fn focus(&mut self, target: FocusTarget) -> bool;
}

/// View over the live document
pub struct DomView<'a> {
    doc: &'a mut Document,
    cache: &'a ElementCache,
}

impl<'a> DomView<'a> {
    pub fn new(doc: &'a mut Document, cache: &'a ElementCache) -> Self {
        Self { doc, cache }
    }

    fn set_flag(&mut self, node: Option<NodeId>, class: &str, on: bool) {
        if let Some(node) = node {
            self.doc.set_class(node, class, on);
        }
    }

    fn set_bool_attr(&mut self, node: Option<NodeId>, name: &str, value: bool) {
        if let Some(node) = node {
            self.doc.set_attribute(node, name, if value { "true" } else { "false" });
        }
    }
}

impl View for DomView<'_> {
    fn set_nav_open(&mut self, open: bool) {
        self.set_flag(self.cache.nav, "open", open);
        self.set_flag(self.cache.nav_toggle, "active", open);
        self.set_bool_attr(self.cache.nav_toggle, "aria-expanded", open);
        let body = self.doc.body();
        self.doc.set_class(body, "nav-open", open);
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        let body = self.doc.body();
        if locked {
            self.doc.set_style(body, "overflow", "hidden");
        } else {
            self.doc.remove_style(body, "overflow");
        }
    }

    fn set_chat_open(&mut self, open: bool) {
        self.set_flag(self.cache.chat_panel, "open", open);
        self.set_bool_attr(self.cache.chat_panel, "aria-hidden", !open);
        self.set_flag(self.cache.chat_toggle, "active", open);
        self.set_bool_attr(self.cache.chat_toggle, "aria-expanded", open);
        let body = self.doc.body();
        self.doc.set_class(body, "chat-open", open);
    }

    fn set_active_section(&mut self, id: &str) {
        let target = format!("#{id}");
        for &link in &self.cache.nav_links {
            let active = self.doc.attribute(link, "href").as_deref() == Some(target.as_str());
            self.doc.set_class(link, "active", active);
            if active {
                self.doc.set_attribute(link, "aria-current", "page");
            } else {
                self.doc.remove_attribute(link, "aria-current");
            }
        }
    }

    fn set_device_type(&mut self, device: DeviceType) {
        let root = self.doc.document_element();
        self.doc.set_attribute(root, "data-device", device.as_str());
    }

    fn set_header_scrolled(&mut self, scrolled: bool) {
        self.set_flag(self.cache.header, "scrolled", scrolled);
    }

    fn set_back_to_top_visible(&mut self, visible: bool) {
        self.set_flag(self.cache.back_to_top, "visible", visible);
        self.set_bool_attr(self.cache.back_to_top, "aria-hidden", !visible);
    }

    fn focus(&mut self, target: FocusTarget) -> bool {
        let node = match target {
            FocusTarget::ChatInput => self
                .cache
                .chat_form
                .and_then(|form| self.doc.query_selector_within(form, "input, textarea").ok().flatten()),
            FocusTarget::ChatToggle => self.cache.chat_toggle,
            FocusTarget::Node(node) => Some(node),
        };
        node.is_some_and(|node| self.doc.focus(node))
    }
}

/// View that records calls, for exercising the state manager without a document
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingView {
    pub calls: Vec<String>,
    pub focus_ok: bool,
}

#[cfg(test)]
impl View for RecordingView {
    fn set_nav_open(&mut self, open: bool) {
        self.calls.push(format!("nav:{open}"));
    }

    fn set_scroll_lock(&mut self, locked: bool) {
        self.calls.push(format!("lock:{locked}"));
    }

    fn set_chat_open(&mut self, open: bool) {
        self.calls.push(format!("chat:{open}"));
    }

    fn set_active_section(&mut self, id: &str) {
        self.calls.push(format!("section:{id}"));
    }

    fn set_device_type(&mut self, device: DeviceType) {
        self.calls.push(format!("device:{device}"));
    }

    fn set_header_scrolled(&mut self, scrolled: bool) {
        self.calls.push(format!("header:{scrolled}"));
    }

    fn set_back_to_top_visible(&mut self, visible: bool) {
        self.calls.push(format!("top:{visible}"));
    }

    fn focus(&mut self, target: FocusTarget) -> bool {
        self.calls.push(format!("focus:{target:?}"));
        self.focus_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, ElementCache) {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        doc.build("header").id("header").append_to(body);
        let nav = doc.build("nav").id("nav").append_to(body);
        doc.build("a").class("nav-link").attr("href", "#home").append_to(nav);
        doc.build("a").class("nav-link").attr("href", "#about").append_to(nav);
        doc.build("button").id("nav-toggle").append_to(body);
        doc.build("button").id("chat-toggle").append_to(body);
        let panel = doc.build("div").id("chat-panel").append_to(body);
        let form = doc.build("form").class("chat-form").append_to(panel);
        doc.build("input").attr("name", "name").append_to(form);
        let cache = ElementCache::build(&mut doc).unwrap();
        (doc, cache)
    }

    #[test]
    fn test_nav_reconciliation_is_idempotent() {
        let (mut doc, cache) = page();
        let toggle = cache.nav_toggle.unwrap();
        {
            let mut view = DomView::new(&mut doc, &cache);
            view.set_nav_open(true);
            view.set_nav_open(true);
        }
        assert_eq!(doc.attribute(cache.nav.unwrap(), "class").as_deref(), Some("open"));
        assert_eq!(doc.attribute(toggle, "aria-expanded").as_deref(), Some("true"));
        let before = doc.tree().len();
        DomView::new(&mut doc, &cache).set_nav_open(true);
        assert_eq!(doc.tree().len(), before);
    }

    #[test]
    fn test_active_section_marks_single_link() {
        let (mut doc, cache) = page();
        DomView::new(&mut doc, &cache).set_active_section("about");
        let (home, about) = (cache.nav_links[0], cache.nav_links[1]);
        assert!(doc.has_class(about, "active"));
        assert_eq!(doc.attribute(about, "aria-current").as_deref(), Some("page"));
        assert!(!doc.has_class(home, "active"));

        DomView::new(&mut doc, &cache).set_active_section("home");
        assert!(doc.has_class(home, "active"));
        assert!(doc.attribute(about, "aria-current").is_none());
    }

    #[test]
    fn test_focus_chat_input() {
        let (mut doc, cache) = page();
        assert!(DomView::new(&mut doc, &cache).focus(FocusTarget::ChatInput));
        let focused = doc.active_element().unwrap();
        assert_eq!(doc.tag_name(focused), Some("input"));
    }

    #[test]
    fn test_scroll_lock() {
        let (mut doc, cache) = page();
        let body = doc.body();
        DomView::new(&mut doc, &cache).set_scroll_lock(true);
        assert_eq!(doc.style(body, "overflow").as_deref(), Some("hidden"));
        DomView::new(&mut doc, &cache).set_scroll_lock(false);
        assert!(doc.style(body, "overflow").is_none());
    }
}
