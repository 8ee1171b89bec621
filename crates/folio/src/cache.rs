//! Element cache
//!
//! One-time lookup of the nodes the behavior layer works with. Built once
//! at startup and never refreshed; nodes added later are invisible here.

use folio_dom::{Document, NodeId};

use crate::Result;

/// Selectors for single-node entries
const HEADER: &str = "#header";
const NAV: &str = "#nav";
const NAV_TOGGLE: &str = "#nav-toggle";
const CHAT_TOGGLE: &str = "#chat-toggle";
const CHAT_PANEL: &str = "#chat-panel";
const CHAT_CLOSE: &str = "#chat-close";
const CHAT_FORM: &str = ".chat-form";
const CHAT_MESSAGES: &str = ".chat-messages";
const CHAT_STATUS: &str = ".chat-status";
const BACK_TO_TOP: &str = "#back-to-top";

/// Selectors for collections
const NAV_LINKS: &str = ".nav-link";
const SECTIONS: &str = "section[id]";
const LAZY_IMAGES: &str = "img[data-src]";
const ANIMATED: &str = "[data-animate]";
const ACTIONS: &str = "[data-action]";
const NEWSLETTER_FORMS: &str = ".newsletter-form";
const VALIDATED_FORMS: &str = "form[data-validate]";

/// Named element lookups
#[derive(Debug, Clone, Default)]
pub struct ElementCache {
    pub header: Option<NodeId>,
    pub nav: Option<NodeId>,
    pub nav_toggle: Option<NodeId>,
    pub chat_toggle: Option<NodeId>,
    pub chat_panel: Option<NodeId>,
    pub chat_close: Option<NodeId>,
    pub chat_form: Option<NodeId>,
    pub chat_messages: Option<NodeId>,
    pub chat_status: Option<NodeId>,
    pub back_to_top: Option<NodeId>,
    pub nav_links: Vec<NodeId>,
    pub sections: Vec<NodeId>,
    pub lazy_images: Vec<NodeId>,
    pub animated: Vec<NodeId>,
    pub actions: Vec<NodeId>,
    pub newsletter_forms: Vec<NodeId>,
    pub validated_forms: Vec<NodeId>,
}

impl ElementCache {
    /// Cache with no entries; every feature depending on it stays disabled
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up every entry, synthesizing the back-to-top control if the
    /// document has none.
    pub fn build(doc: &mut Document) -> Result<Self> {
        let one = |sel: &str| -> Result<Option<NodeId>> { Ok(doc.query_selector(sel)?) };
        let mut cache = Self {
            header: one(HEADER)?,
            nav: one(NAV)?,
            nav_toggle: one(NAV_TOGGLE)?,
            chat_toggle: one(CHAT_TOGGLE)?,
            chat_panel: one(CHAT_PANEL)?,
            chat_close: one(CHAT_CLOSE)?,
            chat_form: one(CHAT_FORM)?,
            chat_messages: one(CHAT_MESSAGES)?,
            chat_status: one(CHAT_STATUS)?,
            back_to_top: one(BACK_TO_TOP)?,
            nav_links: doc.query_selector_all(NAV_LINKS)?,
            sections: doc.query_selector_all(SECTIONS)?,
            lazy_images: doc.query_selector_all(LAZY_IMAGES)?,
            animated: doc.query_selector_all(ANIMATED)?,
            actions: doc.query_selector_all(ACTIONS)?,
            newsletter_forms: doc.query_selector_all(NEWSLETTER_FORMS)?,
            validated_forms: doc.query_selector_all(VALIDATED_FORMS)?,
        };

        if cache.back_to_top.is_none() {
            cache.back_to_top = Some(create_back_to_top(doc));
        }

        for (name, found) in cache.entries() {
            if found == 0 {
                tracing::debug!("Element cache miss: {}", name);
            }
        }
        Ok(cache)
    }

    /// `(logical name, matched node count)` for every entry
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        let one = |n: Option<NodeId>| usize::from(n.is_some());
        vec![
            ("header", one(self.header)),
            ("nav", one(self.nav)),
            ("navToggle", one(self.nav_toggle)),
            ("chatToggle", one(self.chat_toggle)),
            ("chatPanel", one(self.chat_panel)),
            ("chatClose", one(self.chat_close)),
            ("chatForm", one(self.chat_form)),
            ("chatMessages", one(self.chat_messages)),
            ("chatStatus", one(self.chat_status)),
            ("backToTop", one(self.back_to_top)),
            ("navLinks", self.nav_links.len()),
            ("sections", self.sections.len()),
            ("lazyImages", self.lazy_images.len()),
            ("animated", self.animated.len()),
            ("actions", self.actions.len()),
            ("newsletterForms", self.newsletter_forms.len()),
            ("validatedForms", self.validated_forms.len()),
        ]
    }
}

fn create_back_to_top(doc: &mut Document) -> NodeId {
    let body = doc.body();
    let button = doc
        .build("button")
        .id("back-to-top")
        .class("back-to-top")
        .attr("type", "button")
        .attr("aria-label", "Back to top")
        .attr("aria-hidden", "true")
        .text("\u{2191}")
        .append_to(body);
    tracing::debug!("Synthesized back-to-top control");
    button
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesizes_back_to_top_once() {
        let mut doc = Document::new("https://example.com/");
        let first = ElementCache::build(&mut doc).unwrap();
        let button = first.back_to_top.unwrap();
        assert_eq!(doc.get_element_by_id("back-to-top"), Some(button));
        assert_eq!(doc.attribute(button, "aria-label").as_deref(), Some("Back to top"));

        let second = ElementCache::build(&mut doc).unwrap();
        assert_eq!(second.back_to_top, Some(button));
        assert_eq!(doc.query_selector_all("#back-to-top").unwrap().len(), 1);
    }

    #[test]
    fn test_misses_are_empty() {
        let mut doc = Document::new("https://example.com/");
        let cache = ElementCache::build(&mut doc).unwrap();
        assert!(cache.nav.is_none());
        assert!(cache.sections.is_empty());
        let entries = cache.entries();
        assert!(entries.contains(&("backToTop", 1)));
        assert!(entries.contains(&("nav", 0)));
    }

    #[test]
    fn test_collections_in_document_order() {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        let home = doc.build("section").id("home").append_to(body);
        doc.build("section").append_to(body);
        let about = doc.build("section").id("about").append_to(body);

        let cache = ElementCache::build(&mut doc).unwrap();
        assert_eq!(cache.sections, vec![home, about]);
    }
}
