//! Document - High-level document API

use crate::{DOMRect, DomError, DomTree, ElementData, Event, EventTarget, NodeId, Selector};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    /// Focused element
    active_element: Option<NodeId>,
}

impl Document {
    /// Create a document with the `<html><head><body>` skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            active_element: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Start building an element
    pub fn build(&mut self, tag: &str) -> ElementBuilder<'_> {
        let id = self.tree.create_element(tag);
        ElementBuilder { doc: self, node: id }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.tree.append_child(parent, child);
    }

    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) {
        self.tree.insert_after(reference, child);
    }

    /// Remove a node from the document; focus inside it is dropped
    pub fn remove(&mut self, node: NodeId) {
        self.tree.detach(node);
        if let Some(active) = self.active_element {
            if self.tree.is_inclusive_descendant(active, node) {
                self.active_element = None;
            }
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.tree.get(node).and_then(|n| n.as_element())
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.tree.get_mut(node).and_then(|n| n.as_element_mut())
    }

    /// Lower-case tag name
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.element(n).and_then(|e| e.id()) == Some(id))
    }

    /// First connected element matching `selector`, in document order
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// All connected elements matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.query_selector_all_within(self.tree.root(), selector)
    }

    /// Matching descendants of `root`
    pub fn query_selector_all_within(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .tree
            .descendants(root)
            .into_iter()
            .filter(|&n| selector.matches(&self.tree, n))
            .collect())
    }

    pub fn query_selector_within(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all_within(root, selector)?.into_iter().next())
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .find(|&n| selector.matches(&self.tree, n)))
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, DomError> {
        Ok(Selector::parse(selector)?.matches(&self.tree, node))
    }

    // ------------------------------------------------------------------
    // Attributes, classes, style
    // ------------------------------------------------------------------

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let elem = self.element(node)?;
        if name == "class" {
            return (!elem.classes.is_empty()).then(|| elem.classes.value());
        }
        elem.attr(name).map(str::to_string)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute. Returns true if the document changed.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.set_attr(name, value))
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.remove_attr(name))
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.classes.contains(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.classes.add(class))
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.classes.remove(class))
    }

    /// Force a class on or off
    pub fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if let Some(e) = self.element_mut(node) {
            e.classes.toggle(class, Some(on));
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.element(node)?.style(property).map(str::to_string)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(e) = self.element_mut(node) {
            e.set_style(property, value);
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.remove_style(property))
    }

    // ------------------------------------------------------------------
    // Content, values, geometry
    // ------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree
            .descendants(node)
            .into_iter()
            .filter_map(|n| self.tree.get(n).and_then(|n| n.as_text()))
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        let children: Vec<NodeId> = self.tree.children(node).collect();
        for child in children {
            self.remove(child);
        }
        if !text.is_empty() {
            let text_node = self.tree.create_text(text);
            self.tree.append_child(node, text_node);
        }
    }

    /// Form-control value
    pub fn value(&self, node: NodeId) -> String {
        self.element(node).map(|e| e.value.clone()).unwrap_or_default()
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(e) = self.element_mut(node) {
            e.value = value.to_string();
        }
    }

    /// Layout box in document coordinates
    pub fn rect(&self, node: NodeId) -> DOMRect {
        self.element(node).map(|e| e.rect).unwrap_or_default()
    }

    pub fn set_rect(&mut self, node: NodeId, rect: DOMRect) {
        if let Some(e) = self.element_mut(node) {
            e.rect = rect;
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Focus a connected element. Disabled controls refuse focus.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_connected(node) || self.element(node).is_none() || self.has_attribute(node, "disabled") {
            return false;
        }
        self.active_element = Some(node);
        true
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Targets an event visits, innermost first.
    ///
    /// Node events that bubble walk the ancestor chain, then the document
    /// and the window. Non-bubbling events only visit their target.
    pub fn event_path(&self, event: &Event) -> Vec<EventTarget> {
        match event.target {
            EventTarget::Node(node) if event.event_type.bubbles() => {
                let mut path: Vec<EventTarget> = std::iter::once(node)
                    .chain(self.tree.ancestors(node))
                    .filter(|&n| n != self.tree.root())
                    .map(EventTarget::Node)
                    .collect();
                if self.is_connected(node) {
                    path.push(EventTarget::Document);
                    path.push(EventTarget::Window);
                }
                path
            }
            EventTarget::Document if event.event_type.bubbles() => {
                vec![EventTarget::Document, EventTarget::Window]
            }
            target => vec![target],
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

/// Fluent element construction
pub struct ElementBuilder<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl ElementBuilder<'_> {
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.doc.add_class(self.node, class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.doc.set_attribute(self.node, name, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.doc.set_text_content(self.node, text);
        self
    }

    pub fn value(self, value: &str) -> Self {
        self.doc.set_value(self.node, value);
        self
    }

    pub fn rect(self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.doc.set_rect(self.node, DOMRect::from_xywh(x, y, width, height));
        self
    }

    /// Append under `parent` and return the new node
    pub fn append_to(self, parent: NodeId) -> NodeId {
        self.doc.append_child(parent, self.node);
        self.node
    }

    /// Return the node without attaching it
    pub fn finish(self) -> NodeId {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventType;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        let nav = doc.build("nav").id("nav").class("site-nav").append_to(body);
        let link = doc
            .build("a")
            .class("nav-link")
            .attr("href", "#about")
            .text("About")
            .append_to(nav);
        let span = doc.build("span").text("icon").append_to(link);
        (doc, nav, link, span)
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        let (mut doc, nav, _, _) = sample();
        assert_eq!(doc.get_element_by_id("nav"), Some(nav));
        doc.remove(nav);
        assert_eq!(doc.get_element_by_id("nav"), None);
    }

    #[test]
    fn test_query_selectors() {
        let (doc, nav, link, _) = sample();
        assert_eq!(doc.query_selector("#nav").unwrap(), Some(nav));
        assert_eq!(doc.query_selector("a[href^=\"#\"]").unwrap(), Some(link));
        assert_eq!(doc.query_selector("#nav .nav-link").unwrap(), Some(link));
        assert_eq!(doc.query_selector("footer .nav-link").unwrap(), None);
        assert_eq!(doc.query_selector_all("nav, a").unwrap(), vec![nav, link]);
        assert!(doc.query_selector("nav >").is_err());
    }

    #[test]
    fn test_closest() {
        let (doc, nav, link, span) = sample();
        assert_eq!(doc.closest(span, ".nav-link").unwrap(), Some(link));
        assert_eq!(doc.closest(span, "#nav").unwrap(), Some(nav));
        assert_eq!(doc.closest(span, "form").unwrap(), None);
    }

    #[test]
    fn test_text_content() {
        let (mut doc, _, link, _) = sample();
        assert_eq!(doc.text_content(link), "Abouticon");
        doc.set_text_content(link, "Team");
        assert_eq!(doc.text_content(link), "Team");
    }

    #[test]
    fn test_focus_rules() {
        let (mut doc, _, link, _) = sample();
        let body = doc.body();
        let button = doc.build("button").attr("disabled", "").append_to(body);
        let detached = doc.create_element("input");

        assert!(doc.focus(link));
        assert!(!doc.focus(button));
        assert!(!doc.focus(detached));
        assert_eq!(doc.active_element(), Some(link));

        doc.remove(link);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_event_path_bubbles_to_window() {
        let (doc, nav, link, span) = sample();
        let path = doc.event_path(&Event::click(span));
        assert_eq!(path[0], EventTarget::Node(span));
        assert_eq!(path[1], EventTarget::Node(link));
        assert_eq!(path[2], EventTarget::Node(nav));
        assert_eq!(path.last(), Some(&EventTarget::Window));

        let blur = Event::blur(span);
        assert_eq!(blur.event_type, EventType::Blur);
        assert_eq!(doc.event_path(&blur), vec![EventTarget::Node(span)]);
    }
}
