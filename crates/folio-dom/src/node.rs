//! DOM Node
//!
//! Nodes link to each other through `NodeId`s into the tree arena; element
//! payloads carry the attributes, class list, inline style, form value and
//! layout box the behavior layer reads and writes.

use crate::{ClassList, DOMRect, NodeId};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lower-case tag name
    pub tag: String,
    /// Class list (the `class` attribute)
    pub classes: ClassList,
    /// Remaining attributes, in insertion order
    attrs: Vec<(String, String)>,
    /// Inline style declarations
    style: Vec<(String, String)>,
    /// Current form-control value
    pub value: String,
    /// Layout box in document coordinates
    pub rect: DOMRect,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: ClassList::new(),
            attrs: Vec::new(),
            style: Vec::new(),
            value: String::new(),
            rect: DOMRect::default(),
        }
    }

    /// The `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Get an attribute value (`class` is served from the class list by `Document`)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute. Returns true if the stored value changed.
    pub fn set_attr(&mut self, name: &str, value: &str) -> bool {
        if name == "class" {
            let parsed = ClassList::parse(value);
            let changed = parsed != self.classes;
            self.classes = parsed;
            return changed;
        }
        if let Some((_, existing)) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            if existing == value {
                return false;
            }
            *existing = value.to_string();
            return true;
        }
        self.attrs.push((name.to_string(), value.to_string()));
        true
    }

    /// Remove an attribute. Returns true if it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(n, _)| n != name);
        before != self.attrs.len()
    }

    pub fn has_attr(&self, name: &str) -> bool {
        (name == "class" && !self.classes.is_empty()) || self.attrs.iter().any(|(n, _)| n == name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Inline style property value
    pub fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        match self.style.iter_mut().find(|(p, _)| p == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.style.push((property.to_string(), value.to_string())),
        }
    }

    pub fn remove_style(&mut self, property: &str) -> bool {
        let before = self.style.len();
        self.style.retain(|(p, _)| p != property);
        before != self.style.len()
    }

    /// Form controls whose value the behavior layer reads
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_reports_changes() {
        let mut elem = ElementData::new("BUTTON");
        assert_eq!(elem.tag, "button");
        assert!(elem.set_attr("aria-expanded", "false"));
        assert!(!elem.set_attr("aria-expanded", "false"));
        assert!(elem.set_attr("aria-expanded", "true"));
        assert_eq!(elem.attr("aria-expanded"), Some("true"));
    }

    #[test]
    fn test_class_attr_goes_to_class_list() {
        let mut elem = ElementData::new("div");
        elem.set_attr("class", "a b");
        assert!(elem.classes.contains("b"));
        assert!(elem.attr("class").is_none());
        assert!(elem.has_attr("class"));
    }

    #[test]
    fn test_style() {
        let mut elem = ElementData::new("body");
        elem.set_style("overflow", "hidden");
        assert_eq!(elem.style("overflow"), Some("hidden"));
        assert!(elem.remove_style("overflow"));
        assert!(!elem.remove_style("overflow"));
    }
}
