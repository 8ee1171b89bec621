//! Folio DOM - host document model
//!
//! Arena-based document tree plus the browser window surface (viewport,
//! scroll offset, media preferences, network information, history) that
//! the Folio behavior layer drives.

mod classlist;
mod document;
mod events;
mod geometry;
mod node;
mod selector;
mod tree;
mod window;

pub use classlist::ClassList;
pub use document::{Document, ElementBuilder};
pub use events::{Event, EventTarget, EventType, MediaFeature};
pub use geometry::{DOMRect, ScrollBehavior};
pub use node::{ElementData, Node, NodeData};
pub use selector::Selector;
pub use tree::DomTree;
pub use window::{
    ColorScheme, EffectiveType, History, MediaPreferences, NetworkInformation, ServiceWorkerContainer,
    VisibilityState, Window, WindowFeatures,
};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node" in tree links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    pub fn index(self) -> u32 {
        self.0
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} does not exist")]
    NoSuchNode(NodeId),

    #[error("Service worker registration failed for {url}: {reason}")]
    ServiceWorker { url: String, reason: String },
}

/// A loaded page: the document plus the window hosting it.
#[derive(Debug)]
pub struct Page {
    pub document: Document,
    pub window: Window,
}

impl Page {
    /// Create a page with an empty `<html><head><body>` skeleton
    pub fn new(url: &str) -> Self {
        Self {
            document: Document::new(url),
            window: Window::new(url),
        }
    }

    /// Create a page from an already built document
    pub fn with_document(document: Document) -> Self {
        let window = Window::new(document.url());
        Self { document, window }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
