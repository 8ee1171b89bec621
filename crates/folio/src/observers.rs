//! Progressive enhancement observers
//!
//! Intersection observing for lazy images and entrance animations, the
//! viewport-distance fallback used when the host has no observer API, and
//! the network-quality check. Every action here is idempotent, so the
//! observer path and the fallback path can both fire for the same element.

use std::collections::HashMap;

use folio_dom::{DOMRect, Document, EffectiveType, NodeId, Window};

use crate::util::is_in_viewport;

/// Intersection observer options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Margin grown around the viewport (px)
    pub root_margin: f64,
    /// Visible fraction at which a target counts as intersecting
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: 0.0,
            threshold: 0.0,
        }
    }
}

/// Intersection observer entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub bounding_rect: DOMRect,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
}

/// Tracks when observed elements cross into or out of the viewport
#[derive(Debug, Clone)]
pub struct IntersectionObserver {
    options: ObserverOptions,
    /// Last reported intersecting state per target
    observed: HashMap<NodeId, Option<bool>>,
}

impl IntersectionObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: HashMap::new(),
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    pub fn observe(&mut self, target: NodeId) {
        self.observed.entry(target).or_insert(None);
    }

    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
    }

    /// Number of observed targets
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Compare every target against `viewport`. The first check of a target
    /// always reports; later checks report only on a change of state.
    /// Entries come back ordered by node id.
    pub fn check(&mut self, doc: &Document, viewport: DOMRect) -> Vec<IntersectionEntry> {
        let root = viewport.expanded(self.options.root_margin);
        let mut entries = Vec::new();
        for (&target, last) in &mut self.observed {
            if !doc.is_connected(target) {
                continue;
            }
            let rect = doc.rect(target);
            let ratio = if rect.area() > 0.0 {
                rect.intersection(&root).map_or(0.0, |i| i.area() / rect.area())
            } else if rect.touches(&root) {
                1.0
            } else {
                0.0
            };
            let intersecting = rect.touches(&root) && ratio >= self.options.threshold;
            if *last != Some(intersecting) {
                *last = Some(intersecting);
                entries.push(IntersectionEntry {
                    target,
                    bounding_rect: rect,
                    intersection_ratio: ratio,
                    is_intersecting: intersecting,
                });
            }
        }
        entries.sort_by_key(|e| e.target);
        entries
    }
}

/// Swap in the real image source. Returns false if it was already loaded.
pub fn load_image(doc: &mut Document, img: NodeId) -> bool {
    let Some(src) = doc.attribute(img, "data-src") else {
        return false;
    };
    doc.set_attribute(img, "src", &src);
    doc.remove_attribute(img, "data-src");
    doc.add_class(img, "loaded");
    true
}

/// Fallback path: load every pending image within `margin` of the viewport
pub fn load_visible_images(doc: &mut Document, images: &[NodeId], viewport: &DOMRect, margin: f64) -> usize {
    let mut loaded = 0;
    for &img in images {
        if doc.is_connected(img)
            && doc.has_attribute(img, "data-src")
            && is_in_viewport(&doc.rect(img), viewport, margin)
            && load_image(doc, img)
        {
            loaded += 1;
        }
    }
    loaded
}

/// Fallback path: reveal every element that is in the viewport
pub fn reveal_visible(doc: &mut Document, elements: &[NodeId], viewport: &DOMRect) -> usize {
    let mut revealed = 0;
    for &node in elements {
        if doc.is_connected(node) && is_in_viewport(&doc.rect(node), viewport, 0.0) && doc.add_class(node, "animate-in") {
            revealed += 1;
        }
    }
    revealed
}

/// Whether the host reports a slow or data-saving connection
pub fn is_slow_connection(window: &Window) -> bool {
    window.network.as_ref().is_some_and(|network| {
        network.save_data || matches!(network.effective_type, EffectiveType::Slow2G | EffectiveType::TwoG)
    })
}
