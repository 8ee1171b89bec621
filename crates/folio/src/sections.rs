//! Active-section tracking

use folio_dom::{Document, NodeId};

use crate::state::DEFAULT_SECTION;

/// Vertical extent of a section in document coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    pub fn new(id: &str, top: f64, height: f64) -> Self {
        Self {
            id: id.to_string(),
            top,
            height,
        }
    }

    /// Half-open `[top, top + height)`
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// Section containing `point`; overlapping candidates resolve to the one
/// whose top is closest to the point.
pub fn select_section(sections: &[SectionBounds], point: f64) -> Option<&SectionBounds> {
    sections
        .iter()
        .filter(|s| s.contains(point))
        .min_by(|a, b| (point - a.top).total_cmp(&(point - b.top)))
}

/// Bounds of every connected section with an id
pub fn collect_sections(doc: &Document, sections: &[NodeId]) -> Vec<SectionBounds> {
    sections
        .iter()
        .filter(|&&node| doc.is_connected(node))
        .filter_map(|&node| {
            let id = doc.attribute(node, "id")?;
            let rect = doc.rect(node);
            Some(SectionBounds::new(&id, rect.top(), rect.height))
        })
        .collect()
}

/// Id of the section under the probe point, or the default section
pub fn current_section(sections: &[SectionBounds], point: f64) -> String {
    select_section(sections, point).map_or_else(|| DEFAULT_SECTION.to_string(), |s| s.id.clone())
}
