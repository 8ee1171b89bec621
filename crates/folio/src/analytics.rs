//! Analytics sink
//!
//! Events are pushed into the window data layer when a tag manager has
//! installed one. Without a data layer, tracking is a silent no-op.

use folio_dom::Window;
use serde::Serialize;

/// Tracked interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    ChatOpened,
    ChatClosed,
    FormSubmission { form: String, success: bool },
    SectionView { section: String },
    PageHidden,
    Error {
        message: String,
        context: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
}

/// Data-layer writer
#[derive(Debug, Clone, Copy)]
pub struct Analytics {
    enabled: bool,
}

impl Analytics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Push `event`. Returns true if it reached a data layer.
    pub fn track(&self, window: &mut Window, event: &AnalyticsEvent) -> bool {
        if !self.enabled || window.data_layer.is_none() {
            return false;
        }
        match serde_json::to_value(event) {
            Ok(value) => window.push_data_layer(value),
            Err(e) => {
                tracing::warn!("Failed to encode analytics event: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_requires_data_layer() {
        let mut window = Window::new("https://example.com/");
        let analytics = Analytics::new(true);
        assert!(!analytics.track(&mut window, &AnalyticsEvent::ChatOpened));

        window.data_layer = Some(Vec::new());
        assert!(analytics.track(&mut window, &AnalyticsEvent::ChatOpened));
        assert!(!Analytics::new(false).track(&mut window, &AnalyticsEvent::ChatClosed));
        assert_eq!(window.data_layer.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_event_shape() {
        let mut window = Window::new("https://example.com/");
        window.data_layer = Some(Vec::new());
        let analytics = Analytics::new(true);
        analytics.track(
            &mut window,
            &AnalyticsEvent::FormSubmission {
                form: "newsletter".into(),
                success: true,
            },
        );
        analytics.track(
            &mut window,
            &AnalyticsEvent::Error {
                message: "boom".into(),
                context: "global".into(),
                stack: None,
            },
        );

        let layer = window.data_layer.unwrap();
        assert_eq!(layer[0], json!({"event": "form_submission", "form": "newsletter", "success": true}));
        assert_eq!(layer[1], json!({"event": "error", "message": "boom", "context": "global"}));
    }
}
