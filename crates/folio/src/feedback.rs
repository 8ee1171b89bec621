//! Feedback and presentation helpers
//!
//! Toasts, chat status line and transcript, busy state of forms, and the
//! scroll helpers used by navigation.

use folio_dom::{Document, NodeId, ScrollBehavior, Window};

use crate::scheduler::{Scheduler, Task};
use crate::validation::{clear_field, form_fields};

const TOAST_CONTAINER: &str = ".toast-container";
const SUBMIT_CONTROL: &str = "button[type=submit], input[type=submit]";

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Show a transient message. The toast hides after `duration_ms`; the
/// caller handles [`Task::HideToast`] and [`Task::RemoveToast`].
pub fn show_toast(
    doc: &mut Document,
    scheduler: &mut Scheduler,
    message: &str,
    kind: ToastKind,
    duration_ms: u64,
) -> NodeId {
    let container = toast_container(doc);
    let toast = doc
        .build("div")
        .class("toast")
        .class(&format!("toast-{}", kind.as_str()))
        .class("show")
        .attr("role", "alert")
        .text(message)
        .append_to(container);
    scheduler.schedule(duration_ms, Task::HideToast(toast));
    toast
}

/// Start the exit transition; removal follows after `exit_ms`
pub fn hide_toast(doc: &mut Document, scheduler: &mut Scheduler, toast: NodeId, exit_ms: u64) {
    if !doc.is_connected(toast) {
        return;
    }
    doc.remove_class(toast, "show");
    doc.add_class(toast, "hiding");
    scheduler.schedule(exit_ms, Task::RemoveToast(toast));
}

pub fn remove_toast(doc: &mut Document, toast: NodeId) {
    doc.remove(toast);
}

fn toast_container(doc: &mut Document) -> NodeId {
    if let Ok(Some(container)) = doc.query_selector(TOAST_CONTAINER) {
        return container;
    }
    let body = doc.body();
    doc.build("div")
        .class("toast-container")
        .attr("aria-live", "polite")
        .append_to(body)
}

/// Chat status line contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStatus {
    Sending,
    Success,
    Error(String),
}

impl ChatStatus {
    fn class(&self) -> &'static str {
        match self {
            Self::Sending => "status-sending",
            Self::Success => "status-success",
            Self::Error(_) => "status-error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Sending => "Sending\u{2026}",
            Self::Success => "Message sent! We'll get back to you soon.",
            Self::Error(message) => message,
        }
    }
}

const STATUS_CLASSES: [&str; 3] = ["status-sending", "status-success", "status-error"];

pub fn set_chat_status(doc: &mut Document, status_node: NodeId, status: &ChatStatus) {
    for class in STATUS_CLASSES {
        doc.set_class(status_node, class, class == status.class());
    }
    doc.set_attribute(status_node, "role", "status");
    doc.set_text_content(status_node, status.message());
}

pub fn clear_chat_status(doc: &mut Document, status_node: NodeId) {
    for class in STATUS_CLASSES {
        doc.remove_class(status_node, class);
    }
    doc.set_text_content(status_node, "");
}

/// Append a sent message to the chat transcript
pub fn append_transcript(doc: &mut Document, messages: NodeId, name: &str, message: &str) -> NodeId {
    let entry = doc
        .build("div")
        .class("chat-message")
        .class("chat-message-user")
        .append_to(messages);
    doc.build("strong")
        .class("chat-message-author")
        .text(name.trim())
        .append_to(entry);
    doc.build("p")
        .class("chat-message-text")
        .text(message.trim())
        .append_to(entry);
    entry
}

/// Toggle the busy state of a form and its submit control
pub fn set_busy(doc: &mut Document, form: NodeId, busy: bool) {
    if busy {
        doc.set_attribute(form, "aria-busy", "true");
    } else {
        doc.remove_attribute(form, "aria-busy");
    }
    let submit = doc.query_selector_within(form, SUBMIT_CONTROL).ok().flatten();
    if let Some(submit) = submit {
        doc.set_class(submit, "loading", busy);
        if busy {
            doc.set_attribute(submit, "disabled", "");
        } else {
            doc.remove_attribute(submit, "disabled");
        }
    }
}

/// Empty every field and drop leftover error state
pub fn reset_form(doc: &mut Document, form: NodeId) {
    for field in form_fields(doc, form) {
        doc.set_value(field, "");
        clear_field(doc, field);
    }
}

/// Entrance animation
pub fn animate_in(doc: &mut Document, node: NodeId) -> bool {
    doc.add_class(node, "animate-in")
}

fn behavior(smooth: bool) -> ScrollBehavior {
    if smooth {
        ScrollBehavior::Smooth
    } else {
        ScrollBehavior::Auto
    }
}

/// Scroll so that section `id` sits just below a header of `offset` px.
/// Returns false if there is no such element.
pub fn scroll_to_section(doc: &Document, window: &mut Window, id: &str, offset: f64, smooth: bool) -> bool {
    let Some(section) = doc.get_element_by_id(id) else {
        tracing::debug!("No section to scroll to: #{}", id);
        return false;
    };
    window.scroll_to(doc.rect(section).top() - offset, behavior(smooth));
    true
}

pub fn scroll_to_top(window: &mut Window, smooth: bool) {
    window.scroll_to(0.0, behavior(smooth));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_lifecycle() {
        let mut doc = Document::new("https://example.com/");
        let mut scheduler = Scheduler::new();
        let first = show_toast(&mut doc, &mut scheduler, "Saved", ToastKind::Success, 4000);
        show_toast(&mut doc, &mut scheduler, "Again", ToastKind::Info, 4000);

        assert_eq!(doc.query_selector_all(".toast-container").unwrap().len(), 1);
        assert!(doc.has_class(first, "toast-success"));
        assert_eq!(doc.attribute(first, "role").as_deref(), Some("alert"));

        let due = scheduler.advance(4000);
        assert_eq!(due[0].1, Task::HideToast(first));
        hide_toast(&mut doc, &mut scheduler, first, 300);
        assert!(doc.has_class(first, "hiding"));

        let due = scheduler.advance(300);
        assert_eq!(due[0].1, Task::RemoveToast(first));
        remove_toast(&mut doc, first);
        assert!(!doc.is_connected(first));
    }

    #[test]
    fn test_chat_status_classes_are_exclusive() {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        let status = doc.build("div").class("chat-status").append_to(body);

        set_chat_status(&mut doc, status, &ChatStatus::Sending);
        assert!(doc.has_class(status, "status-sending"));
        set_chat_status(&mut doc, status, &ChatStatus::Error("Nope".into()));
        assert!(!doc.has_class(status, "status-sending"));
        assert!(doc.has_class(status, "status-error"));
        assert_eq!(doc.text_content(status), "Nope");
    }

    #[test]
    fn test_busy_and_reset() {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        let form = doc.build("form").append_to(body);
        let input = doc.build("input").attr("name", "email").value("x").append_to(form);
        let submit = doc.build("button").attr("type", "submit").append_to(form);

        set_busy(&mut doc, form, true);
        assert!(doc.has_attribute(submit, "disabled"));
        assert!(doc.has_class(submit, "loading"));
        assert_eq!(doc.attribute(form, "aria-busy").as_deref(), Some("true"));

        set_busy(&mut doc, form, false);
        assert!(!doc.has_attribute(submit, "disabled"));
        reset_form(&mut doc, form);
        assert_eq!(doc.value(input), "");
    }

    #[test]
    fn test_scroll_to_section_offsets_header() {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body();
        doc.build("section").id("about").rect(0.0, 900.0, 1280.0, 600.0).append_to(body);
        let mut window = Window::new("https://example.com/");

        assert!(scroll_to_section(&doc, &mut window, "about", 80.0, true));
        assert_eq!(window.scroll_y(), 820.0);
        assert_eq!(window.last_scroll_behavior(), ScrollBehavior::Smooth);
        assert!(!scroll_to_section(&doc, &mut window, "missing", 0.0, true));
    }
}
