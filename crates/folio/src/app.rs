//! Application context
//!
//! `App` owns every piece of behavior state for one page: the element
//! cache, widget state, listener registry, timers, observers and in-flight
//! submissions. The page itself (document and window) stays with the host
//! and is passed into each call.

use std::collections::BTreeMap;

use folio_dom::{Document, Event, EventTarget, EventType, MediaFeature, NodeId, Page, VisibilityState};
use serde::Serialize;

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::cache::ElementCache;
use crate::capabilities::Capabilities;
use crate::config::Config;
use crate::events::{Handler, ListenerRegistry};
use crate::feedback::{self, ChatStatus, ToastKind};
use crate::navigation::Navigator;
use crate::observers::{self, IntersectionObserver, ObserverOptions};
use crate::reporting::{ErrorReport, GENERIC_ERROR_MESSAGE};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::sections;
use crate::state::{ScrollThresholds, StateManager, WidgetState};
use crate::submission::{FormKind, SubmissionId, SubmissionTracker, Transport};
use crate::util::{self, Debouncer, DeviceType, Throttle};
use crate::validation::{self, ChatLimits, ChatSubmission, FieldError};
use crate::view::{DomView, FocusTarget, View};
use crate::Error;

/// Visible fraction at which `[data-animate]` elements are revealed
const REVEAL_THRESHOLD: f64 = 0.1;

const CHAT_FAILURE_MESSAGE: &str = "Sorry, your message could not be sent. Please try again.";
const NEWSLETTER_SUCCESS_MESSAGE: &str = "Thanks for subscribing!";
const FORM_SUCCESS_MESSAGE: &str = "Thank you! Your submission has been received.";
const FORM_FAILURE_MESSAGE: &str = "Submission failed. Please try again.";

/// Point-in-time view of the application, for diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub state: WidgetState,
    pub capabilities: Capabilities,
    pub listeners: usize,
    pub media_listeners: usize,
    /// Active intersection observers
    pub observers: usize,
    pub observed_targets: usize,
    pub pending_tasks: usize,
    pub in_flight_submissions: usize,
    pub animations_enabled: bool,
    /// Element cache entries and how many nodes each matched
    pub elements: BTreeMap<&'static str, usize>,
}

/// Behavior layer for one page
pub struct App {
    config: Config,
    caps: Capabilities,
    cache: ElementCache,
    state: StateManager,
    listeners: ListenerRegistry,
    scheduler: Scheduler,
    scroll_throttle: Throttle,
    resize_debounce: Debouncer,
    lazy_observer: Option<IntersectionObserver>,
    reveal_observer: Option<IntersectionObserver>,
    submissions: SubmissionTracker,
    transport: Box<dyn Transport>,
    navigator: Navigator,
    analytics: Analytics,
    chat_focus: Option<TaskHandle>,
    chat_auto_close: Option<TaskHandle>,
    scroll_trailing: Option<TaskHandle>,
    animations_enabled: bool,
    lazy_margin: f64,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", self.state.state())
            .field("listeners", &self.listeners.len())
            .field("pending_tasks", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Probe the host and cache elements. A failing cache lookup is logged
    /// and leaves every element-bound feature disabled.
    pub fn new(page: &mut Page, config: Config, transport: Box<dyn Transport>) -> Self {
        let caps = Capabilities::probe(&page.window);
        let cache = match ElementCache::build(&mut page.document) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Element cache unavailable: {}", e);
                ElementCache::empty()
            }
        };
        let device = config.device_type(page.window.inner_width);
        let thresholds = ScrollThresholds {
            header: config.header_scroll_threshold,
            back_to_top: config.back_to_top_threshold,
        };

        Self {
            caps,
            cache,
            state: StateManager::new(device, thresholds),
            listeners: ListenerRegistry::new(),
            scheduler: Scheduler::new(),
            scroll_throttle: Throttle::new(config.scroll_throttle_ms),
            resize_debounce: Debouncer::new(config.resize_debounce_ms),
            lazy_observer: None,
            reveal_observer: None,
            submissions: SubmissionTracker::new(),
            transport,
            navigator: Navigator::new(),
            analytics: Analytics::new(config.features.analytics),
            chat_focus: None,
            chat_auto_close: None,
            scroll_trailing: None,
            animations_enabled: config.features.animations,
            lazy_margin: config.lazy_load_margin_px as f64,
            config,
        }
    }

    /// Wire listeners, start observers and reconcile the initial state
    pub fn init(&mut self, page: &mut Page) {
        self.bind_events(&page.document);
        self.apply_media_preferences(page);
        self.apply_network_quality(page);
        self.setup_observers(&page.document);

        self.state.sync(&mut DomView::new(&mut page.document, &self.cache));
        self.update_scroll(page);
        self.register_service_worker(page);

        tracing::info!(
            "Folio initialized: {} listeners, device {}",
            self.listeners.len(),
            self.state.state().device_type
        );
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &WidgetState {
        self.state.state()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn cache(&self) -> &ElementCache {
        &self.cache
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Virtual time (ms) since startup
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Give back the transport once the app is torn down
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    fn bind_events(&mut self, doc: &Document) {
        let cache = &self.cache;
        let listeners = &mut self.listeners;
        let mut on = |node: NodeId, event_type: EventType, handler: Handler| {
            listeners.add(EventTarget::Node(node), event_type, handler);
        };

        if let Some(toggle) = cache.nav_toggle {
            on(toggle, EventType::Click, Handler::NavToggle);
        }
        for &link in &cache.nav_links {
            on(link, EventType::Click, Handler::NavLink);
        }
        if let Some(toggle) = cache.chat_toggle {
            on(toggle, EventType::Click, Handler::ChatToggle);
        }
        if let Some(close) = cache.chat_close {
            on(close, EventType::Click, Handler::ChatClose);
        }
        if let Some(form) = cache.chat_form {
            on(form, EventType::Submit, Handler::ChatSubmit);
        }
        for &form in &cache.newsletter_forms {
            on(form, EventType::Submit, Handler::NewsletterSubmit);
        }
        for &form in &cache.validated_forms {
            on(form, EventType::Submit, Handler::FormSubmit);
        }
        if let Some(button) = cache.back_to_top {
            on(button, EventType::Click, Handler::BackToTop);
        }
        for &action in &cache.actions {
            on(action, EventType::Click, Handler::Action);
        }

        let forms = cache
            .chat_form
            .iter()
            .chain(&cache.newsletter_forms)
            .chain(&cache.validated_forms);
        for &form in forms {
            for field in validation::form_fields(doc, form) {
                on(field, EventType::Input, Handler::FieldInput);
                on(field, EventType::Blur, Handler::FieldBlur);
            }
        }

        let listeners = &mut self.listeners;
        listeners.add(EventTarget::Document, EventType::Click, Handler::DocumentClick);
        listeners.add(EventTarget::Document, EventType::KeyDown, Handler::KeyDown);
        listeners.add(EventTarget::Document, EventType::VisibilityChange, Handler::VisibilityChange);
        listeners.add(EventTarget::Window, EventType::Scroll, Handler::Scroll);
        listeners.add(EventTarget::Window, EventType::Resize, Handler::Resize);
        listeners.add(EventTarget::Window, EventType::Error, Handler::RuntimeError);
        listeners.add(EventTarget::Window, EventType::UnhandledRejection, Handler::UnhandledRejection);

        if self.caps.match_media {
            listeners.add_media(MediaFeature::ColorScheme, Handler::ColorSchemeChange);
            listeners.add_media(MediaFeature::ReducedMotion, Handler::ReducedMotionChange);
        }
        if self.caps.network_information {
            listeners.add(EventTarget::Connection, EventType::Change, Handler::ConnectionChange);
        }
        tracing::debug!("Bound {} listeners", listeners.len());
    }

    fn setup_observers(&mut self, doc: &Document) {
        if !self.caps.intersection_observer {
            tracing::debug!("No intersection observer; lazy loading and reveal use the scroll fallback");
            return;
        }
        if self.config.features.lazy_loading {
            self.lazy_observer = Some(self.lazy_image_observer(doc));
        }
        if self.animations_enabled {
            self.reveal_observer = Some(self.reveal_element_observer(doc));
        }
    }

    /// Observer over every image that still has a deferred source
    fn lazy_image_observer(&self, doc: &Document) -> IntersectionObserver {
        let mut observer = IntersectionObserver::new(ObserverOptions {
            root_margin: self.lazy_margin,
            threshold: 0.0,
        });
        for &img in &self.cache.lazy_images {
            if doc.has_attribute(img, "data-src") {
                observer.observe(img);
            }
        }
        observer
    }

    /// Observer over every animated element not yet revealed
    fn reveal_element_observer(&self, doc: &Document) -> IntersectionObserver {
        let mut observer = IntersectionObserver::new(ObserverOptions {
            root_margin: 0.0,
            threshold: REVEAL_THRESHOLD,
        });
        for &node in &self.cache.animated {
            if !doc.has_class(node, "animate-in") {
                observer.observe(node);
            }
        }
        observer
    }

    fn apply_media_preferences(&mut self, page: &mut Page) {
        let dark = util::prefers_dark_scheme(&page.window);
        let reduced = util::prefers_reduced_motion(&page.window);
        let root = page.document.document_element();
        page.document.set_class(root, "dark-mode", dark);
        page.document.set_class(root, "reduced-motion", reduced);
        self.animations_enabled = self.config.features.animations && !reduced;
    }

    fn apply_network_quality(&mut self, page: &mut Page) {
        let slow = self.caps.network_information && observers::is_slow_connection(&page.window);
        let root = page.document.document_element();
        page.document.set_class(root, "slow-connection", slow);
        self.lazy_margin = if slow {
            0.0
        } else {
            self.config.lazy_load_margin_px as f64
        };
    }

    fn register_service_worker(&mut self, page: &mut Page) {
        if !self.config.features.service_worker || !self.caps.service_worker {
            return;
        }
        let url = &self.config.service_worker_url;
        match page.window.service_workers.register(url) {
            Ok(()) => tracing::info!("Service worker registered: {}", url),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Deliver an event to every listener on its propagation path
    pub fn dispatch(&mut self, page: &mut Page, event: &mut Event) {
        for target in page.document.event_path(event) {
            for handler in self.listeners.matching(target, event.event_type) {
                self.handle(page, handler, target, event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
    }

    fn handle(&mut self, page: &mut Page, handler: Handler, current: EventTarget, event: &mut Event) {
        let node = current.node();
        match handler {
            Handler::NavToggle => {
                event.prevent_default();
                self.toggle_nav(page);
            }
            Handler::NavLink => {
                if let Some(link) = node {
                    self.follow_nav_link(page, link, event);
                }
            }
            Handler::ChatToggle => {
                event.prevent_default();
                if self.state.state().is_chat_open {
                    self.close_chat(page);
                } else {
                    self.open_chat_from(page, node);
                }
            }
            Handler::ChatClose => {
                event.prevent_default();
                self.close_chat(page);
            }
            Handler::ChatSubmit => {
                event.prevent_default();
                if let Some(form) = node {
                    self.submit_chat(page, form);
                }
            }
            Handler::NewsletterSubmit => {
                event.prevent_default();
                if let Some(form) = node {
                    self.submit_form(page, form, FormKind::Newsletter);
                }
            }
            Handler::FormSubmit => {
                event.prevent_default();
                if let Some(form) = node {
                    self.submit_form(page, form, FormKind::Generic);
                }
            }
            Handler::FieldInput => {
                if let Some(field) = node {
                    if page.document.has_class(field, "error") {
                        validation::clear_field(&mut page.document, field);
                    }
                }
            }
            Handler::FieldBlur => {
                if let Some(field) = node {
                    self.check_field_on_blur(page, field);
                }
            }
            Handler::BackToTop => {
                event.prevent_default();
                self.scroll_to_top(page);
            }
            Handler::Action => {
                if let Some(element) = node {
                    self.run_action(page, element, event);
                }
            }
            Handler::DocumentClick => self.close_nav_on_outside_click(page, event),
            Handler::KeyDown => {
                if event.key.as_deref() == Some("Escape") {
                    if self.state.state().is_chat_open {
                        self.close_chat(page);
                    }
                    if self.state.state().is_nav_open {
                        self.close_nav(page);
                    }
                }
            }
            Handler::Scroll => {
                let now = self.scheduler.now();
                if self.scroll_throttle.admit(now) {
                    self.update_scroll(page);
                } else if self.scroll_trailing.is_none() {
                    let delay = self.scroll_throttle.remaining(now);
                    self.scroll_trailing = Some(self.scheduler.schedule(delay, Task::ScrollSettled));
                }
            }
            Handler::Resize => {
                self.resize_debounce.trigger(&mut self.scheduler, Task::ResizeSettled);
            }
            Handler::VisibilityChange => match page.window.visibility {
                VisibilityState::Hidden => {
                    self.analytics.track(&mut page.window, &AnalyticsEvent::PageHidden);
                }
                VisibilityState::Visible => self.update_section(page),
            },
            Handler::ColorSchemeChange => {
                let dark = util::prefers_dark_scheme(&page.window);
                let root = page.document.document_element();
                page.document.set_class(root, "dark-mode", dark);
            }
            Handler::ReducedMotionChange => self.on_reduced_motion_change(page),
            Handler::ConnectionChange => {
                self.apply_network_quality(page);
                if self.lazy_observer.is_some() {
                    self.lazy_observer = Some(self.lazy_image_observer(&page.document));
                    self.poll_observers(page);
                }
            }
            Handler::RuntimeError => {
                let message = event.message.clone().unwrap_or_else(|| "Unknown error".to_string());
                let report = ErrorReport::new(message, "global").with_stack(event.stack.clone());
                self.report_error(page, report);
            }
            Handler::UnhandledRejection => {
                let reason = event.message.clone().unwrap_or_else(|| "Unhandled rejection".to_string());
                self.report_error(page, ErrorReport::new(reason, "promise"));
            }
        }
    }

    fn follow_nav_link(&mut self, page: &mut Page, link: NodeId, event: &mut Event) {
        let Some(href) = page.document.attribute(link, "href") else {
            return;
        };
        let Some(id) = href.strip_prefix('#').filter(|id| !id.is_empty()) else {
            return;
        };
        event.prevent_default();
        self.scroll_to_section(page, id);
        if let Err(e) = self.navigator.navigate(&mut page.window, &href) {
            tracing::warn!("{}", e);
        }
        if self.state.state().device_type == DeviceType::Mobile {
            self.close_nav(page);
        }
    }

    fn run_action(&mut self, page: &mut Page, element: NodeId, event: &mut Event) {
        let Some(action) = page.document.attribute(element, "data-action") else {
            return;
        };
        match action.as_str() {
            "open-chat" => self.open_chat_from(page, Some(element)),
            "close-chat" => self.close_chat(page),
            "toggle-chat" => {
                if self.state.state().is_chat_open {
                    self.close_chat(page);
                } else {
                    self.open_chat_from(page, Some(element));
                }
            }
            "toggle-nav" => self.toggle_nav(page),
            "scroll-top" => self.scroll_to_top(page),
            "scroll-to" => {
                let target = page.document.attribute(element, "data-target").unwrap_or_default();
                let id = target.trim_start_matches('#');
                if !id.is_empty() {
                    self.scroll_to_section(page, id);
                }
            }
            other => {
                tracing::debug!("Unknown data-action: {}", other);
                return;
            }
        }
        event.prevent_default();
    }

    fn close_nav_on_outside_click(&mut self, page: &mut Page, event: &Event) {
        if !self.state.state().is_nav_open {
            return;
        }
        let Some(target) = event.target.node() else {
            return;
        };
        let tree = page.document.tree();
        let inside = [self.cache.nav, self.cache.nav_toggle]
            .into_iter()
            .flatten()
            .any(|container| tree.is_inclusive_descendant(target, container));
        // Nav toggles outside the nav already handled this click
        let toggles_nav = page
            .document
            .closest(target, "[data-action=toggle-nav]")
            .ok()
            .flatten()
            .is_some();
        if !inside && !toggles_nav {
            self.close_nav(page);
        }
    }

    /// Blur validation skips optional fields the user left empty
    fn check_field_on_blur(&mut self, page: &mut Page, field: NodeId) {
        let doc = &mut page.document;
        if doc.value(field).trim().is_empty() && !doc.has_attribute(field, "required") {
            validation::clear_field(doc, field);
            return;
        }
        match validation::validate_field(doc, field) {
            Ok(()) => validation::clear_field(doc, field),
            Err(error) => validation::mark_field(doc, field, error),
        }
    }

    fn on_reduced_motion_change(&mut self, page: &mut Page) {
        self.apply_media_preferences(page);
        if !self.animations_enabled {
            if let Some(mut observer) = self.reveal_observer.take() {
                observer.disconnect();
            }
        } else if self.caps.intersection_observer && self.reveal_observer.is_none() {
            self.reveal_observer = Some(self.reveal_element_observer(&page.document));
            self.poll_observers(page);
        }
    }

    // ------------------------------------------------------------------
    // Scroll-driven updates
    // ------------------------------------------------------------------

    /// Reflect the window scroll offset: header and back-to-top state,
    /// active section, observers and the fallback pass.
    fn update_scroll(&mut self, page: &mut Page) {
        let position = page.window.scroll_y().max(0.0).round() as u32;
        self.state
            .set_scroll_position(&mut DomView::new(&mut page.document, &self.cache), position);
        self.update_section(page);
        self.poll_observers(page);
        self.fallback_pass(page);
    }

    fn header_height(&self, page: &Page) -> f64 {
        self.cache
            .header
            .map_or(0.0, |header| page.document.rect(header).height)
    }

    fn update_section(&mut self, page: &mut Page) {
        let point = page.window.scroll_y() + self.header_height(page) + self.config.section_offset as f64;
        let bounds = sections::collect_sections(&page.document, &self.cache.sections);
        let id = sections::current_section(&bounds, point);
        let mut view = DomView::new(&mut page.document, &self.cache);
        if self.state.set_current_section(&mut view, &id) {
            self.analytics
                .track(&mut page.window, &AnalyticsEvent::SectionView { section: id });
        }
    }

    fn poll_observers(&mut self, page: &mut Page) {
        let viewport = page.window.viewport();
        let doc = &mut page.document;
        if let Some(observer) = self.lazy_observer.as_mut() {
            for entry in observer.check(doc, viewport) {
                if entry.is_intersecting {
                    observers::load_image(doc, entry.target);
                    observer.unobserve(entry.target);
                }
            }
        }
        if let Some(observer) = self.reveal_observer.as_mut() {
            for entry in observer.check(doc, viewport) {
                if entry.is_intersecting {
                    feedback::animate_in(doc, entry.target);
                    observer.unobserve(entry.target);
                }
            }
        }
    }

    /// Viewport-distance check that runs on every admitted scroll tick,
    /// whether or not an observer covers the same elements.
    fn fallback_pass(&mut self, page: &mut Page) {
        let viewport = page.window.viewport();
        if self.config.features.lazy_loading {
            observers::load_visible_images(&mut page.document, &self.cache.lazy_images, &viewport, self.lazy_margin);
        }
        if self.animations_enabled && !self.caps.intersection_observer {
            observers::reveal_visible(&mut page.document, &self.cache.animated, &viewport);
        }
    }

    fn on_resize_settled(&mut self, page: &mut Page) {
        let device = self.config.device_type(page.window.inner_width);
        self.state
            .set_device_type(&mut DomView::new(&mut page.document, &self.cache), device);
        self.update_scroll(page);
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    pub fn toggle_nav(&mut self, page: &mut Page) {
        self.state
            .toggle_nav(&mut DomView::new(&mut page.document, &self.cache));
    }

    pub fn open_nav(&mut self, page: &mut Page) {
        self.state
            .open_nav(&mut DomView::new(&mut page.document, &self.cache));
    }

    pub fn close_nav(&mut self, page: &mut Page) {
        self.state
            .close_nav(&mut DomView::new(&mut page.document, &self.cache));
    }

    pub fn toggle_chat(&mut self, page: &mut Page) {
        if self.state.state().is_chat_open {
            self.close_chat(page);
        } else {
            self.open_chat(page);
        }
    }

    pub fn open_chat(&mut self, page: &mut Page) {
        self.open_chat_from(page, None);
    }

    fn open_chat_from(&mut self, page: &mut Page, opener: Option<NodeId>) {
        let mut view = DomView::new(&mut page.document, &self.cache);
        if !self.state.open_chat(&mut view, opener) {
            return;
        }
        // Reopening invalidates a pending auto-close.
        self.cancel_chat_timers();
        self.chat_focus = Some(
            self.scheduler
                .schedule(self.config.chat_focus_delay_ms, Task::FocusChatInput),
        );
        self.analytics.track(&mut page.window, &AnalyticsEvent::ChatOpened);
    }

    pub fn close_chat(&mut self, page: &mut Page) {
        let mut view = DomView::new(&mut page.document, &self.cache);
        if !self.state.close_chat(&mut view) {
            return;
        }
        self.cancel_chat_timers();
        self.analytics.track(&mut page.window, &AnalyticsEvent::ChatClosed);
    }

    fn cancel_chat_timers(&mut self) {
        for handle in [self.chat_focus.take(), self.chat_auto_close.take()].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
    }

    /// Scroll to section `id` below the header. Returns false if absent.
    pub fn scroll_to_section(&mut self, page: &mut Page, id: &str) -> bool {
        let offset = self.header_height(page);
        let scrolled = feedback::scroll_to_section(
            &page.document,
            &mut page.window,
            id,
            offset,
            self.caps.smooth_scroll,
        );
        if scrolled {
            self.update_scroll(page);
        }
        scrolled
    }

    pub fn scroll_to_top(&mut self, page: &mut Page) {
        feedback::scroll_to_top(&mut page.window, self.caps.smooth_scroll);
        self.update_scroll(page);
    }

    /// Recompute device class, scroll state and active section, then run
    /// the fallback pass.
    pub fn refresh(&mut self, page: &mut Page) {
        let device = self.config.device_type(page.window.inner_width);
        self.state
            .set_device_type(&mut DomView::new(&mut page.document, &self.cache), device);
        self.update_scroll(page);
        tracing::debug!("Refreshed: section {}", self.state.state().current_section);
    }

    pub fn debug(&self) -> DebugSnapshot {
        let snapshot = DebugSnapshot {
            state: self.state.state().clone(),
            capabilities: self.caps,
            listeners: self.listeners.len(),
            media_listeners: self.listeners.media_listener_count(),
            observers: self.lazy_observer.iter().chain(&self.reveal_observer).count(),
            observed_targets: self
                .lazy_observer
                .iter()
                .chain(&self.reveal_observer)
                .map(IntersectionObserver::len)
                .sum(),
            pending_tasks: self.scheduler.len(),
            in_flight_submissions: self.submissions.in_flight(),
            animations_enabled: self.animations_enabled,
            elements: self.cache.entries().into_iter().collect(),
        };
        tracing::info!("Debug snapshot: {:?}", snapshot);
        snapshot
    }

    /// Log a runtime failure, record it and tell the user unless the chat
    /// widget reports it itself.
    pub fn report_error(&mut self, page: &mut Page, report: ErrorReport) {
        tracing::error!("[{}] {}", report.context, report.message);
        self.analytics.track(
            &mut page.window,
            &AnalyticsEvent::Error {
                message: report.message.clone(),
                context: report.context.clone(),
                stack: report.stack.clone(),
            },
        );
        if report.shows_toast() {
            self.toast(page, GENERIC_ERROR_MESSAGE, ToastKind::Error);
        }
    }

    fn toast(&mut self, page: &mut Page, message: &str, kind: ToastKind) -> NodeId {
        feedback::show_toast(
            &mut page.document,
            &mut self.scheduler,
            message,
            kind,
            self.config.toast_duration_ms,
        )
    }

    // ------------------------------------------------------------------
    // Submissions
    // ------------------------------------------------------------------

    fn submit_chat(&mut self, page: &mut Page, form: NodeId) {
        if !self.submissions.begin(form) {
            return;
        }
        let doc = &mut page.document;
        let submission = ChatSubmission::read(doc, form);
        let limits = ChatLimits {
            name_min: self.config.chat_name_min_len,
            message_min: self.config.chat_message_min_len,
        };
        let errors = validation::validate_chat(&submission, limits);

        for field in ["name", "email", "message"] {
            if let Some(node) = named_field(doc, form, field) {
                validation::clear_field(doc, node);
            }
        }

        if let Some((_, first)) = errors.first() {
            for (field, error) in &errors {
                if let Some(node) = named_field(doc, form, field.as_str()) {
                    validation::mark_field(doc, node, *error);
                }
            }
            if let Some(status) = self.cache.chat_status {
                feedback::set_chat_status(doc, status, &ChatStatus::Error(first.message()));
            }
            tracing::debug!("Chat submission rejected: {} invalid fields", errors.len());
            self.submissions.finish(form);
            return;
        }

        feedback::set_busy(doc, form, true);
        if let Some(status) = self.cache.chat_status {
            feedback::set_chat_status(doc, status, &ChatStatus::Sending);
        }
        let fields = vec![
            ("name".to_string(), submission.name),
            ("email".to_string(), submission.email),
            ("message".to_string(), submission.message),
        ];
        self.send(form, FormKind::Chat, fields);
    }

    fn submit_form(&mut self, page: &mut Page, form: NodeId, kind: FormKind) {
        if !self.submissions.begin(form) {
            return;
        }
        let doc = &mut page.document;
        let mut failures = validation::validate_form(doc, form);

        if kind == FormKind::Newsletter {
            let email = doc
                .query_selector_within(form, "input[type=email], [name=email]")
                .ok()
                .flatten();
            if let Some(email) = email {
                if !failures.iter().any(|(f, _)| *f == email) && !util::validate_email(doc.value(email).trim()) {
                    validation::mark_field(doc, email, FieldError::InvalidEmail);
                    failures.push((email, FieldError::InvalidEmail));
                }
            }
        }

        if let Some(&(first, _)) = failures.first() {
            doc.focus(first);
            tracing::debug!("{} submission rejected: {} invalid fields", kind.as_str(), failures.len());
            self.submissions.finish(form);
            return;
        }

        feedback::set_busy(doc, form, true);
        let fields: Vec<(String, String)> = validation::form_fields(doc, form)
            .into_iter()
            .map(|field| {
                let name = doc
                    .attribute(field, "name")
                    .or_else(|| doc.attribute(field, "id"))
                    .unwrap_or_default();
                (name, doc.value(field))
            })
            .collect();
        self.send(form, kind, fields);
    }

    fn send(&mut self, form: NodeId, kind: FormKind, fields: Vec<(String, String)>) {
        if let Some((id, delay)) = self.submissions.send(&mut *self.transport, kind, form, fields) {
            self.scheduler.schedule(delay, Task::Delivery(id));
        }
    }

    fn on_delivery(&mut self, page: &mut Page, id: SubmissionId) {
        let Some((submission, outcome)) = self.submissions.resolve(id) else {
            return;
        };
        let form = submission.form;
        feedback::set_busy(&mut page.document, form, false);

        match (submission.kind, &outcome) {
            (FormKind::Chat, Ok(())) => {
                let doc = &mut page.document;
                if let Some(messages) = self.cache.chat_messages {
                    feedback::append_transcript(
                        doc,
                        messages,
                        submission.field("name").unwrap_or_default(),
                        submission.field("message").unwrap_or_default(),
                    );
                }
                feedback::reset_form(doc, form);
                if let Some(status) = self.cache.chat_status {
                    feedback::set_chat_status(doc, status, &ChatStatus::Success);
                }
                if self.state.state().is_chat_open {
                    if let Some(handle) = self.chat_auto_close.take() {
                        self.scheduler.cancel(handle);
                    }
                    self.chat_auto_close = Some(
                        self.scheduler
                            .schedule(self.config.chat_auto_close_ms, Task::ChatAutoClose),
                    );
                }
            }
            (FormKind::Chat, Err(e)) => {
                if let Some(status) = self.cache.chat_status {
                    feedback::set_chat_status(
                        &mut page.document,
                        status,
                        &ChatStatus::Error(CHAT_FAILURE_MESSAGE.to_string()),
                    );
                }
                let error = Error::from(e.clone());
                self.report_error(page, ErrorReport::new(error.to_string(), "chat"));
            }
            (kind, Ok(())) => {
                feedback::reset_form(&mut page.document, form);
                let message = if kind == FormKind::Newsletter {
                    NEWSLETTER_SUCCESS_MESSAGE
                } else {
                    FORM_SUCCESS_MESSAGE
                };
                self.toast(page, message, ToastKind::Success);
            }
            (kind, Err(e)) => {
                tracing::warn!("{} submission failed: {}", kind.as_str(), Error::from(e.clone()));
                self.toast(page, FORM_FAILURE_MESSAGE, ToastKind::Error);
            }
        }

        self.analytics.track(
            &mut page.window,
            &AnalyticsEvent::FormSubmission {
                form: submission.kind.as_str().to_string(),
                success: outcome.is_ok(),
            },
        );
        self.submissions.finish(form);
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Advance virtual time by `ms`, running every task that comes due
    /// (including tasks scheduled by those tasks).
    pub fn advance(&mut self, page: &mut Page, ms: u64) {
        let deadline = self.scheduler.now() + ms;
        while let Some((handle, task)) = self.scheduler.next_due(deadline) {
            self.run_task(page, handle, task);
        }
        self.scheduler.finish_at(deadline);
    }

    fn run_task(&mut self, page: &mut Page, handle: TaskHandle, task: Task) {
        match task {
            Task::FocusChatInput => {
                if self.chat_focus == Some(handle) {
                    self.chat_focus = None;
                }
                if self.state.state().is_chat_open {
                    DomView::new(&mut page.document, &self.cache).focus(FocusTarget::ChatInput);
                }
            }
            Task::ResizeSettled => {
                self.resize_debounce.settle();
                self.on_resize_settled(page);
            }
            Task::ScrollSettled => {
                self.scroll_trailing = None;
                self.scroll_throttle.admit(self.scheduler.now());
                self.update_scroll(page);
            }
            Task::Delivery(id) => self.on_delivery(page, id),
            Task::ChatAutoClose => {
                if self.chat_auto_close == Some(handle) {
                    self.chat_auto_close = None;
                }
                self.close_chat(page);
                if let Some(status) = self.cache.chat_status {
                    feedback::clear_chat_status(&mut page.document, status);
                }
            }
            Task::HideToast(toast) => {
                feedback::hide_toast(&mut page.document, &mut self.scheduler, toast, self.config.toast_exit_ms);
            }
            Task::RemoveToast(toast) => feedback::remove_toast(&mut page.document, toast),
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Detach every listener, disconnect observers, cancel every timer and
    /// release the scroll lock. No application code runs afterwards.
    pub fn destroy(&mut self, page: &mut Page) {
        let detached = self.listeners.drain().len();
        for mut observer in [self.lazy_observer.take(), self.reveal_observer.take()]
            .into_iter()
            .flatten()
        {
            observer.disconnect();
        }
        self.resize_debounce.cancel(&mut self.scheduler);
        self.scheduler.clear();
        self.chat_focus = None;
        self.chat_auto_close = None;
        self.scroll_trailing = None;
        self.navigator.clear();
        self.scroll_throttle.reset();

        // Deliveries were cancelled along with the scheduler
        for form in self.submissions.clear() {
            feedback::set_busy(&mut page.document, form, false);
            if Some(form) == self.cache.chat_form {
                if let Some(status) = self.cache.chat_status {
                    feedback::clear_chat_status(&mut page.document, status);
                }
            }
        }
        let toasts = page.document.query_selector_all(".toast").unwrap_or_default();
        for toast in toasts {
            feedback::remove_toast(&mut page.document, toast);
        }

        self.state
            .release_scroll_lock(&mut DomView::new(&mut page.document, &self.cache));
        tracing::info!("Folio destroyed: {} listeners detached", detached);
    }
}

fn named_field(doc: &Document, form: NodeId, name: &str) -> Option<NodeId> {
    doc.query_selector_within(form, &format!("[name={name}]"))
        .ok()
        .flatten()
}
