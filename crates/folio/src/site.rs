//! Site context
//!
//! `Site` owns a page and, between [`Site::ready`] and [`Site::destroy`],
//! the [`App`] bound to it. Every public operation is a no-op outside that
//! window. The host helpers (`click`, `scroll_to`, `advance`, ...) drive
//! the page the way a browser would: mutate the window or document, then
//! dispatch the matching event.

use folio_dom::{ColorScheme, Event, MediaFeature, NetworkInformation, NodeId, Page, VisibilityState};

use crate::app::{App, DebugSnapshot};
use crate::config::Config;
use crate::state::WidgetState;
use crate::submission::{SimulatedTransport, Transport};
use crate::Result;

/// A page plus the behavior layer bound to it
pub struct Site {
    page: Page,
    config: Config,
    transport: Option<Box<dyn Transport>>,
    app: Option<App>,
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("url", &self.page.window.location())
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

impl Site {
    /// Validate `config` and hold on to the page until [`Site::ready`]
    pub fn new(page: Page, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            page,
            config,
            transport: None,
            app: None,
        })
    }

    /// Use `transport` instead of the simulated one
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Bootstrap the behavior layer. Returns false if it was already running.
    pub fn ready(&mut self) -> bool {
        if self.app.is_some() {
            tracing::debug!("Folio already initialized");
            return false;
        }
        let transport = self.transport.take().unwrap_or_else(|| {
            Box::new(SimulatedTransport::new(
                self.config.transport_min_delay_ms,
                self.config.transport_max_delay_ms,
                self.config.transport_seed,
            ))
        });
        let mut app = App::new(&mut self.page, self.config.clone(), transport);
        app.init(&mut self.page);
        self.app = Some(app);
        true
    }

    /// Tear the behavior layer down. A later [`Site::ready`] starts afresh.
    pub fn destroy(&mut self) {
        if let Some(mut app) = self.app.take() {
            app.destroy(&mut self.page);
            self.transport = Some(app.into_transport());
        }
    }

    pub fn is_ready(&self) -> bool {
        self.app.is_some()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn app(&self) -> Option<&App> {
        self.app.as_ref()
    }

    pub fn app_mut(&mut self) -> Option<&mut App> {
        self.app.as_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current widget state, while running
    pub fn state(&self) -> Option<&WidgetState> {
        self.app.as_ref().map(App::state)
    }

    fn with_app(&mut self, f: impl FnOnce(&mut App, &mut Page)) {
        if let Some(app) = self.app.as_mut() {
            f(app, &mut self.page);
        }
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    pub fn open_chat(&mut self) {
        self.with_app(App::open_chat);
    }

    pub fn close_chat(&mut self) {
        self.with_app(App::close_chat);
    }

    pub fn toggle_chat(&mut self) {
        self.with_app(App::toggle_chat);
    }

    pub fn open_nav(&mut self) {
        self.with_app(App::open_nav);
    }

    pub fn close_nav(&mut self) {
        self.with_app(App::close_nav);
    }

    pub fn toggle_nav(&mut self) {
        self.with_app(App::toggle_nav);
    }

    pub fn refresh(&mut self) {
        self.with_app(App::refresh);
    }

    pub fn scroll_to_section(&mut self, id: &str) -> bool {
        match self.app.as_mut() {
            Some(app) => app.scroll_to_section(&mut self.page, id),
            None => false,
        }
    }

    pub fn debug(&self) -> Option<DebugSnapshot> {
        self.app.as_ref().map(App::debug)
    }

    // ------------------------------------------------------------------
    // Host simulation
    // ------------------------------------------------------------------

    /// Dispatch `event` and return it, so callers can inspect whether the
    /// default action was prevented.
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        if let Some(app) = self.app.as_mut() {
            app.dispatch(&mut self.page, &mut event);
        }
        event
    }

    pub fn click(&mut self, node: NodeId) -> Event {
        self.dispatch(Event::click(node))
    }

    pub fn submit(&mut self, form: NodeId) -> Event {
        self.dispatch(Event::submit(form))
    }

    /// Replace a control's value and fire `input`
    pub fn type_into(&mut self, field: NodeId, value: &str) {
        self.page.document.set_value(field, value);
        self.dispatch(Event::input(field));
    }

    pub fn blur(&mut self, field: NodeId) {
        if self.page.document.active_element() == Some(field) {
            self.page.document.blur();
        }
        self.dispatch(Event::blur(field));
    }

    pub fn key(&mut self, key: &str) -> Event {
        self.dispatch(Event::key_down(key))
    }

    /// Jump the window to `y` and fire `scroll`
    pub fn scroll_to(&mut self, y: f64) {
        self.page.window.scroll_to(y, folio_dom::ScrollBehavior::Auto);
        self.dispatch(Event::scroll());
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.page.window.resize(width, height);
        self.dispatch(Event::resize());
    }

    pub fn set_visibility(&mut self, visibility: VisibilityState) {
        self.page.window.visibility = visibility;
        self.dispatch(Event::visibility_change());
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.page.window.media.color_scheme = scheme;
        self.dispatch(Event::media_change(MediaFeature::ColorScheme));
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.page.window.media.reduced_motion = reduced;
        self.dispatch(Event::media_change(MediaFeature::ReducedMotion));
    }

    pub fn set_connection(&mut self, network: NetworkInformation) {
        self.page.window.network = Some(network);
        self.dispatch(Event::connection_change());
    }

    /// Simulate an uncaught runtime error
    pub fn raise_error(&mut self, message: &str, stack: Option<&str>) {
        self.dispatch(Event::error(message, stack));
    }

    /// Simulate an unhandled promise rejection
    pub fn reject(&mut self, reason: &str) {
        self.dispatch(Event::unhandled_rejection(reason));
    }

    /// Let `ms` of virtual time pass
    pub fn advance(&mut self, ms: u64) {
        self.with_app(|app, page| app.advance(page, ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    fn site() -> Site {
        Site::new(demo::landing_page(), Config::default()).unwrap()
    }

    #[test]
    fn test_operations_before_ready_are_noops() {
        let mut site = site();
        site.open_chat();
        site.open_nav();
        assert!(!site.scroll_to_section("about"));
        assert!(site.debug().is_none());
        assert!(site.state().is_none());
        let panel = site.page().document.get_element_by_id("chat-panel").unwrap();
        assert!(!site.page().document.has_class(panel, "open"));
    }

    #[test]
    fn test_ready_is_idempotent() {
        let mut site = site();
        assert!(site.ready());
        let listeners = site.debug().unwrap().listeners;
        assert!(!site.ready());
        assert_eq!(site.debug().unwrap().listeners, listeners);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            transport_min_delay_ms: 5000,
            transport_max_delay_ms: 10,
            ..Config::default()
        };
        assert!(Site::new(demo::landing_page(), config).is_err());
    }

    #[test]
    fn test_dispatch_reports_prevented_default() {
        let mut site = site();
        site.ready();
        let toggle = site.page().document.get_element_by_id("nav-toggle").unwrap();
        assert!(site.click(toggle).is_default_prevented());
        assert!(site.state().unwrap().is_nav_open);
    }
}
