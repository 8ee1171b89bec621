//! Folio - client-side behavior layer for a marketing site
//!
//! Wires a static landing page into an interactive one: navigation and the
//! support-chat widget, form validation and submission, scroll effects,
//! lazy images and entrance animations, and a clean teardown.
//!
//! # Example
//! ```rust,ignore
//! use folio::{Config, Site, demo};
//!
//! let mut site = Site::new(demo::landing_page(), Config::default())?;
//! site.ready();
//! site.open_chat();
//! site.advance(300);
//! ```

mod error;

pub mod analytics;
pub mod app;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod demo;
pub mod events;
pub mod feedback;
pub mod logging;
pub mod navigation;
pub mod observers;
pub mod reporting;
pub mod scheduler;
pub mod sections;
pub mod site;
pub mod state;
pub mod submission;
pub mod util;
pub mod validation;
pub mod view;

pub use app::{App, DebugSnapshot};
pub use capabilities::Capabilities;
pub use config::{Config, FeatureFlags};
pub use error::{Error, Result, TransportError};
pub use site::Site;
pub use state::WidgetState;
pub use submission::{SimulatedTransport, Transport};
pub use util::DeviceType;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
