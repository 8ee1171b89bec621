//! Host capability probe
//!
//! Optional platform APIs are detected once at startup and recorded here;
//! the rest of the layer branches on this record instead of probing.

use folio_dom::Window;
use serde::Serialize;

/// Optional APIs the host exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub network_information: bool,
    pub service_worker: bool,
    pub match_media: bool,
    pub smooth_scroll: bool,
}

impl Capabilities {
    pub fn probe(window: &Window) -> Self {
        let features = window.features;
        let caps = Self {
            intersection_observer: features.intersection_observer,
            network_information: window.network.is_some(),
            service_worker: features.service_worker,
            match_media: features.match_media,
            smooth_scroll: features.smooth_scroll,
        };
        tracing::debug!("Capabilities: {:?}", caps);
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_dom::WindowFeatures;

    #[test]
    fn test_probe_modern_and_legacy() {
        let mut window = Window::new("https://example.com/");
        let modern = Capabilities::probe(&window);
        assert!(modern.intersection_observer && modern.network_information && modern.smooth_scroll);

        window.features = WindowFeatures::legacy();
        window.network = None;
        let legacy = Capabilities::probe(&window);
        assert_eq!(
            legacy,
            Capabilities {
                intersection_observer: false,
                network_information: false,
                service_worker: false,
                match_media: false,
                smooth_scroll: false,
            }
        );
    }
}
