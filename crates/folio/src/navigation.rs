//! Navigation pub/sub
//!
//! In-page navigations go through [`Navigator::navigate`], which resolves
//! the target against the current location, pushes it onto the window
//! history and notifies subscribers.

use folio_dom::Window;
use url::Url;

use crate::{Error, Result};

/// A completed navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    pub from: String,
    pub to: String,
}

impl LocationChange {
    /// Fragment of the new location, without `#`
    pub fn fragment(&self) -> Option<&str> {
        self.to.split_once('#').map(|(_, f)| f).filter(|f| !f.is_empty())
    }
}

type Subscriber = Box<dyn FnMut(&LocationChange)>;

/// Location change notifier
#[derive(Default)]
pub struct Navigator {
    subscribers: Vec<(u64, Subscriber)>,
    next_id: u64,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; the returned id unsubscribes it
    pub fn subscribe(&mut self, callback: impl FnMut(&LocationChange) + 'static) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: u64) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Resolve `target` against the current location, push it and publish
    pub fn navigate(&mut self, window: &mut Window, target: &str) -> Result<LocationChange> {
        let from = window.location().to_string();
        let base = Url::parse(&from).map_err(|source| Error::Navigation {
            url: from.clone(),
            source,
        })?;
        let to = base.join(target).map_err(|source| Error::Navigation {
            url: target.to_string(),
            source,
        })?;

        window.history.push(to.as_str());
        let change = LocationChange {
            from,
            to: to.into(),
        };
        tracing::debug!("Navigated {} -> {}", change.from, change.to);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&change);
        }
        Ok(change)
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_navigate_publishes_and_pushes_history() {
        let mut window = Window::new("https://example.com/index.html");
        let mut navigator = Navigator::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        navigator.subscribe(move |change| sink.borrow_mut().push(change.to.clone()));

        let change = navigator.navigate(&mut window, "#about").unwrap();
        assert_eq!(change.to, "https://example.com/index.html#about");
        assert_eq!(change.fragment(), Some("about"));
        assert_eq!(window.location(), "https://example.com/index.html#about");
        assert_eq!(window.history.len(), 2);
        assert_eq!(seen.borrow().as_slice(), ["https://example.com/index.html#about"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut window = Window::new("https://example.com/");
        let mut navigator = Navigator::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = navigator.subscribe(move |_| *sink.borrow_mut() += 1);

        navigator.navigate(&mut window, "/pricing").unwrap();
        assert!(navigator.unsubscribe(id));
        navigator.navigate(&mut window, "/faq").unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_invalid_base_is_an_error() {
        let mut window = Window::new("not a url");
        let mut navigator = Navigator::new();
        assert!(matches!(
            navigator.navigate(&mut window, "#x"),
            Err(Error::Navigation { .. })
        ));
    }
}
