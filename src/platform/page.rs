//! Capability describing the page a tracking call is made from.

use std::sync::Mutex;

/// Source of the current page's location, title, and referrer.
///
/// Implementations read live values at call time; pageview payloads must never
/// carry values cached at mount time.
pub trait PageContext: Send + Sync {
    /// Current path plus query string.
    fn url(&self) -> String;

    fn title(&self) -> String;

    fn referrer(&self) -> String;
}

#[derive(Clone, Debug, Default)]
struct PageState {
    url: String,
    title: String,
    referrer: String,
}

/// Page mirror for non-browser targets.
///
/// Where no document exists, hosts (and tests) set the values a real document
/// would supply; all accessors default to the empty string.
#[derive(Debug, Default)]
pub struct StaticPage {
    state: Mutex<PageState>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.state.lock().unwrap().url = url.into();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().unwrap().title = title.into();
    }

    pub fn set_referrer(&self, referrer: impl Into<String>) {
        self.state.lock().unwrap().referrer = referrer.into();
    }
}

impl PageContext for StaticPage {
    fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    fn title(&self) -> String {
        self.state.lock().unwrap().title.clone()
    }

    fn referrer(&self) -> String {
        self.state.lock().unwrap().referrer.clone()
    }
}
