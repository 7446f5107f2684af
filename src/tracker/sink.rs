//! Handle to the global tracking object the injected collector script installs.
//!
//! Off-wasm there is no `window.umami`; the registry holds an optional sink so
//! hosts and tests can bridge one in. While no sink is installed, every
//! tracking call is a silent no-op.

use std::sync::{Arc, LazyLock, Mutex};

use crate::tracker::pageview::{EventData, PageviewData};

/// The tracking object's call surface.
pub trait TrackingSink: Send + Sync {
    /// `track()` with no arguments: record the current page with its defaults.
    fn track_default(&self);

    fn track_event(&self, name: &str, data: Option<&EventData>);

    fn track_pageview(&self, payload: &PageviewData);

    fn identify(&self, id: &str);
}

#[derive(Default)]
pub struct TrackerRegistry {
    sink: Mutex<Option<Arc<dyn TrackingSink>>>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, sink: Arc<dyn TrackingSink>) {
        let mut guard = self.sink.lock().unwrap();
        if guard.is_some() {
            log::warn!("replacing previously installed tracking sink");
        }
        *guard = Some(sink);
    }

    pub fn clear(&self) {
        self.sink.lock().unwrap().take();
    }

    pub fn sink(&self) -> Option<Arc<dyn TrackingSink>> {
        self.sink.lock().unwrap().clone()
    }
}

/// Process-wide registry, shared by every facade built with `Umami::new`.
#[derive(Clone)]
pub struct GlobalTrackerRegistry(Arc<TrackerRegistry>);

impl GlobalTrackerRegistry {
    pub fn shared() -> Self {
        static INSTANCE: LazyLock<Arc<TrackerRegistry>> =
            LazyLock::new(|| Arc::new(TrackerRegistry::new()));
        Self(INSTANCE.clone())
    }

    pub fn inner(&self) -> &TrackerRegistry {
        &self.0
    }

    pub fn handle(&self) -> Arc<TrackerRegistry> {
        Arc::clone(&self.0)
    }
}
