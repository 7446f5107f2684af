use std::sync::Arc;

use async_trait::async_trait;

use crate::error::UmamiResult;
use crate::logger::Logger;
use crate::platform::page::PageContext;
use crate::tracker::pageview::{EventData, PageviewData};
use crate::tracker::sink::{GlobalTrackerRegistry, TrackerRegistry};

/// Supplies UTM attribution fields for a campaign identifier.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait UtmFetcher: Send + Sync {
    async fn fetch(&self, utm_id: &str) -> UmamiResult<PageviewData>;
}

/// Stateless tracking facade.
///
/// Forwards events, pageviews, and identity calls to whichever tracking sink is
/// installed at call time; with none installed, every call completes silently.
/// Page location, title, and referrer are read when a call is made, never
/// cached.
#[derive(Clone)]
pub struct Umami {
    registry: Arc<TrackerRegistry>,
    page: Arc<dyn PageContext>,
    logger: Logger,
}

impl Umami {
    /// Facade wired to the shared registry and the platform default page.
    pub fn new() -> Self {
        Self::with_page(default_page())
    }

    pub fn with_page(page: Arc<dyn PageContext>) -> Self {
        Self {
            registry: GlobalTrackerRegistry::shared().handle(),
            page,
            logger: Logger::new(false),
        }
    }

    /// Fully capability-injected constructor for hosts and tests.
    pub fn with_capabilities(
        registry: Arc<TrackerRegistry>,
        page: Arc<dyn PageContext>,
        logger: Logger,
    ) -> Self {
        Self {
            registry,
            page,
            logger,
        }
    }

    /// Forwards a custom event.
    pub fn track(&self, event_name: &str, event_data: Option<EventData>) {
        if let Some(sink) = self.registry.sink() {
            sink.track_event(event_name, event_data.as_ref());
        }
    }

    /// Records a page view.
    ///
    /// With no data (or an empty payload) the sink is invoked with zero
    /// arguments, signalling "use current page defaults". Otherwise the caller
    /// data is laid over a call-time snapshot of the page, caller fields
    /// winning on collision.
    pub fn track_pageview(&self, data: Option<PageviewData>) {
        let Some(sink) = self.registry.sink() else {
            return;
        };
        match data {
            Some(data) if !data.is_empty() => {
                let payload = PageviewData::current(self.page.as_ref()).merged_with(&data);
                sink.track_pageview(&payload);
            }
            _ => sink.track_default(),
        }
    }

    /// Records a page view carrying explicit UTM parameters; `additional_data`
    /// wins over `utm_params`, which wins over the page defaults.
    pub fn track_pageview_with_utm(
        &self,
        utm_params: PageviewData,
        additional_data: Option<PageviewData>,
    ) {
        let mut payload = PageviewData::current(self.page.as_ref()).merged_with(&utm_params);
        if let Some(additional) = &additional_data {
            payload = payload.merged_with(additional);
        }
        self.track_pageview(Some(payload));
    }

    /// Records a page view whose UTM attribution is fetched asynchronously.
    ///
    /// Override priority, increasing: page defaults, `utm_id`, fetched fields,
    /// `additional_data`. A failed fetch is logged (regardless of the debug
    /// flag) and degrades to a `utm_id`-plus-`additional_data` pageview; the
    /// failure never reaches the caller.
    pub async fn track_pageview_async(
        &self,
        utm_id: &str,
        fetcher: &dyn UtmFetcher,
        additional_data: Option<PageviewData>,
    ) {
        match fetcher.fetch(utm_id).await {
            Ok(utm_data) => {
                let mut payload = PageviewData::current(self.page.as_ref());
                payload.utm_id = Some(utm_id.to_string());
                payload = payload.merged_with(&utm_data);
                if let Some(additional) = &additional_data {
                    payload = payload.merged_with(additional);
                }
                self.track_pageview(Some(payload));
            }
            Err(err) => {
                self.logger
                    .error_always(format!("Error fetching UTM data: {err}"));
                let mut fallback = PageviewData::new().with_utm_id(utm_id);
                if let Some(additional) = &additional_data {
                    fallback = fallback.merged_with(additional);
                }
                self.track_pageview(Some(fallback));
            }
        }
    }

    /// Forwards a visitor identity.
    pub fn identify(&self, unique_id: &str) {
        if let Some(sink) = self.registry.sink() {
            sink.identify(unique_id);
        }
    }
}

impl Default for Umami {
    fn default() -> Self {
        Self::new()
    }
}

fn default_page() -> Arc<dyn PageContext> {
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    {
        Arc::new(crate::platform::browser::BrowserPage)
    }

    #[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
    {
        Arc::new(crate::platform::page::StaticPage::new())
    }
}
