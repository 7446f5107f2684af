mod facade;
mod pageview;
mod sink;

pub use facade::{Umami, UtmFetcher};
pub use pageview::{EventData, PageviewData};
pub use sink::{GlobalTrackerRegistry, TrackerRegistry, TrackingSink};
