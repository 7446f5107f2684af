//! Rust port of the Umami browser analytics integration.
//!
//! The crate keeps the original split between a drop-in activation component
//! and a programmatic tracking facade. [`activation::UmamiAnalytics`] decides
//! whether, when, and how the remote collector script element is appended to
//! the document head: configuration is resolved from explicit parameters with
//! environment fallbacks, activation is gated to production by default, and
//! lazy loading defers insertion until the first user interaction.
//! [`tracker::Umami`] forwards custom events, pageviews, and identity calls to
//! the global tracking object the injected script installs, silently no-opping
//! while that object is absent.
//!
//! The document, the hosting environment, and the tracking global sit behind
//! capability traits. Non-browser targets substitute recorded mirrors for the
//! real DOM; the `wasm-web` feature supplies `web-sys` implementations for
//! actual browsers.

pub mod activation;
pub mod config;
pub mod constants;
pub mod dom;
pub mod error;
pub mod logger;
pub mod platform;
pub mod tracker;
