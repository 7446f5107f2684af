/// Prefix applied to every diagnostic line.
pub const LOG_PREFIX: &str = "[Umami Analytics]";

/// Path of the collector script, appended to the configured base URL.
pub const SCRIPT_PATH: &str = "/script.js";

/// Environment fallbacks consulted when the corresponding parameter is absent.
pub const ENV_URL: &str = "UMAMI_URL";
pub const ENV_WEBSITE_ID: &str = "UMAMI_ID";
pub const ENV_DEBUG: &str = "UMAMI_DEBUG";
pub const ENV_LAZY_LOAD: &str = "UMAMI_LAZY_LOAD";

/// Runtime-environment name source and the value that enables activation when
/// production-only gating is on.
pub const ENV_RUNTIME: &str = "NODE_ENV";
pub const PRODUCTION_ENV: &str = "production";

/// Data attributes recognized by the collector script.
pub const WEBSITE_ID_ATTRIBUTE: &str = "data-website-id";
pub const DOMAINS_ATTRIBUTE: &str = "data-domains";
