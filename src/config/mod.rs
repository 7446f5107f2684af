//! Configuration resolution: explicit parameters, environment fallbacks, and
//! built-in defaults merged into one immutable snapshot per activation.

use std::collections::BTreeMap;

use crate::constants::{ENV_DEBUG, ENV_LAZY_LOAD, ENV_URL, ENV_WEBSITE_ID};
use crate::error::{invalid_config, UmamiResult};
use crate::platform::environment::Environment;

/// Caller-supplied parameters; every field is optional and falls back to the
/// environment or a built-in default during resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UmamiProps {
    pub url: Option<String>,
    pub website_id: Option<String>,
    pub debug: Option<bool>,
    pub lazy_load: Option<bool>,
    pub only_in_production: Option<bool>,
    pub domains: Option<Vec<String>>,
    pub script_attributes: Option<BTreeMap<String, String>>,
}

impl UmamiProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_website_id(mut self, website_id: impl Into<String>) -> Self {
        self.website_id = Some(website_id.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn with_lazy_load(mut self, lazy_load: bool) -> Self {
        self.lazy_load = Some(lazy_load);
        self
    }

    pub fn with_only_in_production(mut self, only_in_production: bool) -> Self {
        self.only_in_production = Some(only_in_production);
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_script_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.script_attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// Immutable configuration snapshot, rebuilt on every resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UmamiConfig {
    pub url: String,
    pub website_id: String,
    pub debug: bool,
    pub lazy_load: bool,
    pub only_in_production: bool,
    pub domains: Option<Vec<String>>,
    pub script_attributes: Option<BTreeMap<String, String>>,
}

impl UmamiConfig {
    /// Both required fields carry a value.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> UmamiResult<()> {
        if self.url.is_empty() {
            return Err(invalid_config("UMAMI_URL is not set"));
        }
        if self.website_id.is_empty() {
            return Err(invalid_config("UMAMI_ID is not set"));
        }
        Ok(())
    }
}

/// Merges explicit props, environment fallbacks, and defaults into a snapshot.
///
/// Pure and infallible: absent required fields resolve to the empty string and
/// are rejected later by activation. Per-field precedence is explicit value,
/// then environment, then default. Boolean environment values must be the
/// literal string `"true"`; any other value (including `"TRUE"` or `"1"`) is
/// false.
pub fn resolve_config(props: &UmamiProps, environment: &dyn Environment) -> UmamiConfig {
    let env_string = |key: &str| environment.var(key).unwrap_or_default();
    let env_flag = |key: &str| environment.var(key).as_deref() == Some("true");

    UmamiConfig {
        url: props.url.clone().unwrap_or_else(|| env_string(ENV_URL)),
        website_id: props
            .website_id
            .clone()
            .unwrap_or_else(|| env_string(ENV_WEBSITE_ID)),
        debug: props.debug.unwrap_or_else(|| env_flag(ENV_DEBUG)),
        lazy_load: props.lazy_load.unwrap_or_else(|| env_flag(ENV_LAZY_LOAD)),
        only_in_production: props.only_in_production.unwrap_or(true),
        domains: props.domains.clone(),
        script_attributes: props.script_attributes.clone(),
    }
}
