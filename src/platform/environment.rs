//! Runtime environment detection and configuration fallback lookup.

use std::collections::BTreeMap;

use crate::constants::{ENV_RUNTIME, PRODUCTION_ENV};

/// Capability supplying environment values to configuration resolution and
/// production gating. Hosts inject whichever source their deployment uses.
pub trait Environment: Send + Sync {
    /// Returns the raw value for `key` when the hosting environment supplies one.
    fn var(&self, key: &str) -> Option<String>;

    /// Name of the current runtime environment (`"production"`, `"development"`, ...).
    fn runtime_env(&self) -> String {
        self.var(ENV_RUNTIME).unwrap_or_default()
    }

    fn is_production(&self) -> bool {
        self.runtime_env() == PRODUCTION_ENV
    }
}

/// Environment backed by the hosting process.
///
/// Off-wasm this reads process variables. On wasm targets with the `wasm-web`
/// feature it probes a `__UMAMI_ENV__` object on the JS global scope, where
/// bundlers commonly inline build-time configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            std::env::var(key).ok()
        }

        #[cfg(target_arch = "wasm32")]
        {
            var_from_global(key)
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
fn var_from_global(key: &str) -> Option<String> {
    use wasm_bindgen::JsValue;

    let global = js_sys::global();
    let env = js_sys::Reflect::get(&global, &JsValue::from_str("__UMAMI_ENV__")).ok()?;
    if env.is_null() || env.is_undefined() {
        return None;
    }
    js_sys::Reflect::get(&env, &JsValue::from_str(key))
        .ok()?
        .as_string()
}

#[cfg(all(target_arch = "wasm32", not(feature = "wasm-web")))]
fn var_from_global(_key: &str) -> Option<String> {
    None
}

/// Environment backed by a fixed map, for hosts that source configuration from
/// somewhere other than process variables, and for tests.
#[derive(Clone, Debug, Default)]
pub struct StaticEnvironment {
    vars: BTreeMap<String, String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Shorthand for setting the runtime-environment name.
    pub fn with_runtime_env(self, name: impl Into<String>) -> Self {
        self.with_var(ENV_RUNTIME, name)
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
