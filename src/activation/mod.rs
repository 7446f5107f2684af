//! Activation controller: decides whether, when, and how the collector script
//! element is inserted into the document.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{resolve_config, UmamiConfig, UmamiProps};
use crate::constants::{DOMAINS_ATTRIBUTE, SCRIPT_PATH, WEBSITE_ID_ATTRIBUTE};
use crate::dom::{Interaction, InteractionCallback, ScriptElement, ScriptHost};
use crate::logger::Logger;
use crate::platform::environment::Environment;

/// Externally observable lifecycle state for the current configuration
/// generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationState {
    Idle,
    /// The configuration was missing its url or website id; terminal for this
    /// generation, re-evaluated on the next one.
    Invalid,
    /// Production-only gating vetoed activation; terminal for this generation.
    Suppressed,
    /// Lazy load armed, waiting on the first user interaction.
    Waiting,
    /// The script element has been appended; terminal.
    Injected,
}

/// Drop-in analytics component.
///
/// One instance per mounted component. The host delivers three lifecycle
/// events: `activate` on mount and on every configuration change, `teardown`
/// on unmount. Interaction events arrive through the callbacks registered on
/// the [`ScriptHost`]. The script element is appended at most once per
/// instance no matter how often activation re-runs.
#[derive(Clone)]
pub struct UmamiAnalytics {
    inner: Arc<AnalyticsInner>,
}

impl fmt::Debug for UmamiAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UmamiAnalytics")
            .field("state", &self.state())
            .field("has_injected", &self.has_injected())
            .finish()
    }
}

struct AnalyticsInner {
    dom: Arc<dyn ScriptHost>,
    environment: Arc<dyn Environment>,
    logger: Logger,
    state: Mutex<ActivationState>,
    has_injected: AtomicBool,
    config: Mutex<Option<UmamiConfig>>,
}

impl UmamiAnalytics {
    pub fn new(dom: Arc<dyn ScriptHost>, environment: Arc<dyn Environment>) -> Self {
        Self {
            inner: Arc::new(AnalyticsInner {
                dom,
                environment,
                logger: Logger::new(false),
                state: Mutex::new(ActivationState::Idle),
                has_injected: AtomicBool::new(false),
                config: Mutex::new(None),
            }),
        }
    }

    /// Component wired to the real browser document and the platform-default
    /// environment source (the `__UMAMI_ENV__` global on this target).
    #[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
    pub fn browser() -> Self {
        Self::new(
            Arc::new(crate::platform::browser::BrowserScriptHost),
            Arc::new(crate::platform::environment::ProcessEnvironment),
        )
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    pub fn state(&self) -> ActivationState {
        *self.inner.state.lock().unwrap()
    }

    pub fn has_injected(&self) -> bool {
        self.inner.has_injected.load(Ordering::SeqCst)
    }

    /// Configuration snapshot of the current generation.
    pub fn config(&self) -> Option<UmamiConfig> {
        self.inner.config.lock().unwrap().clone()
    }

    /// Re-evaluates activation for a (possibly changed) parameter set.
    ///
    /// Invoked by the host on mount and again on every configuration change. A
    /// pending lazy wait from the previous generation is cancelled before the
    /// new one is evaluated.
    pub fn activate(&self, props: &UmamiProps) {
        AnalyticsInner::activate(&self.inner, props);
    }

    /// Removes any pending interaction listeners. Invoked by the host on
    /// unmount; safe to call in any state.
    pub fn teardown(&self) {
        self.inner.cancel_pending_wait();
    }
}

impl AnalyticsInner {
    fn activate(inner: &Arc<Self>, props: &UmamiProps) {
        inner.cancel_pending_wait();

        let config = resolve_config(props, inner.environment.as_ref());
        inner.logger.set_debug(config.debug);

        if config.debug {
            inner.logger.warn("Debug mode is enabled");
            inner.logger.info(format!(
                "Configuration: {}",
                serde_json::json!({
                    "url": config.url,
                    "websiteId": config.website_id,
                    "lazyLoad": config.lazy_load,
                    "onlyInProduction": config.only_in_production,
                })
            ));
        }

        *inner.config.lock().unwrap() = Some(config.clone());

        if let Err(err) = config.validate() {
            inner.logger.error(err.to_string());
            inner
                .logger
                .warn("Invalid configuration, component will not load analytics");
            inner.set_state(ActivationState::Invalid);
            return;
        }

        if config.only_in_production && !inner.environment.is_production() {
            inner
                .logger
                .info("Skipping analytics outside the production environment");
            inner.set_state(ActivationState::Suppressed);
            return;
        }

        if config.lazy_load {
            inner.logger.info("Setting up lazy loading");
            inner.set_state(ActivationState::Waiting);
            Self::arm_lazy_wait(inner);
        } else {
            inner.logger.info("Loading analytics script immediately");
            inner.inject_script(&config);
        }
    }

    /// Registers all four interaction listeners, sharing one callback that
    /// releases the wait on whichever event fires first.
    fn arm_lazy_wait(inner: &Arc<Self>) {
        let weak = Arc::downgrade(inner);
        let callback: InteractionCallback = Arc::new(move |interaction| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_interaction(interaction);
            }
        });
        for interaction in Interaction::ALL {
            inner
                .dom
                .add_interaction_listener(interaction, Arc::clone(&callback));
        }
        inner.logger.info("Lazy loading setup completed");
    }

    fn handle_interaction(&self, interaction: Interaction) {
        {
            let mut state = self.state.lock().unwrap();
            if *state != ActivationState::Waiting {
                return;
            }
            // Leaving the wait; inject_script sets the terminal state.
            *state = ActivationState::Idle;
        }

        self.logger.info(format!(
            "First interaction ({}), loading analytics script",
            interaction.event_name()
        ));
        self.dom.remove_interaction_listeners(&Interaction::ALL);

        let config = self.config.lock().unwrap().clone();
        if let Some(config) = config {
            self.inject_script(&config);
        }
    }

    /// Appends the script element at most once per instance.
    fn inject_script(&self, config: &UmamiConfig) {
        if self.has_injected.swap(true, Ordering::SeqCst) {
            self.logger.info("Script already loaded, skipping");
            self.set_state(ActivationState::Injected);
            return;
        }

        let script = build_script_element(config);
        self.dom.append_script(&script);
        self.set_state(ActivationState::Injected);
        self.logger.info("Analytics script loaded successfully");
    }

    fn cancel_pending_wait(&self) {
        let was_waiting = {
            let mut state = self.state.lock().unwrap();
            if *state == ActivationState::Waiting {
                *state = ActivationState::Idle;
                true
            } else {
                false
            }
        };
        if was_waiting {
            self.dom.remove_interaction_listeners(&Interaction::ALL);
        }
    }

    fn set_state(&self, next: ActivationState) {
        *self.state.lock().unwrap() = next;
    }
}

fn build_script_element(config: &UmamiConfig) -> ScriptElement {
    let mut attributes = vec![(WEBSITE_ID_ATTRIBUTE.to_string(), config.website_id.clone())];

    if let Some(domains) = &config.domains {
        if !domains.is_empty() {
            attributes.push((DOMAINS_ATTRIBUTE.to_string(), domains.join(",")));
        }
    }

    if let Some(extra) = &config.script_attributes {
        for (name, value) in extra {
            attributes.push((name.clone(), value.clone()));
        }
    }

    ScriptElement {
        src: format!("{}{}", config.url, SCRIPT_PATH),
        defer: true,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::RecordedScriptHost;
    use crate::logger::LogLevel;
    use crate::platform::environment::StaticEnvironment;
    use std::sync::Mutex as StdMutex;

    fn production_env() -> StaticEnvironment {
        StaticEnvironment::new().with_runtime_env("production")
    }

    fn component(env: StaticEnvironment) -> (UmamiAnalytics, Arc<RecordedScriptHost>) {
        let dom = Arc::new(RecordedScriptHost::new());
        let analytics = UmamiAnalytics::new(Arc::clone(&dom) as Arc<dyn ScriptHost>, Arc::new(env));
        (analytics, dom)
    }

    fn valid_props() -> UmamiProps {
        UmamiProps::new()
            .with_url("https://stats.example.com")
            .with_website_id("site-1")
    }

    #[test]
    fn missing_url_or_website_id_never_injects() {
        for props in [
            UmamiProps::new(),
            UmamiProps::new().with_website_id("site-1"),
            UmamiProps::new().with_url("https://stats.example.com"),
        ] {
            let (analytics, dom) = component(production_env());
            analytics.activate(&props);

            assert_eq!(analytics.state(), ActivationState::Invalid);
            assert_eq!(dom.script_count(), 0);
            assert!(!analytics.has_injected());
        }
    }

    #[test]
    fn invalid_config_logs_error_only_when_debug_is_on() {
        let (analytics, _dom) = component(production_env());
        let records = Arc::new(StdMutex::new(Vec::new()));
        let handler_records = Arc::clone(&records);
        analytics.logger().set_log_handler(move |level, message| {
            handler_records
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        });

        analytics.activate(&UmamiProps::new());
        assert!(records.lock().unwrap().is_empty());

        analytics.activate(&UmamiProps::new().with_debug(true));
        let stored = records.lock().unwrap();
        assert!(stored
            .iter()
            .any(|(level, message)| *level == LogLevel::Error
                && message.contains("UMAMI_URL is not set")));
    }

    #[test]
    fn non_production_environment_suppresses_activation() {
        for runtime in ["development", "test", "staging", ""] {
            let env = StaticEnvironment::new().with_runtime_env(runtime);
            let (analytics, dom) = component(env);

            analytics.activate(&valid_props());

            assert_eq!(analytics.state(), ActivationState::Suppressed);
            assert_eq!(dom.script_count(), 0);
        }
    }

    #[test]
    fn only_in_production_false_injects_anywhere() {
        let env = StaticEnvironment::new().with_runtime_env("development");
        let (analytics, dom) = component(env);

        analytics.activate(&valid_props().with_only_in_production(false));

        assert_eq!(analytics.state(), ActivationState::Injected);
        assert_eq!(dom.script_count(), 1);
    }

    #[test]
    fn eager_activation_appends_one_script_synchronously() {
        let (analytics, dom) = component(production_env());

        analytics.activate(&valid_props());

        let scripts = dom.scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].src, "https://stats.example.com/script.js");
        assert!(scripts[0].defer);
        assert_eq!(scripts[0].attribute("data-website-id"), Some("site-1"));
        assert!(analytics.has_injected());
        assert_eq!(analytics.state(), ActivationState::Injected);
    }

    #[test]
    fn repeated_activation_is_idempotent() {
        let (analytics, dom) = component(production_env());

        analytics.activate(&valid_props());
        analytics.activate(&valid_props());

        assert_eq!(dom.script_count(), 1);
        assert_eq!(analytics.state(), ActivationState::Injected);
    }

    #[test]
    fn explicit_url_prop_overrides_environment_value() {
        let env = production_env()
            .with_var("UMAMI_URL", "https://env.example.com")
            .with_var("UMAMI_ID", "env-site");
        let (analytics, dom) = component(env);

        analytics.activate(&UmamiProps::new().with_url("https://prop.example.com"));

        let scripts = dom.scripts();
        assert_eq!(scripts[0].src, "https://prop.example.com/script.js");
        assert_eq!(scripts[0].attribute("data-website-id"), Some("env-site"));
    }

    #[test]
    fn domains_attribute_is_comma_joined_or_omitted() {
        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props().with_domains(["a.com", "b.com"]));
        assert_eq!(
            dom.scripts()[0].attribute("data-domains"),
            Some("a.com,b.com")
        );

        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props().with_domains(Vec::<String>::new()));
        assert_eq!(dom.scripts()[0].attribute("data-domains"), None);
    }

    #[test]
    fn custom_script_attributes_are_applied_verbatim() {
        let (analytics, dom) = component(production_env());

        analytics.activate(
            &valid_props()
                .with_script_attribute("data-cache", "true")
                .with_script_attribute("data-host-url", "https://proxy.example.com"),
        );

        let scripts = dom.scripts();
        assert_eq!(scripts[0].attribute("data-cache"), Some("true"));
        assert_eq!(
            scripts[0].attribute("data-host-url"),
            Some("https://proxy.example.com")
        );
    }

    #[test]
    fn lazy_activation_waits_for_the_first_interaction() {
        let (analytics, dom) = component(production_env());

        analytics.activate(&valid_props().with_lazy_load(true));

        assert_eq!(analytics.state(), ActivationState::Waiting);
        assert_eq!(dom.script_count(), 0);
        assert_eq!(dom.active_listeners().len(), 4);

        assert!(dom.fire(Interaction::Scroll));

        assert_eq!(dom.script_count(), 1);
        assert_eq!(analytics.state(), ActivationState::Injected);
        assert!(dom.active_listeners().is_empty());
    }

    #[test]
    fn remaining_interactions_do_not_inject_again() {
        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props().with_lazy_load(true));

        assert!(dom.fire(Interaction::KeyDown));
        for interaction in Interaction::ALL {
            dom.fire(interaction);
        }

        assert_eq!(dom.script_count(), 1);
    }

    #[test]
    fn each_interaction_kind_releases_the_wait() {
        for interaction in Interaction::ALL {
            let (analytics, dom) = component(production_env());
            analytics.activate(&valid_props().with_lazy_load(true));

            assert!(dom.fire(interaction));
            assert_eq!(dom.script_count(), 1, "{interaction:?} must inject");
            assert!(dom.active_listeners().is_empty());
        }
    }

    #[test]
    fn configuration_change_while_waiting_restarts_evaluation() {
        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props().with_lazy_load(true));
        assert_eq!(dom.active_listeners().len(), 4);

        // New generation without lazy load: old wait is torn down first.
        analytics.activate(&valid_props());

        assert_eq!(dom.script_count(), 1);
        assert!(dom.active_listeners().is_empty());
        assert!(!dom.fire(Interaction::Click));
        assert_eq!(dom.script_count(), 1);
    }

    #[test]
    fn configuration_change_to_invalid_tears_down_the_wait() {
        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props().with_lazy_load(true));

        analytics.activate(&UmamiProps::new());

        assert_eq!(analytics.state(), ActivationState::Invalid);
        assert!(dom.active_listeners().is_empty());
        assert_eq!(dom.script_count(), 0);
    }

    #[test]
    fn teardown_removes_pending_listeners() {
        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props().with_lazy_load(true));

        analytics.teardown();

        assert!(dom.active_listeners().is_empty());
        assert_eq!(dom.script_count(), 0);
        assert!(!analytics.has_injected());

        // Teardown in a terminal state is a no-op.
        analytics.teardown();
        assert_eq!(dom.script_count(), 0);
    }

    #[test]
    fn reactivation_after_injection_never_appends_twice() {
        let (analytics, dom) = component(production_env());
        analytics.activate(&valid_props());
        assert_eq!(dom.script_count(), 1);

        // Lazy generation armed after injection resolves to the logged no-op.
        analytics.activate(&valid_props().with_lazy_load(true));
        assert_eq!(analytics.state(), ActivationState::Waiting);
        dom.fire(Interaction::Click);

        assert_eq!(dom.script_count(), 1);
        assert_eq!(analytics.state(), ActivationState::Injected);
    }

    #[test]
    fn debug_mode_announces_itself_and_dumps_configuration() {
        let (analytics, _dom) = component(production_env());
        let records = Arc::new(StdMutex::new(Vec::new()));
        let handler_records = Arc::clone(&records);
        analytics.logger().set_log_handler(move |level, message| {
            handler_records
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        });

        analytics.activate(&valid_props().with_debug(true));

        let stored = records.lock().unwrap();
        assert!(stored
            .iter()
            .any(|(level, message)| *level == LogLevel::Warn
                && message == "Debug mode is enabled"));
        assert!(stored
            .iter()
            .any(|(_, message)| message.contains("Configuration:")
                && message.contains("site-1")));
    }
}
