#![cfg(all(target_arch = "wasm32", feature = "wasm-web"))]

use std::sync::Arc;

use umami_rs_sdk::activation::{ActivationState, UmamiAnalytics};
use umami_rs_sdk::config::UmamiProps;
use umami_rs_sdk::dom::{ScriptElement, ScriptHost};
use umami_rs_sdk::platform::browser::BrowserScriptHost;
use umami_rs_sdk::platform::environment::StaticEnvironment;
use umami_rs_sdk::tracker::Umami;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn script_tags() -> Vec<web_sys::Element> {
    let document = web_sys::window().unwrap().document().unwrap();
    let nodes = document.query_selector_all("script[data-website-id]").unwrap();
    (0..nodes.length())
        .filter_map(|index| nodes.get(index))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .collect()
}

#[wasm_bindgen_test]
fn append_script_writes_attributes_to_the_head() {
    let host = BrowserScriptHost;
    host.append_script(&ScriptElement {
        src: "https://stats.example.com/script.js".into(),
        defer: true,
        attributes: vec![("data-website-id".into(), "wasm-site".into())],
    });

    let tags = script_tags();
    assert!(tags
        .iter()
        .any(|tag| tag.get_attribute("data-website-id").as_deref() == Some("wasm-site")));
}

#[wasm_bindgen_test]
fn activation_against_the_real_document_injects_once() {
    let environment = StaticEnvironment::new().with_runtime_env("production");
    let analytics = UmamiAnalytics::new(Arc::new(BrowserScriptHost), Arc::new(environment));
    let props = UmamiProps::new()
        .with_url("https://stats.example.com")
        .with_website_id("wasm-activation");

    analytics.activate(&props);
    analytics.activate(&props);

    assert_eq!(analytics.state(), ActivationState::Injected);
    let matching = script_tags()
        .into_iter()
        .filter(|tag| tag.get_attribute("data-website-id").as_deref() == Some("wasm-activation"))
        .count();
    assert_eq!(matching, 1);
}

#[wasm_bindgen_test]
fn facade_without_window_umami_is_a_no_op() {
    // No collector script ran in this harness, so `window.umami` is absent.
    let umami = Umami::new();
    umami.track("smoke", None);
    umami.track_pageview(None);
    umami.identify("wasm-visitor");
}
