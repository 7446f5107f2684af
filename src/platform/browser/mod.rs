//! Browser implementations backed by `web-sys`.
//!
//! Compiled only for wasm targets with the `wasm-web` feature. Each type is
//! zero-sized and resolves the window, document, and tracking global at call
//! time, so a page that has not finished loading (or a partially shaped
//! `window.umami`) degrades to silent no-ops instead of faulting.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::dom::{Interaction, InteractionCallback, ScriptElement, ScriptHost};
use crate::platform::page::PageContext;
use crate::tracker::{EventData, GlobalTrackerRegistry, PageviewData, TrackingSink};

fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

fn document() -> Option<web_sys::Document> {
    window()?.document()
}

/// Live document location, title, and referrer.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserPage;

impl PageContext for BrowserPage {
    fn url(&self) -> String {
        let Some(window) = window() else {
            return String::new();
        };
        let location = window.location();
        let pathname = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        format!("{pathname}{search}")
    }

    fn title(&self) -> String {
        document().map(|document| document.title()).unwrap_or_default()
    }

    fn referrer(&self) -> String {
        document()
            .map(|document| document.referrer())
            .unwrap_or_default()
    }
}

thread_local! {
    // Closures must stay alive until removed; keyed by event name so the same
    // reference can be detached again.
    static LISTENERS: RefCell<BTreeMap<&'static str, Closure<dyn FnMut(web_sys::Event)>>> =
        RefCell::new(BTreeMap::new());
}

/// Appends real script elements to the document head and wires interaction
/// listeners through `addEventListener`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScriptHost;

impl ScriptHost for BrowserScriptHost {
    fn append_script(&self, script: &ScriptElement) {
        let Some(document) = document() else {
            log::warn!("no document available, dropping script element");
            return;
        };
        let Some(head) = document.head() else {
            log::warn!("document has no head, dropping script element");
            return;
        };
        let Ok(element) = document.create_element("script") else {
            return;
        };

        let _ = element.set_attribute("src", &script.src);
        if script.defer {
            let _ = element.set_attribute("defer", "");
        }
        for (name, value) in &script.attributes {
            let _ = element.set_attribute(name, value);
        }
        let _ = head.append_child(&element);
    }

    fn add_interaction_listener(&self, interaction: Interaction, callback: InteractionCallback) {
        let Some(document) = document() else {
            return;
        };
        let name = interaction.event_name();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            callback(interaction);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let options = web_sys::AddEventListenerOptions::new();
        options.set_once(true);
        let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &options,
        );
        LISTENERS.with(|cell| {
            cell.borrow_mut().insert(name, closure);
        });
    }

    fn remove_interaction_listeners(&self, interactions: &[Interaction]) {
        let Some(document) = document() else {
            return;
        };
        LISTENERS.with(|cell| {
            let mut listeners = cell.borrow_mut();
            for interaction in interactions {
                let name = interaction.event_name();
                if let Some(closure) = listeners.remove(name) {
                    let _ = document
                        .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
                }
            }
        });
    }
}

/// Bridges tracking calls to `window.umami`.
///
/// The global and the specific member are re-probed on every call with a
/// function-type check, matching the degrade-per-member behavior of the
/// script's own consumers.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowTracker;

impl WindowTracker {
    fn member(name: &str) -> Option<(JsValue, js_sys::Function)> {
        let window = window()?;
        let umami = js_sys::Reflect::get(&window, &JsValue::from_str("umami")).ok()?;
        if umami.is_null() || umami.is_undefined() {
            return None;
        }
        let member = js_sys::Reflect::get(&umami, &JsValue::from_str(name)).ok()?;
        let function = member.dyn_into::<js_sys::Function>().ok()?;
        Some((umami, function))
    }

    fn to_js<T: serde::Serialize>(payload: &T) -> Option<JsValue> {
        let json = serde_json::to_string(payload).ok()?;
        js_sys::JSON::parse(&json).ok()
    }
}

impl TrackingSink for WindowTracker {
    fn track_default(&self) {
        if let Some((umami, track)) = Self::member("track") {
            let _ = track.call0(&umami);
        }
    }

    fn track_event(&self, name: &str, data: Option<&EventData>) {
        let Some((umami, track)) = Self::member("track") else {
            return;
        };
        let event_name = JsValue::from_str(name);
        let _ = match data.and_then(Self::to_js) {
            Some(data) => track.call2(&umami, &event_name, &data),
            None => track.call1(&umami, &event_name),
        };
    }

    fn track_pageview(&self, payload: &PageviewData) {
        if let Some((umami, track)) = Self::member("track") {
            if let Some(payload) = Self::to_js(payload) {
                let _ = track.call1(&umami, &payload);
            }
        }
    }

    fn identify(&self, id: &str) {
        if let Some((umami, identify)) = Self::member("identify") {
            let _ = identify.call1(&umami, &JsValue::from_str(id));
        }
    }
}

/// Installs the `window.umami` bridge as the shared tracking sink.
pub fn install_window_tracker() {
    GlobalTrackerRegistry::shared()
        .inner()
        .install(Arc::new(WindowTracker));
}
