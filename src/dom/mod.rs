//! Document boundary for script insertion and interaction listening.
//!
//! Non-wasm targets do not touch a real DOM; [`RecordedScriptHost`] mirrors the
//! appended elements and live listeners instead so hosts and tests can observe
//! what a browser document would have received. The `wasm-web` feature supplies
//! a real implementation in `platform::browser`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// The four first-interaction events that release a lazy-loaded script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Interaction {
    PointerMove,
    Scroll,
    Click,
    KeyDown,
}

impl Interaction {
    pub const ALL: [Interaction; 4] = [
        Interaction::PointerMove,
        Interaction::Scroll,
        Interaction::Click,
        Interaction::KeyDown,
    ];

    /// DOM event name the listener is registered under.
    pub fn event_name(self) -> &'static str {
        match self {
            Interaction::PointerMove => "mousemove",
            Interaction::Scroll => "scroll",
            Interaction::Click => "click",
            Interaction::KeyDown => "keydown",
        }
    }
}

/// Description of the script element the activation controller appends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptElement {
    pub src: String,
    pub defer: bool,
    /// Attributes in application order.
    pub attributes: Vec<(String, String)>,
}

impl ScriptElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }
}

pub type InteractionCallback = Arc<dyn Fn(Interaction) + Send + Sync>;

/// Capability over the document: append one script element to the head and
/// manage first-interaction listeners.
pub trait ScriptHost: Send + Sync {
    fn append_script(&self, script: &ScriptElement);

    /// Registers `callback` for `interaction`. Registering the same interaction
    /// twice replaces the previous listener.
    fn add_interaction_listener(&self, interaction: Interaction, callback: InteractionCallback);

    fn remove_interaction_listeners(&self, interactions: &[Interaction]);
}

/// Script-host mirror for non-wasm targets.
///
/// Records appended scripts and live listeners; `fire` simulates a user
/// interaction the way a browser would deliver one.
#[derive(Default)]
pub struct RecordedScriptHost {
    scripts: Mutex<Vec<ScriptElement>>,
    listeners: Mutex<BTreeMap<Interaction, InteractionCallback>>,
}

impl RecordedScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts(&self) -> Vec<ScriptElement> {
        self.scripts.lock().unwrap().clone()
    }

    pub fn script_count(&self) -> usize {
        self.scripts.lock().unwrap().len()
    }

    pub fn active_listeners(&self) -> Vec<Interaction> {
        self.listeners.lock().unwrap().keys().copied().collect()
    }

    /// Delivers `interaction` to its registered listener, if any. Returns
    /// whether a listener fired.
    pub fn fire(&self, interaction: Interaction) -> bool {
        let callback = self.listeners.lock().unwrap().get(&interaction).cloned();
        match callback {
            Some(callback) => {
                callback(interaction);
                true
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        self.scripts.lock().unwrap().clear();
        self.listeners.lock().unwrap().clear();
    }
}

impl ScriptHost for RecordedScriptHost {
    fn append_script(&self, script: &ScriptElement) {
        self.scripts.lock().unwrap().push(script.clone());
    }

    fn add_interaction_listener(&self, interaction: Interaction, callback: InteractionCallback) {
        let previous = self
            .listeners
            .lock()
            .unwrap()
            .insert(interaction, callback);
        if previous.is_some() {
            log::warn!(
                "replacing interaction listener for `{}`",
                interaction.event_name()
            );
        }
    }

    fn remove_interaction_listeners(&self, interactions: &[Interaction]) {
        let mut listeners = self.listeners.lock().unwrap();
        for interaction in interactions {
            listeners.remove(interaction);
        }
    }
}
