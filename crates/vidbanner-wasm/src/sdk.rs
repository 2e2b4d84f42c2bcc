//! Browser SDK bindings
//!
//! Implements the core SDK seams against the page globals `Vimeo.Player`
//! (player.js) and `YT.Player` (YouTube IFrame API). JS exceptions are
//! caught and surfaced as [`SdkError`] or logged, never rethrown.

use js_sys::{Array, Function, Object, Reflect};
use std::collections::HashMap;
use tracing::{debug, warn};
use vidbanner_core::embed::YOUTUBE_IFRAME_API_URL;
use vidbanner_core::sdk::{
    SdkCallback, TargetRef, VimeoEvent, VimeoPlayer, VimeoSdk, YouTubeEvents, YouTubePlayer,
    YouTubePlayerState, YouTubeSdk,
};
use vidbanner_core::{ProviderKind, SdkError, YouTubePlayerOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Node};

/// Global the IFrame API calls once it has loaded
const READY_HOOK: &str = "onYouTubeIframeAPIReady";

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn sdk_error(provider: ProviderKind, value: &JsValue) -> SdkError {
    SdkError::new(provider, js_message(value))
}

/// Resolve a dotted path on the global object; undefined if any link is missing
fn lookup(path: &[&str]) -> Result<JsValue, JsValue> {
    let mut value: JsValue = js_sys::global().into();
    for key in path {
        if value.is_undefined() || value.is_null() {
            return Ok(JsValue::UNDEFINED);
        }
        value = Reflect::get(&value, &JsValue::from_str(key))?;
    }
    Ok(value)
}

fn constructor(provider: ProviderKind, path: &[&str]) -> Result<Function, SdkError> {
    lookup(path)
        .map_err(|e| sdk_error(provider, &e))?
        .dyn_into::<Function>()
        .map_err(|_| SdkError::new(provider, format!("{} is not loaded", path.join("."))))
}

/// Both SDK constructors accept an element id
fn mount_point(provider: ProviderKind, target: &TargetRef) -> Result<JsValue, SdkError> {
    target
        .element_id()
        .map(|id| JsValue::from_str(&id))
        .ok_or_else(|| SdkError::new(provider, format!("{} has no element id", target.describe())))
}

fn call_method(object: &JsValue, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let method: Function = Reflect::get(object, &JsValue::from_str(name))?.dyn_into()?;
    method.apply(object, args)
}

// =============================================================================
// Vimeo
// =============================================================================

/// `Vimeo.Player` from player.js
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserVimeoSdk;

impl VimeoSdk for BrowserVimeoSdk {
    fn create_player(&self, target: &TargetRef) -> Result<Box<dyn VimeoPlayer>, SdkError> {
        let ctor = constructor(ProviderKind::Vimeo, &["Vimeo", "Player"])?;
        let element = mount_point(ProviderKind::Vimeo, target)?;
        let player = Reflect::construct(&ctor, &Array::of1(&element))
            .map_err(|e| sdk_error(ProviderKind::Vimeo, &e))?;

        Ok(Box::new(BrowserVimeoPlayer {
            player,
            handlers: HashMap::new(),
        }))
    }
}

/// A live `Vimeo.Player`; owns the closures it registered
struct BrowserVimeoPlayer {
    player: JsValue,
    handlers: HashMap<VimeoEvent, Vec<Closure<dyn FnMut()>>>,
}

impl VimeoPlayer for BrowserVimeoPlayer {
    fn on(&mut self, event: VimeoEvent, callback: SdkCallback) {
        let closure = Closure::wrap(callback);
        let args = Array::of2(&JsValue::from_str(event.as_str()), closure.as_ref());
        match call_method(&self.player, "on", &args) {
            Ok(_) => self.handlers.entry(event).or_default().push(closure),
            Err(e) => warn!(event = event.as_str(), error = %js_message(&e), "Vimeo listener not registered"),
        }
    }

    fn off(&mut self, event: VimeoEvent) {
        let args = Array::of1(&JsValue::from_str(event.as_str()));
        if let Err(e) = call_method(&self.player, "off", &args) {
            warn!(event = event.as_str(), error = %js_message(&e), "Vimeo listener removal failed");
        }
        self.handlers.remove(&event);
    }
}

// =============================================================================
// YouTube
// =============================================================================

/// `YT.Player` from the YouTube IFrame API
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserYouTubeSdk;

/// Chain onto the page's ready hook so an existing one still runs
fn install_ready_hook(on_ready: Box<dyn FnOnce()>) -> Result<(), JsValue> {
    let global: JsValue = js_sys::global().into();
    let key = JsValue::from_str(READY_HOOK);
    let previous = Reflect::get(&global, &key)?.dyn_into::<Function>().ok();

    let hook = Closure::once_into_js(move || {
        if let Some(previous) = previous {
            if let Err(e) = previous.call0(&JsValue::NULL) {
                warn!(error = %js_message(&e), "Previous IFrame API ready hook threw");
            }
        }
        on_ready();
    });
    Reflect::set(&global, &key, &hook)?;
    Ok(())
}

/// Insert a `<script>` before the first script on the page
fn inject_script(src: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(src);
    script.set_async(true);

    let first = document.get_elements_by_tag_name("script").item(0);
    match first.and_then(|first| first.parent_node().map(|parent| (Node::from(first), parent))) {
        Some((first, parent)) => {
            parent.insert_before(&script, Some(&first))?;
        }
        None => {
            let root = document
                .document_element()
                .ok_or_else(|| JsValue::from_str("no document element"))?;
            root.append_child(&script)?;
        }
    }
    Ok(())
}

impl YouTubeSdk for BrowserYouTubeSdk {
    fn is_api_available(&self) -> bool {
        lookup(&["YT", "Player"])
            .map(|player| player.is_function())
            .unwrap_or(false)
    }

    fn request_api(&self, on_ready: Box<dyn FnOnce()>) {
        let requested = install_ready_hook(on_ready).and_then(|_| inject_script(YOUTUBE_IFRAME_API_URL));
        match requested {
            Ok(()) => debug!(url = YOUTUBE_IFRAME_API_URL, "IFrame API script injected"),
            Err(e) => warn!(error = %js_message(&e), "Could not request YouTube IFrame API"),
        }
    }

    fn create_player(
        &self,
        target: &TargetRef,
        options: YouTubePlayerOptions,
        events: YouTubeEvents,
    ) -> Result<Box<dyn YouTubePlayer>, SdkError> {
        let fail = |e: JsValue| sdk_error(ProviderKind::YouTube, &e);
        let ctor = constructor(ProviderKind::YouTube, &["YT", "Player"])?;
        let element = mount_point(ProviderKind::YouTube, target)?;
        let config = serde_wasm_bindgen::to_value(&options)
            .map_err(|e| SdkError::new(ProviderKind::YouTube, e.to_string()))?;

        let YouTubeEvents {
            mut on_ready,
            mut on_state_change,
        } = events;

        let ready = Closure::wrap(Box::new(move |_event: JsValue| on_ready()) as Box<dyn FnMut(JsValue)>);
        let state_change = Closure::wrap(Box::new(move |event: JsValue| {
            let code = Reflect::get(&event, &JsValue::from_str("data"))
                .ok()
                .and_then(|data| data.as_f64());
            match code.and_then(|code| YouTubePlayerState::from_code(code as i32)) {
                Some(state) => on_state_change(state),
                None => debug!(?code, "Unknown YouTube player state"),
            }
        }) as Box<dyn FnMut(JsValue)>);

        let handlers = Object::new();
        Reflect::set(&handlers, &JsValue::from_str("onReady"), ready.as_ref()).map_err(fail)?;
        Reflect::set(&handlers, &JsValue::from_str("onStateChange"), state_change.as_ref()).map_err(fail)?;
        Reflect::set(&config, &JsValue::from_str("events"), &handlers).map_err(fail)?;

        let player = Reflect::construct(&ctor, &Array::of2(&element, &config)).map_err(fail)?;

        Ok(Box::new(BrowserYouTubePlayer {
            player,
            _closures: YouTubeClosures {
                _ready: ready,
                _state_change: state_change,
            },
        }))
    }
}

/// Kept alive as long as the player can call them
struct YouTubeClosures {
    _ready: Closure<dyn FnMut(JsValue)>,
    _state_change: Closure<dyn FnMut(JsValue)>,
}

struct BrowserYouTubePlayer {
    player: JsValue,
    _closures: YouTubeClosures,
}

impl YouTubePlayer for BrowserYouTubePlayer {
    fn can_destroy(&self) -> bool {
        Reflect::get(&self.player, &JsValue::from_str("destroy"))
            .map(|destroy| destroy.is_function())
            .unwrap_or(false)
    }

    fn destroy(&mut self) {
        if let Err(e) = call_method(&self.player, "destroy", &Array::new()) {
            warn!(error = %js_message(&e), "YT.Player destroy threw");
        }
    }
}
