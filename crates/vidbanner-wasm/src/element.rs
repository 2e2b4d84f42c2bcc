//! VideoBannerElement - the banner as a JS class
//!
//! Renders the embed iframe and the loading overlay into a host container,
//! and re-styles them on every playback transition and viewport resize.
//! Title, logo and scroll control markup stay with the host, which can read
//! their styles from `styleJson()`.

use crate::sdk::{BrowserVimeoSdk, BrowserYouTubeSdk};
use crate::target::{BrowserSpawner, IframeTarget};
use js_sys::{Function, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use vidbanner_core::style::StyleBlock;
use vidbanner_core::{
    AspectRatio, BannerConfig, BannerStyle, HostCallbacks, LayoutFlags, LayoutObserver, LifecycleEvent,
    PlaybackState, ProviderKind, ProviderServices, ScrollAction, VideoBanner, VideoId, VideoSource,
    ViewportSize,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

pub(crate) fn to_js_error(e: vidbanner_core::Error) -> JsValue {
    js_sys::Error::new(&format!("[{}] {}", e.error_code(), e)).into()
}

fn apply(element: &Element, block: &StyleBlock) {
    element.set_attribute("style", &block.to_css()).ok();
}

/// Elements owned by one mount
struct BannerView {
    container: HtmlElement,
    target: Rc<IframeTarget>,
    overlay: HtmlElement,
    aspect: AspectRatio,
    background: String,
    flags: LayoutFlags,
    state: PlaybackState,
}

impl BannerView {
    fn render(&self) {
        let style = BannerStyle::compute(self.aspect, &self.background, self.state, self.flags);
        apply(&self.container, &style.container);
        apply(self.target.element(), &style.embed);
        apply(&self.overlay, &style.overlay);
    }

    fn remove(&self) {
        self.target.element().remove();
        self.overlay.remove();
    }
}

type ViewSlot = Rc<RefCell<Option<BannerView>>>;
type HookSlot = Rc<RefCell<Option<Function>>>;

fn js_function(object: Option<&Object>, name: &str) -> Option<Function> {
    let object = object?;
    Reflect::get(object, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn call_hook(name: &str, hook: &Function, arg: Option<&JsValue>) {
    let result = match arg {
        Some(arg) => hook.call1(&JsValue::NULL, arg),
        None => hook.call0(&JsValue::NULL),
    };
    if let Err(e) = result {
        warn!(hook = name, error = ?e, "Host callback threw");
    }
}

fn viewport_size() -> ViewportSize {
    let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32;
    match web_sys::window() {
        Some(window) => ViewportSize::new(dimension(window.inner_width()), dimension(window.inner_height())),
        None => ViewportSize::new(1920, 1080),
    }
}

fn scroll_to(id: &str) {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id));
    let Some(element) = element else {
        debug!(id, "Scroll target not found");
        return;
    };

    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Wire host callbacks: the loaded hook slot, optional JS handlers, and
/// view re-rendering on state changes
fn host_callbacks(callbacks: Option<&Object>, view: &ViewSlot, loaded: &HookSlot) -> HostCallbacks {
    let loaded = loaded.clone();
    let mut host = HostCallbacks::new().on_loaded(move || {
        let hook = loaded.borrow().clone();
        if let Some(hook) = hook {
            call_hook("onLoaded", &hook, None);
        }
    });

    if let Some(hook) = js_function(callbacks, "onScrollDown") {
        host = host.on_scroll_down(move || call_hook("onScrollDown", &hook, None));
    }

    let on_event = js_function(callbacks, "onEvent");
    let view = Rc::downgrade(view);
    host.on_event(move |event| {
        if let LifecycleEvent::StateChanged { to, .. } = event {
            if let Some(view) = view.upgrade() {
                if let Some(view) = view.borrow_mut().as_mut() {
                    view.state = *to;
                    view.render();
                }
            }
        }
        if let Some(hook) = &on_event {
            match serde_wasm_bindgen::to_value(event) {
                Ok(value) => call_hook("onEvent", hook, Some(&value)),
                Err(e) => warn!(error = %e, "Lifecycle event not serializable"),
            }
        }
    })
}

/// Background video banner bound to a DOM container
#[wasm_bindgen]
pub struct VideoBannerElement {
    banner: VideoBanner,
    layout: LayoutObserver,
    view: ViewSlot,
    loaded: HookSlot,
}

#[wasm_bindgen]
impl VideoBannerElement {
    /// `config` is a banner config object (`videoId`, `videoSource`, ...).
    /// `callbacks` may carry `onScrollDown` and `onEvent`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, callbacks: Option<Object>) -> Result<VideoBannerElement, JsValue> {
        // Through JSON so numeric ids keep their integer form
        let json: String = js_sys::JSON::stringify(&config)?.into();
        let config = BannerConfig::from_json(&json).map_err(to_js_error)?;

        let view: ViewSlot = Rc::new(RefCell::new(None));
        let loaded: HookSlot = Rc::new(RefCell::new(None));
        let host = host_callbacks(callbacks.as_ref(), &view, &loaded);
        let services = ProviderServices::new(
            Rc::new(BrowserVimeoSdk),
            Rc::new(BrowserYouTubeSdk),
            Rc::new(BrowserSpawner),
        );

        Ok(Self {
            banner: VideoBanner::new(config, services, host).map_err(to_js_error)?,
            layout: LayoutObserver::new(viewport_size()),
            view,
            loaded,
        })
    }

    /// Render into `container` and start loading the video
    #[wasm_bindgen]
    pub fn mount(&mut self, container: HtmlElement) -> Result<(), JsValue> {
        self.unmount();

        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container has no document"))?;
        let config = self.banner.config();
        let target = Rc::new(IframeTarget::create(&document, &config.title)?);
        let overlay: HtmlElement = document.create_element("div")?.dyn_into()?;
        container.append_child(target.element())?;
        container.append_child(&overlay)?;

        let view = BannerView {
            container,
            target: target.clone(),
            overlay,
            aspect: config.aspect().map_err(to_js_error)?,
            background: config.overlay().to_string(),
            flags: self.layout.flags(),
            state: PlaybackState::Uninitialized,
        };
        view.render();
        *self.view.borrow_mut() = Some(view);

        self.banner.mount(target).map_err(to_js_error)
    }

    /// Switch video; only an id or provider change reloads the player
    #[wasm_bindgen(js_name = setVideo)]
    pub fn set_video(&mut self, video_id: &str, video_source: &str) -> Result<(), JsValue> {
        let provider: ProviderKind = video_source.parse().map_err(to_js_error)?;
        let id = VideoId::new(video_id).map_err(to_js_error)?;
        let source = VideoSource::new(id, provider).with_loop(self.banner.source().loop_playback);
        self.banner.set_source(source).map_err(to_js_error)
    }

    /// Destroy the player and remove the rendered elements
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        self.banner.unmount();
        let view = self.view.borrow_mut().take();
        if let Some(view) = view {
            view.remove();
        }
    }

    /// "uninitialized", "loading", "playing" or "disposed"
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.banner.state().to_string()
    }

    /// Run the host scroll handler, or scroll the configured target into view
    #[wasm_bindgen(js_name = scrollDown)]
    pub fn scroll_down(&self) {
        if let ScrollAction::ScrollTo(id) = self.banner.scroll_down() {
            scroll_to(&id);
        }
    }

    /// Called once the provider reports the video loaded
    #[wasm_bindgen(js_name = onLoaded)]
    pub fn on_loaded(&self, callback: Option<Function>) {
        *self.loaded.borrow_mut() = callback;
    }

    /// Viewport resized; returns true when the layout changed
    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.layout.on_resize(ViewportSize::new(width, height)) {
            return false;
        }
        if let Some(view) = self.view.borrow_mut().as_mut() {
            view.flags = self.layout.flags();
            view.render();
        }
        true
    }

    /// Inline styles for every banner element as JSON
    #[wasm_bindgen(js_name = styleJson)]
    pub fn style_json(&self) -> String {
        self.banner.style(self.layout.flags()).to_json()
    }
}

impl Drop for VideoBannerElement {
    fn drop(&mut self) {
        self.unmount();
    }
}
