//! Vidbanner WASM - browser binding for background video banners
//!
//! Provides the browser side of the banner:
//! - Vimeo `player.js` and YouTube IFrame API bindings for the core SDK seams
//! - One-time IFrame API script injection
//! - An iframe embed surface and a microtask executor
//! - `VideoBannerElement`, the banner as a JS class
//!
//! ## Usage
//!
//! ```javascript
//! import init, { VideoBannerElement } from '@vidbanner/wasm';
//!
//! await init();
//! const banner = new VideoBannerElement(
//!   { videoId: 76979871, videoSource: 'vimeo', scrollTargetId: 'content' },
//!   { onEvent: (e) => console.log(e.event) },
//! );
//! banner.onLoaded(() => console.log('loaded'));
//! banner.mount(document.getElementById('hero'));
//! window.addEventListener('resize', () => banner.resize(innerWidth, innerHeight));
//! ```

use wasm_bindgen::prelude::*;

mod element;
mod sdk;
mod target;

pub use element::VideoBannerElement;
pub use sdk::{BrowserVimeoSdk, BrowserYouTubeSdk};
pub use target::{BrowserSpawner, IframeTarget};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    vidbanner_core::init();
    web_sys::console::log_1(&"[Vidbanner WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Embed URL for a video, e.g. for server-rendered markup
#[wasm_bindgen(js_name = embedUrl)]
pub fn embed_url(video_id: &str, video_source: &str) -> Result<String, JsValue> {
    let provider = video_source
        .parse::<vidbanner_core::ProviderKind>()
        .map_err(element::to_js_error)?;
    let id = vidbanner_core::VideoId::new(video_id).map_err(element::to_js_error)?;
    let source = vidbanner_core::VideoSource::new(id, provider);
    vidbanner_core::embed_url(&source)
        .map(String::from)
        .map_err(element::to_js_error)
}

/// `@keyframes` rules the scroll control animates with
#[wasm_bindgen(js_name = keyframesCss)]
pub fn keyframes_css() -> String {
    vidbanner_core::style::keyframes_css()
}
