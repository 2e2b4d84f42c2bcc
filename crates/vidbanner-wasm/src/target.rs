//! Embed surface and executor for the browser

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use url::Url;
use vidbanner_core::embed::EMBED_ALLOW;
use vidbanner_core::{BannerId, RenderTarget};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlIFrameElement};

/// An `<iframe>` the provider SDK takes over
pub struct IframeTarget {
    iframe: HtmlIFrameElement,
}

impl IframeTarget {
    /// Wrap an existing iframe, giving it an id if it has none
    pub fn new(iframe: HtmlIFrameElement) -> Self {
        if iframe.id().is_empty() {
            iframe.set_id(&format!("vidbanner-{}", BannerId::new()));
        }
        iframe.set_attribute("allow", EMBED_ALLOW).ok();
        iframe.set_attribute("frameborder", "0").ok();
        iframe.set_attribute("allowfullscreen", "").ok();
        Self { iframe }
    }

    /// Create a detached iframe in `document`
    pub fn create(document: &Document, title: &str) -> Result<Self, JsValue> {
        let iframe: HtmlIFrameElement = document.create_element("iframe")?.dyn_into()?;
        iframe.set_title(title);
        Ok(Self::new(iframe))
    }

    pub fn element(&self) -> &HtmlIFrameElement {
        &self.iframe
    }
}

impl RenderTarget for IframeTarget {
    fn set_source(&self, url: &Url) {
        self.iframe.set_src(url.as_str());
    }

    fn describe(&self) -> String {
        format!("iframe#{}", self.iframe.id())
    }

    fn element_id(&self) -> Option<String> {
        Some(self.iframe.id())
    }
}

/// Runs deferred work on the browser microtask queue
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
