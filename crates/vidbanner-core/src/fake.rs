//! In-memory SDK doubles
//!
//! Scriptable stand-ins for the Vimeo and YouTube SDKs and for the embed
//! surface. They record every call and let the caller fire provider events
//! at any time, including after teardown, which is how late in-flight
//! events are reproduced.

use crate::sdk::{
    RenderTarget, SdkCallback, TargetRef, VimeoEvent, VimeoPlayer, VimeoSdk, YouTubeEvents,
    YouTubePlayer, YouTubePlayerState, YouTubeSdk,
};
use crate::{ProviderKind, SdkError, YouTubePlayerOptions};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

/// Render target that remembers every source it was pointed at
#[derive(Default)]
pub struct FakeTarget {
    name: String,
    sources: RefCell<Vec<Url>>,
}

impl FakeTarget {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            sources: RefCell::new(Vec::new()),
        })
    }

    /// Current `src`
    pub fn source(&self) -> Option<Url> {
        self.sources.borrow().last().cloned()
    }

    pub fn source_history(&self) -> Vec<Url> {
        self.sources.borrow().clone()
    }
}

impl RenderTarget for FakeTarget {
    fn set_source(&self, url: &Url) {
        self.sources.borrow_mut().push(url.clone());
    }

    fn describe(&self) -> String {
        format!("fake:{}", self.name)
    }
}

// =============================================================================
// Vimeo
// =============================================================================

#[derive(Default)]
struct VimeoPlayerRecord {
    handlers: RefCell<HashMap<VimeoEvent, Vec<SdkCallback>>>,
    off_calls: RefCell<HashMap<VimeoEvent, u32>>,
    sticky: bool,
}

impl VimeoPlayerRecord {
    fn off_count(&self, event: VimeoEvent) -> u32 {
        self.off_calls.borrow().get(&event).copied().unwrap_or(0)
    }

    fn emit(&self, event: VimeoEvent) -> usize {
        // Handlers run without a borrow held so they may re-enter the player
        let offs_before = self.off_count(event);
        let mut handlers = self.handlers.borrow_mut().remove(&event).unwrap_or_default();
        for handler in handlers.iter_mut() {
            handler();
        }
        let fired = handlers.len();
        if !self.sticky && self.off_count(event) != offs_before {
            return fired;
        }
        let mut map = self.handlers.borrow_mut();
        let slot = map.entry(event).or_default();
        handlers.append(slot);
        *slot = handlers;
        fired
    }
}

struct FakeVimeoPlayer {
    record: Rc<VimeoPlayerRecord>,
}

impl VimeoPlayer for FakeVimeoPlayer {
    fn on(&mut self, event: VimeoEvent, callback: SdkCallback) {
        self.record
            .handlers
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(callback);
    }

    fn off(&mut self, event: VimeoEvent) {
        *self.record.off_calls.borrow_mut().entry(event).or_default() += 1;
        if !self.record.sticky {
            self.record.handlers.borrow_mut().remove(&event);
        }
    }
}

/// Scriptable Vimeo SDK
#[derive(Default)]
pub struct FakeVimeoSdk {
    players: RefCell<Vec<Rc<VimeoPlayerRecord>>>,
    sticky: bool,
    fail_create: Cell<bool>,
}

impl FakeVimeoSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep handlers dispatchable after `off`, like events already queued
    /// in the page when the listener was removed
    pub fn with_sticky_handlers() -> Self {
        Self {
            sticky: true,
            ..Self::default()
        }
    }

    /// Make every `create_player` call fail
    pub fn fail_creates(&self) {
        self.fail_create.set(true);
    }

    pub fn players_created(&self) -> usize {
        self.players.borrow().len()
    }

    /// Fire `event` on the most recently created player; returns handlers run
    pub fn emit(&self, event: VimeoEvent) -> usize {
        let count = self.players_created();
        if count == 0 {
            return 0;
        }
        self.emit_on(count - 1, event)
    }

    /// Fire `event` on the player created `index`-th
    pub fn emit_on(&self, index: usize, event: VimeoEvent) -> usize {
        let record = self.players.borrow().get(index).cloned();
        record.map(|r| r.emit(event)).unwrap_or(0)
    }

    /// Handlers currently registered for `event` on player `index`
    pub fn listener_count(&self, index: usize, event: VimeoEvent) -> usize {
        self.players
            .borrow()
            .get(index)
            .and_then(|r| r.handlers.borrow().get(&event).map(Vec::len))
            .unwrap_or(0)
    }

    /// `off(event)` calls made on player `index`
    pub fn off_calls(&self, index: usize, event: VimeoEvent) -> u32 {
        self.players
            .borrow()
            .get(index)
            .and_then(|r| r.off_calls.borrow().get(&event).copied())
            .unwrap_or(0)
    }
}

impl VimeoSdk for FakeVimeoSdk {
    fn create_player(&self, _target: &TargetRef) -> Result<Box<dyn VimeoPlayer>, SdkError> {
        if self.fail_create.get() {
            return Err(SdkError::new(ProviderKind::Vimeo, "player construction refused"));
        }
        let record = Rc::new(VimeoPlayerRecord {
            sticky: self.sticky,
            ..VimeoPlayerRecord::default()
        });
        self.players.borrow_mut().push(record.clone());
        Ok(Box::new(FakeVimeoPlayer { record }))
    }
}

// =============================================================================
// YouTube
// =============================================================================

struct YouTubePlayerRecord {
    options: YouTubePlayerOptions,
    events: RefCell<Option<YouTubeEvents>>,
    destroy_calls: Cell<u32>,
}

impl YouTubePlayerRecord {
    fn with_events(&self, f: impl FnOnce(&mut YouTubeEvents)) {
        let taken = self.events.borrow_mut().take();
        if let Some(mut events) = taken {
            f(&mut events);
            *self.events.borrow_mut() = Some(events);
        }
    }
}

struct FakeYouTubePlayer {
    record: Rc<YouTubePlayerRecord>,
    destroyable: bool,
}

impl YouTubePlayer for FakeYouTubePlayer {
    fn can_destroy(&self) -> bool {
        self.destroyable
    }

    fn destroy(&mut self) {
        self.record.destroy_calls.set(self.record.destroy_calls.get() + 1);
    }
}

/// Scriptable YouTube IFrame API
pub struct FakeYouTubeSdk {
    api_available: Cell<bool>,
    script_requests: Cell<u32>,
    ready_hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
    players: RefCell<Vec<Rc<YouTubePlayerRecord>>>,
    destroyable: bool,
    fail_create: Cell<bool>,
}

impl FakeYouTubeSdk {
    /// API not loaded yet
    pub fn new() -> Self {
        Self {
            api_available: Cell::new(false),
            script_requests: Cell::new(0),
            ready_hooks: RefCell::new(Vec::new()),
            players: RefCell::new(Vec::new()),
            destroyable: true,
            fail_create: Cell::new(false),
        }
    }

    /// `YT` already present on the page
    pub fn with_api_available() -> Self {
        let sdk = Self::new();
        sdk.api_available.set(true);
        sdk
    }

    /// Players built by this SDK expose no `destroy`
    pub fn without_destroy() -> Self {
        Self {
            destroyable: false,
            ..Self::new()
        }
    }

    pub fn fail_creates(&self) {
        self.fail_create.set(true);
    }

    pub fn script_requests(&self) -> u32 {
        self.script_requests.get()
    }

    /// Simulate the script finishing: `YT` appears and ready hooks run
    pub fn fire_api_ready(&self) {
        self.api_available.set(true);
        let hooks: Vec<_> = self.ready_hooks.borrow_mut().drain(..).collect();
        for hook in hooks {
            hook();
        }
    }

    /// Simulate the script failing to load: ready hooks are dropped unfired
    pub fn fail_script_load(&self) {
        let hooks: Vec<_> = self.ready_hooks.borrow_mut().drain(..).collect();
        drop(hooks);
    }

    pub fn players_created(&self) -> usize {
        self.players.borrow().len()
    }

    /// Options the `index`-th player was constructed with
    pub fn player_options(&self, index: usize) -> Option<YouTubePlayerOptions> {
        self.players.borrow().get(index).map(|r| r.options.clone())
    }

    pub fn destroy_calls(&self, index: usize) -> u32 {
        self.players
            .borrow()
            .get(index)
            .map(|r| r.destroy_calls.get())
            .unwrap_or(0)
    }

    /// Fire `onReady` on player `index`
    pub fn emit_ready(&self, index: usize) {
        let record = self.players.borrow().get(index).cloned();
        if let Some(record) = record {
            record.with_events(|events| (events.on_ready)());
        }
    }

    /// Fire `onStateChange` on player `index`
    pub fn emit_state(&self, index: usize, state: YouTubePlayerState) {
        let record = self.players.borrow().get(index).cloned();
        if let Some(record) = record {
            record.with_events(|events| (events.on_state_change)(state));
        }
    }
}

impl Default for FakeYouTubeSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl YouTubeSdk for FakeYouTubeSdk {
    fn is_api_available(&self) -> bool {
        self.api_available.get()
    }

    fn request_api(&self, on_ready: Box<dyn FnOnce()>) {
        self.script_requests.set(self.script_requests.get() + 1);
        self.ready_hooks.borrow_mut().push(on_ready);
    }

    fn create_player(
        &self,
        _target: &TargetRef,
        options: YouTubePlayerOptions,
        events: YouTubeEvents,
    ) -> Result<Box<dyn YouTubePlayer>, SdkError> {
        if self.fail_create.get() {
            return Err(SdkError::new(ProviderKind::YouTube, "YT.Player threw"));
        }
        let record = Rc::new(YouTubePlayerRecord {
            options,
            events: RefCell::new(Some(events)),
            destroy_calls: Cell::new(0),
        });
        self.players.borrow_mut().push(record.clone());
        Ok(Box::new(FakeYouTubePlayer {
            record,
            destroyable: self.destroyable,
        }))
    }
}
