//! Provider adapters - one interface over the Vimeo and YouTube SDKs
//!
//! Each adapter owns the SDK player it creates and every listener it
//! registers on it. `detach` reverses all of it exactly once; calling it
//! again, or for a handle that never finished attaching, is a no-op.
//!
//! SDK failures stop here: they are logged and the banner simply stays
//! loading.

use crate::embed::{embed_url, YouTubePlayerOptions};
use crate::loader::YouTubeApiLoader;
use crate::sdk::{
    TargetRef, VimeoEvent, VimeoPlayer, VimeoSdk, YouTubeEvents, YouTubePlayer,
    YouTubePlayerState, YouTubeSdk,
};
use crate::{AttachToken, Error, PlayerHandle, ProviderKind, Result, VideoSource};
use futures::future::{abortable, AbortHandle};
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

/// Notifications an adapter forwards from the SDK
#[derive(Clone)]
pub struct AdapterCallbacks {
    /// Provider finished loading the video
    pub on_ready: Rc<dyn Fn()>,
    /// Provider started playback
    pub on_playing: Rc<dyn Fn()>,
}

impl AdapterCallbacks {
    pub fn new(on_ready: impl Fn() + 'static, on_playing: impl Fn() + 'static) -> Self {
        Self {
            on_ready: Rc::new(on_ready),
            on_playing: Rc::new(on_playing),
        }
    }

    /// Callbacks that ignore every notification
    pub fn noop() -> Self {
        Self::new(|| {}, || {})
    }
}

/// Capability shared by both providers
pub trait ProviderAdapter {
    /// Provider this adapter drives
    fn kind(&self) -> ProviderKind;

    /// Bind a player for `source` to `target`
    fn attach(
        &mut self,
        target: &TargetRef,
        source: &VideoSource,
        callbacks: AdapterCallbacks,
    ) -> Result<PlayerHandle>;

    /// Tear down the binding created for `handle`
    fn detach(&mut self, handle: &PlayerHandle);

    /// Whether a binding is currently held
    fn is_attached(&self) -> bool;
}

/// SDK entry points and executor shared by adapters
#[derive(Clone)]
pub struct ProviderServices {
    pub vimeo: Rc<dyn VimeoSdk>,
    pub youtube: Rc<dyn YouTubeSdk>,
    pub youtube_loader: YouTubeApiLoader,
    /// Runs deferred YouTube construction on the event loop
    pub spawner: Rc<dyn LocalSpawn>,
}

impl ProviderServices {
    /// Services using the thread-wide YouTube loader
    pub fn new(
        vimeo: Rc<dyn VimeoSdk>,
        youtube: Rc<dyn YouTubeSdk>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Self {
        Self {
            vimeo,
            youtube,
            youtube_loader: YouTubeApiLoader::global(),
            spawner,
        }
    }

    pub fn with_youtube_loader(mut self, loader: YouTubeApiLoader) -> Self {
        self.youtube_loader = loader;
        self
    }
}

/// Create the adapter for a provider
pub fn create_adapter(kind: ProviderKind, services: &ProviderServices) -> Box<dyn ProviderAdapter> {
    match kind {
        ProviderKind::Vimeo => Box::new(VimeoAdapter::new(services.vimeo.clone())),
        ProviderKind::YouTube => Box::new(YouTubeAdapter::new(
            services.youtube.clone(),
            services.youtube_loader.clone(),
            services.spawner.clone(),
        )),
    }
}

/// Point the embed surface at the provider URL
fn prepare_target(kind: ProviderKind, target: &TargetRef, source: &VideoSource) -> Result<()> {
    if source.provider != kind {
        return Err(Error::ProviderMismatch {
            adapter: kind,
            source_kind: source.provider,
        });
    }
    let url = embed_url(source)?;
    debug!(surface = %target.describe(), url = %url, "Embed source set");
    target.set_source(&url);
    Ok(())
}

// =============================================================================
// Vimeo
// =============================================================================

struct VimeoAttachment {
    token: AttachToken,
    player: Option<Box<dyn VimeoPlayer>>,
    subscriptions: Vec<VimeoEvent>,
}

/// Adapter over Vimeo `player.js`
pub struct VimeoAdapter {
    sdk: Rc<dyn VimeoSdk>,
    attachment: Option<VimeoAttachment>,
}

impl VimeoAdapter {
    pub fn new(sdk: Rc<dyn VimeoSdk>) -> Self {
        Self {
            sdk,
            attachment: None,
        }
    }

    fn release(attachment: VimeoAttachment) {
        let VimeoAttachment {
            token,
            player,
            mut subscriptions,
        } = attachment;
        if let Some(mut player) = player {
            for event in subscriptions.drain(..) {
                player.off(event);
            }
        }
        info!(token = %token, "Vimeo player detached");
    }
}

impl ProviderAdapter for VimeoAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vimeo
    }

    #[instrument(skip_all, fields(video_id = %source.id))]
    fn attach(
        &mut self,
        target: &TargetRef,
        source: &VideoSource,
        callbacks: AdapterCallbacks,
    ) -> Result<PlayerHandle> {
        prepare_target(ProviderKind::Vimeo, target, source)?;

        if let Some(previous) = self.attachment.take() {
            warn!(token = %previous.token, "Attach while attached, releasing previous player");
            Self::release(previous);
        }

        let token = AttachToken::next();
        let mut subscriptions = Vec::new();
        let player = match self.sdk.create_player(target) {
            Ok(mut player) => {
                let on_playing = callbacks.on_playing.clone();
                player.on(VimeoEvent::Play, Box::new(move || on_playing()));
                subscriptions.push(VimeoEvent::Play);

                let on_ready = callbacks.on_ready.clone();
                player.on(VimeoEvent::Loaded, Box::new(move || on_ready()));
                subscriptions.push(VimeoEvent::Loaded);

                info!(token = %token, "Vimeo player attached");
                Some(player)
            }
            Err(e) => {
                warn!(error = %e, "Vimeo player construction failed, banner stays loading");
                None
            }
        };

        self.attachment = Some(VimeoAttachment {
            token,
            player,
            subscriptions,
        });
        Ok(PlayerHandle::new(token, ProviderKind::Vimeo))
    }

    fn detach(&mut self, handle: &PlayerHandle) {
        if self.attachment.as_ref().map(|a| a.token) != Some(handle.token()) {
            debug!(token = %handle.token(), "Vimeo detach ignored, handle not attached");
            return;
        }
        if let Some(attachment) = self.attachment.take() {
            Self::release(attachment);
        }
    }

    fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }
}

// =============================================================================
// YouTube
// =============================================================================

type PlayerSlot = Rc<RefCell<Option<Box<dyn YouTubePlayer>>>>;

struct YouTubeAttachment {
    token: AttachToken,
    player: PlayerSlot,
    live: Rc<Cell<bool>>,
    pending: Option<AbortHandle>,
}

/// Adapter over the YouTube IFrame API
pub struct YouTubeAdapter {
    sdk: Rc<dyn YouTubeSdk>,
    loader: YouTubeApiLoader,
    spawner: Rc<dyn LocalSpawn>,
    attachment: Option<YouTubeAttachment>,
}

impl YouTubeAdapter {
    pub fn new(
        sdk: Rc<dyn YouTubeSdk>,
        loader: YouTubeApiLoader,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Self {
        Self {
            sdk,
            loader,
            spawner,
            attachment: None,
        }
    }

    /// Whether the player is still waiting on the IFrame API
    pub fn is_pending(&self) -> bool {
        self.attachment
            .as_ref()
            .map(|a| a.live.get() && a.player.borrow().is_none() && a.pending.is_some())
            .unwrap_or(false)
    }

    fn release(attachment: YouTubeAttachment) {
        attachment.live.set(false);
        if let Some(pending) = attachment.pending {
            pending.abort();
        }
        let player = attachment.player.borrow_mut().take();
        match player {
            Some(mut player) if player.can_destroy() => {
                player.destroy();
                info!(token = %attachment.token, "YouTube player destroyed");
            }
            Some(_) => debug!(token = %attachment.token, "YouTube player has no destroy"),
            None => debug!(token = %attachment.token, "YouTube player never constructed"),
        }
    }
}

/// Build `YT.Player` and wire its events to `callbacks`
fn construct_youtube_player(
    sdk: &Rc<dyn YouTubeSdk>,
    target: &TargetRef,
    options: YouTubePlayerOptions,
    callbacks: &AdapterCallbacks,
    slot: &PlayerSlot,
    live: &Cell<bool>,
) {
    let on_ready = callbacks.on_ready.clone();
    let on_playing = callbacks.on_playing.clone();
    let events = YouTubeEvents {
        on_ready: Box::new(move || on_ready()),
        on_state_change: Box::new(move |state| {
            if state == YouTubePlayerState::Playing {
                on_playing();
            }
        }),
    };

    match sdk.create_player(target, options, events) {
        Ok(mut player) => {
            if live.get() {
                *slot.borrow_mut() = Some(player);
                info!("YouTube player attached");
            } else if player.can_destroy() {
                // Detached while the constructor ran
                player.destroy();
            }
        }
        Err(e) => warn!(error = %e, "YouTube player construction failed, banner stays loading"),
    }
}

impl ProviderAdapter for YouTubeAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::YouTube
    }

    #[instrument(skip_all, fields(video_id = %source.id))]
    fn attach(
        &mut self,
        target: &TargetRef,
        source: &VideoSource,
        callbacks: AdapterCallbacks,
    ) -> Result<PlayerHandle> {
        prepare_target(ProviderKind::YouTube, target, source)?;

        if let Some(previous) = self.attachment.take() {
            warn!(token = %previous.token, "Attach while attached, releasing previous player");
            Self::release(previous);
        }

        let token = AttachToken::next();
        let slot: PlayerSlot = Rc::new(RefCell::new(None));
        let live = Rc::new(Cell::new(true));
        let options = YouTubePlayerOptions::for_source(source);

        let pending = if self.loader.is_ready(self.sdk.as_ref()) {
            construct_youtube_player(&self.sdk, target, options, &callbacks, &slot, &live);
            None
        } else {
            debug!(token = %token, "YouTube IFrame API not ready, deferring player");
            let ready = self.loader.ensure_loaded(self.sdk.as_ref());
            let sdk = self.sdk.clone();
            let target = target.clone();
            let task_slot = slot.clone();
            let task_live = live.clone();

            let (task, abort) = abortable(async move {
                if !ready.await {
                    warn!("YouTube IFrame API never became ready, banner stays loading");
                    return;
                }
                if task_live.get() {
                    construct_youtube_player(&sdk, &target, options, &callbacks, &task_slot, &task_live);
                }
            });

            if let Err(e) = self.spawner.spawn_local(async move {
                let _ = task.await;
            }) {
                warn!(error = %e, "Could not schedule YouTube player, banner stays loading");
            }
            Some(abort)
        };

        self.attachment = Some(YouTubeAttachment {
            token,
            player: slot,
            live,
            pending,
        });
        Ok(PlayerHandle::new(token, ProviderKind::YouTube))
    }

    fn detach(&mut self, handle: &PlayerHandle) {
        if self.attachment.as_ref().map(|a| a.token) != Some(handle.token()) {
            debug!(token = %handle.token(), "YouTube detach ignored, handle not attached");
            return;
        }
        if let Some(attachment) = self.attachment.take() {
            Self::release(attachment);
        }
    }

    fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }
}
