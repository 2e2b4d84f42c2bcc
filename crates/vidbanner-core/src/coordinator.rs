//! Playback Coordinator - lifecycle state machine for one mounted banner
//!
//! Coordinates:
//! - Adapter attach/detach
//! - State machine transitions (uninitialized -> loading -> playing -> disposed)
//! - Host notifications (loaded hook, lifecycle events, state watchers)
//!
//! SDK callbacks are bound to the attach token current when they were
//! created. Disposal clears the token before detaching, so anything the SDK
//! still has in flight lands as a no-op.

use crate::adapter::{create_adapter, AdapterCallbacks, ProviderAdapter, ProviderServices};
use crate::events::{HostCallbacks, LifecycleEvent};
use crate::sdk::TargetRef;
use crate::types::*;
use crate::{Error, Result};
use std::cell::Cell;
use std::rc::{Rc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// State reachable from SDK callbacks
struct CoordinatorShared {
    banner_id: BannerId,
    state_tx: watch::Sender<PlaybackState>,
    current: Cell<Option<AttachToken>>,
    ready_fired: Cell<bool>,
    host: HostCallbacks,
}

impl CoordinatorShared {
    fn state(&self) -> PlaybackState {
        *self.state_tx.borrow()
    }

    fn is_current(&self, token: AttachToken) -> bool {
        self.current.get() == Some(token)
    }

    /// Transition to new state
    fn set_state(&self, new_state: PlaybackState) -> Result<()> {
        let current = self.state();

        if !current.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        self.state_tx.send_replace(new_state);
        info!(banner_id = %self.banner_id, from = %current, to = %new_state, "State transition");

        self.host.emit(LifecycleEvent::StateChanged {
            banner_id: self.banner_id,
            from: current,
            to: new_state,
        });

        Ok(())
    }

    fn handle_ready(&self, token: AttachToken) {
        if !self.is_current(token) {
            debug!(banner_id = %self.banner_id, token = %token, "Stale ready callback ignored");
            return;
        }
        if self.ready_fired.replace(true) {
            debug!(banner_id = %self.banner_id, "Repeated ready callback ignored");
            return;
        }

        info!(banner_id = %self.banner_id, "Provider ready");
        self.host.emit(LifecycleEvent::Loaded {
            banner_id: self.banner_id,
        });
        if let Some(on_loaded) = &self.host.on_loaded {
            on_loaded();
        }
    }

    fn handle_playing(&self, token: AttachToken) {
        if !self.is_current(token) {
            debug!(banner_id = %self.banner_id, token = %token, "Stale playing callback ignored");
            return;
        }
        if self.state() != PlaybackState::Loading {
            debug!(banner_id = %self.banner_id, state = %self.state(), "Playing callback ignored");
            return;
        }
        let _ = self.set_state(PlaybackState::Playing);
    }
}

/// Lifecycle coordinator for a single banner.
///
/// The provider is fixed at construction. A different source needs a new
/// coordinator; this one is disposed (explicitly or on drop) first.
pub struct PlaybackCoordinator {
    shared: Rc<CoordinatorShared>,
    adapter: Box<dyn ProviderAdapter>,
    handle: Option<PlayerHandle>,
}

impl PlaybackCoordinator {
    /// Create a coordinator driving `adapter`
    pub fn new(adapter: Box<dyn ProviderAdapter>, host: HostCallbacks) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::Uninitialized);

        Self {
            shared: Rc::new(CoordinatorShared {
                banner_id: BannerId::new(),
                state_tx,
                current: Cell::new(None),
                ready_fired: Cell::new(false),
                host,
            }),
            adapter,
            handle: None,
        }
    }

    /// Create a coordinator with the adapter for `kind`
    pub fn for_provider(kind: ProviderKind, services: &ProviderServices, host: HostCallbacks) -> Self {
        Self::new(create_adapter(kind, services), host)
    }

    /// Get banner ID
    pub fn id(&self) -> BannerId {
        self.shared.banner_id
    }

    pub fn provider(&self) -> ProviderKind {
        self.adapter.kind()
    }

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.shared.state()
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether the adapter currently holds a player binding
    pub fn is_attached(&self) -> bool {
        self.handle.is_some() && self.adapter.is_attached()
    }

    /// Attach a player for `source` to `target`; enters Loading immediately
    #[instrument(skip_all, fields(banner_id = %self.shared.banner_id, video_id = %source.id))]
    pub fn attach(&mut self, target: &TargetRef, source: &VideoSource) -> Result<()> {
        let kind = self.adapter.kind();
        if source.provider != kind {
            return Err(Error::ProviderMismatch {
                adapter: kind,
                source_kind: source.provider,
            });
        }

        self.shared.set_state(PlaybackState::Loading)?;

        let token = AttachToken::next();
        self.shared.current.set(Some(token));
        self.shared.host.emit(LifecycleEvent::Attached {
            banner_id: self.shared.banner_id,
            provider: kind,
            video_id: source.id.to_string(),
        });

        match self.adapter.attach(target, source, self.callbacks_for(token)) {
            Ok(handle) => {
                info!(provider = %kind, token = %token, "Player attach requested");
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.dispose();
                Err(e)
            }
        }
    }

    /// Tear down: invalidate callbacks, publish Disposed, detach the player.
    ///
    /// Safe to call repeatedly; only the first call has any effect.
    pub fn dispose(&mut self) {
        if self.shared.state().is_terminal() {
            debug!(banner_id = %self.shared.banner_id, "Already disposed");
            return;
        }

        self.shared.current.set(None);
        let _ = self.shared.set_state(PlaybackState::Disposed);
        self.shared.host.emit(LifecycleEvent::Disposed {
            banner_id: self.shared.banner_id,
        });

        if let Some(handle) = self.handle.take() {
            self.adapter.detach(&handle);
        }
    }

    fn callbacks_for(&self, token: AttachToken) -> AdapterCallbacks {
        let ready: Weak<CoordinatorShared> = Rc::downgrade(&self.shared);
        let playing = ready.clone();
        AdapterCallbacks::new(
            move || {
                if let Some(shared) = ready.upgrade() {
                    shared.handle_ready(token);
                }
            },
            move || {
                if let Some(shared) = playing.upgrade() {
                    shared.handle_playing(token);
                }
            },
        )
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeTarget, FakeVimeoSdk, FakeYouTubeSdk};
    use crate::loader::YouTubeApiLoader;
    use crate::sdk::{VimeoEvent, YouTubePlayerState};
    use futures::executor::LocalPool;
    use std::cell::RefCell;

    struct Fixture {
        vimeo: Rc<FakeVimeoSdk>,
        youtube: Rc<FakeYouTubeSdk>,
        pool: LocalPool,
        services: ProviderServices,
        target: TargetRef,
    }

    fn fixture(vimeo: FakeVimeoSdk, youtube: FakeYouTubeSdk) -> Fixture {
        let vimeo = Rc::new(vimeo);
        let youtube = Rc::new(youtube);
        let pool = LocalPool::new();
        let services = ProviderServices::new(vimeo.clone(), youtube.clone(), Rc::new(pool.spawner()))
            .with_youtube_loader(YouTubeApiLoader::new());
        Fixture {
            vimeo,
            youtube,
            pool,
            services,
            target: FakeTarget::new("banner"),
        }
    }

    fn loaded_counter() -> (Rc<Cell<u32>>, HostCallbacks) {
        let loaded = Rc::new(Cell::new(0));
        let sink = loaded.clone();
        (loaded, HostCallbacks::new().on_loaded(move || sink.set(sink.get() + 1)))
    }

    #[test]
    fn test_coordinator_creation() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let coordinator = PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, HostCallbacks::new());

        assert_eq!(coordinator.state(), PlaybackState::Uninitialized);
        assert_eq!(coordinator.provider(), ProviderKind::Vimeo);
        assert!(!coordinator.is_attached());
    }

    #[test]
    fn test_vimeo_lifecycle() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let (loaded, host) = loaded_counter();
        let mut coordinator = PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, host);

        coordinator.attach(&fx.target, &VideoSource::vimeo("123").unwrap()).unwrap();
        assert_eq!(coordinator.state(), PlaybackState::Loading);

        fx.vimeo.emit(VimeoEvent::Loaded);
        assert_eq!(loaded.get(), 1);
        assert_eq!(coordinator.state(), PlaybackState::Loading);

        fx.vimeo.emit(VimeoEvent::Play);
        assert_eq!(coordinator.state(), PlaybackState::Playing);

        fx.vimeo.emit(VimeoEvent::Loaded);
        fx.vimeo.emit(VimeoEvent::Play);
        assert_eq!(loaded.get(), 1);
        assert_eq!(coordinator.state(), PlaybackState::Playing);

        coordinator.dispose();
        assert_eq!(coordinator.state(), PlaybackState::Disposed);
        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Play), 1);
    }

    #[test]
    fn test_playing_before_ready() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let (loaded, host) = loaded_counter();
        let mut coordinator = PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, host);

        coordinator.attach(&fx.target, &VideoSource::vimeo("123").unwrap()).unwrap();
        fx.vimeo.emit(VimeoEvent::Play);
        fx.vimeo.emit(VimeoEvent::Loaded);

        assert_eq!(coordinator.state(), PlaybackState::Playing);
        assert_eq!(loaded.get(), 1);
    }

    #[test]
    fn test_late_callbacks_after_dispose_are_ignored() {
        let fx = fixture(FakeVimeoSdk::with_sticky_handlers(), FakeYouTubeSdk::new());
        let (loaded, host) = loaded_counter();
        let mut coordinator = PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, host);

        coordinator.attach(&fx.target, &VideoSource::vimeo("123").unwrap()).unwrap();
        coordinator.dispose();

        assert_eq!(fx.vimeo.emit(VimeoEvent::Play), 1);
        assert_eq!(fx.vimeo.emit(VimeoEvent::Loaded), 1);
        assert_eq!(coordinator.state(), PlaybackState::Disposed);
        assert_eq!(loaded.get(), 0);
    }

    #[test]
    fn test_youtube_late_events_after_dispose() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::with_api_available());
        let (loaded, host) = loaded_counter();
        let mut coordinator = PlaybackCoordinator::for_provider(ProviderKind::YouTube, &fx.services, host);

        coordinator.attach(&fx.target, &VideoSource::youtube("abc").unwrap()).unwrap();
        coordinator.dispose();
        assert_eq!(fx.youtube.destroy_calls(0), 1);

        fx.youtube.emit_ready(0);
        fx.youtube.emit_state(0, YouTubePlayerState::Playing);
        assert_eq!(coordinator.state(), PlaybackState::Disposed);
        assert_eq!(loaded.get(), 0);
    }

    #[test]
    fn test_youtube_deferred_lifecycle() {
        let mut fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let mut coordinator =
            PlaybackCoordinator::for_provider(ProviderKind::YouTube, &fx.services, HostCallbacks::new());

        coordinator.attach(&fx.target, &VideoSource::youtube("abc").unwrap()).unwrap();
        fx.pool.run_until_stalled();
        assert_eq!(coordinator.state(), PlaybackState::Loading);
        assert_eq!(fx.youtube.players_created(), 0);

        fx.youtube.fire_api_ready();
        fx.pool.run_until_stalled();
        fx.youtube.emit_state(0, YouTubePlayerState::Playing);
        assert_eq!(coordinator.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_double_attach_rejected() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let mut coordinator =
            PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, HostCallbacks::new());
        let source = VideoSource::vimeo("123").unwrap();

        coordinator.attach(&fx.target, &source).unwrap();
        let err = coordinator.attach(&fx.target, &source).unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(fx.vimeo.players_created(), 1);
    }

    #[test]
    fn test_attach_after_dispose_rejected() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let mut coordinator =
            PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, HostCallbacks::new());

        coordinator.dispose();
        let err = coordinator
            .attach(&fx.target, &VideoSource::vimeo("123").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(fx.vimeo.players_created(), 0);
    }

    #[test]
    fn test_provider_mismatch_leaves_state() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let mut coordinator =
            PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, HostCallbacks::new());

        let err = coordinator
            .attach(&fx.target, &VideoSource::youtube("abc").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::ProviderMismatch { .. }));
        assert_eq!(coordinator.state(), PlaybackState::Uninitialized);
    }

    #[test]
    fn test_dispose_twice_detaches_once() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::with_api_available());
        let mut coordinator =
            PlaybackCoordinator::for_provider(ProviderKind::YouTube, &fx.services, HostCallbacks::new());

        coordinator.attach(&fx.target, &VideoSource::youtube("abc").unwrap()).unwrap();
        coordinator.dispose();
        coordinator.dispose();
        drop(coordinator);

        assert_eq!(fx.youtube.destroy_calls(0), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let mut coordinator =
            PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, HostCallbacks::new());
        coordinator.attach(&fx.target, &VideoSource::vimeo("123").unwrap()).unwrap();
        let rx = coordinator.subscribe_state();

        drop(coordinator);
        assert_eq!(*rx.borrow(), PlaybackState::Disposed);
        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Loaded), 1);
    }

    #[test]
    fn test_event_sequence() {
        let fx = fixture(FakeVimeoSdk::new(), FakeYouTubeSdk::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let host = HostCallbacks::new().on_event(move |e| sink.borrow_mut().push(e.clone()));
        let mut coordinator = PlaybackCoordinator::for_provider(ProviderKind::Vimeo, &fx.services, host);

        coordinator.attach(&fx.target, &VideoSource::vimeo("123").unwrap()).unwrap();
        fx.vimeo.emit(VimeoEvent::Loaded);
        fx.vimeo.emit(VimeoEvent::Play);
        coordinator.dispose();

        let names: Vec<_> = seen.borrow().iter().map(LifecycleEvent::name).collect();
        assert_eq!(
            names,
            vec!["state_changed", "attached", "loaded", "state_changed", "state_changed", "disposed"]
        );
        assert!(seen.borrow().iter().all(|e| e.banner_id() == coordinator.id()));
    }
}
