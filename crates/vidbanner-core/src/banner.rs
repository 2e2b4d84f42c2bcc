//! Video Banner - glue between host configuration and the playback lifecycle
//!
//! Coordinates:
//! - Config validation (once, at construction)
//! - Mount/unmount of the embed surface
//! - Source changes (re-attachment policy)
//! - Scroll control and style computation for the view

use crate::adapter::ProviderServices;
use crate::config::{AspectRatio, BannerConfig};
use crate::coordinator::PlaybackCoordinator;
use crate::events::HostCallbacks;
use crate::layout::LayoutFlags;
use crate::sdk::TargetRef;
use crate::style::BannerStyle;
use crate::types::*;
use crate::Result;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// What activating the scroll control should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollAction {
    /// The host's scroll handler ran
    Callback,
    /// Scroll the element with this id into view
    ScrollTo(String),
    /// Nothing configured
    None,
}

/// One banner instance as a web view sees it
pub struct VideoBanner {
    config: BannerConfig,
    aspect: AspectRatio,
    source: VideoSource,
    services: ProviderServices,
    host: HostCallbacks,
    target: Option<TargetRef>,
    coordinator: Option<PlaybackCoordinator>,
}

impl VideoBanner {
    /// Create a banner; rejects invalid config before anything is mounted
    pub fn new(config: BannerConfig, services: ProviderServices, host: HostCallbacks) -> Result<Self> {
        let source = config.validate()?;
        let aspect = config.aspect()?;

        Ok(Self {
            config,
            aspect,
            source,
            services,
            host,
            target: None,
            coordinator: None,
        })
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    /// Current video source
    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    pub fn is_mounted(&self) -> bool {
        self.target.is_some()
    }

    /// ID of the current coordinator, if one was created
    pub fn banner_id(&self) -> Option<BannerId> {
        self.coordinator.as_ref().map(PlaybackCoordinator::id)
    }

    /// Playback state of the current coordinator
    pub fn state(&self) -> PlaybackState {
        self.coordinator
            .as_ref()
            .map(PlaybackCoordinator::state)
            .unwrap_or_default()
    }

    /// Watch the current coordinator's state.
    ///
    /// A source change replaces the coordinator; the old receiver then ends
    /// at Disposed and the caller subscribes again.
    pub fn subscribe_state(&self) -> Option<watch::Receiver<PlaybackState>> {
        self.coordinator.as_ref().map(PlaybackCoordinator::subscribe_state)
    }

    /// Mount onto `target` and attach a player for the current source
    #[instrument(skip_all, fields(surface = %target.describe()))]
    pub fn mount(&mut self, target: TargetRef) -> Result<()> {
        self.unmount();
        self.target = Some(target);
        self.attach_current()
    }

    /// Change the video.
    ///
    /// Only an id or provider change rebuilds the player: the old coordinator
    /// is disposed (detaching its player exactly once) before the new one
    /// attaches. Other changes, such as `loop`, are recorded but leave the
    /// mounted embed untouched; they take effect on the next mount.
    #[instrument(skip_all, fields(video_id = %source.id, provider = %source.provider))]
    pub fn set_source(&mut self, source: VideoSource) -> Result<()> {
        let reattach = self.source.requires_reattach(&source);
        self.source = source;

        if !reattach {
            debug!("Source unchanged, keeping player");
            return Ok(());
        }
        if self.target.is_none() {
            debug!("Not mounted, deferring attach");
            return Ok(());
        }

        if let Some(mut previous) = self.coordinator.take() {
            previous.dispose();
        }
        info!("Re-attaching for new source");
        self.attach_current()
    }

    /// Tear down the player; repeated calls are no-ops.
    ///
    /// The disposed coordinator is kept so `state()` reads Disposed until
    /// the next mount.
    pub fn unmount(&mut self) {
        if let Some(coordinator) = self.coordinator.as_mut() {
            coordinator.dispose();
        }
        self.target = None;
    }

    /// Scroll control activated
    pub fn scroll_down(&self) -> ScrollAction {
        if let Some(on_scroll_down) = &self.host.on_scroll_down {
            on_scroll_down();
            return ScrollAction::Callback;
        }
        match &self.config.scroll_target_id {
            Some(id) => ScrollAction::ScrollTo(id.clone()),
            None => ScrollAction::None,
        }
    }

    /// Inline styles for the current state
    pub fn style(&self, flags: LayoutFlags) -> BannerStyle {
        BannerStyle::compute(self.aspect, self.config.overlay(), self.state(), flags)
    }

    fn attach_current(&mut self) -> Result<()> {
        let Some(target) = self.target.clone() else {
            return Ok(());
        };

        let mut coordinator =
            PlaybackCoordinator::for_provider(self.source.provider, &self.services, self.host.clone());
        let result = coordinator.attach(&target, &self.source);
        self.coordinator = Some(coordinator);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeTarget, FakeVimeoSdk, FakeYouTubeSdk};
    use crate::loader::YouTubeApiLoader;
    use crate::sdk::VimeoEvent;
    use crate::Error;
    use futures::executor::LocalPool;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixture {
        vimeo: Rc<FakeVimeoSdk>,
        youtube: Rc<FakeYouTubeSdk>,
        _pool: LocalPool,
        services: ProviderServices,
    }

    fn fixture() -> Fixture {
        let vimeo = Rc::new(FakeVimeoSdk::new());
        let youtube = Rc::new(FakeYouTubeSdk::with_api_available());
        let pool = LocalPool::new();
        let services = ProviderServices::new(vimeo.clone(), youtube.clone(), Rc::new(pool.spawner()))
            .with_youtube_loader(YouTubeApiLoader::new());
        Fixture {
            vimeo,
            youtube,
            _pool: pool,
            services,
        }
    }

    fn vimeo_config(id: &str) -> BannerConfig {
        BannerConfig::new(VideoId::new(id).unwrap(), ProviderKind::Vimeo)
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let fx = fixture();
        let mut config = vimeo_config("1");
        config.video_source = "dailymotion".to_string();

        let result = VideoBanner::new(config, fx.services.clone(), HostCallbacks::new());
        assert!(matches!(result, Err(Error::UnknownProvider(_))));
        assert_eq!(fx.vimeo.players_created(), 0);
    }

    #[test]
    fn test_mount_attaches() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        assert_eq!(banner.state(), PlaybackState::Uninitialized);
        assert!(banner.subscribe_state().is_none());

        let target = FakeTarget::new("hero");
        banner.mount(target.clone()).unwrap();

        assert!(banner.is_mounted());
        assert_eq!(banner.state(), PlaybackState::Loading);
        assert_eq!(
            target.source().unwrap().as_str(),
            "https://player.vimeo.com/video/1?background=1&autoplay=1&muted=1"
        );

        fx.vimeo.emit(VimeoEvent::Play);
        assert_eq!(banner.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_source_change_detaches_once() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        let target = FakeTarget::new("hero");
        banner.mount(target.clone()).unwrap();
        let old = banner.subscribe_state().unwrap();

        banner.set_source(VideoSource::vimeo("2").unwrap()).unwrap();

        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Play), 1);
        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Loaded), 1);
        assert_eq!(fx.vimeo.players_created(), 2);
        assert_eq!(*old.borrow(), PlaybackState::Disposed);
        assert_eq!(banner.state(), PlaybackState::Loading);
        assert_eq!(target.source_history().len(), 2);

        banner.unmount();
        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Play), 1);
        assert_eq!(fx.vimeo.off_calls(1, VimeoEvent::Play), 1);
    }

    #[test]
    fn test_loop_change_keeps_player() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        banner.mount(FakeTarget::new("hero")).unwrap();

        banner
            .set_source(VideoSource::vimeo("1").unwrap().with_loop(false))
            .unwrap();

        assert_eq!(fx.vimeo.players_created(), 1);
        assert!(!banner.source().loop_playback);
    }

    #[test]
    fn test_youtube_loop_change_applies_on_next_mount() {
        let fx = fixture();
        let config = BannerConfig::new(VideoId::new("abc").unwrap(), ProviderKind::YouTube);
        let mut banner = VideoBanner::new(config, fx.services.clone(), HostCallbacks::new()).unwrap();
        let target = FakeTarget::new("hero");
        banner.mount(target.clone()).unwrap();

        banner
            .set_source(VideoSource::youtube("abc").unwrap().with_loop(false))
            .unwrap();

        assert_eq!(fx.youtube.players_created(), 1);
        assert_eq!(target.source_history().len(), 1);
        assert!(target.source().unwrap().as_str().contains("loop=1"));

        banner.mount(target.clone()).unwrap();
        let remounted = target.source().unwrap();
        assert!(!remounted.as_str().contains("loop="));
        assert!(!remounted.as_str().contains("playlist="));
    }

    #[test]
    fn test_provider_switch() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        banner.mount(FakeTarget::new("hero")).unwrap();

        banner.set_source(VideoSource::youtube("abc").unwrap()).unwrap();

        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Play), 1);
        assert_eq!(fx.youtube.players_created(), 1);

        banner.unmount();
        assert_eq!(fx.youtube.destroy_calls(0), 1);
    }

    #[test]
    fn test_source_change_while_unmounted() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();

        banner.set_source(VideoSource::vimeo("2").unwrap()).unwrap();
        assert_eq!(fx.vimeo.players_created(), 0);

        let target = FakeTarget::new("hero");
        banner.mount(target.clone()).unwrap();
        assert!(target.source().unwrap().path().ends_with("/2"));
    }

    #[test]
    fn test_unmount_idempotent() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        banner.mount(FakeTarget::new("hero")).unwrap();

        banner.unmount();
        banner.unmount();

        assert!(!banner.is_mounted());
        assert_eq!(banner.state(), PlaybackState::Disposed);
        assert_eq!(fx.vimeo.off_calls(0, VimeoEvent::Play), 1);
    }

    #[test]
    fn test_scroll_down_precedence() {
        let fx = fixture();
        let mut config = vimeo_config("1");
        config.scroll_target_id = Some("content".to_string());

        let plain = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        assert_eq!(plain.scroll_down(), ScrollAction::None);

        let targeted = VideoBanner::new(config.clone(), fx.services.clone(), HostCallbacks::new()).unwrap();
        assert_eq!(targeted.scroll_down(), ScrollAction::ScrollTo("content".to_string()));

        let calls = Rc::new(Cell::new(0));
        let sink = calls.clone();
        let host = HostCallbacks::new().on_scroll_down(move || sink.set(sink.get() + 1));
        let handled = VideoBanner::new(config, fx.services.clone(), host).unwrap();
        assert_eq!(handled.scroll_down(), ScrollAction::Callback);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_style_follows_state() {
        let fx = fixture();
        let mut banner = VideoBanner::new(vimeo_config("1"), fx.services.clone(), HostCallbacks::new()).unwrap();
        banner.mount(FakeTarget::new("hero")).unwrap();
        assert_eq!(banner.style(LayoutFlags::default()).overlay.get("opacity"), Some("1"));

        fx.vimeo.emit(VimeoEvent::Play);
        assert_eq!(banner.style(LayoutFlags::default()).overlay.get("opacity"), Some("0.3"));
    }
}
