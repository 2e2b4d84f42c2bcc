//! Seams to the third-party player SDKs and the embed surface
//!
//! The browser binding implements these against `Vimeo.Player` and
//! `YT.Player`; [`crate::fake`] implements them in memory. Everything runs on
//! one event loop, so callbacks are neither `Send` nor `Sync`.

use crate::{SdkError, YouTubePlayerOptions};
use std::rc::Rc;
use url::Url;

/// Callback invoked by an SDK for a parameterless event
pub type SdkCallback = Box<dyn FnMut()>;

/// Callback invoked by the YouTube SDK on every player state change
pub type StateChangeCallback = Box<dyn FnMut(YouTubePlayerState)>;

/// Mount point the embed is rendered into (an iframe in the browser)
pub trait RenderTarget {
    /// Point the embed surface at `url`
    fn set_source(&self, url: &Url);

    /// Short description for logs
    fn describe(&self) -> String {
        "render-target".to_string()
    }

    /// DOM id the SDK constructors can resolve, if the target has one
    fn element_id(&self) -> Option<String> {
        None
    }
}

/// Shared handle to a render target
pub type TargetRef = Rc<dyn RenderTarget>;

/// Vimeo player events the banner listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VimeoEvent {
    /// Playback started
    Play,
    /// Video metadata loaded
    Loaded,
}

impl VimeoEvent {
    /// Event name in the Vimeo player API
    pub fn as_str(&self) -> &'static str {
        match self {
            VimeoEvent::Play => "play",
            VimeoEvent::Loaded => "loaded",
        }
    }
}

/// Vimeo `player.js` entry point
pub trait VimeoSdk {
    /// `new Vimeo.Player(target)`
    fn create_player(&self, target: &TargetRef) -> Result<Box<dyn VimeoPlayer>, SdkError>;
}

/// A live Vimeo player
pub trait VimeoPlayer {
    /// `player.on(event, callback)`
    fn on(&mut self, event: VimeoEvent, callback: SdkCallback);

    /// `player.off(event)`, removing every handler for `event`
    fn off(&mut self, event: VimeoEvent);
}

/// `YT.PlayerState` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YouTubePlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl YouTubePlayerState {
    /// Map the numeric `event.data` of `onStateChange`
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(YouTubePlayerState::Unstarted),
            0 => Some(YouTubePlayerState::Ended),
            1 => Some(YouTubePlayerState::Playing),
            2 => Some(YouTubePlayerState::Paused),
            3 => Some(YouTubePlayerState::Buffering),
            5 => Some(YouTubePlayerState::Cued),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            YouTubePlayerState::Unstarted => -1,
            YouTubePlayerState::Ended => 0,
            YouTubePlayerState::Playing => 1,
            YouTubePlayerState::Paused => 2,
            YouTubePlayerState::Buffering => 3,
            YouTubePlayerState::Cued => 5,
        }
    }
}

/// Handlers passed in the `events` option of `YT.Player`
pub struct YouTubeEvents {
    pub on_ready: SdkCallback,
    pub on_state_change: StateChangeCallback,
}

/// YouTube IFrame API entry point
pub trait YouTubeSdk {
    /// Whether `YT.Player` is already usable
    fn is_api_available(&self) -> bool;

    /// Inject the IFrame API script and arrange for `on_ready` to run once
    /// the API reports ready. Called at most once per loader.
    fn request_api(&self, on_ready: Box<dyn FnOnce()>);

    /// `new YT.Player(target, options)`
    fn create_player(
        &self,
        target: &TargetRef,
        options: YouTubePlayerOptions,
        events: YouTubeEvents,
    ) -> Result<Box<dyn YouTubePlayer>, SdkError>;
}

/// A live YouTube player
pub trait YouTubePlayer {
    /// Whether the player exposes `destroy`
    fn can_destroy(&self) -> bool {
        true
    }

    /// `player.destroy()`
    fn destroy(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_state_codes() {
        assert_eq!(YouTubePlayerState::from_code(1), Some(YouTubePlayerState::Playing));
        assert_eq!(YouTubePlayerState::from_code(-1), Some(YouTubePlayerState::Unstarted));
        assert_eq!(YouTubePlayerState::from_code(4), None);
        assert_eq!(YouTubePlayerState::Cued.code(), 5);
    }

    #[test]
    fn test_vimeo_event_names() {
        assert_eq!(VimeoEvent::Play.as_str(), "play");
        assert_eq!(VimeoEvent::Loaded.as_str(), "loaded");
    }
}
