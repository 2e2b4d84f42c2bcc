//! Core types for VidBanner

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique banner identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BannerId(pub Uuid);

impl BannerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BannerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BannerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Embed provider backing a banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Vimeo,
    YouTube,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Vimeo => "vimeo",
            ProviderKind::YouTube => "youtube",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vimeo" => Ok(ProviderKind::Vimeo),
            "youtube" => Ok(ProviderKind::YouTube),
            _ => Err(Error::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side video identifier.
///
/// Vimeo ids are numeric and hosts frequently pass them as numbers, so both
/// JSON strings and numbers deserialize into this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVideoId", into = "String")]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidVideoId(id.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for VideoId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVideoId {
    Number(u64),
    Text(String),
}

impl TryFrom<RawVideoId> for VideoId {
    type Error = Error;

    fn try_from(raw: RawVideoId) -> Result<Self> {
        match raw {
            RawVideoId::Number(n) => Ok(VideoId::from(n)),
            RawVideoId::Text(s) => VideoId::new(s),
        }
    }
}

/// What to play and how.
///
/// Background banners always autoplay muted; only looping is configurable,
/// and only the YouTube embed honours it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    pub id: VideoId,
    pub provider: ProviderKind,
    pub autoplay: bool,
    pub muted: bool,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
}

impl VideoSource {
    pub fn new(id: VideoId, provider: ProviderKind) -> Self {
        Self {
            id,
            provider,
            autoplay: true,
            muted: true,
            loop_playback: true,
        }
    }

    pub fn vimeo(id: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(VideoId::new(id)?, ProviderKind::Vimeo))
    }

    pub fn youtube(id: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(VideoId::new(id)?, ProviderKind::YouTube))
    }

    pub fn with_loop(mut self, loop_playback: bool) -> Self {
        self.loop_playback = loop_playback;
        self
    }

    /// Whether switching from `self` to `other` needs a fresh player
    pub fn requires_reattach(&self, other: &VideoSource) -> bool {
        self.id != other.id || self.provider != other.provider
    }
}

/// Playback lifecycle of one mounted banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing attached yet
    Uninitialized,
    /// Player requested, waiting for the first frame
    Loading,
    /// Provider reported playback
    Playing,
    /// Torn down, terminal
    Disposed,
}

impl PlaybackState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, target),
            (Uninitialized, Loading)
                | (Loading, Playing)
                | (Uninitialized, Disposed)
                | (Loading, Disposed)
                | (Playing, Disposed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Disposed)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Uninitialized
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Uninitialized => write!(f, "uninitialized"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Disposed => write!(f, "disposed"),
        }
    }
}

static NEXT_ATTACH_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Epoch of a single attach.
///
/// Callbacks carry the token they were created under; once the owner moves
/// on to a different token (or none) they are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachToken(u64);

impl AttachToken {
    pub fn next() -> Self {
        Self(NEXT_ATTACH_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttachToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque result of a successful attach, handed back to `detach`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHandle {
    token: AttachToken,
    provider: ProviderKind,
}

impl PlayerHandle {
    pub fn new(token: AttachToken, provider: ProviderKind) -> Self {
        Self { token, provider }
    }

    pub fn token(&self) -> AttachToken {
        self.token
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("vimeo".parse::<ProviderKind>().unwrap(), ProviderKind::Vimeo);
        assert_eq!("YouTube".parse::<ProviderKind>().unwrap(), ProviderKind::YouTube);
        assert!(matches!(
            "dailymotion".parse::<ProviderKind>(),
            Err(Error::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_video_id_rejects_blank() {
        assert!(VideoId::new("   ").is_err());
        assert_eq!(VideoId::new(" 76979871 ").unwrap().as_str(), "76979871");
    }

    #[test]
    fn test_video_id_accepts_numbers() {
        let id: VideoId = serde_json::from_str("123").unwrap();
        assert_eq!(id.as_str(), "123");
        let id: VideoId = serde_json::from_str("\"dQw4w9WgXcQ\"").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert!(serde_json::from_str::<VideoId>("\"\"").is_err());
    }

    #[test]
    fn test_state_transitions() {
        use PlaybackState::*;
        assert!(Uninitialized.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Disposed));
        assert!(Uninitialized.can_transition_to(Disposed));

        assert!(!Playing.can_transition_to(Loading));
        assert!(!Disposed.can_transition_to(Playing));
        assert!(!Disposed.can_transition_to(Disposed));
        assert!(!Uninitialized.can_transition_to(Playing));
    }

    #[test]
    fn test_attach_tokens_increase() {
        let a = AttachToken::next();
        let b = AttachToken::next();
        assert!(b > a);
    }

    #[test]
    fn test_requires_reattach() {
        let a = VideoSource::vimeo("123").unwrap();
        let b = VideoSource::vimeo("456").unwrap();
        let c = VideoSource::youtube("123").unwrap();
        assert!(a.requires_reattach(&b));
        assert!(a.requires_reattach(&c));
        assert!(!a.requires_reattach(&a.clone().with_loop(false)));
    }
}
