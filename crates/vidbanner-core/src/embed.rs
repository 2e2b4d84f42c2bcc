//! Embed URLs and player parameters for the two providers
//!
//! These are wire contracts with Vimeo and YouTube. Parameter order is not
//! significant to the providers but is kept stable so URLs compare equal.

use crate::{ProviderKind, Result, VideoSource};
use serde::{Deserialize, Serialize};
use url::Url;

/// Vimeo background-mode embed base
pub const VIMEO_EMBED_BASE: &str = "https://player.vimeo.com/video/";

/// YouTube embed base (fallback `src` before the IFrame API takes over)
pub const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// YouTube IFrame API loader script
pub const YOUTUBE_IFRAME_API_URL: &str = "https://www.youtube.com/iframe_api";

/// `allow` attribute for the embed surface
pub const EMBED_ALLOW: &str = "autoplay; fullscreen; picture-in-picture";

/// Build the embed URL for a source
pub fn embed_url(source: &VideoSource) -> Result<Url> {
    match source.provider {
        ProviderKind::Vimeo => vimeo_embed_url(source),
        ProviderKind::YouTube => youtube_embed_url(source),
    }
}

fn base_with_id(base: &str, id: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(id);
    Ok(url)
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

fn vimeo_embed_url(source: &VideoSource) -> Result<Url> {
    let mut url = base_with_id(VIMEO_EMBED_BASE, source.id.as_str())?;
    url.query_pairs_mut()
        .append_pair("background", "1")
        .append_pair("autoplay", flag(source.autoplay))
        .append_pair("muted", flag(source.muted));
    Ok(url)
}

fn youtube_embed_url(source: &VideoSource) -> Result<Url> {
    let id = source.id.as_str();
    let mut url = base_with_id(YOUTUBE_EMBED_BASE, id)?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("autoplay", flag(source.autoplay))
            .append_pair("mute", flag(source.muted))
            .append_pair("controls", "0")
            .append_pair("showinfo", "0")
            .append_pair("rel", "0")
            .append_pair("modestbranding", "1");
        // Single-video loops need the video listed as its own playlist
        if source.loop_playback {
            query.append_pair("loop", "1").append_pair("playlist", id);
        }
    }
    Ok(url)
}

/// `playerVars` passed to `YT.Player`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubePlayerVars {
    pub playsinline: u8,
    pub autoplay: u8,
    pub mute: u8,
    pub controls: u8,
    pub showinfo: u8,
    pub rel: u8,
    pub modestbranding: u8,
}

impl YouTubePlayerVars {
    pub fn for_source(source: &VideoSource) -> Self {
        Self {
            playsinline: 1,
            autoplay: u8::from(source.autoplay),
            mute: u8::from(source.muted),
            controls: 0,
            showinfo: 0,
            rel: 0,
            modestbranding: 1,
        }
    }

    /// Name/value pairs in a stable order
    pub fn pairs(&self) -> [(&'static str, u8); 7] {
        [
            ("playsinline", self.playsinline),
            ("autoplay", self.autoplay),
            ("mute", self.mute),
            ("controls", self.controls),
            ("showinfo", self.showinfo),
            ("rel", self.rel),
            ("modestbranding", self.modestbranding),
        ]
    }
}

impl Default for YouTubePlayerVars {
    fn default() -> Self {
        Self {
            playsinline: 1,
            autoplay: 1,
            mute: 1,
            controls: 0,
            showinfo: 0,
            rel: 0,
            modestbranding: 1,
        }
    }
}

/// Everything `YT.Player` needs besides the mount point and event handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubePlayerOptions {
    pub video_id: String,
    pub player_vars: YouTubePlayerVars,
}

impl YouTubePlayerOptions {
    pub fn for_source(source: &VideoSource) -> Self {
        Self {
            video_id: source.id.to_string(),
            player_vars: YouTubePlayerVars::for_source(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vimeo_embed_url() {
        let source = VideoSource::vimeo("123").unwrap();
        assert_eq!(
            embed_url(&source).unwrap().as_str(),
            "https://player.vimeo.com/video/123?background=1&autoplay=1&muted=1"
        );
    }

    #[test]
    fn test_youtube_embed_url() {
        let source = VideoSource::youtube("abc").unwrap();
        assert_eq!(
            embed_url(&source).unwrap().as_str(),
            "https://www.youtube.com/embed/abc?autoplay=1&mute=1&controls=0&showinfo=0&rel=0&modestbranding=1&loop=1&playlist=abc"
        );
    }

    #[test]
    fn test_youtube_embed_url_without_loop() {
        let source = VideoSource::youtube("abc").unwrap().with_loop(false);
        let url = embed_url(&source).unwrap();
        assert!(!url.as_str().contains("loop="));
        assert!(!url.as_str().contains("playlist="));
    }

    #[test]
    fn test_embed_id_is_escaped() {
        let source = VideoSource::youtube("a/b c").unwrap();
        let url = embed_url(&source).unwrap();
        assert!(url.path().ends_with("/embed/a%2Fb%20c"));
    }

    #[test]
    fn test_player_vars() {
        let source = VideoSource::youtube("abc").unwrap();
        let options = YouTubePlayerOptions::for_source(&source);
        assert_eq!(options.video_id, "abc");
        assert_eq!(options.player_vars, YouTubePlayerVars::default());

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["playerVars"]["modestbranding"], 1);
        assert_eq!(json["videoId"], "abc");
    }
}
