//! Banner configuration
//!
//! Deserialized from the host (camelCase JSON, as a web host passes props)
//! and validated once, up front. An unknown provider or aspect ratio is
//! rejected here rather than at attach time.

use crate::{Error, ProviderKind, Result, VideoId, VideoSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overlay background used when the host sets none
pub const DEFAULT_OVERLAY: &str = "linear-gradient(180deg, rgba(50, 50, 50, 1), rgba(0, 0, 0, 1))";

/// Banner sizing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    /// Fill the viewport height
    #[default]
    #[serde(rename = "full")]
    Full,
}

impl AspectRatio {
    /// Height as a fraction of width, `None` for full-viewport
    pub fn height_ratio(&self) -> Option<f64> {
        match self {
            AspectRatio::Landscape => Some(9.0 / 16.0),
            AspectRatio::Portrait => Some(16.0 / 9.0),
            AspectRatio::Square => Some(1.0),
            AspectRatio::Full => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Full => "full",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "1:1" => Ok(AspectRatio::Square),
            "full" => Ok(AspectRatio::Full),
            other => Err(Error::InvalidAspectRatio(other.to_string())),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_video_source() -> String {
    ProviderKind::Vimeo.as_str().to_string()
}

fn default_aspect_ratio() -> String {
    AspectRatio::Full.as_str().to_string()
}

fn default_true() -> bool {
    true
}

/// Banner configuration as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerConfig {
    /// Provider video id (string or number)
    pub video_id: VideoId,
    /// "vimeo" or "youtube"
    #[serde(default = "default_video_source")]
    pub video_source: String,
    /// "16:9", "9:16", "1:1" or "full"
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    /// CSS background for the overlay
    #[serde(default)]
    pub overlay_color: Option<String>,
    #[serde(default = "default_true")]
    pub show_scroll_down: bool,
    /// Element id scrolled into view by the scroll control
    #[serde(default)]
    pub scroll_target_id: Option<String>,
    #[serde(default)]
    pub logo_src: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Loop the video (YouTube only)
    #[serde(default = "default_true", rename = "loop")]
    pub loop_playback: bool,
}

impl BannerConfig {
    /// Minimal config for a source
    pub fn new(video_id: VideoId, provider: ProviderKind) -> Self {
        Self {
            video_id,
            video_source: provider.as_str().to_string(),
            aspect_ratio: default_aspect_ratio(),
            overlay_color: None,
            show_scroll_down: true,
            scroll_target_id: None,
            logo_src: None,
            title: String::new(),
            loop_playback: true,
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and derive the video source
    pub fn validate(&self) -> Result<VideoSource> {
        let provider = self.provider()?;
        self.aspect()?;
        if let Some(color) = &self.overlay_color {
            if color.trim().is_empty() {
                return Err(Error::InvalidConfig("overlayColor is empty".to_string()));
            }
        }
        if let Some(target) = &self.scroll_target_id {
            if target.trim().is_empty() {
                return Err(Error::InvalidConfig("scrollTargetId is empty".to_string()));
            }
        }
        Ok(VideoSource::new(self.video_id.clone(), provider).with_loop(self.loop_playback))
    }

    pub fn provider(&self) -> Result<ProviderKind> {
        self.video_source.parse()
    }

    pub fn aspect(&self) -> Result<AspectRatio> {
        self.aspect_ratio.parse()
    }

    /// Overlay background, falling back to the default gradient
    pub fn overlay(&self) -> &str {
        self.overlay_color.as_deref().unwrap_or(DEFAULT_OVERLAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BannerConfig::from_json(r#"{"videoId": 76979871}"#).unwrap();
        assert_eq!(config.video_source, "vimeo");
        assert_eq!(config.aspect().unwrap(), AspectRatio::Full);
        assert!(config.show_scroll_down);
        assert!(config.loop_playback);
        assert_eq!(config.overlay(), DEFAULT_OVERLAY);
        assert_eq!(config.title, "");
    }

    #[test]
    fn test_config_full() {
        let json = r##"{
            "videoId": "dQw4w9WgXcQ",
            "videoSource": "youtube",
            "aspectRatio": "9:16",
            "overlayColor": "#000",
            "showScrollDown": false,
            "scrollTargetId": "content",
            "logoSrc": "/logo.svg",
            "title": "Welcome",
            "loop": false
        }"##;
        let config = BannerConfig::from_json(json).unwrap();
        let source = config.validate().unwrap();

        assert_eq!(source.provider, ProviderKind::YouTube);
        assert!(!source.loop_playback);
        assert_eq!(config.aspect().unwrap(), AspectRatio::Portrait);
        assert_eq!(config.overlay(), "#000");
        assert_eq!(config.scroll_target_id.as_deref(), Some("content"));
    }

    #[test]
    fn test_unknown_provider_fails_fast() {
        let err = BannerConfig::from_json(r#"{"videoId": "x", "videoSource": "dailymotion"}"#).unwrap_err();
        assert!(matches!(err, Error::UnknownProvider(_)));
    }

    #[test]
    fn test_unknown_aspect_ratio() {
        let err = BannerConfig::from_json(r#"{"videoId": "x", "aspectRatio": "4:3"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidAspectRatio(_)));
    }

    #[test]
    fn test_missing_video_id() {
        let err = BannerConfig::from_json(r#"{"videoSource": "vimeo"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_height_ratios() {
        assert_eq!(AspectRatio::Landscape.height_ratio(), Some(0.5625));
        assert_eq!(AspectRatio::Full.height_ratio(), None);
        assert_eq!("1:1".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
    }
}
