//! Banner style model
//!
//! Pure function from (aspect ratio, overlay, playback state, layout flags)
//! to the inline styles a web view applies, plus the keyframes the scroll
//! control animates with.
//!
//! # Usage
//!
//! ```rust
//! use vidbanner_core::style::BannerStyle;
//! use vidbanner_core::{AspectRatio, LayoutFlags, PlaybackState};
//!
//! let style = BannerStyle::compute(AspectRatio::Full, "black", PlaybackState::Playing, LayoutFlags::default());
//! assert_eq!(style.overlay.get("opacity"), Some("0.3"));
//! ```

use crate::config::AspectRatio;
use crate::layout::LayoutFlags;
use crate::PlaybackState;
use serde::ser::{Serialize, Serializer};
use serde::Serialize as DeriveSerialize;

/// Overlay opacity while the video is loading
pub const OVERLAY_LOADING_OPACITY: &str = "1";

/// Overlay opacity once the video plays
pub const OVERLAY_PLAYING_OPACITY: &str = "0.3";

/// Idle animation of the scroll control
pub const SCROLL_IDLE_ANIMATION: &str = "autoBounce 5s ease-in-out infinite";

/// Hover animation of the scroll control
pub const SCROLL_HOVER_ANIMATION: &str = "bounce 1s infinite";

/// Ordered CSS declarations for one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBlock(Vec<(&'static str, String)>);

impl StyleBlock {
    fn with(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.0.push((property, value.into()));
        self
    }

    /// Value of a property
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn declarations(&self) -> &[(&'static str, String)] {
        &self.0
    }

    /// Render as an inline `style` attribute
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for StyleBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(p, v)| (*p, v)))
    }
}

/// Format a percentage with at most two decimals
fn percent(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", trimmed)
}

/// Inline styles for every banner element
#[derive(Debug, Clone, PartialEq, DeriveSerialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerStyle {
    pub container: StyleBlock,
    pub embed: StyleBlock,
    pub overlay: StyleBlock,
    pub text: StyleBlock,
    pub logo: StyleBlock,
    pub title: StyleBlock,
    pub scroll_down: StyleBlock,
    pub learn_more: StyleBlock,
    pub scroll_button: StyleBlock,
    pub scroll_icon: StyleBlock,
}

impl BannerStyle {
    pub fn compute(
        aspect: AspectRatio,
        overlay: &str,
        state: PlaybackState,
        flags: LayoutFlags,
    ) -> Self {
        let short = flags.short_viewport;

        let mut container = StyleBlock::default()
            .with("display", "flex")
            .with("flex-direction", "column")
            .with("position", "relative")
            .with("overflow", "hidden")
            .with("width", "100vw")
            .with("margin-top", "-64px");
        container = match aspect.height_ratio() {
            Some(ratio) => container
                .with("height", "0")
                .with("padding-bottom", percent(100.0 / ratio)),
            None => container.with("height", "100vh"),
        };

        let embed = StyleBlock::default()
            .with("position", "absolute")
            .with("z-index", "1")
            .with("top", "50%")
            .with("left", "50%")
            .with("height", if flags.tall_aspect { "56.25vw" } else { "100vh" })
            .with("width", if flags.wide_aspect { "177.78vh" } else { "100vw" })
            .with("cursor", "pointer")
            .with("transform", "translate(-50%, -50%)");

        let opacity = if state == PlaybackState::Playing {
            OVERLAY_PLAYING_OPACITY
        } else {
            OVERLAY_LOADING_OPACITY
        };
        let overlay = StyleBlock::default()
            .with("position", "absolute")
            .with("top", "0")
            .with("left", "0")
            .with("width", "100%")
            .with("height", "100%")
            .with("background", overlay)
            .with("opacity", opacity)
            .with("transition", "opacity 0.5s ease")
            .with("z-index", "2")
            .with("cursor", "pointer");

        let text = StyleBlock::default()
            .with("position", "absolute")
            .with("top", "0")
            .with("left", "0")
            .with("width", "100%")
            .with("height", "100%")
            .with("z-index", "3")
            .with("display", "flex")
            .with("flex-direction", "column")
            .with("justify-content", "center")
            .with("align-items", "flex-start")
            .with("padding", if short { "16px" } else { "24px" })
            .with("margin-top", if short { "0px" } else { "16px" })
            .with("color", "white")
            .with("cursor", "pointer");

        let logo = StyleBlock::default()
            .with("max-width", "350px")
            .with("margin-bottom", "16px")
            .with("width", "100%")
            .with("height", "auto");

        let title = StyleBlock::default()
            .with("color", "white")
            .with("max-width", "85%")
            .with("font-size", if short { "1.5rem" } else { "2rem" })
            .with("font-weight", "500")
            .with("line-height", "1.2");

        let scroll_down = StyleBlock::default()
            .with("position", "absolute")
            .with("bottom", if short { "36px" } else { "20px" })
            .with("left", "50%")
            .with("transform", "translateX(-50%)")
            .with("text-align", "center")
            .with("color", "white")
            .with("z-index", "3");

        let learn_more = StyleBlock::default()
            .with("color", "white")
            .with("font-size", if short { "0.875rem" } else { "1rem" })
            .with("margin-bottom", "4px")
            .with("opacity", "0.9");

        let scroll_button = StyleBlock::default()
            .with("background-color", "transparent")
            .with("border", "none")
            .with("outline", "none")
            .with("cursor", "pointer")
            .with("padding", "8px")
            .with("border-radius", "50%")
            .with("transition", "background-color 0.2s ease");

        let scroll_icon = StyleBlock::default()
            .with("width", "24px")
            .with("height", "24px")
            .with("fill", "white")
            .with("transition", "transform 0.2s ease")
            .with("animation", SCROLL_IDLE_ANIMATION);

        Self {
            container,
            embed,
            overlay,
            text,
            logo,
            title,
            scroll_down,
            learn_more,
            scroll_button,
            scroll_icon,
        }
    }

    /// Export as JSON for JS interop
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Keyframes used by the scroll control
pub fn keyframes_css() -> String {
    r#"
@keyframes bounce {
  0%, 100% {
    transform: translateY(0);
  }
  50% {
    transform: translateY(8px);
  }
}

@keyframes autoBounce {
  0%, 40%, 100% {
    transform: translateY(0);
    opacity: 0.8;
  }
  20% {
    transform: translateY(8px);
    opacity: 1;
  }
}
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_OVERLAY;

    fn flags(short_viewport: bool, wide_aspect: bool, tall_aspect: bool) -> LayoutFlags {
        LayoutFlags {
            short_viewport,
            wide_aspect,
            tall_aspect,
        }
    }

    #[test]
    fn test_overlay_fades_when_playing() {
        let loading = BannerStyle::compute(AspectRatio::Full, DEFAULT_OVERLAY, PlaybackState::Loading, flags(false, false, true));
        let playing = BannerStyle::compute(AspectRatio::Full, DEFAULT_OVERLAY, PlaybackState::Playing, flags(false, false, true));

        assert_eq!(loading.overlay.get("opacity"), Some("1"));
        assert_eq!(playing.overlay.get("opacity"), Some("0.3"));
        assert_eq!(playing.overlay.get("background"), Some(DEFAULT_OVERLAY));
    }

    #[test]
    fn test_container_sizing() {
        let full = BannerStyle::compute(AspectRatio::Full, "black", PlaybackState::Loading, LayoutFlags::default());
        assert_eq!(full.container.get("height"), Some("100vh"));
        assert_eq!(full.container.get("padding-bottom"), None);

        let square = BannerStyle::compute(AspectRatio::Square, "black", PlaybackState::Loading, LayoutFlags::default());
        assert_eq!(square.container.get("height"), Some("0"));
        assert_eq!(square.container.get("padding-bottom"), Some("100%"));

        let landscape = BannerStyle::compute(AspectRatio::Landscape, "black", PlaybackState::Loading, LayoutFlags::default());
        assert_eq!(landscape.container.get("padding-bottom"), Some("177.78%"));

        let portrait = BannerStyle::compute(AspectRatio::Portrait, "black", PlaybackState::Loading, LayoutFlags::default());
        assert_eq!(portrait.container.get("padding-bottom"), Some("56.25%"));
    }

    #[test]
    fn test_embed_cover_sizing() {
        let wide = BannerStyle::compute(AspectRatio::Full, "black", PlaybackState::Loading, flags(false, true, false));
        assert_eq!(wide.embed.get("width"), Some("177.78vh"));
        assert_eq!(wide.embed.get("height"), Some("100vh"));

        let tall = BannerStyle::compute(AspectRatio::Full, "black", PlaybackState::Loading, flags(false, false, true));
        assert_eq!(tall.embed.get("width"), Some("100vw"));
        assert_eq!(tall.embed.get("height"), Some("56.25vw"));
    }

    #[test]
    fn test_short_viewport_typography() {
        let short = BannerStyle::compute(AspectRatio::Full, "black", PlaybackState::Loading, flags(true, false, true));
        assert_eq!(short.title.get("font-size"), Some("1.5rem"));
        assert_eq!(short.text.get("padding"), Some("16px"));
        assert_eq!(short.scroll_down.get("bottom"), Some("36px"));
        assert_eq!(short.learn_more.get("font-size"), Some("0.875rem"));
    }

    #[test]
    fn test_css_rendering() {
        let style = BannerStyle::compute(AspectRatio::Full, "black", PlaybackState::Loading, LayoutFlags::default());
        assert!(style.logo.to_css().starts_with("max-width: 350px; margin-bottom: 16px;"));
        assert!(style.to_json().contains("\"scrollDown\""));
        assert!(keyframes_css().contains("@keyframes autoBounce"));
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(100.0), "100%");
        assert_eq!(percent(56.25), "56.25%");
        assert_eq!(percent(177.777), "177.78%");
    }
}
