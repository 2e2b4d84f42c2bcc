//! Vidbanner Core - provider adapters and playback lifecycle for video banners
//!
//! This crate provides the core functionality behind a full-bleed background
//! video banner:
//! - Vimeo and YouTube provider adapters behind one contract
//! - One-time YouTube IFrame API loading shared by every banner
//! - Playback lifecycle coordination (loading -> playing -> disposed)
//! - Responsive layout predicates and the banner style model
//! - Host configuration and lifecycle events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Vidbanner Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Config    │  │    Layout    │  │    Style     │           │
//! │  │  Validation  │  │   Observer   │  │    Model     │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │    Video    │                              │
//! │                    │   Banner    │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │  Playback   │──── lifecycle events         │
//! │                    │ Coordinator │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │    Vimeo     │  │  Provider   │  │   YouTube    │            │
//! │  │   Adapter    │──│   Adapter   │──│   Adapter    │            │
//! │  └──────┬───────┘  └─────────────┘  └──────┬───────┘            │
//! │         │                                  │                    │
//! │  ┌──────┴───────┐                   ┌──────┴───────┐            │
//! │  │  Vimeo SDK   │                   │ YouTube SDK  │            │
//! │  │    (seam)    │                   │ + API Loader │            │
//! │  └──────────────┘                   └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod embed;
pub mod sdk;
pub mod loader;
pub mod adapter;
pub mod events;
pub mod coordinator;
pub mod layout;
pub mod config;
pub mod banner;
pub mod style;
#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use error::{Error, Result, SdkError};
pub use types::*;
pub use embed::{embed_url, YouTubePlayerOptions, YouTubePlayerVars};
pub use sdk::{RenderTarget, TargetRef, VimeoEvent, YouTubePlayerState};
pub use loader::{ApiStatus, YouTubeApiLoader};
pub use adapter::{create_adapter, AdapterCallbacks, ProviderAdapter, ProviderServices};
pub use events::{HostCallbacks, LifecycleEvent};
pub use coordinator::PlaybackCoordinator;
pub use layout::{LayoutFlags, LayoutObserver, ViewportSize};
pub use config::{AspectRatio, BannerConfig, DEFAULT_OVERLAY};
pub use banner::{ScrollAction, VideoBanner};
pub use style::BannerStyle;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the banner library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Vidbanner Core initialized");
}
