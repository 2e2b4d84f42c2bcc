//! Responsive layout observer
//!
//! Mirrors three viewport media queries as booleans:
//! - `(max-height: 400px)` -> `short_viewport`
//! - `(max-aspect-ratio: 16/9)` -> `wide_aspect`
//! - `(min-aspect-ratio: 16/9)` -> `tall_aspect`
//!
//! At exactly 16:9 both aspect predicates hold, as they do in CSS.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Height at or below which the viewport counts as short
pub const SHORT_VIEWPORT_MAX_HEIGHT: u32 = 400;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Current values of the responsive predicates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutFlags {
    /// Viewport height <= 400px
    pub short_viewport: bool,
    /// Aspect ratio at most 16:9; the embed is sized from the height
    pub wide_aspect: bool,
    /// Aspect ratio at least 16:9; the embed is sized from the width
    pub tall_aspect: bool,
}

impl LayoutFlags {
    /// Evaluate the predicates for a viewport
    pub fn evaluate(size: ViewportSize) -> Self {
        // Compare w/h against 16/9 without floating point
        let w9 = u64::from(size.width) * 9;
        let h16 = u64::from(size.height) * 16;
        Self {
            short_viewport: size.height <= SHORT_VIEWPORT_MAX_HEIGHT,
            wide_aspect: w9 <= h16,
            tall_aspect: w9 >= h16,
        }
    }
}

/// Recomputes [`LayoutFlags`] on resize and publishes changes
pub struct LayoutObserver {
    size: ViewportSize,
    flags_tx: watch::Sender<LayoutFlags>,
}

impl LayoutObserver {
    pub fn new(initial: ViewportSize) -> Self {
        let (flags_tx, _) = watch::channel(LayoutFlags::evaluate(initial));
        Self {
            size: initial,
            flags_tx,
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Current flags
    pub fn flags(&self) -> LayoutFlags {
        *self.flags_tx.borrow()
    }

    /// Subscribe to flag changes
    pub fn subscribe(&self) -> watch::Receiver<LayoutFlags> {
        self.flags_tx.subscribe()
    }

    /// Viewport resized. Returns true when any flag changed.
    pub fn on_resize(&mut self, size: ViewportSize) -> bool {
        self.size = size;
        let next = LayoutFlags::evaluate(size);
        let changed = self.flags_tx.send_if_modified(|flags| {
            if *flags == next {
                return false;
            }
            *flags = next;
            true
        });
        if changed {
            debug!(width = size.width, height = size.height, ?next, "Layout flags changed");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_desktop() {
        let flags = LayoutFlags::evaluate(ViewportSize::new(2560, 1080));
        assert!(!flags.short_viewport);
        assert!(!flags.wide_aspect);
        assert!(flags.tall_aspect);
    }

    #[test]
    fn test_portrait_phone() {
        let flags = LayoutFlags::evaluate(ViewportSize::new(390, 844));
        assert!(!flags.short_viewport);
        assert!(flags.wide_aspect);
        assert!(!flags.tall_aspect);
    }

    #[test]
    fn test_exact_16_9_and_short() {
        let flags = LayoutFlags::evaluate(ViewportSize::new(640, 360));
        assert!(flags.short_viewport);
        assert!(flags.wide_aspect);
        assert!(flags.tall_aspect);
    }

    #[test]
    fn test_resize_publishes_only_changes() {
        let mut observer = LayoutObserver::new(ViewportSize::new(1920, 1080));
        let mut rx = observer.subscribe();

        assert!(!observer.on_resize(ViewportSize::new(1280, 720)));
        assert!(!rx.has_changed().unwrap());

        assert!(observer.on_resize(ViewportSize::new(800, 380)));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().short_viewport);
        assert_eq!(observer.size(), ViewportSize::new(800, 380));
    }
}
