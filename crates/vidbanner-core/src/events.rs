//! Host-facing callbacks and lifecycle events
//!
//! Lifecycle events are what a host forwards to its analytics pipeline:
//! - Attached: a player was requested for a source
//! - Loaded: the provider finished loading (at most once per attach)
//! - StateChanged: every accepted playback transition
//! - Disposed: the banner was torn down

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Lifecycle event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Player requested
    Attached {
        banner_id: BannerId,
        provider: ProviderKind,
        video_id: String,
    },

    /// Provider reported ready
    Loaded { banner_id: BannerId },

    /// State change
    StateChanged {
        banner_id: BannerId,
        from: PlaybackState,
        to: PlaybackState,
    },

    /// Banner torn down
    Disposed { banner_id: BannerId },
}

impl LifecycleEvent {
    /// Get event name
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Attached { .. } => "attached",
            LifecycleEvent::Loaded { .. } => "loaded",
            LifecycleEvent::StateChanged { .. } => "state_changed",
            LifecycleEvent::Disposed { .. } => "disposed",
        }
    }

    pub fn banner_id(&self) -> BannerId {
        match self {
            LifecycleEvent::Attached { banner_id, .. }
            | LifecycleEvent::Loaded { banner_id }
            | LifecycleEvent::StateChanged { banner_id, .. }
            | LifecycleEvent::Disposed { banner_id } => *banner_id,
        }
    }

    /// Serialize for JS interop
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Callbacks supplied by the host application
#[derive(Clone, Default)]
pub struct HostCallbacks {
    /// Provider finished loading the video
    pub on_loaded: Option<Rc<dyn Fn()>>,
    /// Scroll control activated; takes precedence over scrolling to a target
    pub on_scroll_down: Option<Rc<dyn Fn()>>,
    /// Every lifecycle event
    pub on_event: Option<Rc<dyn Fn(&LifecycleEvent)>>,
}

impl HostCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_loaded(mut self, f: impl Fn() + 'static) -> Self {
        self.on_loaded = Some(Rc::new(f));
        self
    }

    pub fn on_scroll_down(mut self, f: impl Fn() + 'static) -> Self {
        self.on_scroll_down = Some(Rc::new(f));
        self
    }

    pub fn on_event(mut self, f: impl Fn(&LifecycleEvent) + 'static) -> Self {
        self.on_event = Some(Rc::new(f));
        self
    }

    pub(crate) fn emit(&self, event: LifecycleEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_event_json() {
        let event = LifecycleEvent::StateChanged {
            banner_id: BannerId::new(),
            from: PlaybackState::Loading,
            to: PlaybackState::Playing,
        };
        let json = event.to_json();
        assert!(json.contains("\"event\":\"state_changed\""));
        assert!(json.contains("\"to\":\"playing\""));
    }

    #[test]
    fn test_emit_reaches_hook() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let host = HostCallbacks::new().on_event(move |e| sink.borrow_mut().push(e.name()));

        let banner_id = BannerId::new();
        host.emit(LifecycleEvent::Loaded { banner_id });
        host.emit(LifecycleEvent::Disposed { banner_id });

        assert_eq!(*seen.borrow(), vec!["loaded", "disposed"]);
    }
}
