//! YouTube IFrame API loader
//!
//! The IFrame API script is page-global: it is fetched once and announces
//! itself through a single global hook. Every YouTube banner on the page
//! awaits the same shared readiness future instead of re-requesting the
//! script or polling a flag.

use crate::embed::YOUTUBE_IFRAME_API_URL;
use crate::sdk::YouTubeSdk;
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

/// Load status of the IFrame API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    /// Script never requested
    NotRequested,
    /// Script requested, ready hook not fired yet
    Pending,
    /// `YT.Player` usable
    Ready,
    /// Ready hook dropped without firing; the script is not requested again
    Failed,
}

type ReadySignal = Shared<oneshot::Receiver<()>>;

struct LoaderState {
    status: ApiStatus,
    signal: Option<ReadySignal>,
    requests: u32,
}

/// Owns the readiness sender handed to the SDK.
///
/// Firing wakes every waiter with `true`. Dropping it unfired cancels the
/// shared signal, so every waiter sees `false`.
struct ReadyHook {
    sender: Option<oneshot::Sender<()>>,
    state: Weak<RefCell<LoaderState>>,
}

impl ReadyHook {
    fn fire(mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().status = ApiStatus::Ready;
        }
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(());
            info!("YouTube IFrame API ready");
        }
    }
}

impl Drop for ReadyHook {
    fn drop(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        warn!("YouTube IFrame API ready hook dropped before firing");
        if let Some(state) = self.state.upgrade() {
            if let Ok(mut state) = state.try_borrow_mut() {
                if state.status == ApiStatus::Pending {
                    state.status = ApiStatus::Failed;
                }
            }
        }
    }
}

/// Shared readiness service for the YouTube IFrame API.
///
/// Cloning yields another handle to the same service. [`YouTubeApiLoader::global`]
/// is the instance shared by every banner on the current event-loop thread.
#[derive(Clone)]
pub struct YouTubeApiLoader {
    state: Rc<RefCell<LoaderState>>,
}

thread_local! {
    static GLOBAL_LOADER: YouTubeApiLoader = YouTubeApiLoader::new();
}

impl YouTubeApiLoader {
    /// Create an independent loader
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(LoaderState {
                status: ApiStatus::NotRequested,
                signal: None,
                requests: 0,
            })),
        }
    }

    /// The loader shared by every banner on this thread
    pub fn global() -> Self {
        GLOBAL_LOADER.with(Clone::clone)
    }

    pub fn status(&self) -> ApiStatus {
        self.state.borrow().status
    }

    /// Number of script requests issued through this loader (0 or 1)
    pub fn request_count(&self) -> u32 {
        self.state.borrow().requests
    }

    /// Whether `YT.Player` can be constructed right now.
    ///
    /// Also notices an API that was loaded behind the loader's back.
    pub fn is_ready(&self, sdk: &dyn YouTubeSdk) -> bool {
        if self.status() == ApiStatus::Ready {
            return true;
        }
        if sdk.is_api_available() {
            self.state.borrow_mut().status = ApiStatus::Ready;
            return true;
        }
        false
    }

    /// Resolve once the IFrame API is ready, requesting the script if nobody
    /// has yet.
    ///
    /// Concurrent callers share one request and one readiness signal. The
    /// future yields `false` if the SDK drops the ready hook without firing
    /// it (script-load failure); later callers then get `false` as well
    /// without a second request. Dropping the future cancels only this
    /// caller's wait.
    pub fn ensure_loaded(&self, sdk: &dyn YouTubeSdk) -> impl Future<Output = bool> + 'static {
        let signal = if self.is_ready(sdk) {
            None
        } else {
            Some(self.pending_signal(sdk))
        };

        async move {
            match signal {
                None => true,
                Some(signal) => signal.await.is_ok(),
            }
        }
    }

    fn pending_signal(&self, sdk: &dyn YouTubeSdk) -> ReadySignal {
        let (signal, sender) = {
            let mut state = self.state.borrow_mut();
            if let Some(signal) = &state.signal {
                debug!("YouTube IFrame API already requested, awaiting shared signal");
                return signal.clone();
            }

            let (sender, receiver) = oneshot::channel();
            let signal = receiver.shared();
            state.signal = Some(signal.clone());
            state.status = ApiStatus::Pending;
            state.requests += 1;
            (signal, sender)
        };

        info!(url = YOUTUBE_IFRAME_API_URL, "Requesting YouTube IFrame API");

        // The hook may fire or be dropped synchronously, so no borrow is held here
        let hook = ReadyHook {
            sender: Some(sender),
            state: Rc::downgrade(&self.state),
        };
        sdk.request_api(Box::new(move || hook.fire()));

        signal
    }
}

impl Default for YouTubeApiLoader {
    fn default() -> Self {
        Self::new()
    }
}
