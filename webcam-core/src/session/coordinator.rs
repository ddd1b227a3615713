use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

static SHARED: OnceLock<Arc<AcquisitionCoordinator>> = OnceLock::new();

/// Guard shared by every widget instance of a host, allowing at most one
/// pending acquisition at a time.
///
/// The instance that wins `try_acquire` owns the guard until its teardown
/// calls `release`. The coordinator also keeps the registry of live track
/// IDs adopted by widgets.
#[derive(Debug, Default)]
pub struct AcquisitionCoordinator {
    requested: AtomicBool,
    tracks: Mutex<Vec<String>>,
}

impl AcquisitionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide coordinator for callers that don't inject their own.
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    /// Take the guard. Returns false if an acquisition is already requested.
    pub fn try_acquire(&self) -> bool {
        self.requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn release(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn register_tracks<I>(&self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.tracks.lock().extend(ids);
    }

    pub fn unregister_tracks(&self, ids: &[String]) {
        self.tracks.lock().retain(|id| !ids.contains(id));
    }

    /// Live track IDs across all widgets using this coordinator.
    pub fn tracks(&self) -> Vec<String> {
        self.tracks.lock().clone()
    }
}

/// Cancellable handle for one in-flight acquisition.
///
/// Teardown cancels the handle; a host result arriving afterwards is
/// discarded instead of being written back to the widget.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionHandle {
    cancelled: Arc<AtomicBool>,
}

impl AcquisitionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
