use std::{
    process,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::sync::{futures::Notified, Notify};

/// Track outstanding conversions.
///
/// Backs the shared loading indicator and lets callers wait until every
/// conversion has finished.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<Inner>);

impl InFlight {
    /// Create a new tracker without outstanding conversions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a conversion.
    pub fn activity(&self) -> Activity {
        Activity::new(&self.0)
    }

    /// Whether at least one conversion is outstanding.
    pub fn is_loading(&self) -> bool {
        !self.0.idle()
    }

    /// The number of outstanding conversions.
    pub fn count(&self) -> usize {
        self.0.active.load(Ordering::Relaxed)
    }

    /// Async "block" until no conversion is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let changed = self.0.changed();
            if self.0.idle() {
                break;
            }
            changed.await
        }
    }
}

/// A single outstanding conversion.
///
/// The conversion is finished on drop.
#[derive(Debug)]
pub struct Activity(Arc<Inner>);

impl Activity {
    fn new(inner: &Arc<Inner>) -> Self {
        Self(inner.increment())
    }
}

impl Drop for Activity {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

#[derive(Debug, Default)]
struct Inner {
    // number of outstanding conversions
    active: AtomicUsize,
    // notified whenever the result of `idle` changes
    notify: Notify,
}

impl Inner {
    /// Abort if more then isize::MAX activities are active.
    ///
    /// This prevents integer overflow of the `active` counter in case
    /// someone is `mem::forget`ing activities.
    const MAX_ACTIVE: usize = isize::MAX as usize;

    fn increment(self: &Arc<Self>) -> Arc<Self> {
        match self.active.fetch_add(1, Ordering::Relaxed) {
            0 => self.notify.notify_waiters(),
            1..=Self::MAX_ACTIVE => {}
            _ => process::abort(),
        }
        self.clone()
    }

    fn decrement(&self) {
        match self.active.fetch_sub(1, Ordering::Relaxed) {
            1 => self.notify.notify_waiters(),
            2..=Self::MAX_ACTIVE => {}
            _ => process::abort(),
        }
    }

    fn idle(&self) -> bool {
        self.active.load(Ordering::Relaxed) == 0
    }

    fn changed(&self) -> Notified<'_> {
        self.notify.notified()
    }
}
