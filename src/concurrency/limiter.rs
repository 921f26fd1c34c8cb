//! FIFO bounded-admission limiter
//!
//! Grants a slot to at most `capacity` concurrent holders. Built on a tokio
//! `Semaphore`, which queues excess callers in arrival order and assigns a
//! released permit directly to the oldest waiter, so the active count never
//! dips while someone is waiting.

use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

struct Shared {
    name: String,
    capacity: usize,
    semaphore: Arc<Semaphore>,
    /// Callers currently suspended in `acquire`
    waiting: AtomicUsize,
}

/// Counts a caller as queued until it is granted a slot or gives up
struct Queued<'a>(&'a AtomicUsize);

impl<'a> Queued<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Queued<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bounded-admission gate for one protected resource pool
///
/// Cloning is cheap and every clone shares the same slots, so one limiter can
/// be handed to any number of callers.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    shared: Arc<Shared>,
}

impl ConcurrencyLimiter {
    /// Create a limiter admitting at most `capacity` concurrent holders
    ///
    /// A capacity of zero is raised to one; a pool that can never admit
    /// anybody would hang every caller.
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                capacity,
                semaphore: Arc::new(Semaphore::new(capacity)),
                waiting: AtomicUsize::new(0),
            }),
        }
    }

    /// Wait for a slot
    ///
    /// Returns immediately when a slot is free; otherwise queues behind every
    /// earlier waiter. The slot is released when the guard drops. Dropping the
    /// future while queued gives up the place in line without losing a slot.
    pub async fn acquire(&self) -> SlotGuard {
        if let Ok(permit) = Arc::clone(&self.shared.semaphore).try_acquire_owned() {
            return self.granted(permit);
        }

        let _queued = Queued::enter(&self.shared.waiting);
        debug!(
            "Queuing {} request. Active: {}, Queue: {}",
            self.shared.name,
            self.active(),
            self.waiting()
        );

        // The semaphore is never closed, so acquire_owned only fails if
        // that invariant is broken; keep waiting rather than overrun the pool.
        loop {
            match Arc::clone(&self.shared.semaphore).acquire_owned().await {
                Ok(permit) => return self.granted(permit),
                Err(_) => {
                    error!("{} limiter semaphore was closed unexpectedly", self.shared.name);
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    fn granted(&self, permit: OwnedSemaphorePermit) -> SlotGuard {
        debug!("Acquired {} slot. Active: {}", self.shared.name, self.active());
        SlotGuard {
            shared: Arc::clone(&self.shared),
            _permit: permit,
        }
    }

    /// Fixed maximum number of concurrent holders
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Current number of slot holders
    #[must_use]
    pub fn active(&self) -> usize {
        self.shared.capacity - self.shared.semaphore.available_permits()
    }

    /// Number of callers queued for a slot
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.shared.waiting.load(Ordering::SeqCst)
    }
}

/// A held limiter slot, returned to the pool on drop
#[must_use = "the slot is released as soon as the guard is dropped"]
pub struct SlotGuard {
    shared: Arc<Shared>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        // The permit itself is returned right after this runs
        debug!("Releasing {} slot", self.shared.name);
    }
}

impl std::fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotGuard")
            .field("pool", &self.shared.name)
            .finish()
    }
}
