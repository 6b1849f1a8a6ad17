//! Per-attempt bookkeeping.
//!
//! An attempt owns the wait-strategy tasks started for it and the
//! single-assignment guards that make the identity signal and the registry
//! clear happen at most once.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for JoinHandle storage because:
//! 1. Operations are O(1) push or O(n) drain
//! 2. Lock is never held across `.await` points

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::state::AcceptancePath;
use crate::registry::PendingInvitationRegistry;

#[derive(Debug)]
pub(crate) struct Attempt {
    id: Uuid,
    generation: u64,
    path: AcceptancePath,
    fired: AtomicBool,
    registry_cleared: AtomicBool,
    cancel_tx: watch::Sender<bool>,
    waiters: Mutex<Vec<JoinHandle<()>>>,
}

impl Attempt {
    pub(crate) fn new(generation: u64, path: AcceptancePath) -> Self {
        let (cancel_tx, _cancel_rx) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            generation,
            path,
            fired: AtomicBool::new(false),
            registry_cleared: AtomicBool::new(false),
            cancel_tx,
            waiters: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn path(&self) -> AcceptancePath {
        self.path
    }

    /// Claim the identity signal. Only the first caller gets `true`.
    pub(crate) fn try_fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Spawn a wait-strategy task tied to this attempt.
    ///
    /// A task spawned after the attempt fired or was cancelled is aborted
    /// immediately.
    pub(crate) fn spawn_waiter<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        let mut waiters = self.waiters.lock();
        if self.has_fired() || self.is_cancelled() {
            handle.abort();
            return;
        }
        waiters.push(handle);
    }

    /// Abort every wait-strategy task: poll timer, stream subscription, timeout.
    pub(crate) fn release_waiters(&self) {
        for handle in self.waiters.lock().drain(..) {
            handle.abort();
        }
    }

    pub(crate) fn active_waiters(&self) -> usize {
        self.waiters
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Cancel the attempt: claims the signal guard, wakes anything awaiting
    /// [`cancelled`](Self::cancelled), and releases the waiters.
    pub(crate) fn cancel(&self) {
        self.fired.store(true, Ordering::Release);
        self.cancel_tx.send_replace(true);
        self.release_waiters();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Resolves when the attempt is cancelled.
    pub(crate) async fn cancelled(&self) {
        let mut cancel_rx = self.cancel_tx.subscribe();
        loop {
            if *cancel_rx.borrow_and_update() {
                return;
            }
            if cancel_rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Clear the pending invitation unless this attempt already did.
    pub(crate) fn clear_registry_once(&self, registry: &PendingInvitationRegistry) -> bool {
        if self
            .registry_cleared
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        registry.clear();
        true
    }
}

impl Drop for Attempt {
    fn drop(&mut self) {
        for handle in self.waiters.get_mut().drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachlink_core::InvitationId;

    #[test]
    fn test_fire_is_single_assignment() {
        let attempt = Attempt::new(1, AcceptancePath::Federated);
        assert!(attempt.try_fire());
        assert!(!attempt.try_fire());
    }

    #[test]
    fn test_cancel_claims_the_guard() {
        let attempt = Attempt::new(1, AcceptancePath::Federated);
        attempt.cancel();
        assert!(attempt.is_cancelled());
        assert!(!attempt.try_fire());
    }

    #[test]
    fn test_registry_cleared_once() {
        let registry = PendingInvitationRegistry::new();
        registry.register_deep_link(InvitationId::new("abc123"));
        let attempt = Attempt::new(1, AcceptancePath::Manual);

        assert!(attempt.clear_registry_once(&registry));
        assert!(!attempt.clear_registry_once(&registry));
        assert_eq!(registry.clear_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_waiters() {
        let attempt = Attempt::new(1, AcceptancePath::Federated);
        attempt.spawn_waiter(futures::future::pending::<()>());
        assert_eq!(attempt.active_waiters(), 1);

        attempt.cancel();
        assert_eq!(attempt.active_waiters(), 0);
        attempt.cancelled().await;
    }

    #[tokio::test]
    async fn test_waiter_after_fire_is_dropped() {
        let attempt = Attempt::new(1, AcceptancePath::Federated);
        assert!(attempt.try_fire());
        attempt.spawn_waiter(futures::future::pending::<()>());
        assert_eq!(attempt.active_waiters(), 0);
    }
}
