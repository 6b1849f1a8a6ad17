//! # Pending Invitation Registry
//!
//! Deep-link bookkeeping shared across screens. The deep-link entry point
//! registers the invitation before the coordinator is built; from then on only
//! the coordinator mutates it, which is why the mutators are crate-private.
//!
//! Screens observe it through [`PendingInvitationRegistry::subscribe`].
//!
//! The registry also tracks which invitations have a redemption call in
//! flight. Every coordinator built against the same registry sees those
//! claims, so a coordinator rebuilt after a cancel cannot issue a second
//! redemption while the abandoned one is still running.

use coachlink_core::InvitationId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Deep-link state for an in-progress acceptance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvitation {
    /// Invitation carried by the deep link
    pub invitation_id: Option<InvitationId>,
    /// Whether an acceptance attempt is running
    pub is_processing: bool,
    /// Whether the invitation screen should be shown
    pub is_visible: bool,
}

impl PendingInvitation {
    /// True once nothing is pending
    pub fn is_clear(&self) -> bool {
        self.invitation_id.is_none() && !self.is_processing && !self.is_visible
    }
}

/// Shared handle to the pending invitation
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone)]
pub struct PendingInvitationRegistry {
    state: Arc<watch::Sender<PendingInvitation>>,
    clears: Arc<AtomicU64>,
    redeeming: Arc<Mutex<HashSet<InvitationId>>>,
}

/// Held for the duration of one redemption call; releases the claim on drop.
#[derive(Debug)]
pub(crate) struct RedemptionClaim {
    redeeming: Arc<Mutex<HashSet<InvitationId>>>,
    invitation_id: InvitationId,
}

impl Drop for RedemptionClaim {
    fn drop(&mut self) {
        self.redeeming.lock().remove(&self.invitation_id);
    }
}

impl PendingInvitationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let (state, _rx) = watch::channel(PendingInvitation::default());
        Self {
            state: Arc::new(state),
            clears: Arc::new(AtomicU64::new(0)),
            redeeming: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Record an invitation arriving through a deep link and show its screen
    pub fn register_deep_link(&self, invitation_id: InvitationId) {
        debug!(invitation_id = %invitation_id, "Deep link registered");
        self.state.send_replace(PendingInvitation {
            invitation_id: Some(invitation_id),
            is_processing: false,
            is_visible: true,
        });
    }

    /// Current value
    pub fn snapshot(&self) -> PendingInvitation {
        self.state.borrow().clone()
    }

    /// Observe changes
    pub fn subscribe(&self) -> watch::Receiver<PendingInvitation> {
        self.state.subscribe()
    }

    /// How many times the registry has been cleared
    pub fn clear_count(&self) -> u64 {
        self.clears.load(Ordering::Acquire)
    }

    /// Whether a redemption call for `invitation_id` is still running
    pub fn is_redeeming(&self, invitation_id: &InvitationId) -> bool {
        self.redeeming.lock().contains(invitation_id)
    }

    /// Claim the single redemption slot for `invitation_id`, or `None` if
    /// another call holds it.
    pub(crate) fn claim_redemption(
        &self,
        invitation_id: &InvitationId,
    ) -> Option<RedemptionClaim> {
        if !self.redeeming.lock().insert(invitation_id.clone()) {
            return None;
        }
        Some(RedemptionClaim {
            redeeming: Arc::clone(&self.redeeming),
            invitation_id: invitation_id.clone(),
        })
    }

    pub(crate) fn set_processing(&self, processing: bool) {
        self.state.send_if_modified(|pending| {
            let changed = pending.is_processing != processing;
            pending.is_processing = processing;
            changed
        });
    }

    pub(crate) fn clear(&self) {
        self.state.send_replace(PendingInvitation::default());
        self.clears.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for PendingInvitationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_clear() {
        let registry = PendingInvitationRegistry::new();
        registry.register_deep_link(InvitationId::new("abc123"));
        registry.set_processing(true);

        let pending = registry.snapshot();
        assert_eq!(pending.invitation_id, Some(InvitationId::new("abc123")));
        assert!(pending.is_processing);
        assert!(pending.is_visible);

        registry.clear();
        assert!(registry.snapshot().is_clear());
        assert_eq!(registry.clear_count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = PendingInvitationRegistry::new();
        let screen = registry.clone();
        let rx = screen.subscribe();

        registry.register_deep_link(InvitationId::new("abc123"));
        assert!(rx.has_changed().unwrap());
        assert!(screen.snapshot().is_visible);
    }

    #[test]
    fn test_redemption_claim_is_exclusive_per_invitation() {
        let registry = PendingInvitationRegistry::new();
        let rebuilt = registry.clone();
        let id = InvitationId::new("abc123");

        let claim = registry.claim_redemption(&id).unwrap();
        assert!(rebuilt.is_redeeming(&id));
        assert!(rebuilt.claim_redemption(&id).is_none());
        assert!(rebuilt.claim_redemption(&InvitationId::new("other")).is_some());

        drop(claim);
        assert!(!registry.is_redeeming(&id));
        assert!(rebuilt.claim_redemption(&id).is_some());
    }

    #[test]
    fn test_set_processing_is_edge_only() {
        let registry = PendingInvitationRegistry::new();
        let mut rx = registry.subscribe();
        rx.borrow_and_update();

        registry.set_processing(false);
        assert!(!rx.has_changed().unwrap());
        registry.set_processing(true);
        assert!(rx.has_changed().unwrap());
    }
}
