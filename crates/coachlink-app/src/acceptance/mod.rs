//! # Invitation Acceptance
//!
//! Links a deep-linked invitation to a freshly authenticated identity.
//!
//! ```text
//! Idle ─start─▶ Loading ─▶ InvitationLoaded ─begin/manual─▶ AwaitingIdentity
//!                  │                ▲                              │
//!                  ▼                │ retry                        ▼
//!               Failed ◀────────────┴──────────────────────── Redeeming ─▶ Success
//! ```
//!
//! The coordinator is single-writer: every transition happens under one lock
//! that is never held across an await, and every asynchronous step re-checks
//! that its attempt is still current before applying a result.

mod attempt;
mod coordinator;
mod state;
mod wait;

pub use coordinator::{AcceptanceCoordinator, AcceptanceCoordinatorBuilder};
pub use state::{AcceptancePath, AcceptancePhase, AcceptanceState, WaitStrategy};

use coachlink_core::InvitationId;

/// Callbacks fired by the coordinator
///
/// Invoked while the coordinator's state lock is held: implementations must
/// not call back into the coordinator.
pub trait AcceptanceObserver: Send + Sync {
    /// A transition was applied
    fn on_state_changed(&self, _state: &AcceptanceState) {}

    /// The client record exists now; cached role and session info is stale
    fn on_session_refresh(&self, _invitation_id: &InvitationId) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AcceptanceObserver for NoopObserver {}
