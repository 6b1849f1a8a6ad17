//! # CoachLink App - Invitation Acceptance
//!
//! Headless core that turns a trainer's invitation deep link into an active
//! client record once the invitee has authenticated.
//!
//! ## Layout
//!
//! - [`acceptance`]: the [`AcceptanceCoordinator`] state machine and its wait strategies
//! - [`registry`]: the [`PendingInvitationRegistry`] shared with other screens
//! - [`config`]: timing and secret parameters ([`AcceptanceConfig`])
//! - [`errors`]: failure kinds carried in state and API misuse errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = PendingInvitationRegistry::new();
//! registry.register_deep_link(invitation_id.clone());
//!
//! let coordinator = AcceptanceCoordinator::builder(invitation_id, store, identity, registry)
//!     .with_config(AcceptanceConfig::default())
//!     .build()?;
//!
//! coordinator.start().await?;
//! coordinator.begin_federated_sign_in().await?;
//! let outcome = coordinator.wait_until(AcceptanceState::is_outcome).await;
//! ```

#![forbid(unsafe_code)]

pub mod acceptance;
pub mod config;
pub mod errors;
pub mod registry;

pub use acceptance::{
    AcceptanceCoordinator, AcceptanceCoordinatorBuilder, AcceptanceObserver, AcceptancePath,
    AcceptancePhase, AcceptanceState, NoopObserver, WaitStrategy,
};
pub use config::{AcceptanceConfig, ConfigError};
pub use errors::{AcceptanceError, AcceptanceErrorKind};
pub use registry::{PendingInvitation, PendingInvitationRegistry};

pub use coachlink_core::{ClientRecord, Identity, InvitationId, InvitationRecord, InvitationStatus};
