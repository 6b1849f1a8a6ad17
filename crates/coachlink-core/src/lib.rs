//! CoachLink Core - Invitation Domain Foundation
//!
//! This crate provides the domain records and effect interfaces used by the
//! invitation acceptance flow. It contains no runtime or application logic.
//!
//! # Contents
//!
//! ## Domain Records
//! - [`InvitationRecord`]: a trainer-issued invitation as fetched from the store
//! - [`ClientRecord`]: the active client produced by redeeming an invitation
//! - [`Identity`]: an authenticated identity returned by the identity provider
//!
//! ## Effect Interfaces (Pure Signatures)
//! - [`effects::InvitationStore`]: `fetch`, `redeem`
//! - [`effects::IdentityProvider`]: federated trigger, session flags, state stream,
//!   manual credential creation
//! - [`effects::PhysicalTimeEffects`], [`effects::RandomEffects`]: runtime services
//!
//! Handlers live in `coachlink-effects`; test doubles in `coachlink-testkit`.

#![forbid(unsafe_code)]

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Domain error types
pub mod errors;

/// Invitation, client, and identity records
pub mod types;

pub use errors::{IdentityError, StoreError};
pub use types::{ClientRecord, Identity, InvitationId, InvitationRecord, InvitationStatus};
