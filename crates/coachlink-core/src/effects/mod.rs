//! Effect trait definitions
//!
//! Pure trait definitions for every side effect the acceptance flow performs.
//! This module defines **what** effects can be performed; handlers define **how**.
//!
//! # Effect Classification
//!
//! ## Infrastructure Effects (`coachlink-effects`)
//! - **Time**: wall clock and cancellable sleeps
//! - **Random**: one-time secret material
//!
//! ## Application Effects (external collaborators)
//! - **InvitationStore**: remote invitation/client records
//! - **IdentityProvider**: federated and manual authentication
//!
//! Test doubles for all of them live in `coachlink-testkit`.

pub mod identity;
pub mod random;
pub mod store;
pub mod time;

pub use identity::{IdentityProvider, IdentityStateStream};
pub use random::RandomEffects;
pub use store::InvitationStore;
pub use time::PhysicalTimeEffects;
