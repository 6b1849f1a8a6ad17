//! Scripted effect doubles
//!
//! Each double records how it was called so tests can assert on call counts
//! and ordering, and can be scripted to fail or stall.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for recorded calls and scripted results. Locks
//! are never held across `.await`.

mod identity;
mod random;
mod store;

pub use identity::{MockIdentityProvider, SignInBehavior};
pub use random::MockRandomHandler;
pub use store::MockInvitationStore;
