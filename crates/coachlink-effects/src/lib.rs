//! CoachLink Effects - Standard Effect Handlers
//!
//! Concrete implementations of the effect traits defined in `coachlink-core`:
//!
//! - [`RealTimeHandler`]: tokio-backed sleeps and the system clock
//! - [`RealRandomHandler`]: thread-local CSPRNG
//! - [`MemoryInvitationStore`]: in-process invitation/client records
//! - [`MemoryIdentityProvider`]: in-process session with a watch-backed state stream
//!
//! The in-memory handlers back the `accept-host` binary and local demos.
//! Scripted doubles for tests live in `coachlink-testkit`.

#![forbid(unsafe_code)]

pub mod identity;
pub mod random;
pub mod store;
pub mod time;

pub use identity::MemoryIdentityProvider;
pub use random::RealRandomHandler;
pub use store::MemoryInvitationStore;
pub use time::RealTimeHandler;
