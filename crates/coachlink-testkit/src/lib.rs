//! CoachLink Testing Infrastructure
//!
//! Scripted effect doubles and fixtures shared by the CoachLink test suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! coachlink-testkit = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use coachlink_testkit::*;
//!
//! let store = MockInvitationStore::new()
//!     .with_invitation(sample_invitation("abc123", "Alex", "sam@x.com"));
//! let identity = MockIdentityProvider::new()
//!     .with_sign_in(SignInBehavior::Complete { after_ms: 1_200 });
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per process. `RUST_LOG` overrides
/// the default `warn` filter.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
