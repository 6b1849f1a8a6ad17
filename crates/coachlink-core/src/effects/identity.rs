//! Identity provider interface.
//!
//! The provider exposes two ways to learn that sign-in finished: sampling the
//! `is_authenticated` / `is_in_progress` flags, or listening to the
//! authentication state stream. Re-authenticating a session that is already
//! live produces no edge on the stream, which is why both exist.

use crate::errors::IdentityError;
use crate::types::Identity;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Stream of "is authenticated" values.
///
/// The first item reflects the state at subscription time.
pub type IdentityStateStream = BoxStream<'static, bool>;

/// Federated and manual authentication.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Trigger federated sign-in.
    ///
    /// Returns once the flow is launched; completion is only observable via
    /// the session flags or [`subscribe_state_change`](Self::subscribe_state_change).
    async fn sign_in_federated(&self) -> Result<(), IdentityError>;

    /// Whether a session is currently live.
    fn is_authenticated(&self) -> bool;

    /// Whether a sign-in flow is currently running.
    fn is_in_progress(&self) -> bool;

    /// Subscribe to authentication state changes.
    fn subscribe_state_change(&self) -> IdentityStateStream;

    /// Create an email/secret credential and sign in with it.
    ///
    /// Fails with [`IdentityError::AlreadyExists`] or [`IdentityError::Network`].
    async fn create_manual_credential(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Identity, IdentityError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    async fn sign_in_federated(&self) -> Result<(), IdentityError> {
        (**self).sign_in_federated().await
    }

    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    fn is_in_progress(&self) -> bool {
        (**self).is_in_progress()
    }

    fn subscribe_state_change(&self) -> IdentityStateStream {
        (**self).subscribe_state_change()
    }

    async fn create_manual_credential(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Identity, IdentityError> {
        (**self).create_manual_credential(email, secret).await
    }
}
