//! In-memory identity provider
//!
//! Models a provider session as a `watch` channel of "is authenticated". A
//! federated sign-in marks the session in progress, waits the configured
//! latency on a background task, then publishes `true`. Publishing only
//! happens on an actual edge, so re-authenticating a live session is silent
//! on the state stream, like the real provider.

use async_trait::async_trait;
use coachlink_core::effects::{IdentityProvider, IdentityStateStream, PhysicalTimeEffects};
use coachlink_core::{Identity, IdentityError};
use futures::{future, stream, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::time::RealTimeHandler;

/// Default delay between a federated trigger and the session going live
pub const DEFAULT_SIGN_IN_LATENCY_MS: u64 = 250;

/// In-memory [`IdentityProvider`]
#[derive(Clone)]
pub struct MemoryIdentityProvider {
    authenticated: Arc<watch::Sender<bool>>,
    in_progress: Arc<AtomicBool>,
    accounts: Arc<Mutex<HashMap<String, Identity>>>,
    current: Arc<Mutex<Option<Identity>>>,
    federated_email: String,
    sign_in_latency_ms: u64,
    time: Arc<dyn PhysicalTimeEffects>,
}

impl MemoryIdentityProvider {
    /// Create a signed-out provider whose federated account uses `federated_email`
    pub fn new(federated_email: impl Into<String>) -> Self {
        let (authenticated, _rx) = watch::channel(false);
        Self {
            authenticated: Arc::new(authenticated),
            in_progress: Arc::new(AtomicBool::new(false)),
            accounts: Arc::new(Mutex::new(HashMap::new())),
            current: Arc::new(Mutex::new(None)),
            federated_email: federated_email.into(),
            sign_in_latency_ms: DEFAULT_SIGN_IN_LATENCY_MS,
            time: Arc::new(RealTimeHandler::new()),
        }
    }

    /// Override the federated sign-in latency
    pub fn with_sign_in_latency_ms(mut self, ms: u64) -> Self {
        self.sign_in_latency_ms = ms;
        self
    }

    /// Override the clock used for the sign-in latency
    pub fn with_time(mut self, time: Arc<dyn PhysicalTimeEffects>) -> Self {
        self.time = time;
        self
    }

    /// Start with a live session, as if the user signed in earlier
    pub fn signed_in(self) -> Self {
        let identity = self.federated_identity();
        *self.current.lock() = Some(identity);
        self.publish(true);
        self
    }

    /// Identity of the current session, if any
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.lock().clone()
    }

    /// End the current session
    pub fn sign_out(&self) {
        *self.current.lock() = None;
        self.publish(false);
    }

    fn federated_identity(&self) -> Identity {
        Identity {
            user_id: format!("federated-{}", self.federated_email),
            email: self.federated_email.clone(),
        }
    }

    fn publish(&self, value: bool) {
        self.authenticated.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in_federated(&self) -> Result<(), IdentityError> {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            return Err(IdentityError::provider("sign-in already in progress"));
        }
        info!(email = %self.federated_email, "Federated sign-in started");

        let provider = self.clone();
        tokio::spawn(async move {
            provider.time.sleep_ms(provider.sign_in_latency_ms).await;
            *provider.current.lock() = Some(provider.federated_identity());
            provider.publish(true);
            provider.in_progress.store(false, Ordering::Release);
            debug!(email = %provider.federated_email, "Federated sign-in completed");
        });
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// The first item is the value at subscribe time, not at first poll.
    fn subscribe_state_change(&self) -> IdentityStateStream {
        let state_rx = self.authenticated.subscribe();
        let snapshot = *state_rx.borrow();
        stream::once(future::ready(snapshot))
            .chain(WatchStream::from_changes(state_rx))
            .boxed()
    }

    async fn create_manual_credential(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Identity, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::provider("empty secret"));
        }

        let identity = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(email) {
                return Err(IdentityError::already_exists(email));
            }
            let identity = Identity {
                user_id: Uuid::new_v4().to_string(),
                email: email.to_string(),
            };
            accounts.insert(email.to_string(), identity.clone());
            identity
        };

        *self.current.lock() = Some(identity.clone());
        self.publish(true);
        info!(user_id = %identity.user_id, "Manual credential created");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test(start_paused = true)]
    async fn test_federated_sign_in_emits_edge() {
        let provider = MemoryIdentityProvider::new("sam@x.com");
        let mut stream = provider.subscribe_state_change();
        assert_eq!(stream.next().await, Some(false));

        provider.sign_in_federated().await.unwrap();
        assert!(provider.is_in_progress());

        assert_eq!(stream.next().await, Some(true));
        assert!(provider.is_authenticated());
        assert_eq!(
            provider.current_identity().map(|i| i.email),
            Some("sam@x.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_stream_starts_with_value_at_subscribe_time() {
        let provider = MemoryIdentityProvider::new("trainer@x.com");
        let mut stream = provider.subscribe_state_change();

        // Goes live before the stream is first polled
        provider
            .create_manual_credential("sam@x.com", "s3cret")
            .await
            .unwrap();

        assert_eq!(stream.next().await, Some(false));
        assert_eq!(stream.next().await, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reauthentication_is_silent_on_stream() {
        let provider = MemoryIdentityProvider::new("sam@x.com").signed_in();
        let mut stream = provider.subscribe_state_change();
        assert_eq!(stream.next().await, Some(true));

        provider.sign_in_federated().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(
            DEFAULT_SIGN_IN_LATENCY_MS * 2,
        ))
        .await;

        assert!(!provider.is_in_progress());
        assert!(provider.is_authenticated());
        let pending = tokio::time::timeout(std::time::Duration::from_millis(10), stream.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_manual_credential_rejects_duplicates() {
        let provider = MemoryIdentityProvider::new("trainer@x.com");
        let identity = provider
            .create_manual_credential("sam@x.com", "s3cret")
            .await
            .unwrap();
        assert_eq!(identity.email, "sam@x.com");
        assert!(provider.is_authenticated());

        assert_matches!(
            provider.create_manual_credential("sam@x.com", "other").await,
            Err(IdentityError::AlreadyExists { .. })
        );
    }
}
