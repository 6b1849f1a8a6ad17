use async_trait::async_trait;
use coachlink_core::effects::{IdentityProvider, IdentityStateStream};
use coachlink_core::{Identity, IdentityError};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// What `sign_in_federated` does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInBehavior {
    /// Mark sign-in in progress, then after `after_ms` go live and clear the flag
    Complete {
        /// Delay before the session goes live
        after_ms: u64,
    },
    /// Mark sign-in in progress and never finish
    Hang,
    /// Fail the trigger immediately
    Fail(IdentityError),
}

#[derive(Debug)]
struct IdentityState {
    authenticated: AtomicBool,
    in_progress: AtomicBool,
    sign_in: Mutex<SignInBehavior>,
    stale_first_value: Mutex<Option<bool>>,
    manual_result: Mutex<Option<Result<Identity, IdentityError>>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<bool>>>,
    subscribe_calls: AtomicUsize,
    sign_in_calls: AtomicUsize,
    manual_calls: Mutex<Vec<(String, String)>>,
}

/// Scripted [`IdentityProvider`]
///
/// The state stream only emits on an edge of `authenticated`, so a sign-in
/// that completes while already authenticated is silent, as with the real
/// provider. Use [`emit`](Self::emit) to push arbitrary values.
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    state: Arc<IdentityState>,
}

impl MockIdentityProvider {
    /// Signed-out provider whose sign-in completes after 100ms
    pub fn new() -> Self {
        Self {
            state: Arc::new(IdentityState {
                authenticated: AtomicBool::new(false),
                in_progress: AtomicBool::new(false),
                sign_in: Mutex::new(SignInBehavior::Complete { after_ms: 100 }),
                stale_first_value: Mutex::new(None),
                manual_result: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
                subscribe_calls: AtomicUsize::new(0),
                sign_in_calls: AtomicUsize::new(0),
                manual_calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Set the initial session flag
    pub fn authenticated(self, authenticated: bool) -> Self {
        self.state
            .authenticated
            .store(authenticated, Ordering::SeqCst);
        self
    }

    /// Script `sign_in_federated`
    pub fn with_sign_in(self, behavior: SignInBehavior) -> Self {
        *self.state.sign_in.lock() = behavior;
        self
    }

    /// Make every subscription start with `value` instead of the current state
    pub fn with_stale_first_value(self, value: bool) -> Self {
        *self.state.stale_first_value.lock() = Some(value);
        self
    }

    /// Script `create_manual_credential`
    pub fn with_manual_result(self, result: Result<Identity, IdentityError>) -> Self {
        *self.state.manual_result.lock() = Some(result);
        self
    }

    /// Change the session flag, emitting on an edge
    pub fn set_authenticated(&self, authenticated: bool) {
        let previous = self
            .state
            .authenticated
            .swap(authenticated, Ordering::SeqCst);
        if previous != authenticated {
            self.emit(authenticated);
        }
    }

    /// Change the in-progress flag
    pub fn set_in_progress(&self, in_progress: bool) {
        self.state.in_progress.store(in_progress, Ordering::SeqCst);
    }

    /// Push `value` to every live subscriber without touching the flags
    pub fn emit(&self, value: bool) {
        self.state
            .subscribers
            .lock()
            .retain(|subscriber| subscriber.send(value).is_ok());
    }

    /// End every live subscription, as when the provider tears down its listener
    pub fn close_streams(&self) {
        self.state.subscribers.lock().clear();
    }

    /// Number of `subscribe_state_change` calls
    pub fn subscribe_count(&self) -> usize {
        self.state.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Number of subscriptions whose stream has not been dropped
    pub fn live_subscribers(&self) -> usize {
        let mut subscribers = self.state.subscribers.lock();
        subscribers.retain(|subscriber| !subscriber.is_closed());
        subscribers.len()
    }

    /// Number of `sign_in_federated` calls
    pub fn sign_in_count(&self) -> usize {
        self.state.sign_in_calls.load(Ordering::SeqCst)
    }

    /// `(email, secret)` of every `create_manual_credential` call
    pub fn manual_calls(&self) -> Vec<(String, String)> {
        self.state.manual_calls.lock().clone()
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in_federated(&self) -> Result<(), IdentityError> {
        self.state.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.state.sign_in.lock().clone();
        match behavior {
            SignInBehavior::Complete { after_ms } => {
                self.set_in_progress(true);
                let provider = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(after_ms)).await;
                    provider.set_authenticated(true);
                    provider.set_in_progress(false);
                });
                Ok(())
            }
            SignInBehavior::Hang => {
                self.set_in_progress(true);
                Ok(())
            }
            SignInBehavior::Fail(error) => Err(error),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.state.authenticated.load(Ordering::SeqCst)
    }

    fn is_in_progress(&self) -> bool {
        self.state.in_progress.load(Ordering::SeqCst)
    }

    fn subscribe_state_change(&self) -> IdentityStateStream {
        self.state.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        let stale = *self.state.stale_first_value.lock();
        let first = stale.unwrap_or_else(|| self.is_authenticated());
        tx.send(first).unwrap();
        self.state.subscribers.lock().push(tx);
        UnboundedReceiverStream::new(rx).boxed()
    }

    async fn create_manual_credential(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Identity, IdentityError> {
        self.state
            .manual_calls
            .lock()
            .push((email.to_string(), secret.to_string()));
        let scripted = self.state.manual_result.lock().clone();
        let result = scripted.unwrap_or_else(|| {
            Ok(Identity {
                user_id: format!("manual-{email}"),
                email: email.to_string(),
            })
        });
        if result.is_ok() {
            self.set_authenticated(true);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_emits_fresh_true() {
        let identity = MockIdentityProvider::new()
            .with_sign_in(SignInBehavior::Complete { after_ms: 300 });
        let mut stream = identity.subscribe_state_change();
        assert_eq!(stream.next().await, Some(false));

        identity.sign_in_federated().await.unwrap();
        assert!(identity.is_in_progress());
        assert_eq!(stream.next().await, Some(true));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(identity.is_authenticated());
        assert!(!identity.is_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reauth_is_silent() {
        let identity = MockIdentityProvider::new()
            .authenticated(true)
            .with_sign_in(SignInBehavior::Complete { after_ms: 300 });
        let mut stream = identity.subscribe_state_change();
        assert_eq!(stream.next().await, Some(true));

        identity.sign_in_federated().await.unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_stale_first_value() {
        let identity = MockIdentityProvider::new().with_stale_first_value(true);
        let mut stream = identity.subscribe_state_change();
        assert_eq!(stream.next().await, Some(true));
        assert!(!identity.is_authenticated());
        assert_eq!(identity.subscribe_count(), 1);
    }

    #[tokio::test]
    async fn test_close_streams_ends_subscriptions() {
        let identity = MockIdentityProvider::new();
        let mut stream = identity.subscribe_state_change();
        assert_eq!(stream.next().await, Some(false));

        identity.close_streams();
        assert_eq!(stream.next().await, None);
        assert_eq!(identity.live_subscribers(), 0);
    }

    #[tokio::test]
    async fn test_manual_credential_is_recorded() {
        let identity = MockIdentityProvider::new();
        let created = identity
            .create_manual_credential("sam@x.com", "s3cret")
            .await
            .unwrap();
        assert_eq!(created.email, "sam@x.com");
        assert!(identity.is_authenticated());
        assert_eq!(
            identity.manual_calls(),
            vec![("sam@x.com".to_string(), "s3cret".to_string())]
        );
    }
}
