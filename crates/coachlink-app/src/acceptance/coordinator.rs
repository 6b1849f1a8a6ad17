//! Acceptance coordinator.
//!
//! # Blocking Lock Usage
//!
//! The state machine sits behind a `parking_lot::Mutex`. The lock is taken
//! for the check-and-transition of each step and released before any await.
//! Results that arrive after an await are applied only if the attempt
//! generation they were started under is still current; `cancel` and every
//! new attempt bump the generation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use coachlink_core::effects::{
    IdentityProvider, InvitationStore, PhysicalTimeEffects, RandomEffects,
};
use coachlink_core::{InvitationId, InvitationRecord};
use coachlink_effects::{RealRandomHandler, RealTimeHandler};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::attempt::Attempt;
use super::state::{AcceptancePath, AcceptancePhase, AcceptanceState, WaitStrategy};
use super::wait::{self, WaitOutcome};
use super::{AcceptanceObserver, NoopObserver};
use crate::config::AcceptanceConfig;
use crate::errors::{AcceptanceError, AcceptanceErrorKind};
use crate::registry::PendingInvitationRegistry;

struct Machine {
    state: AcceptanceState,
    invitation: Option<InvitationRecord>,
    generation: u64,
    attempt: Option<Arc<Attempt>>,
}

impl Machine {
    fn is_current(&self, attempt: &Attempt) -> bool {
        self.generation == attempt.generation()
    }
}

struct Inner {
    invitation_id: InvitationId,
    store: Arc<dyn InvitationStore>,
    identity: Arc<dyn IdentityProvider>,
    registry: PendingInvitationRegistry,
    time: Arc<dyn PhysicalTimeEffects>,
    random: Arc<dyn RandomEffects>,
    observer: Arc<dyn AcceptanceObserver>,
    config: AcceptanceConfig,
    machine: Mutex<Machine>,
    state_tx: watch::Sender<AcceptanceState>,
}

/// Drives one invitation from deep link to client record.
///
/// Construct with [`AcceptanceCoordinator::builder`]. Public operations may be
/// called from any task; transitions are serialized internally.
pub struct AcceptanceCoordinator {
    inner: Arc<Inner>,
}

/// Builder for [`AcceptanceCoordinator`]
pub struct AcceptanceCoordinatorBuilder {
    invitation_id: InvitationId,
    store: Arc<dyn InvitationStore>,
    identity: Arc<dyn IdentityProvider>,
    registry: PendingInvitationRegistry,
    config: AcceptanceConfig,
    time: Option<Arc<dyn PhysicalTimeEffects>>,
    random: Option<Arc<dyn RandomEffects>>,
    observer: Option<Arc<dyn AcceptanceObserver>>,
}

impl AcceptanceCoordinatorBuilder {
    /// Override the default configuration
    pub fn with_config(mut self, config: AcceptanceConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the clock (defaults to [`RealTimeHandler`])
    pub fn with_time(mut self, time: Arc<dyn PhysicalTimeEffects>) -> Self {
        self.time = Some(time);
        self
    }

    /// Override the secret source (defaults to [`RealRandomHandler`])
    pub fn with_random(mut self, random: Arc<dyn RandomEffects>) -> Self {
        self.random = Some(random);
        self
    }

    /// Register an observer for transitions and session refreshes
    pub fn with_observer(mut self, observer: Arc<dyn AcceptanceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate the configuration and build the coordinator in `Idle`
    pub fn build(self) -> Result<AcceptanceCoordinator, AcceptanceError> {
        self.config.validate()?;
        let (state_tx, _state_rx) = watch::channel(AcceptanceState::Idle);
        let inner = Inner {
            invitation_id: self.invitation_id,
            store: self.store,
            identity: self.identity,
            registry: self.registry,
            time: self
                .time
                .unwrap_or_else(|| Arc::new(RealTimeHandler::new())),
            random: self
                .random
                .unwrap_or_else(|| Arc::new(RealRandomHandler::new())),
            observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
            config: self.config,
            machine: Mutex::new(Machine {
                state: AcceptanceState::Idle,
                invitation: None,
                generation: 0,
                attempt: None,
            }),
            state_tx,
        };
        Ok(AcceptanceCoordinator {
            inner: Arc::new(inner),
        })
    }
}

impl AcceptanceCoordinator {
    /// Start building a coordinator for `invitation_id`.
    ///
    /// `registry` must already hold the deep link for this invitation.
    pub fn builder(
        invitation_id: InvitationId,
        store: Arc<dyn InvitationStore>,
        identity: Arc<dyn IdentityProvider>,
        registry: PendingInvitationRegistry,
    ) -> AcceptanceCoordinatorBuilder {
        AcceptanceCoordinatorBuilder {
            invitation_id,
            store,
            identity,
            registry,
            config: AcceptanceConfig::default(),
            time: None,
            random: None,
            observer: None,
        }
    }

    /// Invitation this coordinator accepts
    pub fn invitation_id(&self) -> &InvitationId {
        &self.inner.invitation_id
    }

    /// Active configuration
    pub fn config(&self) -> &AcceptanceConfig {
        &self.inner.config
    }

    /// Current state
    pub fn state(&self) -> AcceptanceState {
        self.inner.machine.lock().state.clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<AcceptanceState> {
        self.inner.state_tx.subscribe()
    }

    /// Loaded invitation, kept across retriable failures
    pub fn invitation(&self) -> Option<InvitationRecord> {
        self.inner.machine.lock().invitation.clone()
    }

    /// User-facing message for the current failure, if any
    pub fn error_message(&self) -> Option<&'static str> {
        self.inner
            .machine
            .lock()
            .state
            .error()
            .map(|kind| kind.user_message())
    }

    /// Number of wait-strategy tasks (poll, subscription, timeout) still held
    pub fn active_wait_tasks(&self) -> usize {
        self.inner
            .machine
            .lock()
            .attempt
            .as_ref()
            .map_or(0, |attempt| attempt.active_waiters())
    }

    /// Wait until `predicate` holds for the current state and return it
    pub async fn wait_until<F>(&self, mut predicate: F) -> AcceptanceState
    where
        F: FnMut(&AcceptanceState) -> bool,
    {
        let mut state_rx = self.inner.state_tx.subscribe();
        let reached = state_rx
            .wait_for(|state| predicate(state))
            .await
            .map(|state| (*state).clone());
        reached.unwrap_or_else(|_| self.state())
    }

    /// Load the invitation.
    ///
    /// Valid only from `Idle`. Ends in `InvitationLoaded` or `Failed`; load
    /// failures leave the pending invitation untouched.
    pub async fn start(&self) -> Result<AcceptanceState, AcceptanceError> {
        let inner = &self.inner;
        let generation = {
            let mut machine = inner.machine.lock();
            if machine.state != AcceptanceState::Idle {
                return Err(AcceptanceError::invalid("start", machine.state.phase()));
            }
            inner.transition(&mut machine, AcceptanceState::Loading);
            machine.generation
        };

        info!(invitation_id = %inner.invitation_id, "Loading invitation");
        let fetched = inner.store.fetch(&inner.invitation_id).await;
        let now_ms = inner.time.now_ms().await;

        let mut machine = inner.machine.lock();
        if machine.generation != generation || machine.state != AcceptanceState::Loading {
            debug!(invitation_id = %inner.invitation_id, "Discarding invitation of a cancelled load");
            return Ok(machine.state.clone());
        }

        let next = match fetched {
            Ok(record) if record.is_accepted() => {
                warn!(invitation_id = %inner.invitation_id, "Invitation already accepted");
                AcceptanceState::Failed(AcceptanceErrorKind::AlreadyAccepted)
            }
            Ok(record) if record.is_expired_at(now_ms) => {
                warn!(invitation_id = %inner.invitation_id, "Invitation expired");
                AcceptanceState::Failed(AcceptanceErrorKind::Expired)
            }
            Ok(record) => {
                info!(
                    invitation_id = %inner.invitation_id,
                    trainer = %record.trainer_name,
                    "Invitation loaded"
                );
                machine.invitation = Some(record.clone());
                AcceptanceState::InvitationLoaded(record)
            }
            Err(error) => {
                let kind = AcceptanceErrorKind::from_fetch(&error);
                warn!(invitation_id = %inner.invitation_id, %error, code = kind.code(), "Invitation load failed");
                AcceptanceState::Failed(kind)
            }
        };
        inner.transition(&mut machine, next.clone());
        Ok(next)
    }

    /// Trigger federated sign-in and wait for the identity in the background.
    ///
    /// Valid from `InvitationLoaded` or a retriable `Failed`. The wait
    /// strategy is chosen from `is_authenticated` sampled before the trigger
    /// and returned. Progress is reported through state.
    pub async fn begin_federated_sign_in(&self) -> Result<WaitStrategy, AcceptanceError> {
        let inner = &self.inner;
        let (attempt, strategy) = {
            let mut machine = inner.machine.lock();
            inner.ensure_can_attempt(&machine, "begin federated sign-in")?;
            let strategy = WaitStrategy::select(inner.identity.is_authenticated());
            let attempt = inner.open_attempt(&mut machine, AcceptancePath::Federated);
            inner.transition(&mut machine, AcceptanceState::AwaitingIdentity);
            (attempt, strategy)
        };
        inner.registry.set_processing(true);
        info!(
            invitation_id = %inner.invitation_id,
            attempt = %attempt.id(),
            ?strategy,
            "Federated sign-in requested"
        );

        match strategy {
            WaitStrategy::Poll => {
                let waiter = wait::poll_until_ready(
                    Arc::clone(&inner.identity),
                    Arc::clone(&inner.time),
                    inner.config.poll_interval_ms,
                );
                inner.spawn_waiter(&attempt, waiter);
            }
            WaitStrategy::Subscribe => {
                let stream = inner.identity.subscribe_state_change();
                inner.spawn_waiter(&attempt, wait::next_fresh_authentication(stream));
            }
        }
        if let Some(timeout_ms) = inner.config.identity_timeout_ms {
            let waiter = wait::identity_timeout(Arc::clone(&inner.time), timeout_ms);
            inner.spawn_waiter(&attempt, waiter);
        }

        if let Err(error) = inner.identity.sign_in_federated().await {
            warn!(invitation_id = %inner.invitation_id, %error, "Federated sign-in could not start");
            inner.fail_attempt(&attempt, AcceptanceErrorKind::from_identity(&error));
        }
        Ok(strategy)
    }

    /// Create an email/secret credential for the invited email and redeem.
    ///
    /// Valid from `InvitationLoaded` or a retriable `Failed`. Runs to the end
    /// of the attempt and returns the resulting state. No settle delay applies.
    pub async fn accept_manually(&self) -> Result<AcceptanceState, AcceptanceError> {
        let inner = &self.inner;
        let (attempt, invitation) = {
            let mut machine = inner.machine.lock();
            let invitation = inner.ensure_can_attempt(&machine, "accept manually")?;
            let attempt = inner.open_attempt(&mut machine, AcceptancePath::Manual);
            inner.transition(&mut machine, AcceptanceState::AwaitingIdentity);
            (attempt, invitation)
        };
        inner.registry.set_processing(true);
        info!(
            invitation_id = %inner.invitation_id,
            attempt = %attempt.id(),
            "Manual acceptance requested"
        );

        let secret = inner.generate_secret().await;
        match inner
            .identity
            .create_manual_credential(&invitation.client_email, &secret)
            .await
        {
            Ok(identity) => {
                debug!(user_id = %identity.user_id, "Manual credential created");
                if attempt.try_fire() {
                    inner.redeem(&attempt).await;
                } else {
                    debug!(attempt = %attempt.id(), "Manual attempt cancelled before redemption");
                }
            }
            Err(error) => {
                warn!(invitation_id = %inner.invitation_id, %error, "Manual credential creation failed");
                inner.fail_attempt(&attempt, AcceptanceErrorKind::from_identity(&error));
            }
        }
        Ok(self.state())
    }

    /// Report that the identity is ready.
    ///
    /// This is what the wait strategies call; hosts with their own provider
    /// callback may call it too. Only the first signal of a federated attempt
    /// in `AwaitingIdentity` counts. Returns whether this call won.
    pub fn notify_identity_ready(&self) -> bool {
        let attempt = {
            let machine = self.inner.machine.lock();
            match (&machine.state, &machine.attempt) {
                (AcceptanceState::AwaitingIdentity, Some(attempt))
                    if attempt.path() == AcceptancePath::Federated =>
                {
                    Arc::clone(attempt)
                }
                _ => {
                    debug!(state = %machine.state.phase(), "Identity signal ignored");
                    return false;
                }
            }
        };
        self.inner.on_identity_signal(&attempt)
    }

    /// Return from a retriable failure to `InvitationLoaded`
    pub fn retry(&self) -> Result<AcceptanceState, AcceptanceError> {
        let inner = &self.inner;
        let mut machine = inner.machine.lock();
        let invitation = match (&machine.state, &machine.invitation) {
            (AcceptanceState::Failed(kind), Some(invitation)) if kind.is_retriable() => {
                invitation.clone()
            }
            _ => return Err(AcceptanceError::invalid("retry", machine.state.phase())),
        };
        let next = AcceptanceState::InvitationLoaded(invitation);
        inner.transition(&mut machine, next.clone());
        Ok(next)
    }

    /// Abandon the flow and reset to `Idle`.
    ///
    /// Releases timers and subscriptions and clears the pending invitation
    /// immediately. A redemption already issued is left to finish in the
    /// background and its result is discarded. Rejected after `Success`.
    pub fn cancel(&self) -> Result<(), AcceptanceError> {
        let inner = &self.inner;
        let mut machine = inner.machine.lock();
        match machine.state {
            AcceptanceState::Idle => return Ok(()),
            AcceptanceState::Success(_) => {
                return Err(AcceptanceError::invalid("cancel", AcceptancePhase::Success))
            }
            _ => {}
        }

        let from = machine.state.phase();
        machine.generation += 1;
        machine.invitation = None;
        match machine.attempt.take() {
            Some(attempt) => {
                attempt.cancel();
                attempt.clear_registry_once(&inner.registry);
            }
            None => inner.registry.clear(),
        }
        inner.transition(&mut machine, AcceptanceState::Idle);
        info!(
            invitation_id = %inner.invitation_id,
            %from,
            redemption_in_flight = inner.registry.is_redeeming(&inner.invitation_id),
            "Acceptance cancelled"
        );
        Ok(())
    }
}

impl fmt::Debug for AcceptanceCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceptanceCoordinator")
            .field("invitation_id", &self.inner.invitation_id)
            .field("phase", &self.inner.machine.lock().state.phase())
            .finish_non_exhaustive()
    }
}

impl Drop for AcceptanceCoordinator {
    fn drop(&mut self) {
        let mut machine = self.inner.machine.lock();
        machine.generation += 1;
        if let Some(attempt) = machine.attempt.take() {
            attempt.cancel();
            debug!(
                invitation_id = %self.inner.invitation_id,
                attempt = %attempt.id(),
                "Coordinator dropped; attempt abandoned"
            );
        }
    }
}

impl Inner {
    fn transition(&self, machine: &mut Machine, next: AcceptanceState) {
        debug!(
            invitation_id = %self.invitation_id,
            from = %machine.state.phase(),
            to = %next.phase(),
            "Acceptance transition"
        );
        self.state_tx.send_replace(next.clone());
        self.observer.on_state_changed(&next);
        machine.state = next;
    }

    fn ensure_can_attempt(
        &self,
        machine: &Machine,
        operation: &'static str,
    ) -> Result<InvitationRecord, AcceptanceError> {
        let ready = match &machine.state {
            AcceptanceState::InvitationLoaded(_) => true,
            AcceptanceState::Failed(kind) => kind.is_retriable(),
            _ => false,
        };
        let invitation = match (&machine.invitation, ready) {
            (Some(invitation), true) => invitation.clone(),
            _ => return Err(AcceptanceError::invalid(operation, machine.state.phase())),
        };
        if self.registry.is_redeeming(&self.invitation_id) {
            return Err(AcceptanceError::RedemptionInFlight {
                invitation_id: self.invitation_id.clone(),
            });
        }
        Ok(invitation)
    }

    fn open_attempt(&self, machine: &mut Machine, path: AcceptancePath) -> Arc<Attempt> {
        machine.generation += 1;
        if let Some(previous) = machine.attempt.take() {
            previous.release_waiters();
        }
        let attempt = Arc::new(Attempt::new(machine.generation, path));
        machine.attempt = Some(Arc::clone(&attempt));
        attempt
    }

    fn spawn_waiter<F>(self: &Arc<Self>, attempt: &Arc<Attempt>, waiter: F)
    where
        F: Future<Output = WaitOutcome> + Send + 'static,
    {
        let inner = Arc::clone(self);
        let task_attempt = Arc::clone(attempt);
        attempt.spawn_waiter(async move {
            let outcome = waiter.await;
            inner.handle_wait_outcome(&task_attempt, outcome);
        });
    }

    fn handle_wait_outcome(self: &Arc<Self>, attempt: &Arc<Attempt>, outcome: WaitOutcome) {
        match outcome {
            WaitOutcome::Ready => {
                self.on_identity_signal(attempt);
            }
            WaitOutcome::StreamClosed => {
                self.fail_attempt(attempt, AcceptanceErrorKind::AuthProviderError);
            }
            WaitOutcome::TimedOut => {
                warn!(
                    invitation_id = %self.invitation_id,
                    timeout_ms = ?self.config.identity_timeout_ms,
                    "Timed out waiting for identity"
                );
                self.fail_attempt(attempt, AcceptanceErrorKind::AuthProviderError);
            }
        }
    }

    /// First identity signal of an attempt: release the other waiters and
    /// start the settle-then-redeem step.
    fn on_identity_signal(self: &Arc<Self>, attempt: &Arc<Attempt>) -> bool {
        if !attempt.try_fire() {
            debug!(attempt = %attempt.id(), "Identity signal already handled");
            return false;
        }
        attempt.release_waiters();
        info!(
            invitation_id = %self.invitation_id,
            attempt = %attempt.id(),
            "Identity ready"
        );

        let inner = Arc::clone(self);
        let attempt = Arc::clone(attempt);
        tokio::spawn(async move {
            inner.settle_and_redeem(&attempt).await;
        });
        true
    }

    async fn settle_and_redeem(self: &Arc<Self>, attempt: &Arc<Attempt>) {
        let settle_ms = self.config.settle_delay_ms;
        if settle_ms > 0 {
            tokio::select! {
                _ = attempt.cancelled() => {
                    debug!(attempt = %attempt.id(), "Cancelled during settle delay");
                    return;
                }
                _ = self.time.sleep_ms(settle_ms) => {}
            }
        }

        if !self.identity.is_authenticated() {
            warn!(
                invitation_id = %self.invitation_id,
                "Identity provider reports no session after settle delay"
            );
            self.fail_current(attempt, AcceptanceErrorKind::AuthProviderError);
            return;
        }
        self.redeem(attempt).await;
    }

    /// Issue the single redemption call for `attempt` and apply its result.
    async fn redeem(self: &Arc<Self>, attempt: &Arc<Attempt>) {
        let claim = {
            let mut machine = self.machine.lock();
            if !machine.is_current(attempt) {
                debug!(attempt = %attempt.id(), "Attempt superseded before redemption");
                return;
            }
            let Some(claim) = self.registry.claim_redemption(&self.invitation_id) else {
                warn!(invitation_id = %self.invitation_id, "Previous redemption still in flight");
                self.apply_failure(&mut machine, attempt, AcceptanceErrorKind::Network);
                return;
            };
            self.transition(&mut machine, AcceptanceState::Redeeming);
            claim
        };

        info!(
            invitation_id = %self.invitation_id,
            attempt = %attempt.id(),
            path = %attempt.path(),
            "Redeeming invitation"
        );
        let result = self.store.redeem(&self.invitation_id).await;
        drop(claim);

        let mut machine = self.machine.lock();
        if !machine.is_current(attempt) {
            info!(
                invitation_id = %self.invitation_id,
                succeeded = result.is_ok(),
                "Discarding redemption result of cancelled attempt"
            );
            return;
        }

        match result {
            Ok(client) => {
                info!(
                    invitation_id = %self.invitation_id,
                    client_id = %client.id,
                    "Invitation accepted"
                );
                self.transition(&mut machine, AcceptanceState::Success(client));
                self.observer.on_session_refresh(&self.invitation_id);
                drop(machine);
                self.schedule_registry_clear(attempt);
            }
            Err(error) => {
                let kind = AcceptanceErrorKind::from_redeem(&error);
                warn!(
                    invitation_id = %self.invitation_id,
                    %error,
                    code = kind.code(),
                    "Redemption failed"
                );
                self.apply_failure(&mut machine, attempt, kind);
            }
        }
    }

    /// Fail an attempt that is still waiting for its identity signal.
    fn fail_attempt(&self, attempt: &Attempt, kind: AcceptanceErrorKind) {
        if !attempt.try_fire() {
            debug!(attempt = %attempt.id(), ?kind, "Failure ignored; attempt already settled");
            return;
        }
        self.fail_current(attempt, kind);
    }

    fn fail_current(&self, attempt: &Attempt, kind: AcceptanceErrorKind) {
        let mut machine = self.machine.lock();
        if !machine.is_current(attempt) {
            debug!(attempt = %attempt.id(), ?kind, "Failure of superseded attempt dropped");
            return;
        }
        self.apply_failure(&mut machine, attempt, kind);
    }

    fn apply_failure(&self, machine: &mut Machine, attempt: &Attempt, kind: AcceptanceErrorKind) {
        attempt.release_waiters();
        self.transition(machine, AcceptanceState::Failed(kind));
        if kind.is_terminal() {
            attempt.clear_registry_once(&self.registry);
        } else {
            self.registry.set_processing(false);
        }
        if kind.is_success_adjacent() {
            self.observer.on_session_refresh(&self.invitation_id);
        }
    }

    /// Clear the pending invitation once dependent screens had a chance to
    /// observe `Success`.
    fn schedule_registry_clear(&self, attempt: &Arc<Attempt>) {
        let delay_ms = self.config.registry_clear_delay_ms;
        let registry = self.registry.clone();
        let time = Arc::clone(&self.time);
        let attempt = Arc::clone(attempt);
        tokio::spawn(async move {
            time.sleep_ms(delay_ms).await;
            if attempt.clear_registry_once(&registry) {
                debug!(attempt = %attempt.id(), "Pending invitation cleared");
            }
        });
    }

    async fn generate_secret(&self) -> String {
        hex::encode(self.random.random_bytes(self.config.secret_bytes).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachlink_testkit::{sample_invitation, MockIdentityProvider, MockInvitationStore};

    fn coordinator(
        store: MockInvitationStore,
        registry: PendingInvitationRegistry,
    ) -> AcceptanceCoordinator {
        AcceptanceCoordinator::builder(
            InvitationId::new("abc123"),
            Arc::new(store),
            Arc::new(MockIdentityProvider::new()),
            registry,
        )
        .build()
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_load_discards_fetch() {
        let store = MockInvitationStore::new()
            .with_invitation(sample_invitation("abc123", "Alex", "sam@x.com"))
            .with_fetch_latency_ms(1_000);
        let registry = PendingInvitationRegistry::new();
        registry.register_deep_link(InvitationId::new("abc123"));
        let coordinator = Arc::new(coordinator(store, registry.clone()));

        let loading = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.start().await })
        };
        coordinator
            .wait_until(|state| *state == AcceptanceState::Loading)
            .await;
        coordinator.cancel().unwrap();

        let result = loading.await.unwrap().unwrap();
        assert_eq!(result, AcceptanceState::Idle);
        assert_eq!(coordinator.state(), AcceptanceState::Idle);
        assert!(coordinator.invitation().is_none());
        assert!(registry.snapshot().is_clear());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_reports_transitions() {
        let store = MockInvitationStore::new()
            .with_invitation(sample_invitation("abc123", "Alex", "sam@x.com"));
        let coordinator = coordinator(store, PendingInvitationRegistry::new());
        let mut states = coordinator.subscribe();
        assert_eq!(*states.borrow_and_update(), AcceptanceState::Idle);

        coordinator.start().await.unwrap();
        assert!(states.has_changed().unwrap());
        assert_eq!(
            states.borrow_and_update().phase(),
            AcceptancePhase::InvitationLoaded
        );
        assert_eq!(coordinator.error_message(), None);
    }
}
