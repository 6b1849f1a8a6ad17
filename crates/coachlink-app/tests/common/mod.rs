//! Shared harness for acceptance integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use coachlink_app::{
    AcceptanceConfig, AcceptanceCoordinator, AcceptanceObserver, AcceptancePhase, AcceptanceState,
    InvitationId, PendingInvitationRegistry,
};
use coachlink_testkit::{MockIdentityProvider, MockInvitationStore, MockRandomHandler};
use parking_lot::Mutex;

pub const INVITATION: &str = "abc123";

/// Records every transition and session refresh
#[derive(Default)]
pub struct RecordingObserver {
    phases: Mutex<Vec<AcceptancePhase>>,
    refreshes: AtomicUsize,
}

impl RecordingObserver {
    pub fn phases(&self) -> Vec<AcceptancePhase> {
        self.phases.lock().clone()
    }

    pub fn saw(&self, phase: AcceptancePhase) -> bool {
        self.phases.lock().contains(&phase)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl AcceptanceObserver for RecordingObserver {
    fn on_state_changed(&self, state: &AcceptanceState) {
        self.phases.lock().push(state.phase());
    }

    fn on_session_refresh(&self, _invitation_id: &InvitationId) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub coordinator: Arc<AcceptanceCoordinator>,
    pub store: MockInvitationStore,
    pub identity: MockIdentityProvider,
    pub registry: PendingInvitationRegistry,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new(store: MockInvitationStore, identity: MockIdentityProvider) -> Self {
        Self::with_config(store, identity, AcceptanceConfig::default())
    }

    pub fn with_config(
        store: MockInvitationStore,
        identity: MockIdentityProvider,
        config: AcceptanceConfig,
    ) -> Self {
        coachlink_testkit::init_test_tracing();

        let registry = PendingInvitationRegistry::new();
        registry.register_deep_link(InvitationId::new(INVITATION));
        let observer = Arc::new(RecordingObserver::default());

        let coordinator = AcceptanceCoordinator::builder(
            InvitationId::new(INVITATION),
            Arc::new(store.clone()),
            Arc::new(identity.clone()),
            registry.clone(),
        )
        .with_config(config)
        .with_random(Arc::new(MockRandomHandler::default()))
        .with_observer(observer.clone())
        .build()
        .unwrap();

        Self {
            coordinator: Arc::new(coordinator),
            store,
            identity,
            registry,
            observer,
        }
    }

    pub async fn outcome(&self) -> AcceptanceState {
        self.coordinator.wait_until(AcceptanceState::is_outcome).await
    }

    pub async fn reach(&self, phase: AcceptancePhase) -> AcceptanceState {
        self.coordinator
            .wait_until(|state| state.phase() == phase)
            .await
    }
}
