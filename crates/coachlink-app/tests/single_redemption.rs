//! Property: however identity signals interleave, one attempt redeems at most once.
#![allow(missing_docs)]

mod common;

use std::time::Duration;

use coachlink_app::AcceptanceState;
use coachlink_testkit::{sample_invitation, MockIdentityProvider, MockInvitationStore, SignInBehavior};
use common::{Harness, INVITATION};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Signal {
    Notify,
    Emit,
    Yield,
    Advance(u64),
}

fn signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        Just(Signal::Notify),
        Just(Signal::Emit),
        Just(Signal::Yield),
        (1u64..800).prop_map(Signal::Advance),
    ]
}

fn run(signals: Vec<Signal>, already_authenticated: bool) -> (usize, usize, AcceptanceState) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    runtime.block_on(async move {
        let h = Harness::new(
            MockInvitationStore::new()
                .with_invitation(sample_invitation(INVITATION, "Alex", "sam@x.com"))
                .with_redeem_latency_ms(50),
            MockIdentityProvider::new()
                .authenticated(already_authenticated)
                .with_sign_in(SignInBehavior::Hang),
        );
        h.coordinator.start().await.unwrap();
        h.coordinator.begin_federated_sign_in().await.unwrap();
        h.identity.set_in_progress(false);
        h.identity.set_authenticated(true);

        let mut notifiers = Vec::new();
        for signal in signals {
            match signal {
                Signal::Notify => {
                    let coordinator = h.coordinator.clone();
                    notifiers.push(tokio::spawn(async move {
                        coordinator.notify_identity_ready()
                    }));
                }
                Signal::Emit => h.identity.emit(true),
                Signal::Yield => tokio::task::yield_now().await,
                Signal::Advance(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            }
        }

        let mut winners = 0;
        for notifier in notifiers {
            if notifier.await.unwrap() {
                winners += 1;
            }
        }

        let outcome = h.outcome().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        (h.store.redeem_calls(), winners, outcome)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn interleaved_signals_redeem_once(
        signals in proptest::collection::vec(signal(), 0..12),
        already_authenticated in any::<bool>(),
    ) {
        let (redeem_calls, winners, outcome) = run(signals, already_authenticated);
        prop_assert_eq!(redeem_calls, 1);
        prop_assert!(winners <= 1);
        prop_assert!(matches!(outcome, AcceptanceState::Success(_)));
    }
}
