//! Identity wait strategies.
//!
//! Each strategy is a future that resolves once it has something to report.
//! The coordinator races them as separate tasks and funnels the first
//! outcome into the attempt's single-assignment guard; the losers are aborted.

use std::sync::Arc;

use coachlink_core::effects::{IdentityProvider, IdentityStateStream, PhysicalTimeEffects};
use futures::StreamExt;
use tracing::trace;

/// What a wait strategy observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    /// The identity provider reports a live session
    Ready,
    /// The state stream closed before reporting a session
    StreamClosed,
    /// The identity timeout elapsed first
    TimedOut,
}

/// POLL: sample `(is_in_progress, is_authenticated)` every `interval_ms`
/// until sign-in has finished with a live session.
///
/// The first sample is taken one interval after the trigger so the provider
/// has a chance to flag the sign-in as in progress.
pub(crate) async fn poll_until_ready(
    identity: Arc<dyn IdentityProvider>,
    time: Arc<dyn PhysicalTimeEffects>,
    interval_ms: u64,
) -> WaitOutcome {
    loop {
        time.sleep_ms(interval_ms).await;
        let in_progress = identity.is_in_progress();
        let authenticated = identity.is_authenticated();
        trace!(in_progress, authenticated, "Identity poll");
        if !in_progress && authenticated {
            return WaitOutcome::Ready;
        }
    }
}

/// SUBSCRIBE: skip the first emission (the state at subscription time) and
/// resolve on the first later `true`.
pub(crate) async fn next_fresh_authentication(mut stream: IdentityStateStream) -> WaitOutcome {
    match stream.next().await {
        Some(stale) => trace!(stale, "Ignoring initial identity state"),
        None => return WaitOutcome::StreamClosed,
    }
    while let Some(authenticated) = stream.next().await {
        trace!(authenticated, "Identity state changed");
        if authenticated {
            return WaitOutcome::Ready;
        }
    }
    WaitOutcome::StreamClosed
}

/// Resolves after `timeout_ms`.
pub(crate) async fn identity_timeout(
    time: Arc<dyn PhysicalTimeEffects>,
    timeout_ms: u64,
) -> WaitOutcome {
    time.sleep_ms(timeout_ms).await;
    WaitOutcome::TimedOut
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachlink_effects::RealTimeHandler;
    use coachlink_testkit::{MockIdentityProvider, SignInBehavior};
    use futures::stream;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stale_true_is_ignored() {
        let stream = stream::iter(vec![true, false, true]).boxed();
        assert_eq!(next_fresh_authentication(stream).await, WaitOutcome::Ready);

        let stream = stream::iter(vec![true]).boxed();
        assert_eq!(
            next_fresh_authentication(stream).await,
            WaitOutcome::StreamClosed
        );
    }

    #[tokio::test]
    async fn test_falses_do_not_resolve() {
        let stream = stream::iter(vec![false, false, false]).boxed();
        assert_eq!(
            next_fresh_authentication(stream).await,
            WaitOutcome::StreamClosed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_waits_for_sign_in_to_finish() {
        let identity = Arc::new(
            MockIdentityProvider::new()
                .authenticated(true)
                .with_sign_in(SignInBehavior::Complete { after_ms: 1_200 }),
        );
        identity.sign_in_federated().await.unwrap();
        assert!(identity.is_in_progress());

        let started = tokio::time::Instant::now();
        let outcome =
            poll_until_ready(identity.clone(), Arc::new(RealTimeHandler::new()), 500).await;

        assert_eq!(outcome, WaitOutcome::Ready);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1_500));
        assert!(elapsed < Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves() {
        let outcome = identity_timeout(Arc::new(RealTimeHandler::new()), 10).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }
}
