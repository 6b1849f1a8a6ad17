//! Host driver for the acceptance coordinator.
//!
//! Guarded by the `host` feature. Seeds the in-memory store and identity
//! provider with one invitation, registers its deep link, and runs a single
//! acceptance to completion. Useful for watching the transition log:
//!
//! ```text
//! RUST_LOG=coachlink_app=debug cargo run -p coachlink-app --features host -- abc123
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use coachlink_app::{
    AcceptanceConfig, AcceptanceCoordinator, AcceptanceObserver, AcceptanceState, InvitationId,
    InvitationRecord, InvitationStatus, PendingInvitationRegistry,
};
use coachlink_core::effects::PhysicalTimeEffects;
use coachlink_effects::{MemoryIdentityProvider, MemoryInvitationStore, RealTimeHandler};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One day, for the seeded invitation's expiry
const SEED_TTL_MS: u64 = 24 * 60 * 60 * 1_000;

#[derive(Parser)]
#[command(name = "accept-host")]
#[command(about = "Run one invitation acceptance against in-memory handlers", long_about = None)]
struct Cli {
    /// Invitation id from the deep link
    invitation_id: String,

    /// Trainer shown on the invitation
    #[arg(long, default_value = "Alex")]
    trainer: String,

    /// Email the invitation is addressed to
    #[arg(long, default_value = "sam@example.com")]
    email: String,

    /// Use the manual email/secret path instead of federated sign-in
    #[arg(long)]
    manual: bool,

    /// Start with a live federated session (exercises the POLL strategy)
    #[arg(long)]
    signed_in: bool,

    /// Seed the invitation as already expired
    #[arg(long)]
    expired: bool,

    /// Federated sign-in latency in milliseconds
    #[arg(long, default_value = "250")]
    sign_in_latency_ms: u64,

    /// Config file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct LogObserver;

impl AcceptanceObserver for LogObserver {
    fn on_state_changed(&self, state: &AcceptanceState) {
        info!(phase = %state.phase(), "State changed");
    }

    fn on_session_refresh(&self, invitation_id: &InvitationId) {
        info!(%invitation_id, "Session refresh requested");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AcceptanceConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AcceptanceConfig::default(),
    };
    config.merge_with_env()?;

    let time = Arc::new(RealTimeHandler::new());
    let now_ms = time.now_ms().await;
    let invitation_id = InvitationId::new(cli.invitation_id.clone());

    let store = Arc::new(MemoryInvitationStore::with_time(time.clone()));
    store.insert(InvitationRecord {
        id: invitation_id.clone(),
        trainer_name: cli.trainer.clone(),
        client_email: cli.email.clone(),
        status: if cli.expired {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        },
        created_at_ms: now_ms,
        expires_at_ms: Some(now_ms + SEED_TTL_MS),
    });

    let mut identity = MemoryIdentityProvider::new(cli.email.clone())
        .with_sign_in_latency_ms(cli.sign_in_latency_ms)
        .with_time(time.clone());
    if cli.signed_in {
        identity = identity.signed_in();
    }
    let identity = Arc::new(identity);

    let registry = PendingInvitationRegistry::new();
    registry.register_deep_link(invitation_id.clone());

    let coordinator = AcceptanceCoordinator::builder(
        invitation_id.clone(),
        store.clone(),
        identity,
        registry.clone(),
    )
    .with_config(config)
    .with_time(time)
    .with_observer(Arc::new(LogObserver))
    .build()?;

    if let AcceptanceState::Failed(kind) = coordinator.start().await? {
        bail!("{} ({})", kind.user_message(), kind.code());
    }

    let outcome = if cli.manual {
        coordinator.accept_manually().await?
    } else {
        let strategy = coordinator.begin_federated_sign_in().await?;
        info!(?strategy, "Waiting for identity");
        coordinator.wait_until(AcceptanceState::is_outcome).await
    };

    match outcome {
        AcceptanceState::Success(client) => {
            println!(
                "Accepted invitation {invitation_id} from {}: client {} ({})",
                client.trainer_name, client.id, client.email
            );
            // Let the deferred registry clear run before exiting.
            let delay = coordinator.config().registry_clear_delay();
            tokio::time::sleep(delay + Duration::from_millis(50)).await;
            info!(
                pending = ?registry.snapshot(),
                clients = store.client_count(),
                "Done"
            );
            Ok(())
        }
        AcceptanceState::Failed(kind) => bail!("{} ({})", kind.user_message(), kind.code()),
        other => bail!("acceptance stopped in state {}", other.phase()),
    }
}
