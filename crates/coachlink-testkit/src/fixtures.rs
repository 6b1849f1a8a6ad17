//! Record fixtures

use coachlink_core::{ClientRecord, InvitationId, InvitationRecord, InvitationStatus};

/// Fixed creation time for fixtures: 2024-01-01 00:00:00 UTC
pub const FIXTURE_CREATED_AT_MS: u64 = 1_704_067_200_000;

/// Pending invitation with no expiry
pub fn sample_invitation(id: &str, trainer_name: &str, client_email: &str) -> InvitationRecord {
    InvitationRecord {
        id: InvitationId::new(id),
        trainer_name: trainer_name.to_string(),
        client_email: client_email.to_string(),
        status: InvitationStatus::Pending,
        created_at_ms: FIXTURE_CREATED_AT_MS,
        expires_at_ms: None,
    }
}

/// Invitation whose stored status is already `Expired`
pub fn expired_invitation(id: &str) -> InvitationRecord {
    InvitationRecord {
        status: InvitationStatus::Expired,
        ..sample_invitation(id, "Alex", "sam@x.com")
    }
}

/// Invitation that was already redeemed
pub fn accepted_invitation(id: &str) -> InvitationRecord {
    InvitationRecord {
        status: InvitationStatus::Accepted,
        ..sample_invitation(id, "Alex", "sam@x.com")
    }
}

/// Client record as the store would create it for `invitation`
pub fn sample_client(invitation: &InvitationRecord) -> ClientRecord {
    ClientRecord {
        id: format!("client-{}", invitation.id),
        invitation_id: invitation.id.clone(),
        trainer_name: invitation.trainer_name.clone(),
        email: invitation.client_email.clone(),
        created_at_ms: FIXTURE_CREATED_AT_MS + 1,
    }
}
