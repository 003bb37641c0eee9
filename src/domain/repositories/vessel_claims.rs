use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::vessel_claim_requests::VesselClaimRequestEntity;
use crate::domain::value_objects::enums::approval_types::ApprovalType;

/// Outcome of the completing approval, decided inside one transaction so
/// the captain-cap count cannot interleave with another completion.
#[derive(Debug, Clone)]
pub enum ClaimCompletion {
    Completed(VesselClaimRequestEntity),
    CaptainLimitReached,
    SlotConflict,
}

#[automock]
#[async_trait]
pub trait VesselClaimRepository {
    async fn find_by_id(&self, request_id: Uuid)
        -> Result<Option<VesselClaimRequestEntity>>;

    /// Fills one approval slot without completing the claim. Guarded on
    /// the slot still being empty; returns false on conflict.
    async fn fill_approval_slot(
        &self,
        request_id: Uuid,
        approval_type: ApprovalType,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Fills the last empty slot and flips the claim to approved, after
    /// re-checking the slot and counting currently-approved claims for the
    /// vessel, all in a single transaction.
    async fn complete_approval(
        &self,
        request_id: Uuid,
        approval_type: ApprovalType,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
        max_approved_per_vessel: i64,
    ) -> Result<ClaimCompletion>;

    /// Rejects a non-terminal claim. Returns false when the claim was
    /// already terminal.
    async fn reject(
        &self,
        request_id: Uuid,
        reviewed_by: Uuid,
        review_notes: Option<String>,
    ) -> Result<bool>;
}
