use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::vessel_claim_requests::VesselClaimRequestEntity;
use crate::domain::repositories::users::UserRepository;
use crate::domain::repositories::vessel_claims::{ClaimCompletion, VesselClaimRepository};
use crate::domain::repositories::vessels::VesselRepository;
use crate::domain::value_objects::enums::approval_types::ApprovalType;
use crate::domain::value_objects::enums::claim_statuses::ClaimStatus;
use crate::domain::value_objects::vessel_claims::ClaimApprovalDto;

/// Hard cap on concurrently approved captain claims per vessel.
const MAX_APPROVED_CAPTAINS_PER_VESSEL: i64 = 2;

const DEFAULT_CAPTAIN_POSITION: &str = "Captain";

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("claim request not found")]
    NotFound,
    #[error("claim request is already finalized")]
    AlreadyFinalized,
    #[error("this approval was already recorded")]
    SlotAlreadyFilled,
    #[error("vessel already has the maximum number of approved captains")]
    CaptainLimitReached,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ClaimError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ClaimError::NotFound => StatusCode::NOT_FOUND,
            ClaimError::AlreadyFinalized
            | ClaimError::SlotAlreadyFilled
            | ClaimError::CaptainLimitReached => StatusCode::BAD_REQUEST,
            ClaimError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ClaimResult<T> = std::result::Result<T, ClaimError>;

/// Dual-approval workflow for a captain claiming command of a vessel.
/// The vessel side and the platform side each fill one slot, in either
/// order; the second approval completes the claim and provisions the
/// captain onto the vessel.
pub struct VesselClaimUseCase<C, U, V>
where
    C: VesselClaimRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    claim_repo: Arc<C>,
    user_repo: Arc<U>,
    vessel_repo: Arc<V>,
}

impl<C, U, V> VesselClaimUseCase<C, U, V>
where
    C: VesselClaimRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    pub fn new(claim_repo: Arc<C>, user_repo: Arc<U>, vessel_repo: Arc<V>) -> Self {
        Self {
            claim_repo,
            user_repo,
            vessel_repo,
        }
    }

    pub async fn approve(
        &self,
        request_id: Uuid,
        reviewed_by: Uuid,
        approval_type: ApprovalType,
    ) -> ClaimResult<ClaimApprovalDto> {
        let claim = self.load_open(request_id).await?;

        if claim.slot_filled(approval_type) {
            return Err(ClaimError::SlotAlreadyFilled);
        }

        let other_slot = match approval_type {
            ApprovalType::Vessel => ApprovalType::Admin,
            ApprovalType::Admin => ApprovalType::Vessel,
        };
        let now = Utc::now();

        if claim.slot_filled(other_slot) {
            // Completing approval. The slot re-check, the captain-cap
            // count, and the status flip happen in one transaction in the
            // repository so two completions cannot both squeeze under the
            // cap.
            let completion = self
                .claim_repo
                .complete_approval(
                    request_id,
                    approval_type,
                    reviewed_by,
                    now,
                    MAX_APPROVED_CAPTAINS_PER_VESSEL,
                )
                .await
                .map_err(ClaimError::Internal)?;

            let claim = match completion {
                ClaimCompletion::Completed(claim) => claim,
                ClaimCompletion::SlotConflict => return Err(ClaimError::SlotAlreadyFilled),
                ClaimCompletion::CaptainLimitReached => {
                    warn!(
                        %request_id,
                        vessel_id = %claim.vessel_id,
                        "vessel_claims: captain cap reached, approval refused"
                    );
                    return Err(ClaimError::CaptainLimitReached);
                }
            };

            info!(
                %request_id,
                vessel_id = %claim.vessel_id,
                captain_id = %claim.requested_by,
                completing_slot = %approval_type,
                "vessel_claims: claim fully approved"
            );

            self.provision_captain(&claim).await?;

            return Ok(ClaimApprovalDto {
                status: ClaimStatus::Approved,
                fully_approved: true,
            });
        }

        let filled = self
            .claim_repo
            .fill_approval_slot(request_id, approval_type, reviewed_by, now)
            .await
            .map_err(ClaimError::Internal)?;
        if !filled {
            return Err(ClaimError::SlotAlreadyFilled);
        }

        let status = match approval_type {
            ApprovalType::Vessel => ClaimStatus::VesselApproved,
            ApprovalType::Admin => ClaimStatus::AdminApproved,
        };

        info!(
            %request_id,
            vessel_id = %claim.vessel_id,
            slot = %approval_type,
            "vessel_claims: first approval recorded"
        );

        Ok(ClaimApprovalDto {
            status,
            fully_approved: false,
        })
    }

    pub async fn reject(
        &self,
        request_id: Uuid,
        reviewed_by: Uuid,
        review_notes: Option<String>,
    ) -> ClaimResult<ClaimApprovalDto> {
        let claim = self.load_open(request_id).await?;

        let rejected = self
            .claim_repo
            .reject(request_id, reviewed_by, review_notes)
            .await
            .map_err(ClaimError::Internal)?;
        if !rejected {
            return Err(ClaimError::AlreadyFinalized);
        }

        info!(
            %request_id,
            vessel_id = %claim.vessel_id,
            "vessel_claims: claim rejected"
        );

        Ok(ClaimApprovalDto {
            status: ClaimStatus::Rejected,
            fully_approved: false,
        })
    }

    async fn load_open(&self, request_id: Uuid) -> ClaimResult<VesselClaimRequestEntity> {
        let claim = self
            .claim_repo
            .find_by_id(request_id)
            .await
            .map_err(ClaimError::Internal)?
            .ok_or(ClaimError::NotFound)?;

        let status = ClaimStatus::from_str(&claim.status);
        if status.is_none_or(|status| status.is_terminal()) {
            return Err(ClaimError::AlreadyFinalized);
        }

        Ok(claim)
    }

    /// Puts the newly approved captain in command: assignment moved onto
    /// the vessel, active-vessel pointer updated, signing authority
    /// replaced. Manager backfill alone is best-effort.
    async fn provision_captain(&self, claim: &VesselClaimRequestEntity) -> ClaimResult<()> {
        let captain = self
            .user_repo
            .find_by_id(claim.requested_by)
            .await
            .map_err(ClaimError::Internal)?;
        let position = captain
            .as_ref()
            .and_then(|user| user.position.clone())
            .unwrap_or_else(|| DEFAULT_CAPTAIN_POSITION.to_string());

        let today = Utc::now().date_naive();

        let closed = self
            .vessel_repo
            .close_open_assignments_elsewhere(claim.requested_by, claim.vessel_id, today)
            .await
            .map_err(ClaimError::Internal)?;
        info!(
            request_id = %claim.id,
            captain_id = %claim.requested_by,
            closed_assignments = closed,
            "vessel_claims: closed open assignments on other vessels"
        );

        self.vessel_repo
            .upsert_open_assignment(claim.vessel_id, claim.requested_by, &position, today)
            .await
            .map_err(ClaimError::Internal)?;
        info!(
            request_id = %claim.id,
            vessel_id = %claim.vessel_id,
            position = %position,
            "vessel_claims: open assignment in place"
        );

        self.backfill_manager(claim).await;

        self.user_repo
            .set_active_vessel(claim.requested_by, claim.vessel_id)
            .await
            .map_err(ClaimError::Internal)?;
        info!(
            request_id = %claim.id,
            captain_id = %claim.requested_by,
            vessel_id = %claim.vessel_id,
            "vessel_claims: active vessel updated"
        );

        self.vessel_repo
            .replace_primary_signing_authority(claim.vessel_id, claim.requested_by, Utc::now())
            .await
            .map_err(ClaimError::Internal)?;
        info!(
            request_id = %claim.id,
            vessel_id = %claim.vessel_id,
            "vessel_claims: primary signing authority replaced"
        );

        Ok(())
    }

    /// A vessel without a manager gets one backfilled from any
    /// vessel-operator account tied to it. Failures are logged, never
    /// propagated: the claim approval already stands.
    async fn backfill_manager(&self, claim: &VesselClaimRequestEntity) {
        let vessel = match self.vessel_repo.find_by_id(claim.vessel_id).await {
            Ok(Some(vessel)) => vessel,
            Ok(None) => return,
            Err(err) => {
                warn!(
                    request_id = %claim.id,
                    error = %err,
                    "vessel_claims: manager backfill skipped, vessel lookup failed"
                );
                return;
            }
        };

        if vessel.manager_id.is_some() {
            return;
        }

        let manager = match self
            .user_repo
            .find_vessel_role_user_for_vessel(claim.vessel_id)
            .await
        {
            Ok(Some(manager)) => manager,
            Ok(None) => return,
            Err(err) => {
                warn!(
                    request_id = %claim.id,
                    error = %err,
                    "vessel_claims: manager backfill skipped, operator lookup failed"
                );
                return;
            }
        };

        if let Err(err) = self.vessel_repo.set_manager(claim.vessel_id, manager.id).await {
            warn!(
                request_id = %claim.id,
                vessel_id = %claim.vessel_id,
                manager_id = %manager.id,
                error = %err,
                "vessel_claims: manager backfill failed"
            );
        } else {
            info!(
                request_id = %claim.id,
                vessel_id = %claim.vessel_id,
                manager_id = %manager.id,
                "vessel_claims: vessel manager backfilled"
            );
        }
    }
}
