use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use uuid::Uuid;

use crate::domain::entities::vessel_claim_requests::VesselClaimRequestEntity;
use crate::domain::repositories::vessel_claims::{ClaimCompletion, VesselClaimRepository};
use crate::domain::value_objects::enums::approval_types::ApprovalType;
use crate::domain::value_objects::enums::claim_statuses::ClaimStatus;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{vessel_claim_requests, vessels},
};

pub struct VesselClaimPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl VesselClaimPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl VesselClaimRepository for VesselClaimPostgres {
    async fn find_by_id(&self, request_id: Uuid) -> Result<Option<VesselClaimRequestEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = vessel_claim_requests::table
            .find(request_id)
            .select(VesselClaimRequestEntity::as_select())
            .first::<VesselClaimRequestEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn fill_approval_slot(
        &self,
        request_id: Uuid,
        approval_type: ApprovalType,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = match approval_type {
            ApprovalType::Vessel => update(vessel_claim_requests::table)
                .filter(vessel_claim_requests::id.eq(request_id))
                .filter(vessel_claim_requests::vessel_approved_by.is_null())
                .set((
                    vessel_claim_requests::vessel_approved_by.eq(Some(reviewed_by)),
                    vessel_claim_requests::vessel_approved_at.eq(Some(reviewed_at)),
                    vessel_claim_requests::status.eq(ClaimStatus::VesselApproved.to_string()),
                ))
                .execute(&mut conn)?,
            ApprovalType::Admin => update(vessel_claim_requests::table)
                .filter(vessel_claim_requests::id.eq(request_id))
                .filter(vessel_claim_requests::admin_approved_by.is_null())
                .set((
                    vessel_claim_requests::admin_approved_by.eq(Some(reviewed_by)),
                    vessel_claim_requests::admin_approved_at.eq(Some(reviewed_at)),
                    vessel_claim_requests::status.eq(ClaimStatus::AdminApproved.to_string()),
                ))
                .execute(&mut conn)?,
        };

        Ok(affected > 0)
    }

    async fn complete_approval(
        &self,
        request_id: Uuid,
        approval_type: ApprovalType,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
        max_approved_per_vessel: i64,
    ) -> Result<ClaimCompletion> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // One transaction for the re-read, the cap count, and the flip.
        // Locking the vessel row serializes competing completions for the
        // same vessel, so two claims cannot both pass the count.
        let completion = conn.transaction::<_, anyhow::Error, _>(|conn| {
            let claim = vessel_claim_requests::table
                .find(request_id)
                .select(VesselClaimRequestEntity::as_select())
                .for_update()
                .first::<VesselClaimRequestEntity>(conn)
                .optional()?;

            let Some(claim) = claim else {
                return Ok(ClaimCompletion::SlotConflict);
            };

            let status = ClaimStatus::from_str(&claim.status);
            if status.is_none_or(|status| status.is_terminal())
                || claim.slot_filled(approval_type)
            {
                return Ok(ClaimCompletion::SlotConflict);
            }

            vessels::table
                .find(claim.vessel_id)
                .select(vessels::id)
                .for_update()
                .first::<Uuid>(conn)?;

            let approved_count = vessel_claim_requests::table
                .filter(vessel_claim_requests::vessel_id.eq(claim.vessel_id))
                .filter(vessel_claim_requests::status.eq(ClaimStatus::Approved.to_string()))
                .count()
                .get_result::<i64>(conn)?;

            if approved_count >= max_approved_per_vessel {
                return Ok(ClaimCompletion::CaptainLimitReached);
            }

            let completed = match approval_type {
                ApprovalType::Vessel => update(vessel_claim_requests::table)
                    .filter(vessel_claim_requests::id.eq(request_id))
                    .set((
                        vessel_claim_requests::vessel_approved_by.eq(Some(reviewed_by)),
                        vessel_claim_requests::vessel_approved_at.eq(Some(reviewed_at)),
                        vessel_claim_requests::status.eq(ClaimStatus::Approved.to_string()),
                    ))
                    .returning(VesselClaimRequestEntity::as_returning())
                    .get_result::<VesselClaimRequestEntity>(conn)?,
                ApprovalType::Admin => update(vessel_claim_requests::table)
                    .filter(vessel_claim_requests::id.eq(request_id))
                    .set((
                        vessel_claim_requests::admin_approved_by.eq(Some(reviewed_by)),
                        vessel_claim_requests::admin_approved_at.eq(Some(reviewed_at)),
                        vessel_claim_requests::status.eq(ClaimStatus::Approved.to_string()),
                    ))
                    .returning(VesselClaimRequestEntity::as_returning())
                    .get_result::<VesselClaimRequestEntity>(conn)?,
            };

            Ok(ClaimCompletion::Completed(completed))
        })?;

        Ok(completion)
    }

    async fn reject(
        &self,
        request_id: Uuid,
        reviewed_by: Uuid,
        review_notes: Option<String>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let terminal = vec![
            ClaimStatus::Approved.to_string(),
            ClaimStatus::Rejected.to_string(),
        ];

        let notes = review_notes
            .map(|notes| format!("Rejected by {}: {}", reviewed_by, notes))
            .unwrap_or_else(|| format!("Rejected by {}", reviewed_by));

        let affected = update(vessel_claim_requests::table)
            .filter(vessel_claim_requests::id.eq(request_id))
            .filter(vessel_claim_requests::status.ne_all(terminal))
            .set((
                vessel_claim_requests::status.eq(ClaimStatus::Rejected.to_string()),
                vessel_claim_requests::review_notes.eq(Some(notes)),
            ))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }
}
