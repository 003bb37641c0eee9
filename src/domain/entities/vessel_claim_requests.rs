use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::vessel_claim_requests;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = vessel_claim_requests)]
pub struct VesselClaimRequestEntity {
    pub id: Uuid,
    pub vessel_id: Uuid,
    pub requested_by: Uuid,
    pub status: String,
    pub vessel_approved_by: Option<Uuid>,
    pub vessel_approved_at: Option<DateTime<Utc>>,
    pub admin_approved_by: Option<Uuid>,
    pub admin_approved_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VesselClaimRequestEntity {
    pub fn slot_filled(
        &self,
        approval_type: crate::domain::value_objects::enums::approval_types::ApprovalType,
    ) -> bool {
        use crate::domain::value_objects::enums::approval_types::ApprovalType;
        match approval_type {
            ApprovalType::Vessel => self.vessel_approved_by.is_some(),
            ApprovalType::Admin => self.admin_approved_by.is_some(),
        }
    }
}
