use serde::Serialize;

use super::enums::claim_statuses::ClaimStatus;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClaimApprovalDto {
    pub status: ClaimStatus,
    pub fully_approved: bool,
}
