use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SignoffDecision {
    Approve,
    Reject,
}

impl SignoffDecision {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(SignoffDecision::Approve),
            "reject" => Some(SignoffDecision::Reject),
            _ => None,
        }
    }
}

/// The subset of a testimonial an external captain needs to review it.
/// No internal ids beyond the sea-service facts themselves.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignoffReviewDto {
    pub vessel_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub at_sea_days: i32,
    pub standby_days: i32,
    pub yard_days: i32,
    pub leave_days: i32,
    pub crew_name: Option<String>,
    pub captain_name: Option<String>,
    pub notes: Option<String>,
}

/// Write model for the single terminal decision. Applied in one guarded
/// update that re-matches the token and an unset `signoff_used_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignoffDecisionUpdate {
    pub status: super::enums::testimonial_statuses::TestimonialStatus,
    pub signoff_used_at: DateTime<Utc>,
    pub captain_name: Option<String>,
    pub captain_email: Option<String>,
    pub captain_position: Option<String>,
    pub captain_user_id: Option<Uuid>,
    pub notes: Option<String>,
}
