use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ClaimStatus {
    #[default]
    Pending,
    VesselApproved,
    AdminApproved,
    Approved,
    Rejected,
}

impl Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::VesselApproved => "vessel_approved",
            ClaimStatus::AdminApproved => "admin_approved",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl ClaimStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ClaimStatus::Pending),
            "vessel_approved" => Some(ClaimStatus::VesselApproved),
            "admin_approved" => Some(ClaimStatus::AdminApproved),
            "approved" => Some(ClaimStatus::Approved),
            "rejected" => Some(ClaimStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected)
    }
}
