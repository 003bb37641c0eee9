use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which of the two independent approval slots a reviewer is filling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Vessel,
    Admin,
}

impl Display for ApprovalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let approval_type = match self {
            ApprovalType::Vessel => "vessel",
            ApprovalType::Admin => "admin",
        };
        write!(f, "{}", approval_type)
    }
}

impl ApprovalType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "vessel" => Some(ApprovalType::Vessel),
            "admin" => Some(ApprovalType::Admin),
            _ => None,
        }
    }
}
