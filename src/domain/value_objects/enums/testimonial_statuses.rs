use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TestimonialStatus {
    #[default]
    PendingCaptain,
    Approved,
    Rejected,
}

impl Display for TestimonialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            TestimonialStatus::PendingCaptain => "pending_captain",
            TestimonialStatus::Approved => "approved",
            TestimonialStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl TestimonialStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending_captain" => Some(TestimonialStatus::PendingCaptain),
            "approved" => Some(TestimonialStatus::Approved),
            "rejected" => Some(TestimonialStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TestimonialStatus::Approved | TestimonialStatus::Rejected
        )
    }
}
