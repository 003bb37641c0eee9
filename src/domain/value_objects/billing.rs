use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How the pending-change projection on the user record is keyed: the
/// caller may pass an explicit user id, otherwise we fall back to the
/// Stripe customer id resolved from the subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingAccountRef {
    UserId(Uuid),
    CustomerId(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvoiceSummary {
    pub id: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentIntentSummary {
    pub id: String,
    pub status: Option<String>,
    pub client_secret: Option<String>,
}

/// Result of a plan-change request. Downgrades never bill immediately;
/// upgrades may surface an invoice/payment-intent that still needs a
/// client-side confirmation step.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanChangeOutcome {
    NoChange,
    DowngradeScheduled {
        pending_tier: String,
        effective_at: DateTime<Utc>,
    },
    UpgradeApplied {
        subscription_status: String,
        latest_invoice: Option<InvoiceSummary>,
        payment_intent: Option<PaymentIntentSummary>,
    },
}

impl PlanChangeOutcome {
    pub fn mode(&self) -> &'static str {
        match self {
            PlanChangeOutcome::NoChange => "no_change",
            PlanChangeOutcome::DowngradeScheduled { .. } => "downgrade_scheduled",
            PlanChangeOutcome::UpgradeApplied { .. } => "upgrade_applied",
        }
    }
}
