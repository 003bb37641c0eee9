use std::collections::HashMap;

use anyhow::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::error;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Minimal Stripe client built on reqwest. Covers only the surface the
/// plan-change engine touches: subscriptions, prices, and schedules.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
}

/// Stripe returns related objects either as a bare id or, when expanded,
/// as a full object. We only ever need the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StripeObjectRef {
    Id(String),
    Object { id: String },
}

impl StripeObjectRef {
    pub fn id(&self) -> &str {
        match self {
            StripeObjectRef::Id(id) => id,
            StripeObjectRef::Object { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: Option<String>,
    pub customer: Option<StripeObjectRef>,
    pub current_period_end: Option<i64>,
    pub schedule: Option<StripeObjectRef>,
    #[serde(default)]
    pub items: StripeSubscriptionItems,
    pub latest_invoice: Option<StripeInvoice>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StripeSubscriptionItems {
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    pub id: String,
    pub quantity: Option<u64>,
    pub price: StripePrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub id: String,
    pub unit_amount: Option<i64>,
    pub nickname: Option<String>,
    pub product: Option<StripeObjectRef>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripePrice {
    pub fn product_id(&self) -> Option<&str> {
        self.product.as_ref().map(StripeObjectRef::id)
    }

    /// Tier label carried in price metadata; not all historical prices
    /// are tagged.
    pub fn tier(&self) -> Option<&str> {
        self.metadata.get("tier").map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    pub status: Option<String>,
    pub payment_intent: Option<StripePaymentIntent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub status: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSchedule {
    pub id: String,
    pub end_behavior: Option<String>,
    #[serde(default)]
    pub phases: Vec<StripeSchedulePhase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSchedulePhase {
    pub start_date: i64,
    pub end_date: Option<i64>,
    #[serde(default)]
    pub items: Vec<StripePhaseItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePhaseItem {
    pub price: StripeObjectRef,
    pub quantity: Option<u64>,
}

/// Write model for a schedule rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSpec {
    pub start_date: i64,
    pub end_date: Option<i64>,
    pub items: Vec<PhaseItemSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseItemSpec {
    pub price: String,
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = resp.text().await.unwrap_or_default();

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .map(|envelope| envelope.error)
            .ok();

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            stripe_error_message = ?details.as_ref().and_then(|d| d.message.as_deref()),
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T> {
        let resp = self
            .http
            .get(format!("{API_BASE}{path}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .query(query)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, context).await?;
        Ok(resp.json().await?)
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &[(String, String)],
        context: &str,
    ) -> Result<T> {
        let resp = self
            .http
            .post(format!("{API_BASE}{path}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, context).await?;
        Ok(resp.json().await?)
    }

    /// Retrieves a subscription with plan items, products, and the latest
    /// invoice's payment intent expanded.
    pub async fn retrieve_subscription(&self, subscription_id: &str) -> Result<StripeSubscription> {
        // https://stripe.com/docs/api/subscriptions/retrieve
        self.get(
            &format!("/subscriptions/{subscription_id}"),
            &[
                ("expand[]", "items.data.price.product"),
                ("expand[]", "latest_invoice.payment_intent"),
            ],
            "retrieve subscription",
        )
        .await
    }

    pub async fn retrieve_price(&self, price_id: &str) -> Result<StripePrice> {
        // https://stripe.com/docs/api/prices/retrieve
        self.get(
            &format!("/prices/{price_id}"),
            &[("expand[]", "product")],
            "retrieve price",
        )
        .await
    }

    /// Creates a schedule seeded from the subscription's current state.
    pub async fn create_schedule_from_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSchedule> {
        // https://stripe.com/docs/api/subscription_schedules/create
        let body = vec![(
            "from_subscription".to_string(),
            subscription_id.to_string(),
        )];
        self.post_form("/subscription_schedules", &body, "create schedule")
            .await
    }

    pub async fn retrieve_schedule(&self, schedule_id: &str) -> Result<StripeSchedule> {
        self.get(
            &format!("/subscription_schedules/{schedule_id}"),
            &[],
            "retrieve schedule",
        )
        .await
    }

    /// Rewrites the schedule's phase timeline.
    pub async fn update_schedule_phases(
        &self,
        schedule_id: &str,
        phases: &[PhaseSpec],
        end_behavior: &str,
    ) -> Result<StripeSchedule> {
        // https://stripe.com/docs/api/subscription_schedules/update
        let mut body: Vec<(String, String)> =
            vec![("end_behavior".to_string(), end_behavior.to_string())];

        for (phase_idx, phase) in phases.iter().enumerate() {
            body.push((
                format!("phases[{phase_idx}][start_date]"),
                phase.start_date.to_string(),
            ));
            if let Some(end_date) = phase.end_date {
                body.push((
                    format!("phases[{phase_idx}][end_date]"),
                    end_date.to_string(),
                ));
            }
            for (item_idx, item) in phase.items.iter().enumerate() {
                body.push((
                    format!("phases[{phase_idx}][items][{item_idx}][price]"),
                    item.price.clone(),
                ));
                body.push((
                    format!("phases[{phase_idx}][items][{item_idx}][quantity]"),
                    item.quantity.to_string(),
                ));
            }
        }

        self.post_form(
            &format!("/subscription_schedules/{schedule_id}"),
            &body,
            "update schedule phases",
        )
        .await
    }

    /// Detaches the schedule, leaving the subscription on normal billing.
    pub async fn release_schedule(&self, schedule_id: &str) -> Result<()> {
        // https://stripe.com/docs/api/subscription_schedules/release
        let _: serde_json::Value = self
            .post_form(
                &format!("/subscription_schedules/{schedule_id}/release"),
                &[],
                "release schedule",
            )
            .await?;
        Ok(())
    }

    /// Swaps the plan line item to a new price with prorations; payment
    /// may be left pending rather than failing the update.
    pub async fn update_subscription_item(
        &self,
        subscription_id: &str,
        item_id: &str,
        price_id: &str,
    ) -> Result<StripeSubscription> {
        // https://stripe.com/docs/api/subscriptions/update
        let body = vec![
            ("items[0][id]".to_string(), item_id.to_string()),
            ("items[0][price]".to_string(), price_id.to_string()),
            (
                "proration_behavior".to_string(),
                "create_prorations".to_string(),
            ),
            (
                "payment_behavior".to_string(),
                "pending_if_incomplete".to_string(),
            ),
            (
                "expand[]".to_string(),
                "latest_invoice.payment_intent".to_string(),
            ),
        ];
        self.post_form(
            &format!("/subscriptions/{subscription_id}"),
            &body,
            "update subscription item",
        )
        .await
    }
}
