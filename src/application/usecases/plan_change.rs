use std::sync::Arc;

use anyhow::{Result as AnyResult, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::config_model::Stripe as StripeConfig;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::billing::{
    BillingAccountRef, InvoiceSummary, PaymentIntentSummary, PlanChangeOutcome,
};
use crate::payments::stripe_client::{
    PhaseItemSpec, PhaseSpec, StripeClient, StripePrice, StripeSchedule, StripeSchedulePhase,
    StripeSubscription, StripeSubscriptionItem, StripeSubscriptionItems,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingGateway: Send + Sync {
    async fn retrieve_subscription(&self, subscription_id: &str) -> AnyResult<StripeSubscription>;

    async fn retrieve_price(&self, price_id: &str) -> AnyResult<StripePrice>;

    async fn create_schedule_from_subscription(
        &self,
        subscription_id: &str,
    ) -> AnyResult<StripeSchedule>;

    async fn retrieve_schedule(&self, schedule_id: &str) -> AnyResult<StripeSchedule>;

    async fn update_schedule_phases(
        &self,
        schedule_id: &str,
        phases: Vec<PhaseSpec>,
        end_behavior: &str,
    ) -> AnyResult<StripeSchedule>;

    async fn release_schedule(&self, schedule_id: &str) -> AnyResult<()>;

    async fn update_subscription_item(
        &self,
        subscription_id: &str,
        item_id: &str,
        price_id: &str,
    ) -> AnyResult<StripeSubscription>;
}

#[async_trait]
impl BillingGateway for StripeClient {
    async fn retrieve_subscription(&self, subscription_id: &str) -> AnyResult<StripeSubscription> {
        self.retrieve_subscription(subscription_id).await
    }

    async fn retrieve_price(&self, price_id: &str) -> AnyResult<StripePrice> {
        self.retrieve_price(price_id).await
    }

    async fn create_schedule_from_subscription(
        &self,
        subscription_id: &str,
    ) -> AnyResult<StripeSchedule> {
        self.create_schedule_from_subscription(subscription_id).await
    }

    async fn retrieve_schedule(&self, schedule_id: &str) -> AnyResult<StripeSchedule> {
        self.retrieve_schedule(schedule_id).await
    }

    async fn update_schedule_phases(
        &self,
        schedule_id: &str,
        phases: Vec<PhaseSpec>,
        end_behavior: &str,
    ) -> AnyResult<StripeSchedule> {
        self.update_schedule_phases(schedule_id, &phases, end_behavior)
            .await
    }

    async fn release_schedule(&self, schedule_id: &str) -> AnyResult<()> {
        self.release_schedule(schedule_id).await
    }

    async fn update_subscription_item(
        &self,
        subscription_id: &str,
        item_id: &str,
        price_id: &str,
    ) -> AnyResult<StripeSubscription> {
        self.update_subscription_item(subscription_id, item_id, price_id)
            .await
    }
}

#[derive(Debug, Error)]
pub enum PlanChangeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("billing product families are not configured")]
    MissingProductConfig,
    #[error("cannot switch between crew and vessel plans")]
    CrossFamilySwitch {
        current_product_id: String,
        new_product_id: String,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanChangeError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanChangeError::MissingField(_) | PlanChangeError::CrossFamilySwitch { .. } => {
                StatusCode::BAD_REQUEST
            }
            PlanChangeError::MissingProductConfig => StatusCode::INTERNAL_SERVER_ERROR,
            PlanChangeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PlanChangeResult<T> = std::result::Result<T, PlanChangeError>;

/// Decides whether a tier change applies immediately (upgrade, prorated)
/// or at the next billing boundary (downgrade, via a two-phase schedule).
/// Price amounts are the sole source of truth for direction; tier names
/// are informational only.
pub struct PlanChangeUseCase<U, B>
where
    U: UserRepository + Send + Sync + 'static,
    B: BillingGateway + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    billing: Arc<B>,
    config: StripeConfig,
}

impl<U, B> PlanChangeUseCase<U, B>
where
    U: UserRepository + Send + Sync + 'static,
    B: BillingGateway + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, billing: Arc<B>, config: StripeConfig) -> Self {
        Self {
            user_repo,
            billing,
            config,
        }
    }

    pub async fn change_plan(
        &self,
        subscription_id: &str,
        price_id: &str,
        user_id: Option<Uuid>,
    ) -> PlanChangeResult<PlanChangeOutcome> {
        if subscription_id.is_empty() {
            return Err(PlanChangeError::MissingField("subscriptionId"));
        }
        if price_id.is_empty() {
            return Err(PlanChangeError::MissingField("priceId"));
        }
        if self.config.crew_product_id.is_empty() || self.config.vessel_product_id.is_empty() {
            error!("plan_change: product family ids are not configured");
            return Err(PlanChangeError::MissingProductConfig);
        }

        info!(
            subscription_id,
            price_id,
            user_id = ?user_id,
            "plan_change: change requested"
        );

        let subscription = self
            .billing
            .retrieve_subscription(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id,
                    error = ?err,
                    "plan_change: failed to retrieve subscription"
                );
                PlanChangeError::Internal(err)
            })?;

        let plan_item = select_plan_item(&subscription.items.data, &self.config)
            .ok_or_else(|| {
                error!(subscription_id, "plan_change: subscription has no line items");
                PlanChangeError::Internal(anyhow!("subscription has no line items"))
            })?
            .clone();

        let target_price = self.billing.retrieve_price(price_id).await.map_err(|err| {
            error!(
                price_id,
                error = ?err,
                "plan_change: failed to retrieve target price"
            );
            PlanChangeError::Internal(err)
        })?;

        let current_product_id = plan_item.price.product_id().unwrap_or_default().to_string();
        let new_product_id = target_price.product_id().unwrap_or_default().to_string();
        let current_family = product_family(&current_product_id, &self.config);
        let target_family = product_family(&new_product_id, &self.config);
        if let (Some(current), Some(target)) = (current_family, target_family) {
            if current != target {
                warn!(
                    subscription_id,
                    current_product_id,
                    new_product_id,
                    "plan_change: cross-family switch rejected"
                );
                return Err(PlanChangeError::CrossFamilySwitch {
                    current_product_id,
                    new_product_id,
                });
            }
        }

        if target_price.id == plan_item.price.id {
            info!(subscription_id, price_id, "plan_change: no change");
            return Ok(PlanChangeOutcome::NoChange);
        }

        let account = resolve_account(user_id, &subscription);

        let current_amount = plan_item.price.unit_amount.unwrap_or(0);
        let target_amount = target_price.unit_amount.unwrap_or(0);
        if target_amount < current_amount {
            self.schedule_downgrade(&subscription, &target_price, account)
                .await
        } else {
            self.apply_upgrade(&subscription, &plan_item, &target_price, account)
                .await
        }
    }

    /// Rewrites the subscription's schedule to exactly two phases: the
    /// current items until the period boundary, then the new price onward.
    async fn schedule_downgrade(
        &self,
        subscription: &StripeSubscription,
        target_price: &StripePrice,
        account: Option<BillingAccountRef>,
    ) -> PlanChangeResult<PlanChangeOutcome> {
        let period_end = subscription.current_period_end.ok_or_else(|| {
            error!(
                subscription_id = %subscription.id,
                "plan_change: subscription has no current period end"
            );
            PlanChangeError::Internal(anyhow!("subscription has no current period end"))
        })?;

        let schedule = match subscription.schedule.as_ref() {
            Some(schedule_ref) => self
                .billing
                .retrieve_schedule(schedule_ref.id())
                .await
                .map_err(|err| {
                    error!(
                        subscription_id = %subscription.id,
                        schedule_id = schedule_ref.id(),
                        error = ?err,
                        "plan_change: failed to retrieve existing schedule"
                    );
                    PlanChangeError::Internal(err)
                })?,
            None => self
                .billing
                .create_schedule_from_subscription(&subscription.id)
                .await
                .map_err(|err| {
                    error!(
                        subscription_id = %subscription.id,
                        error = ?err,
                        "plan_change: failed to create schedule from subscription"
                    );
                    PlanChangeError::Internal(err)
                })?,
        };

        let now = Utc::now().timestamp();
        let current_phase = current_phase(&schedule.phases, now).ok_or_else(|| {
            error!(
                subscription_id = %subscription.id,
                schedule_id = %schedule.id,
                "plan_change: schedule has no phases"
            );
            PlanChangeError::Internal(anyhow!("schedule has no phases"))
        })?;

        let phases = vec![
            PhaseSpec {
                start_date: current_phase.start_date,
                end_date: Some(period_end),
                items: current_phase
                    .items
                    .iter()
                    .map(|item| PhaseItemSpec {
                        price: item.price.id().to_string(),
                        quantity: item.quantity.unwrap_or(1),
                    })
                    .collect(),
            },
            PhaseSpec {
                start_date: period_end,
                end_date: None,
                items: vec![PhaseItemSpec {
                    price: target_price.id.clone(),
                    quantity: 1,
                }],
            },
        ];

        self.billing
            .update_schedule_phases(&schedule.id, phases, "release")
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %subscription.id,
                    schedule_id = %schedule.id,
                    error = ?err,
                    "plan_change: failed to rewrite schedule phases"
                );
                PlanChangeError::Internal(err)
            })?;

        let pending_tier = tier_label(target_price);
        let effective_at = timestamp_to_datetime(period_end)?;

        match account {
            Some(account) => {
                self.user_repo
                    .set_pending_plan_change(account, &pending_tier, effective_at)
                    .await
                    .map_err(|err| {
                        error!(
                            subscription_id = %subscription.id,
                            db_error = ?err,
                            "plan_change: failed to persist pending change projection"
                        );
                        PlanChangeError::Internal(err)
                    })?;
            }
            None => warn!(
                subscription_id = %subscription.id,
                "plan_change: no account reference; pending projection skipped"
            ),
        }

        info!(
            subscription_id = %subscription.id,
            pending_tier = %pending_tier,
            effective_at = %effective_at,
            "plan_change: downgrade scheduled"
        );

        Ok(PlanChangeOutcome::DowngradeScheduled {
            pending_tier,
            effective_at,
        })
    }

    async fn apply_upgrade(
        &self,
        subscription: &StripeSubscription,
        plan_item: &StripeSubscriptionItem,
        target_price: &StripePrice,
        account: Option<BillingAccountRef>,
    ) -> PlanChangeResult<PlanChangeOutcome> {
        // An in-flight downgrade must not silently override an immediate
        // upgrade: detach the schedule first.
        if let Some(schedule_ref) = subscription.schedule.as_ref() {
            info!(
                subscription_id = %subscription.id,
                schedule_id = schedule_ref.id(),
                "plan_change: releasing existing schedule before upgrade"
            );
            self.billing
                .release_schedule(schedule_ref.id())
                .await
                .map_err(|err| {
                    error!(
                        subscription_id = %subscription.id,
                        schedule_id = schedule_ref.id(),
                        error = ?err,
                        "plan_change: failed to release schedule"
                    );
                    PlanChangeError::Internal(err)
                })?;
        }

        let updated = self
            .billing
            .update_subscription_item(&subscription.id, &plan_item.id, &target_price.id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id = %subscription.id,
                    item_id = %plan_item.id,
                    price_id = %target_price.id,
                    error = ?err,
                    "plan_change: failed to update subscription item"
                );
                PlanChangeError::Internal(err)
            })?;

        match account {
            Some(account) => {
                self.user_repo
                    .clear_pending_plan_change(account)
                    .await
                    .map_err(|err| {
                        error!(
                            subscription_id = %subscription.id,
                            db_error = ?err,
                            "plan_change: failed to clear pending change projection"
                        );
                        PlanChangeError::Internal(err)
                    })?;
            }
            None => warn!(
                subscription_id = %subscription.id,
                "plan_change: no account reference; pending projection not cleared"
            ),
        }

        let latest_invoice = updated.latest_invoice.as_ref().map(|invoice| InvoiceSummary {
            id: invoice.id.clone(),
            status: invoice.status.clone(),
        });
        let payment_intent = updated
            .latest_invoice
            .as_ref()
            .and_then(|invoice| invoice.payment_intent.as_ref())
            .map(|intent| PaymentIntentSummary {
                id: intent.id.clone(),
                status: intent.status.clone(),
                client_secret: intent.client_secret.clone(),
            });

        let subscription_status = updated.status.clone().unwrap_or_else(|| "active".to_string());

        info!(
            subscription_id = %subscription.id,
            price_id = %target_price.id,
            subscription_status = %subscription_status,
            "plan_change: upgrade applied"
        );

        Ok(PlanChangeOutcome::UpgradeApplied {
            subscription_status,
            latest_invoice,
            payment_intent,
        })
    }
}

/// Picks the line item that represents "the plan" rather than an add-on.
/// Lenient on purpose: not all historical subscriptions carry clean tags.
pub fn select_plan_item<'a>(
    items: &'a [StripeSubscriptionItem],
    config: &StripeConfig,
) -> Option<&'a StripeSubscriptionItem> {
    items
        .iter()
        .find(|item| {
            item.price
                .product_id()
                .is_some_and(|id| id == config.crew_product_id || id == config.vessel_product_id)
        })
        .or_else(|| items.iter().find(|item| item.price.tier().is_some()))
        .or_else(|| items.first())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProductFamily {
    Crew,
    Vessel,
}

pub fn product_family(product_id: &str, config: &StripeConfig) -> Option<ProductFamily> {
    if product_id == config.crew_product_id {
        Some(ProductFamily::Crew)
    } else if product_id == config.vessel_product_id {
        Some(ProductFamily::Vessel)
    } else {
        None
    }
}

/// Phase whose [start_date, end_date) contains `now`, or the last phase
/// as the lifecycle fallback for not-yet-started/edge states.
pub fn current_phase(phases: &[StripeSchedulePhase], now: i64) -> Option<&StripeSchedulePhase> {
    phases
        .iter()
        .find(|phase| {
            phase.start_date <= now && phase.end_date.map_or(true, |end| now < end)
        })
        .or_else(|| phases.last())
}

fn tier_label(price: &StripePrice) -> String {
    price
        .tier()
        .map(str::to_string)
        .or_else(|| price.nickname.clone())
        .unwrap_or_else(|| price.id.clone())
}

fn resolve_account(
    user_id: Option<Uuid>,
    subscription: &StripeSubscription,
) -> Option<BillingAccountRef> {
    user_id.map(BillingAccountRef::UserId).or_else(|| {
        subscription
            .customer
            .as_ref()
            .map(|customer| BillingAccountRef::CustomerId(customer.id().to_string()))
    })
}

fn timestamp_to_datetime(ts: i64) -> PlanChangeResult<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| PlanChangeError::Internal(anyhow!("invalid unix timestamp: {ts}")))
}
