use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::UserEntity;
use crate::domain::value_objects::billing::BillingAccountRef;

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    /// Writes the denormalized pending-downgrade projection. Both fields
    /// are set together; billing truth stays with the payment processor.
    async fn set_pending_plan_change(
        &self,
        account: BillingAccountRef,
        pending_tier: &str,
        effective_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Clears both pending fields together.
    async fn clear_pending_plan_change(&self, account: BillingAccountRef) -> Result<()>;

    async fn set_active_vessel(&self, user_id: Uuid, vessel_id: Uuid) -> Result<()>;

    /// Any vessel-operator account tied to the vessel, used to backfill a
    /// missing manager reference.
    async fn find_vessel_role_user_for_vessel(
        &self,
        vessel_id: Uuid,
    ) -> Result<Option<UserEntity>>;
}
