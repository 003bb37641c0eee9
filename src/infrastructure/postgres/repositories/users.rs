use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use uuid::Uuid;

use crate::domain::entities::users::UserEntity;
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::billing::BillingAccountRef;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::users};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .find(user_id)
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn set_pending_plan_change(
        &self,
        account: BillingAccountRef,
        pending_tier: &str,
        effective_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let changes = (
            users::pending_subscription_tier.eq(Some(pending_tier.to_string())),
            users::pending_change_effective_at.eq(Some(effective_at)),
        );

        match account {
            BillingAccountRef::UserId(user_id) => {
                update(users::table)
                    .filter(users::id.eq(user_id))
                    .set(changes)
                    .execute(&mut conn)?;
            }
            BillingAccountRef::CustomerId(customer_id) => {
                update(users::table)
                    .filter(users::stripe_customer_id.eq(customer_id))
                    .set(changes)
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }

    async fn clear_pending_plan_change(&self, account: BillingAccountRef) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let changes = (
            users::pending_subscription_tier.eq(None::<String>),
            users::pending_change_effective_at.eq(None::<DateTime<Utc>>),
        );

        match account {
            BillingAccountRef::UserId(user_id) => {
                update(users::table)
                    .filter(users::id.eq(user_id))
                    .set(changes)
                    .execute(&mut conn)?;
            }
            BillingAccountRef::CustomerId(customer_id) => {
                update(users::table)
                    .filter(users::stripe_customer_id.eq(customer_id))
                    .set(changes)
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }

    async fn set_active_vessel(&self, user_id: Uuid, vessel_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::active_vessel_id.eq(Some(vessel_id)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_vessel_role_user_for_vessel(
        &self,
        vessel_id: Uuid,
    ) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::role.eq("vessel"))
            .filter(users::active_vessel_id.eq(Some(vessel_id)))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
