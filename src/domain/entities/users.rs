use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub email: String,
    pub rank: Option<String>,
    pub position: Option<String>,
    pub role: String,
    pub stripe_customer_id: Option<String>,
    pub subscription_tier: Option<String>,
    pub subscription_status: String,
    pub pending_subscription_tier: Option<String>,
    pub pending_change_effective_at: Option<DateTime<Utc>>,
    pub active_vessel_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
