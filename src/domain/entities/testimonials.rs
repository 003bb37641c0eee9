use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::testimonials;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = testimonials)]
pub struct TestimonialEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vessel_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub at_sea_days: i32,
    pub standby_days: i32,
    pub yard_days: i32,
    pub leave_days: i32,
    pub status: String,
    pub signoff_token: Option<String>,
    pub signoff_target_email: Option<String>,
    pub signoff_token_expires_at: Option<DateTime<Utc>>,
    pub signoff_used_at: Option<DateTime<Utc>>,
    pub captain_name: Option<String>,
    pub captain_email: Option<String>,
    pub captain_position: Option<String>,
    pub captain_user_id: Option<Uuid>,
    pub testimonial_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
