use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::approved_testimonials;

/// Immutable verification snapshot. One row per testimonial, never
/// updated or deleted after insert.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = approved_testimonials)]
pub struct ApprovedTestimonialEntity {
    pub id: Uuid,
    pub testimonial_id: Uuid,
    pub crew_user_id: Uuid,
    pub crew_name: Option<String>,
    pub crew_rank: Option<String>,
    pub vessel_name: Option<String>,
    pub vessel_imo: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub at_sea_days: i32,
    pub standby_days: i32,
    pub yard_days: i32,
    pub leave_days: i32,
    pub captain_name: Option<String>,
    pub captain_license: Option<String>,
    pub testimonial_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = approved_testimonials)]
pub struct InsertApprovedTestimonialEntity {
    pub testimonial_id: Uuid,
    pub crew_user_id: Uuid,
    pub crew_name: Option<String>,
    pub crew_rank: Option<String>,
    pub vessel_name: Option<String>,
    pub vessel_imo: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub at_sea_days: i32,
    pub standby_days: i32,
    pub yard_days: i32,
    pub leave_days: i32,
    pub captain_name: Option<String>,
    pub captain_license: Option<String>,
    pub testimonial_code: Option<String>,
}
