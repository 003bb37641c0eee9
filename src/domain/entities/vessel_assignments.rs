use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::vessel_assignments;

/// An open assignment carries a null end_date; a captain holds at most
/// one open row per vessel.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vessel_assignments)]
pub struct InsertVesselAssignmentEntity {
    pub vessel_id: Uuid,
    pub user_id: Uuid,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}
