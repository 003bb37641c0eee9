use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::vessels;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = vessels)]
pub struct VesselEntity {
    pub id: Uuid,
    pub name: String,
    pub imo_number: Option<String>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
