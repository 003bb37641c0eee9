use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::vessel_signing_authorities;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vessel_signing_authorities)]
pub struct InsertVesselSigningAuthorityEntity {
    pub vessel_id: Uuid,
    pub user_id: Uuid,
    pub is_primary: bool,
    pub granted_at: DateTime<Utc>,
}
