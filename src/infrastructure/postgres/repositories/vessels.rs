use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::domain::entities::vessel_assignments::InsertVesselAssignmentEntity;
use crate::domain::entities::vessel_signing_authorities::InsertVesselSigningAuthorityEntity;
use crate::domain::entities::vessels::VesselEntity;
use crate::domain::repositories::vessels::VesselRepository;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{vessel_assignments, vessel_signing_authorities, vessels},
};

pub struct VesselPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl VesselPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl VesselRepository for VesselPostgres {
    async fn find_by_id(&self, vessel_id: Uuid) -> Result<Option<VesselEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = vessels::table
            .find(vessel_id)
            .select(VesselEntity::as_select())
            .first::<VesselEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn set_manager(&self, vessel_id: Uuid, manager_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(vessels::table)
            .filter(vessels::id.eq(vessel_id))
            .set(vessels::manager_id.eq(Some(manager_id)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn close_open_assignments_elsewhere(
        &self,
        user_id: Uuid,
        keep_vessel_id: Uuid,
        end_date: NaiveDate,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let closed = update(vessel_assignments::table)
            .filter(vessel_assignments::user_id.eq(user_id))
            .filter(vessel_assignments::vessel_id.ne(keep_vessel_id))
            .filter(vessel_assignments::end_date.is_null())
            .set(vessel_assignments::end_date.eq(Some(end_date)))
            .execute(&mut conn)?;

        Ok(closed)
    }

    async fn upsert_open_assignment(
        &self,
        vessel_id: Uuid,
        user_id: Uuid,
        position: &str,
        start_date: NaiveDate,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let existing = vessel_assignments::table
            .filter(vessel_assignments::vessel_id.eq(vessel_id))
            .filter(vessel_assignments::user_id.eq(user_id))
            .filter(vessel_assignments::end_date.is_null())
            .select(vessel_assignments::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        match existing {
            Some(assignment_id) => {
                update(vessel_assignments::table)
                    .filter(vessel_assignments::id.eq(assignment_id))
                    .set(vessel_assignments::position.eq(position))
                    .execute(&mut conn)?;
            }
            None => {
                insert_into(vessel_assignments::table)
                    .values(&InsertVesselAssignmentEntity {
                        vessel_id,
                        user_id,
                        position: position.to_string(),
                        start_date,
                        end_date: None,
                    })
                    .execute(&mut conn)?;
            }
        }

        Ok(())
    }

    async fn replace_primary_signing_authority(
        &self,
        vessel_id: Uuid,
        user_id: Uuid,
        granted_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            update(vessel_signing_authorities::table)
                .filter(vessel_signing_authorities::vessel_id.eq(vessel_id))
                .filter(vessel_signing_authorities::is_primary.eq(true))
                .filter(vessel_signing_authorities::revoked_at.is_null())
                .set(vessel_signing_authorities::revoked_at.eq(Some(granted_at)))
                .execute(conn)?;

            insert_into(vessel_signing_authorities::table)
                .values(&InsertVesselSigningAuthorityEntity {
                    vessel_id,
                    user_id,
                    is_primary: true,
                    granted_at,
                })
                .execute(conn)?;

            Ok(())
        })?;

        Ok(())
    }
}
