use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::vessels::VesselEntity;

#[automock]
#[async_trait]
pub trait VesselRepository {
    async fn find_by_id(&self, vessel_id: Uuid) -> Result<Option<VesselEntity>>;

    async fn set_manager(&self, vessel_id: Uuid, manager_id: Uuid) -> Result<()>;

    /// Closes every open-ended assignment the captain holds on any other
    /// vessel. A captain is actively assigned to at most one vessel.
    async fn close_open_assignments_elsewhere(
        &self,
        user_id: Uuid,
        keep_vessel_id: Uuid,
        end_date: NaiveDate,
    ) -> Result<usize>;

    /// Creates or reopens the captain's open-ended assignment on the
    /// vessel, leaving at most one open row per captain per vessel.
    async fn upsert_open_assignment(
        &self,
        vessel_id: Uuid,
        user_id: Uuid,
        position: &str,
        start_date: NaiveDate,
    ) -> Result<()>;

    /// Revokes any active primary signing authority on the vessel, then
    /// grants a new primary one to the captain.
    async fn replace_primary_signing_authority(
        &self,
        vessel_id: Uuid,
        user_id: Uuid,
        granted_at: DateTime<Utc>,
    ) -> Result<()>;
}
