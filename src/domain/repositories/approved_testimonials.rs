use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::approved_testimonials::{
    ApprovedTestimonialEntity, InsertApprovedTestimonialEntity,
};

#[automock]
#[async_trait]
pub trait ApprovedTestimonialRepository {
    async fn find_by_testimonial_id(
        &self,
        testimonial_id: Uuid,
    ) -> Result<Option<ApprovedTestimonialEntity>>;

    /// Inserts the snapshot unless one already exists for the testimonial.
    /// A concurrent duplicate insert resolves to the surviving row, never
    /// an error and never a second row.
    async fn create_if_absent(
        &self,
        entity: InsertApprovedTestimonialEntity,
    ) -> Result<ApprovedTestimonialEntity>;
}
