use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use uuid::Uuid;

use crate::domain::entities::approved_testimonials::{
    ApprovedTestimonialEntity, InsertApprovedTestimonialEntity,
};
use crate::domain::repositories::approved_testimonials::ApprovedTestimonialRepository;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, schema::approved_testimonials,
};

pub struct ApprovedTestimonialPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ApprovedTestimonialPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ApprovedTestimonialRepository for ApprovedTestimonialPostgres {
    async fn find_by_testimonial_id(
        &self,
        testimonial_id: Uuid,
    ) -> Result<Option<ApprovedTestimonialEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = approved_testimonials::table
            .filter(approved_testimonials::testimonial_id.eq(testimonial_id))
            .select(ApprovedTestimonialEntity::as_select())
            .first::<ApprovedTestimonialEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create_if_absent(
        &self,
        entity: InsertApprovedTestimonialEntity,
    ) -> Result<ApprovedTestimonialEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let testimonial_id = entity.testimonial_id;

        // The unique index on testimonial_id makes concurrent inserts
        // collapse to a single surviving row; the loser re-selects it.
        insert_into(approved_testimonials::table)
            .values(&entity)
            .on_conflict(approved_testimonials::testimonial_id)
            .do_nothing()
            .execute(&mut conn)?;

        let snapshot = approved_testimonials::table
            .filter(approved_testimonials::testimonial_id.eq(testimonial_id))
            .select(ApprovedTestimonialEntity::as_select())
            .first::<ApprovedTestimonialEntity>(&mut conn)
            .optional()?
            .ok_or_else(|| anyhow!("snapshot row missing after insert for {}", testimonial_id))?;

        Ok(snapshot)
    }
}
