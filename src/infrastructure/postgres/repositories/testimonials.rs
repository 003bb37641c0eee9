use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*, update};
use uuid::Uuid;

use crate::domain::entities::testimonials::TestimonialEntity;
use crate::domain::repositories::testimonials::TestimonialRepository;
use crate::domain::value_objects::signoff::SignoffDecisionUpdate;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::testimonials};

pub struct TestimonialPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TestimonialPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TestimonialRepository for TestimonialPostgres {
    async fn find_by_signoff(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Option<TestimonialEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = testimonials::table
            .filter(testimonials::signoff_token.eq(token))
            .filter(testimonials::signoff_target_email.eq(email))
            .select(TestimonialEntity::as_select())
            .first::<TestimonialEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, testimonial_id: Uuid) -> Result<Option<TestimonialEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = testimonials::table
            .find(testimonial_id)
            .select(TestimonialEntity::as_select())
            .first::<TestimonialEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn apply_signoff_decision(
        &self,
        token: &str,
        decision: SignoffDecisionUpdate,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Single-use guard: the row must still carry the token with no
        // recorded use. A concurrent decision updates zero rows here.
        let affected = update(testimonials::table)
            .filter(testimonials::signoff_token.eq(token))
            .filter(testimonials::signoff_used_at.is_null())
            .set((
                testimonials::status.eq(decision.status.to_string()),
                testimonials::signoff_used_at.eq(Some(decision.signoff_used_at)),
                testimonials::captain_name.eq(decision.captain_name),
                testimonials::captain_email.eq(decision.captain_email),
                testimonials::captain_position.eq(decision.captain_position),
                testimonials::captain_user_id.eq(decision.captain_user_id),
                testimonials::notes.eq(decision.notes),
            ))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }
}
