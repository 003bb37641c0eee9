use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::testimonials::TestimonialEntity;
use crate::domain::value_objects::signoff::SignoffDecisionUpdate;

#[automock]
#[async_trait]
pub trait TestimonialRepository {
    /// Exact match on (signoff_token, signoff_target_email).
    async fn find_by_signoff(&self, token: &str, email: &str)
        -> Result<Option<TestimonialEntity>>;

    async fn find_by_id(&self, testimonial_id: Uuid) -> Result<Option<TestimonialEntity>>;

    /// Applies the terminal decision guarded by re-matching the token and
    /// an unset `signoff_used_at` in the same update. Returns false when
    /// no row matched, i.e. a concurrent request already decided.
    async fn apply_signoff_decision(
        &self,
        token: &str,
        update: SignoffDecisionUpdate,
    ) -> Result<bool>;
}
