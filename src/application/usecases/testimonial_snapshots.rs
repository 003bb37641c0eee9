use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::approved_testimonials::{
    ApprovedTestimonialEntity, InsertApprovedTestimonialEntity,
};
use crate::domain::entities::testimonials::TestimonialEntity;
use crate::domain::repositories::approved_testimonials::ApprovedTestimonialRepository;
use crate::domain::repositories::testimonials::TestimonialRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::repositories::vessels::VesselRepository;
use crate::domain::value_objects::enums::testimonial_statuses::TestimonialStatus;

/// Bounded polling for the asynchronously generated testimonial code.
/// Delay grows linearly: base × attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("testimonial not found")]
    TestimonialNotFound,
    #[error("testimonial is not approved")]
    NotApproved,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SnapshotError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SnapshotError::TestimonialNotFound => StatusCode::NOT_FOUND,
            SnapshotError::NotApproved => StatusCode::BAD_REQUEST,
            SnapshotError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Derives the immutable verification snapshot for an approved
/// testimonial. Idempotent: an existing snapshot is returned unchanged.
pub struct TestimonialSnapshotUseCase<T, U, A, V>
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    testimonial_repo: Arc<T>,
    user_repo: Arc<U>,
    snapshot_repo: Arc<A>,
    vessel_repo: Arc<V>,
    retry_policy: RetryPolicy,
}

impl<T, U, A, V> TestimonialSnapshotUseCase<T, U, A, V>
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    pub fn new(
        testimonial_repo: Arc<T>,
        user_repo: Arc<U>,
        snapshot_repo: Arc<A>,
        vessel_repo: Arc<V>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            testimonial_repo,
            user_repo,
            snapshot_repo,
            vessel_repo,
            retry_policy,
        }
    }

    pub async fn create_snapshot(
        &self,
        testimonial_id: Uuid,
    ) -> SnapshotResult<ApprovedTestimonialEntity> {
        if let Some(existing) = self
            .snapshot_repo
            .find_by_testimonial_id(testimonial_id)
            .await
            .map_err(SnapshotError::Internal)?
        {
            info!(%testimonial_id, "snapshots: snapshot already exists");
            return Ok(existing);
        }

        let testimonial = self.await_code_assignment(testimonial_id).await?;

        let status = TestimonialStatus::from_str(&testimonial.status);
        if status != Some(TestimonialStatus::Approved) {
            warn!(
                %testimonial_id,
                status = %testimonial.status,
                "snapshots: refusing snapshot for non-approved testimonial"
            );
            return Err(SnapshotError::NotApproved);
        }

        let crew = self
            .user_repo
            .find_by_id(testimonial.user_id)
            .await
            .map_err(SnapshotError::Internal)?;
        let vessel = self
            .vessel_repo
            .find_by_id(testimonial.vessel_id)
            .await
            .map_err(SnapshotError::Internal)?;

        let entity = InsertApprovedTestimonialEntity {
            testimonial_id: testimonial.id,
            crew_user_id: testimonial.user_id,
            crew_name: crew.as_ref().and_then(|user| user.display_name.clone()),
            crew_rank: crew.as_ref().and_then(|user| user.rank.clone()),
            vessel_name: vessel.as_ref().map(|vessel| vessel.name.clone()),
            vessel_imo: vessel.as_ref().and_then(|vessel| vessel.imo_number.clone()),
            start_date: testimonial.start_date,
            end_date: testimonial.end_date,
            total_days: testimonial.total_days,
            at_sea_days: testimonial.at_sea_days,
            standby_days: testimonial.standby_days,
            yard_days: testimonial.yard_days,
            leave_days: testimonial.leave_days,
            captain_name: testimonial.captain_name.clone(),
            captain_license: Some(license_from_position(
                testimonial.captain_position.as_deref(),
            )),
            testimonial_code: testimonial.testimonial_code.clone(),
        };

        let snapshot = self
            .snapshot_repo
            .create_if_absent(entity)
            .await
            .map_err(SnapshotError::Internal)?;

        info!(
            %testimonial_id,
            snapshot_id = %snapshot.id,
            testimonial_code = ?snapshot.testimonial_code,
            "snapshots: snapshot created"
        );

        Ok(snapshot)
    }

    /// The testimonial code is generated out-of-band and can lag the
    /// status flip. Poll a bounded number of times, then fall through
    /// with whatever the last read returned rather than block.
    async fn await_code_assignment(
        &self,
        testimonial_id: Uuid,
    ) -> SnapshotResult<TestimonialEntity> {
        let mut last_seen: Option<TestimonialEntity> = None;

        for attempt in 1..=self.retry_policy.max_attempts {
            let testimonial = self
                .testimonial_repo
                .find_by_id(testimonial_id)
                .await
                .map_err(SnapshotError::Internal)?
                .ok_or(SnapshotError::TestimonialNotFound)?;

            let status = TestimonialStatus::from_str(&testimonial.status);
            let ready = status == Some(TestimonialStatus::Approved)
                && testimonial.testimonial_code.is_some();
            // A rejected testimonial will never grow a code; stop waiting.
            let terminal_non_approved = status
                .is_some_and(|status| status.is_terminal() && status != TestimonialStatus::Approved);
            last_seen = Some(testimonial);

            if ready || terminal_non_approved {
                break;
            }

            if attempt < self.retry_policy.max_attempts {
                info!(
                    %testimonial_id,
                    attempt,
                    "snapshots: testimonial code not assigned yet; retrying"
                );
                tokio::time::sleep(self.retry_policy.delay(attempt)).await;
            } else {
                warn!(
                    %testimonial_id,
                    attempts = self.retry_policy.max_attempts,
                    "snapshots: testimonial code still missing; proceeding without it"
                );
            }
        }

        last_seen.ok_or(SnapshotError::TestimonialNotFound)
    }
}

/// Maps a free-text captain position to the license recorded on the
/// snapshot. A prioritized chain, lenient because historical records are
/// not consistently tagged.
pub fn license_from_position(position: Option<&str>) -> String {
    const KNOWN_LICENSES: &[&str] = &[
        "Master",
        "Chief Mate",
        "Second Mate",
        "Third Mate",
        "Chief Engineer",
    ];

    let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) else {
        return "Captain".to_string();
    };

    if let Some(known) = KNOWN_LICENSES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(position))
    {
        return known.to_string();
    }

    let lowered = position.to_ascii_lowercase();
    if lowered.contains("master") || lowered.contains("captain") {
        return "Master".to_string();
    }

    position.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::approved_testimonials::MockApprovedTestimonialRepository;
    use crate::domain::repositories::testimonials::MockTestimonialRepository;
    use crate::domain::repositories::users::MockUserRepository;
    use crate::domain::repositories::vessels::MockVesselRepository;
    use chrono::{NaiveDate, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn testimonial(id: Uuid, status: &str, code: Option<&str>) -> TestimonialEntity {
        TestimonialEntity {
            id,
            user_id: Uuid::new_v4(),
            vessel_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_days: 60,
            at_sea_days: 40,
            standby_days: 10,
            yard_days: 5,
            leave_days: 5,
            status: status.to_string(),
            signoff_token: None,
            signoff_target_email: None,
            signoff_token_expires_at: None,
            signoff_used_at: Some(Utc::now()),
            captain_name: Some("J. Holt".to_string()),
            captain_email: None,
            captain_position: Some("Master".to_string()),
            captain_user_id: None,
            testimonial_code: code.map(str::to_string),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn snapshot_row(testimonial_id: Uuid, code: Option<&str>) -> ApprovedTestimonialEntity {
        ApprovedTestimonialEntity {
            id: Uuid::new_v4(),
            testimonial_id,
            crew_user_id: Uuid::new_v4(),
            crew_name: Some("A. Mate".to_string()),
            crew_rank: Some("Deckhand".to_string()),
            vessel_name: Some("MV Petrel".to_string()),
            vessel_imo: Some("9876543".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_days: 60,
            at_sea_days: 40,
            standby_days: 10,
            yard_days: 5,
            leave_days: 5,
            captain_name: Some("J. Holt".to_string()),
            captain_license: Some("Master".to_string()),
            testimonial_code: code.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn license_chain_resolves_in_priority_order() {
        assert_eq!(license_from_position(Some("Master")), "Master");
        assert_eq!(license_from_position(Some("chief mate")), "Chief Mate");
        assert_eq!(license_from_position(Some("Relief Captain")), "Master");
        assert_eq!(license_from_position(Some("Bosun")), "Bosun");
        assert_eq!(license_from_position(Some("  ")), "Captain");
        assert_eq!(license_from_position(None), "Captain");
    }

    #[tokio::test]
    async fn existing_snapshot_is_returned_without_insert() {
        let testimonial_id = Uuid::new_v4();

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(move |id| Ok(Some(snapshot_row(id, Some("HT-0001")))));
        snapshot_repo.expect_create_if_absent().never();

        let usecase = TestimonialSnapshotUseCase::new(
            Arc::new(MockTestimonialRepository::new()),
            Arc::new(MockUserRepository::new()),
            Arc::new(snapshot_repo),
            Arc::new(MockVesselRepository::new()),
            fast_policy(),
        );

        let snapshot = usecase.create_snapshot(testimonial_id).await.unwrap();
        assert_eq!(snapshot.testimonial_id, testimonial_id);
    }

    #[tokio::test]
    async fn polls_until_code_is_assigned() {
        let testimonial_id = Uuid::new_v4();
        let reads = Arc::new(AtomicU32::new(0));

        let mut testimonial_repo = MockTestimonialRepository::new();
        let reads_in_mock = Arc::clone(&reads);
        testimonial_repo.expect_find_by_id().returning(move |id| {
            let attempt = reads_in_mock.fetch_add(1, Ordering::SeqCst) + 1;
            let code = (attempt >= 3).then_some("HT-0042");
            Ok(Some(testimonial(id, "approved", code)))
        });

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(|_| Ok(None));
        snapshot_repo
            .expect_create_if_absent()
            .withf(|entity| entity.testimonial_code.as_deref() == Some("HT-0042"))
            .returning(|entity| {
                Ok(snapshot_row(
                    entity.testimonial_id,
                    entity.testimonial_code.as_deref(),
                ))
            });

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(|_| Ok(None));
        let mut vessel_repo = MockVesselRepository::new();
        vessel_repo.expect_find_by_id().returning(|_| Ok(None));

        let usecase = TestimonialSnapshotUseCase::new(
            Arc::new(testimonial_repo),
            Arc::new(user_repo),
            Arc::new(snapshot_repo),
            Arc::new(vessel_repo),
            fast_policy(),
        );

        let snapshot = usecase.create_snapshot(testimonial_id).await.unwrap();
        assert_eq!(snapshot.testimonial_code.as_deref(), Some("HT-0042"));
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn falls_through_with_null_code_after_max_attempts() {
        let testimonial_id = Uuid::new_v4();
        let reads = Arc::new(AtomicU32::new(0));

        let mut testimonial_repo = MockTestimonialRepository::new();
        let reads_in_mock = Arc::clone(&reads);
        testimonial_repo.expect_find_by_id().returning(move |id| {
            reads_in_mock.fetch_add(1, Ordering::SeqCst);
            Ok(Some(testimonial(id, "approved", None)))
        });

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(|_| Ok(None));
        snapshot_repo
            .expect_create_if_absent()
            .withf(|entity| entity.testimonial_code.is_none())
            .returning(|entity| Ok(snapshot_row(entity.testimonial_id, None)));

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(|_| Ok(None));
        let mut vessel_repo = MockVesselRepository::new();
        vessel_repo.expect_find_by_id().returning(|_| Ok(None));

        let usecase = TestimonialSnapshotUseCase::new(
            Arc::new(testimonial_repo),
            Arc::new(user_repo),
            Arc::new(snapshot_repo),
            Arc::new(vessel_repo),
            fast_policy(),
        );

        let snapshot = usecase.create_snapshot(testimonial_id).await.unwrap();
        assert!(snapshot.testimonial_code.is_none());
        assert_eq!(reads.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn rejected_testimonial_fails_without_exhausting_the_poll() {
        let reads = Arc::new(AtomicU32::new(0));

        let mut testimonial_repo = MockTestimonialRepository::new();
        let reads_in_mock = Arc::clone(&reads);
        testimonial_repo.expect_find_by_id().returning(move |id| {
            reads_in_mock.fetch_add(1, Ordering::SeqCst);
            Ok(Some(testimonial(id, "rejected", None)))
        });

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(|_| Ok(None));
        snapshot_repo.expect_create_if_absent().never();

        let usecase = TestimonialSnapshotUseCase::new(
            Arc::new(testimonial_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(snapshot_repo),
            Arc::new(MockVesselRepository::new()),
            fast_policy(),
        );

        let err = usecase.create_snapshot(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SnapshotError::NotApproved));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_approved_testimonial_is_rejected() {
        let mut testimonial_repo = MockTestimonialRepository::new();
        testimonial_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(testimonial(id, "pending_captain", None))));

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(|_| Ok(None));
        snapshot_repo.expect_create_if_absent().never();

        let usecase = TestimonialSnapshotUseCase::new(
            Arc::new(testimonial_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(snapshot_repo),
            Arc::new(MockVesselRepository::new()),
            fast_policy(),
        );

        let err = usecase.create_snapshot(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SnapshotError::NotApproved));
    }
}
