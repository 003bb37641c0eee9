use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::usecases::testimonial_snapshots::TestimonialSnapshotUseCase;
use crate::domain::entities::testimonials::TestimonialEntity;
use crate::domain::repositories::approved_testimonials::ApprovedTestimonialRepository;
use crate::domain::repositories::testimonials::TestimonialRepository;
use crate::domain::repositories::users::UserRepository;
use crate::domain::repositories::vessels::VesselRepository;
use crate::domain::value_objects::enums::testimonial_statuses::TestimonialStatus;
use crate::domain::value_objects::signoff::{
    SignoffDecision, SignoffDecisionUpdate, SignoffReviewDto,
};
use crate::notifications::mailer::Mailer;

#[derive(Debug, Error)]
pub enum SignoffError {
    #[error("sign-off link is invalid or has been revoked")]
    InvalidLink,
    #[error("sign-off link has expired")]
    Expired,
    #[error("sign-off link has already been used")]
    AlreadyUsed,
    #[error("testimonial is not awaiting sign-off")]
    NotAwaitingSignoff,
    #[error("invalid decision: {0}")]
    InvalidDecision(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SignoffError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SignoffError::InvalidLink => StatusCode::NOT_FOUND,
            SignoffError::Expired => StatusCode::GONE,
            SignoffError::AlreadyUsed | SignoffError::NotAwaitingSignoff => StatusCode::CONFLICT,
            SignoffError::InvalidDecision(_) => StatusCode::BAD_REQUEST,
            SignoffError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type SignoffResult<T> = std::result::Result<T, SignoffError>;

/// Captain-facing sign-off over a single-use emailed link. The captain
/// needs no account; the (token, email) pair is the whole credential.
pub struct CaptainSignoffUseCase<T, U, A, V, M>
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
    M: Mailer + 'static,
{
    testimonial_repo: Arc<T>,
    user_repo: Arc<U>,
    vessel_repo: Arc<V>,
    snapshots: Arc<TestimonialSnapshotUseCase<T, U, A, V>>,
    mailer: Arc<M>,
}

impl<T, U, A, V, M> CaptainSignoffUseCase<T, U, A, V, M>
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
    M: Mailer + 'static,
{
    pub fn new(
        testimonial_repo: Arc<T>,
        user_repo: Arc<U>,
        vessel_repo: Arc<V>,
        snapshots: Arc<TestimonialSnapshotUseCase<T, U, A, V>>,
        mailer: Arc<M>,
    ) -> Self {
        Self {
            testimonial_repo,
            user_repo,
            vessel_repo,
            snapshots,
            mailer,
        }
    }

    /// Read-only view for the sign-off page.
    pub async fn review(&self, token: &str, email: &str) -> SignoffResult<SignoffReviewDto> {
        let testimonial = self.load_pending(token, email).await?;

        let crew = self
            .user_repo
            .find_by_id(testimonial.user_id)
            .await
            .map_err(SignoffError::Internal)?;
        let vessel = self
            .vessel_repo
            .find_by_id(testimonial.vessel_id)
            .await
            .map_err(SignoffError::Internal)?;

        Ok(SignoffReviewDto {
            vessel_name: vessel.map(|vessel| vessel.name),
            start_date: testimonial.start_date,
            end_date: testimonial.end_date,
            total_days: testimonial.total_days,
            at_sea_days: testimonial.at_sea_days,
            standby_days: testimonial.standby_days,
            yard_days: testimonial.yard_days,
            leave_days: testimonial.leave_days,
            crew_name: crew.and_then(|user| user.display_name),
            captain_name: testimonial.captain_name,
            notes: testimonial.notes,
        })
    }

    /// Applies the captain's terminal decision. The token is single-use:
    /// the update re-matches it with an unset `signoff_used_at`, so a
    /// concurrent decision on the same link loses and surfaces as
    /// already-used.
    pub async fn decide(
        &self,
        token: &str,
        email: &str,
        decision: SignoffDecision,
        rejection_reason: Option<String>,
    ) -> SignoffResult<()> {
        let testimonial = self.load_pending(token, email).await?;
        let now = Utc::now();

        let update = match decision {
            SignoffDecision::Reject => SignoffDecisionUpdate {
                status: TestimonialStatus::Rejected,
                signoff_used_at: now,
                captain_name: testimonial.captain_name.clone(),
                captain_email: testimonial.captain_email.clone(),
                captain_position: testimonial.captain_position.clone(),
                captain_user_id: testimonial.captain_user_id,
                notes: append_rejection_reason(testimonial.notes.clone(), rejection_reason),
            },
            SignoffDecision::Approve => {
                // A captain with an account on the platform enriches the
                // testimonial; fields already set by the crew member win.
                let captain = self
                    .user_repo
                    .find_by_email(email)
                    .await
                    .map_err(SignoffError::Internal)?;

                SignoffDecisionUpdate {
                    status: TestimonialStatus::Approved,
                    signoff_used_at: now,
                    captain_name: testimonial
                        .captain_name
                        .clone()
                        .or_else(|| captain.as_ref().and_then(|user| user.display_name.clone())),
                    captain_email: testimonial
                        .captain_email
                        .clone()
                        .or_else(|| Some(email.to_string())),
                    captain_position: testimonial
                        .captain_position
                        .clone()
                        .or_else(|| captain.as_ref().and_then(|user| user.position.clone())),
                    captain_user_id: testimonial
                        .captain_user_id
                        .or(captain.as_ref().map(|user| user.id)),
                    notes: testimonial.notes.clone(),
                }
            }
        };

        let applied = self
            .testimonial_repo
            .apply_signoff_decision(token, update)
            .await
            .map_err(SignoffError::Internal)?;

        if !applied {
            warn!(
                testimonial_id = %testimonial.id,
                "signoff: decision lost the race, token already consumed"
            );
            return Err(SignoffError::AlreadyUsed);
        }

        info!(
            testimonial_id = %testimonial.id,
            decision = ?decision,
            "signoff: decision recorded"
        );

        if decision == SignoffDecision::Approve {
            // Snapshot creation is best-effort here: the approval already
            // stands, and the snapshot endpoint can re-derive it later.
            if let Err(err) = self.snapshots.create_snapshot(testimonial.id).await {
                warn!(
                    testimonial_id = %testimonial.id,
                    error = %err,
                    "signoff: snapshot creation failed after approval"
                );
            }
        }

        self.notify_crew(&testimonial, decision).await;

        Ok(())
    }

    /// Shared validation ladder. Ordering is deliberate: a link that is
    /// both expired and used reports expired.
    async fn load_pending(&self, token: &str, email: &str) -> SignoffResult<TestimonialEntity> {
        let testimonial = self
            .testimonial_repo
            .find_by_signoff(token, email)
            .await
            .map_err(SignoffError::Internal)?
            .ok_or(SignoffError::InvalidLink)?;

        if let Some(expires_at) = testimonial.signoff_token_expires_at {
            if expires_at < Utc::now() {
                return Err(SignoffError::Expired);
            }
        }

        if testimonial.signoff_used_at.is_some() {
            return Err(SignoffError::AlreadyUsed);
        }

        if TestimonialStatus::from_str(&testimonial.status)
            != Some(TestimonialStatus::PendingCaptain)
        {
            return Err(SignoffError::NotAwaitingSignoff);
        }

        Ok(testimonial)
    }

    async fn notify_crew(&self, testimonial: &TestimonialEntity, decision: SignoffDecision) {
        let crew = match self.user_repo.find_by_id(testimonial.user_id).await {
            Ok(Some(crew)) => crew,
            Ok(None) => return,
            Err(err) => {
                warn!(
                    testimonial_id = %testimonial.id,
                    error = %err,
                    "signoff: could not load crew member for notification"
                );
                return;
            }
        };

        let (subject, body) = match decision {
            SignoffDecision::Approve => (
                "Your sea service testimonial was approved",
                "The captain has signed off on your sea service testimonial.",
            ),
            SignoffDecision::Reject => (
                "Your sea service testimonial was rejected",
                "The captain has rejected your sea service testimonial. Check the notes for details.",
            ),
        };

        if let Err(err) = self.mailer.send(&crew.email, subject, body).await {
            warn!(
                testimonial_id = %testimonial.id,
                error = %err,
                "signoff: crew notification email failed"
            );
        }
    }
}

/// A rejection reason is appended to the crew member's notes, never
/// overwriting them.
fn append_rejection_reason(notes: Option<String>, reason: Option<String>) -> Option<String> {
    let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    match (notes, reason) {
        (Some(notes), Some(reason)) => Some(format!("{notes}\nRejection reason: {reason}")),
        (None, Some(reason)) => Some(format!("Rejection reason: {reason}")),
        (notes, None) => notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecases::testimonial_snapshots::RetryPolicy;
    use crate::domain::entities::approved_testimonials::ApprovedTestimonialEntity;
    use crate::domain::entities::users::UserEntity;
    use crate::domain::repositories::approved_testimonials::MockApprovedTestimonialRepository;
    use crate::domain::repositories::testimonials::MockTestimonialRepository;
    use crate::domain::repositories::users::MockUserRepository;
    use crate::domain::repositories::vessels::MockVesselRepository;
    use crate::notifications::mailer::MockMailer;
    use chrono::{Duration, NaiveDate};
    use std::time::Duration as StdDuration;
    use uuid::Uuid;

    const TOKEN: &str = "tok_7f3a";
    const CAPTAIN_EMAIL: &str = "captain@harbor.example";

    fn pending_testimonial() -> TestimonialEntity {
        TestimonialEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            vessel_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_days: 60,
            at_sea_days: 40,
            standby_days: 10,
            yard_days: 5,
            leave_days: 5,
            status: "pending_captain".to_string(),
            signoff_token: Some(TOKEN.to_string()),
            signoff_target_email: Some(CAPTAIN_EMAIL.to_string()),
            signoff_token_expires_at: Some(Utc::now() + Duration::days(7)),
            signoff_used_at: None,
            captain_name: None,
            captain_email: None,
            captain_position: None,
            captain_user_id: None,
            testimonial_code: None,
            notes: Some("Two Atlantic crossings.".to_string()),
            created_at: Utc::now(),
        }
    }

    fn captain_account() -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            display_name: Some("J. Holt".to_string()),
            email: CAPTAIN_EMAIL.to_string(),
            rank: None,
            position: Some("Master".to_string()),
            role: "captain".to_string(),
            stripe_customer_id: None,
            subscription_tier: None,
            subscription_status: "active".to_string(),
            pending_subscription_tier: None,
            pending_change_effective_at: None,
            active_vessel_id: None,
            created_at: Utc::now(),
        }
    }

    fn snapshot_row(testimonial_id: Uuid) -> ApprovedTestimonialEntity {
        ApprovedTestimonialEntity {
            id: Uuid::new_v4(),
            testimonial_id,
            crew_user_id: Uuid::new_v4(),
            crew_name: None,
            crew_rank: None,
            vessel_name: None,
            vessel_imo: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            total_days: 60,
            at_sea_days: 40,
            standby_days: 10,
            yard_days: 5,
            leave_days: 5,
            captain_name: None,
            captain_license: Some("Master".to_string()),
            testimonial_code: None,
            created_at: Utc::now(),
        }
    }

    fn snapshots(
        testimonial_repo: Arc<MockTestimonialRepository>,
        user_repo: Arc<MockUserRepository>,
        snapshot_repo: Arc<MockApprovedTestimonialRepository>,
        vessel_repo: Arc<MockVesselRepository>,
    ) -> Arc<
        TestimonialSnapshotUseCase<
            MockTestimonialRepository,
            MockUserRepository,
            MockApprovedTestimonialRepository,
            MockVesselRepository,
        >,
    > {
        Arc::new(TestimonialSnapshotUseCase::new(
            testimonial_repo,
            user_repo,
            snapshot_repo,
            vessel_repo,
            RetryPolicy {
                max_attempts: 1,
                base_delay: StdDuration::ZERO,
            },
        ))
    }

    fn silent_mailer() -> Arc<MockMailer> {
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_, _, _| Ok(()));
        Arc::new(mailer)
    }

    #[tokio::test]
    async fn review_returns_the_sea_service_facts() {
        let testimonial = pending_testimonial();
        let crew_id = testimonial.user_id;

        let mut testimonial_repo = MockTestimonialRepository::new();
        let row = testimonial.clone();
        testimonial_repo
            .expect_find_by_signoff()
            .withf(|token, email| token == TOKEN && email == CAPTAIN_EMAIL)
            .returning(move |_, _| Ok(Some(row.clone())));

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |id| {
            assert_eq!(id, crew_id);
            let mut crew = captain_account();
            crew.display_name = Some("A. Mate".to_string());
            Ok(Some(crew))
        });

        let mut vessel_repo = MockVesselRepository::new();
        vessel_repo.expect_find_by_id().returning(|id| {
            Ok(Some(crate::domain::entities::vessels::VesselEntity {
                id,
                name: "MV Petrel".to_string(),
                imo_number: Some("9876543".to_string()),
                manager_id: None,
                created_at: Utc::now(),
            }))
        });

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(user_repo);
        let vessel_repo = Arc::new(vessel_repo);
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(MockApprovedTestimonialRepository::new()),
                vessel_repo,
            ),
            silent_mailer(),
        );

        let review = usecase.review(TOKEN, CAPTAIN_EMAIL).await.unwrap();
        assert_eq!(review.vessel_name.as_deref(), Some("MV Petrel"));
        assert_eq!(review.crew_name.as_deref(), Some("A. Mate"));
        assert_eq!(review.total_days, 60);
    }

    #[tokio::test]
    async fn unknown_token_is_an_invalid_link() {
        let mut testimonial_repo = MockTestimonialRepository::new();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(|_, _| Ok(None));

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(MockUserRepository::new());
        let vessel_repo = Arc::new(MockVesselRepository::new());
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(MockApprovedTestimonialRepository::new()),
                vessel_repo,
            ),
            silent_mailer(),
        );

        let err = usecase.review(TOKEN, CAPTAIN_EMAIL).await.unwrap_err();
        assert!(matches!(err, SignoffError::InvalidLink));
    }

    #[tokio::test]
    async fn expired_link_reports_expired_even_when_already_used() {
        let mut testimonial = pending_testimonial();
        testimonial.signoff_token_expires_at = Some(Utc::now() - Duration::days(1));
        testimonial.signoff_used_at = Some(Utc::now() - Duration::days(2));

        let mut testimonial_repo = MockTestimonialRepository::new();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(move |_, _| Ok(Some(testimonial.clone())));

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(MockUserRepository::new());
        let vessel_repo = Arc::new(MockVesselRepository::new());
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(MockApprovedTestimonialRepository::new()),
                vessel_repo,
            ),
            silent_mailer(),
        );

        let err = usecase
            .decide(TOKEN, CAPTAIN_EMAIL, SignoffDecision::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SignoffError::Expired));
    }

    #[tokio::test]
    async fn used_token_conflicts_without_touching_the_row() {
        let mut testimonial = pending_testimonial();
        testimonial.signoff_used_at = Some(Utc::now() - Duration::hours(1));

        let mut testimonial_repo = MockTestimonialRepository::new();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(move |_, _| Ok(Some(testimonial.clone())));
        testimonial_repo.expect_apply_signoff_decision().never();

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(MockUserRepository::new());
        let vessel_repo = Arc::new(MockVesselRepository::new());
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(MockApprovedTestimonialRepository::new()),
                vessel_repo,
            ),
            silent_mailer(),
        );

        let err = usecase
            .decide(TOKEN, CAPTAIN_EMAIL, SignoffDecision::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SignoffError::AlreadyUsed));
    }

    #[tokio::test]
    async fn approval_backfills_only_unset_captain_fields() {
        let mut testimonial = pending_testimonial();
        testimonial.captain_name = Some("Capt. Reyes".to_string());
        let testimonial_id = testimonial.id;
        let captain = captain_account();
        let captain_id = captain.id;

        let mut testimonial_repo = MockTestimonialRepository::new();
        let row = testimonial.clone();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(move |_, _| Ok(Some(row.clone())));
        let approved_row = {
            let mut row = testimonial.clone();
            row.status = "approved".to_string();
            row.testimonial_code = Some("HT-0099".to_string());
            row
        };
        testimonial_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(approved_row.clone())));
        testimonial_repo
            .expect_apply_signoff_decision()
            .withf(move |token, update| {
                token == TOKEN
                    && update.status == TestimonialStatus::Approved
                    // name set by the crew member is kept, the rest comes
                    // from the captain's account
                    && update.captain_name.as_deref() == Some("Capt. Reyes")
                    && update.captain_email.as_deref() == Some(CAPTAIN_EMAIL)
                    && update.captain_position.as_deref() == Some("Master")
                    && update.captain_user_id == Some(captain_id)
            })
            .returning(|_, _| Ok(true));

        let mut user_repo = MockUserRepository::new();
        let account = captain.clone();
        user_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(account.clone())));
        user_repo
            .expect_find_by_id()
            .returning(|_| Ok(None));

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(|_| Ok(None));
        snapshot_repo
            .expect_create_if_absent()
            .times(1)
            .returning(move |_| Ok(snapshot_row(testimonial_id)));

        let mut vessel_repo = MockVesselRepository::new();
        vessel_repo.expect_find_by_id().returning(|_| Ok(None));

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(user_repo);
        let vessel_repo = Arc::new(vessel_repo);
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(snapshot_repo),
                vessel_repo,
            ),
            silent_mailer(),
        );

        usecase
            .decide(TOKEN, CAPTAIN_EMAIL, SignoffDecision::Approve, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejection_appends_the_reason_to_existing_notes() {
        let testimonial = pending_testimonial();

        let mut testimonial_repo = MockTestimonialRepository::new();
        let row = testimonial.clone();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(move |_, _| Ok(Some(row.clone())));
        testimonial_repo
            .expect_apply_signoff_decision()
            .withf(|_, update| {
                update.status == TestimonialStatus::Rejected
                    && update.notes.as_deref()
                        == Some("Two Atlantic crossings.\nRejection reason: Dates are wrong")
            })
            .returning(|_, _| Ok(true));

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(|_| Ok(None));

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(user_repo);
        let vessel_repo = Arc::new(MockVesselRepository::new());
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(MockApprovedTestimonialRepository::new()),
                vessel_repo,
            ),
            silent_mailer(),
        );

        usecase
            .decide(
                TOKEN,
                CAPTAIN_EMAIL,
                SignoffDecision::Reject,
                Some("Dates are wrong".to_string()),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn losing_the_guarded_update_surfaces_already_used() {
        let testimonial = pending_testimonial();

        let mut testimonial_repo = MockTestimonialRepository::new();
        let row = testimonial.clone();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(move |_, _| Ok(Some(row.clone())));
        testimonial_repo
            .expect_apply_signoff_decision()
            .returning(|_, _| Ok(false));

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(|_| Ok(None));

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo.expect_find_by_testimonial_id().never();
        snapshot_repo.expect_create_if_absent().never();

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(user_repo);
        let vessel_repo = Arc::new(MockVesselRepository::new());
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(snapshot_repo),
                vessel_repo,
            ),
            silent_mailer(),
        );

        let err = usecase
            .decide(TOKEN, CAPTAIN_EMAIL, SignoffDecision::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SignoffError::AlreadyUsed));
    }

    #[tokio::test]
    async fn snapshot_failure_does_not_fail_the_approval() {
        let testimonial = pending_testimonial();

        let mut testimonial_repo = MockTestimonialRepository::new();
        let row = testimonial.clone();
        testimonial_repo
            .expect_find_by_signoff()
            .returning(move |_, _| Ok(Some(row.clone())));
        testimonial_repo
            .expect_apply_signoff_decision()
            .returning(|_, _| Ok(true));
        // the snapshot poll sees the testimonial gone
        testimonial_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(|_| Ok(None));
        user_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut snapshot_repo = MockApprovedTestimonialRepository::new();
        snapshot_repo
            .expect_find_by_testimonial_id()
            .returning(|_| Ok(None));

        let testimonial_repo = Arc::new(testimonial_repo);
        let user_repo = Arc::new(user_repo);
        let vessel_repo = Arc::new(MockVesselRepository::new());
        let usecase = CaptainSignoffUseCase::new(
            Arc::clone(&testimonial_repo),
            Arc::clone(&user_repo),
            Arc::clone(&vessel_repo),
            snapshots(
                testimonial_repo,
                user_repo,
                Arc::new(snapshot_repo),
                vessel_repo,
            ),
            silent_mailer(),
        );

        usecase
            .decide(TOKEN, CAPTAIN_EMAIL, SignoffDecision::Approve, None)
            .await
            .unwrap();
    }
}
