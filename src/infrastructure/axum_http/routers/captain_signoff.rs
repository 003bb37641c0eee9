use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    application::usecases::{
        captain_signoff::{CaptainSignoffUseCase, SignoffError},
        testimonial_snapshots::{RetryPolicy, TestimonialSnapshotUseCase},
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            approved_testimonials::ApprovedTestimonialRepository,
            testimonials::TestimonialRepository, users::UserRepository,
            vessels::VesselRepository,
        },
        value_objects::signoff::SignoffDecision,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{
            approved_testimonials::ApprovedTestimonialPostgres, testimonials::TestimonialPostgres,
            users::UserPostgres, vessels::VesselPostgres,
        },
    },
    notifications::mailer::{HttpMailer, Mailer, NoopMailer},
};

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    token: String,
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    token: String,
    email: String,
    decision: String,
    rejection_reason: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let testimonial_repository = Arc::new(TestimonialPostgres::new(Arc::clone(&db_pool)));
    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let snapshot_repository = Arc::new(ApprovedTestimonialPostgres::new(Arc::clone(&db_pool)));
    let vessel_repository = Arc::new(VesselPostgres::new(Arc::clone(&db_pool)));

    let snapshots = Arc::new(TestimonialSnapshotUseCase::new(
        Arc::clone(&testimonial_repository),
        Arc::clone(&user_repository),
        snapshot_repository,
        Arc::clone(&vessel_repository),
        RetryPolicy::default(),
    ));

    match &config.mailer {
        Some(mailer_config) => {
            let usecase = CaptainSignoffUseCase::new(
                testimonial_repository,
                user_repository,
                vessel_repository,
                snapshots,
                Arc::new(HttpMailer::new(mailer_config.clone())),
            );
            signoff_router(Arc::new(usecase))
        }
        None => {
            let usecase = CaptainSignoffUseCase::new(
                testimonial_repository,
                user_repository,
                vessel_repository,
                snapshots,
                Arc::new(NoopMailer),
            );
            signoff_router(Arc::new(usecase))
        }
    }
}

fn signoff_router<T, U, A, V, M>(usecase: Arc<CaptainSignoffUseCase<T, U, A, V, M>>) -> Router
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route("/", get(review).post(decide))
        .with_state(usecase)
}

pub async fn review<T, U, A, V, M>(
    State(usecase): State<Arc<CaptainSignoffUseCase<T, U, A, V, M>>>,
    Query(query): Query<ReviewQuery>,
) -> impl IntoResponse
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
    M: Mailer + 'static,
{
    info!("signoff: review request received");

    match usecase.review(&query.token, &query.email).await {
        Ok(testimonial) => (
            StatusCode::OK,
            Json(json!({ "success": true, "testimonial": testimonial })),
        )
            .into_response(),
        Err(err) => signoff_error_response(err),
    }
}

pub async fn decide<T, U, A, V, M>(
    State(usecase): State<Arc<CaptainSignoffUseCase<T, U, A, V, M>>>,
    Json(request): Json<DecisionRequest>,
) -> impl IntoResponse
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
    M: Mailer + 'static,
{
    info!(decision = %request.decision, "signoff: decision request received");

    let Some(decision) = SignoffDecision::from_str(&request.decision) else {
        return signoff_error_response(SignoffError::InvalidDecision(request.decision));
    };

    match usecase
        .decide(
            &request.token,
            &request.email,
            decision,
            request.rejection_reason,
        )
        .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(err) => signoff_error_response(err),
    }
}

fn signoff_error_response(err: SignoffError) -> axum::response::Response {
    (err.status_code(), Json(json!({ "error": err.to_string() }))).into_response()
}
