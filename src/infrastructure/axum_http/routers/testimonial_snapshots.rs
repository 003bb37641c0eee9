use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    application::usecases::testimonial_snapshots::{RetryPolicy, TestimonialSnapshotUseCase},
    domain::repositories::{
        approved_testimonials::ApprovedTestimonialRepository, testimonials::TestimonialRepository,
        users::UserRepository, vessels::VesselRepository,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{
            approved_testimonials::ApprovedTestimonialPostgres, testimonials::TestimonialPostgres,
            users::UserPostgres, vessels::VesselPostgres,
        },
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotRequest {
    testimonial_id: Uuid,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let usecase = TestimonialSnapshotUseCase::new(
        Arc::new(TestimonialPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ApprovedTestimonialPostgres::new(Arc::clone(&db_pool))),
        Arc::new(VesselPostgres::new(Arc::clone(&db_pool))),
        RetryPolicy::default(),
    );

    Router::new()
        .route("/create-snapshot", post(create_snapshot))
        .with_state(Arc::new(usecase))
}

pub async fn create_snapshot<T, U, A, V>(
    State(usecase): State<Arc<TestimonialSnapshotUseCase<T, U, A, V>>>,
    Json(request): Json<CreateSnapshotRequest>,
) -> impl IntoResponse
where
    T: TestimonialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: ApprovedTestimonialRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    info!(
        testimonial_id = %request.testimonial_id,
        "snapshots: create request received"
    );

    match usecase.create_snapshot(request.testimonial_id).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "snapshot": {
                    "id": snapshot.id,
                    "testimonialId": snapshot.testimonial_id,
                    "crewName": snapshot.crew_name,
                    "crewRank": snapshot.crew_rank,
                    "vesselName": snapshot.vessel_name,
                    "vesselImo": snapshot.vessel_imo,
                    "startDate": snapshot.start_date,
                    "endDate": snapshot.end_date,
                    "totalDays": snapshot.total_days,
                    "atSeaDays": snapshot.at_sea_days,
                    "standbyDays": snapshot.standby_days,
                    "yardDays": snapshot.yard_days,
                    "leaveDays": snapshot.leave_days,
                    "captainName": snapshot.captain_name,
                    "captainLicense": snapshot.captain_license,
                    "testimonialCode": snapshot.testimonial_code,
                },
            })),
        )
            .into_response(),
        Err(err) => (err.status_code(), Json(json!({ "error": err.to_string() }))).into_response(),
    }
}
