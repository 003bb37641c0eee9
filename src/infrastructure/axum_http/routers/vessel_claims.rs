use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    application::usecases::vessel_claims::{ClaimError, VesselClaimUseCase},
    domain::{
        repositories::{
            users::UserRepository, vessel_claims::VesselClaimRepository,
            vessels::VesselRepository,
        },
        value_objects::enums::approval_types::ApprovalType,
        value_objects::vessel_claims::ClaimApprovalDto,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{
            users::UserPostgres, vessel_claims::VesselClaimPostgres, vessels::VesselPostgres,
        },
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveClaimRequest {
    request_id: Uuid,
    reviewed_by: Uuid,
    approval_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectClaimRequest {
    request_id: Uuid,
    reviewed_by: Uuid,
    review_notes: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let usecase = VesselClaimUseCase::new(
        Arc::new(VesselClaimPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        Arc::new(VesselPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/approve", post(approve_claim))
        .route("/reject", post(reject_claim))
        .with_state(Arc::new(usecase))
}

pub async fn approve_claim<C, U, V>(
    State(usecase): State<Arc<VesselClaimUseCase<C, U, V>>>,
    Json(request): Json<ApproveClaimRequest>,
) -> impl IntoResponse
where
    C: VesselClaimRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    info!(
        request_id = %request.request_id,
        approval_type = %request.approval_type,
        "vessel_claims: approve request received"
    );

    let Some(approval_type) = ApprovalType::from_str(&request.approval_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("invalid approval type: {}", request.approval_type),
            })),
        )
            .into_response();
    };

    match usecase
        .approve(request.request_id, request.reviewed_by, approval_type)
        .await
    {
        Ok(dto) => claim_response(dto),
        Err(err) => claim_error_response(err),
    }
}

pub async fn reject_claim<C, U, V>(
    State(usecase): State<Arc<VesselClaimUseCase<C, U, V>>>,
    Json(request): Json<RejectClaimRequest>,
) -> impl IntoResponse
where
    C: VesselClaimRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: VesselRepository + Send + Sync + 'static,
{
    info!(
        request_id = %request.request_id,
        "vessel_claims: reject request received"
    );

    match usecase
        .reject(request.request_id, request.reviewed_by, request.review_notes)
        .await
    {
        Ok(dto) => claim_response(dto),
        Err(err) => claim_error_response(err),
    }
}

fn claim_response(dto: ClaimApprovalDto) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "status": dto.status.to_string(),
            "fullyApproved": dto.fully_approved,
        })),
    )
        .into_response()
}

fn claim_error_response(err: ClaimError) -> axum::response::Response {
    (err.status_code(), Json(json!({ "error": err.to_string() }))).into_response()
}
