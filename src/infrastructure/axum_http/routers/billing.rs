use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    application::usecases::plan_change::{BillingGateway, PlanChangeError, PlanChangeUseCase},
    config::config_model::DotEnvyConfig,
    domain::repositories::users::UserRepository,
    domain::value_objects::billing::PlanChangeOutcome,
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::users::UserPostgres,
    },
    payments::stripe_client::StripeClient,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    #[serde(default)]
    subscription_id: String,
    #[serde(default)]
    price_id: String,
    user_id: Option<Uuid>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::new(config.stripe.secret_key.clone());
    let usecase = PlanChangeUseCase::new(
        Arc::new(user_repository),
        Arc::new(stripe_client),
        config.stripe.clone(),
    );

    Router::new()
        .route("/change-plan", post(change_plan))
        .with_state(Arc::new(usecase))
}

pub async fn change_plan<U, B>(
    State(usecase): State<Arc<PlanChangeUseCase<U, B>>>,
    Json(request): Json<ChangePlanRequest>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    B: BillingGateway + Send + Sync + 'static,
{
    info!(
        subscription_id = %request.subscription_id,
        "billing: change-plan request received"
    );

    let outcome = match usecase
        .change_plan(&request.subscription_id, &request.price_id, request.user_id)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => return plan_change_error_response(err),
    };

    let body = match &outcome {
        PlanChangeOutcome::NoChange => json!({
            "success": true,
            "mode": outcome.mode(),
        }),
        PlanChangeOutcome::DowngradeScheduled {
            pending_tier,
            effective_at,
        } => json!({
            "success": true,
            "mode": outcome.mode(),
            "pendingTier": pending_tier,
            "effectiveAt": effective_at,
        }),
        PlanChangeOutcome::UpgradeApplied {
            subscription_status,
            latest_invoice,
            payment_intent,
        } => json!({
            "success": true,
            "mode": outcome.mode(),
            "subscriptionStatus": subscription_status,
            "latestInvoice": latest_invoice,
            "paymentIntent": payment_intent,
        }),
    };

    (StatusCode::OK, Json(body)).into_response()
}

fn plan_change_error_response(err: PlanChangeError) -> axum::response::Response {
    let status = err.status_code();

    // The cross-family refusal carries both product ids so the client
    // can show which plans were involved.
    let body = match &err {
        PlanChangeError::CrossFamilySwitch {
            current_product_id,
            new_product_id,
        } => json!({
            "error": err.to_string(),
            "currentProductId": current_product_id,
            "newProductId": new_product_id,
        }),
        _ => json!({ "error": err.to_string() }),
    };

    (status, Json(body)).into_response()
}
