use super::common::{created_response, map_service_error};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::payments::{PaymentResult, RecordPaymentCommand},
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};

#[utoipa::path(
    post,
    path = "/process-payment",
    request_body = RecordPaymentCommand,
    responses(
        (status = 201, description = "Receipt issued and visit marked paid", body = PaymentResult,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Visit not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn process_payment(
    State(state): State<AppState>,
    Json(payload): Json<RecordPaymentCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .services
        .payments
        .record_payment(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(payment))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/process-payment", post(process_payment))
}
