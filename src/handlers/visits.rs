use super::common::{map_service_error, required_id, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::{
        patients::PatientNameQuery,
        visits::{CleanupResult, SaveVisitCommand, SaveVisitResult, VisitView},
    },
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CleanupDuplicatesRequest {
    #[serde(default, alias = "visitId")]
    pub visit_id: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/save-visit",
    request_body = SaveVisitCommand,
    responses(
        (status = 200, description = "Visit saved with its line items", body = SaveVisitResult,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Patient, doctor or visit not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Insufficient stock or missing catalog entry", body = crate::errors::ErrorResponse)
    ),
    tag = "visits"
)]
pub async fn save_visit(
    State(state): State<AppState>,
    Json(payload): Json<SaveVisitCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let saved = state
        .services
        .visits
        .save_visit(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(saved))
}

#[utoipa::path(
    post,
    path = "/cleanup-duplicates",
    request_body = CleanupDuplicatesRequest,
    responses(
        (status = 200, description = "Duplicate line items removed", body = CleanupResult),
        (status = 400, description = "visit_id missing", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Visit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "visits"
)]
pub async fn cleanup_duplicates(
    State(state): State<AppState>,
    Json(payload): Json<CleanupDuplicatesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let visit_id = required_id(payload.visit_id, "visit_id")?;
    let cleaned = state
        .services
        .visits
        .cleanup_duplicates(visit_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cleaned))
}

#[utoipa::path(
    get,
    path = "/get-visit-info",
    params(PatientNameQuery),
    responses(
        (status = 200, description = "Visits of the patient, newest first", body = [VisitView]),
        (status = 400, description = "Name not supplied", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such patient", body = crate::errors::ErrorResponse)
    ),
    tag = "visits"
)]
pub async fn get_visit_info(
    State(state): State<AppState>,
    Query(query): Query<PatientNameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let visits = state
        .services
        .visits
        .visit_history(&query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(visits))
}

pub fn visit_routes() -> Router<AppState> {
    Router::new()
        .route("/save-visit", post(save_visit))
        .route("/cleanup-duplicates", post(cleanup_duplicates))
        .route("/get-visit-info", get(get_visit_info))
}
