use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::patients::{
        CreatePatientCommand, CreatePatientResult, PatientNameQuery, PatientRecord,
        UpdatePatientCommand,
    },
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use tracing::info;

/// List every patient with visit count, last visit and billed total
async fn list_patients(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let patients = state
        .services
        .patients
        .list_patients()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(patients))
}

#[utoipa::path(
    get,
    path = "/get-patient-full",
    params(PatientNameQuery),
    responses(
        (status = 200, description = "Full patient record", body = PatientRecord),
        (status = 400, description = "Name not supplied", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such patient", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn get_patient_full(
    State(state): State<AppState>,
    Query(query): Query<PatientNameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .services
        .patients
        .get_patient_full(&query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(record))
}

async fn get_patient_id(
    State(state): State<AppState>,
    Query(query): Query<PatientNameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let patient_id = state
        .services
        .patients
        .find_patient_id(&query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "patientId": patient_id })))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = CreatePatientCommand,
    responses(
        (status = 201, description = "Patient registered", body = CreatePatientResult),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(state): State<AppState>,
    Json(payload): Json<CreatePatientCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .patients
        .create_patient(payload)
        .await
        .map_err(map_service_error)?;

    info!(patient_id = created.patient_id, "Patient created");
    Ok(created_response(created))
}

async fn update_patient(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePatientCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let patient_id = state
        .services
        .patients
        .update_patient(payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "patientId": patient_id,
        "message": "Patient updated successfully"
    })))
}

pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_patient))
        .route("/get-patients", get(list_patients))
        .route("/get-patient-full", get(get_patient_full))
        .route("/get-patient-id", get(get_patient_id))
        .route("/update-patient", put(update_patient))
}
