use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, handlers::AppState, services::employees::AddEmployeeCommand};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

async fn list_employees(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let employees = state
        .services
        .employees
        .list_employees()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(employees))
}

async fn list_doctors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doctors = state
        .services
        .employees
        .list_doctors()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(doctors))
}

async fn add_employee(
    State(state): State<AppState>,
    Json(payload): Json<AddEmployeeCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .employees
        .add_employee(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created))
}

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/add-employee", post(add_employee))
        .route("/get-employees", get(list_employees))
        .route("/get-doctors", get(list_doctors))
}
