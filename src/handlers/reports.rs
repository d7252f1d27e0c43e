use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState, services::reports::ActQuery};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;

async fn revenue_last_3_months(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();
    let revenue = state
        .services
        .reports
        .revenue_last_3_months(today)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(revenue))
}

async fn visits_by_employees(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .reports
        .visits_by_employees()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

/// Completed-work acts: one by `id`, or the most recent ones
async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<ActQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let acts = state
        .services
        .reports
        .completed_work_acts(&query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(acts))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/get-revenue-last-3-months", get(revenue_last_3_months))
        .route("/get-visits-by-employees", get(visits_by_employees))
        .route("/get-data", get(get_data))
}
