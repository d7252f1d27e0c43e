use super::common::{
    created_response, map_service_error, required_id, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::contractors::{ContractorCommand, ContractorIdQuery, ContractorSearchQuery},
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tracing::info;

async fn list_contractors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let contractors = state
        .services
        .contractors
        .list_contractors()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(contractors))
}

async fn search_contractors(
    State(state): State<AppState>,
    Query(query): Query<ContractorSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let matches = state
        .services
        .contractors
        .search_contractors(&query)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(matches))
}

async fn get_contractor_details(
    State(state): State<AppState>,
    Query(query): Query<ContractorIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = required_id(query.id, "id")?;
    let details = state
        .services
        .contractors
        .contractor_details(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(details))
}

async fn add_contractor(
    State(state): State<AppState>,
    Json(payload): Json<ContractorCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let saved = state
        .services
        .contractors
        .add_contractor(payload)
        .await
        .map_err(map_service_error)?;

    info!(contractor_id = saved.contractor_id, "Contractor created");
    Ok(created_response(saved))
}

async fn update_contractor(
    State(state): State<AppState>,
    Json(payload): Json<ContractorCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let saved = state
        .services
        .contractors
        .update_contractor(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(saved))
}

pub fn contractor_routes() -> Router<AppState> {
    Router::new()
        .route("/get-contractors", get(list_contractors))
        .route("/search-contractors", get(search_contractors))
        .route("/get-contractor-details", get(get_contractor_details))
        .route("/add-contractor", post(add_contractor))
        .route("/update-contractor", put(update_contractor))
}
