use super::common::{map_service_error, success_response};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::warehouse::{UpdateQuantityCommand, WarehouseItemView},
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};

async fn list_dental_services(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let services = state
        .services
        .warehouse
        .list_dental_services()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(services))
}

/// Products with stock on hand, for the visit form
async fn list_warehouse_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .warehouse
        .list_available_products()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

async fn list_warehouse_items(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .warehouse
        .list_items()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

#[utoipa::path(
    put,
    path = "/update-warehouse-quantity",
    request_body = UpdateQuantityCommand,
    responses(
        (status = 200, description = "Quantity overwritten", body = WarehouseItemView),
        (status = 400, description = "Missing or negative quantity", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouse"
)]
pub async fn update_warehouse_quantity(
    State(state): State<AppState>,
    Json(payload): Json<UpdateQuantityCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .warehouse
        .update_quantity(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

pub fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/get-dental-services", get(list_dental_services))
        .route("/get-warehouse-products", get(list_warehouse_products))
        .route("/get-warehouse-items", get(list_warehouse_items))
        .route("/update-warehouse-quantity", put(update_warehouse_quantity))
}
