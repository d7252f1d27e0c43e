use super::common::{map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::supplier_orders::{
        ApplyStockCommand, ApplyStockResult, OrderIdQuery, ReceiptDetails,
        SaveSupplierOrderCommand, SaveSupplierOrderResult,
    },
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

#[utoipa::path(
    post,
    path = "/save-supplier-order",
    request_body = SaveSupplierOrderCommand,
    responses(
        (status = 200, description = "Order saved; stock credited on first delivery", body = SaveSupplierOrderResult,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request or status transition", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "supplier-orders"
)]
pub async fn save_supplier_order(
    State(state): State<AppState>,
    Json(payload): Json<SaveSupplierOrderCommand>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let saved = state
        .services
        .supplier_orders
        .save_order(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(saved))
}

#[utoipa::path(
    post,
    path = "/update-stock-manually",
    request_body = ApplyStockCommand,
    responses(
        (status = 200, description = "Credit applied, or skipped when already applied", body = ApplyStockResult),
        (status = 400, description = "Order is not delivered", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "supplier-orders"
)]
pub async fn update_stock_manually(
    State(state): State<AppState>,
    Json(payload): Json<ApplyStockCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .services
        .supplier_orders
        .apply_delivered_stock(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(outcome))
}

async fn list_receipts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let receipts = state
        .services
        .supplier_orders
        .list_receipts()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(receipts))
}

#[utoipa::path(
    get,
    path = "/get-receipt-details",
    params(OrderIdQuery),
    responses(
        (status = 200, description = "Order header, supplier and items", body = ReceiptDetails),
        (status = 400, description = "receipt_id missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "supplier-orders"
)]
pub async fn get_receipt_details(
    State(state): State<AppState>,
    Query(query): Query<OrderIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = query.required().map_err(map_service_error)?;
    let details = state
        .services
        .supplier_orders
        .receipt_details(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(details))
}

async fn get_receipt_for_order(
    State(state): State<AppState>,
    Query(query): Query<OrderIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = query.required().map_err(map_service_error)?;
    let form = state
        .services
        .supplier_orders
        .receipt_for_order(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(form))
}

async fn get_order_details(
    State(state): State<AppState>,
    Query(query): Query<OrderIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = query.required().map_err(map_service_error)?;
    let details = state
        .services
        .supplier_orders
        .order_details(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(details))
}

pub fn supplier_order_routes() -> Router<AppState> {
    Router::new()
        .route("/save-supplier-order", post(save_supplier_order))
        .route("/save-supplier-order-fixed", post(save_supplier_order))
        .route("/update-stock-manually", post(update_stock_manually))
        .route("/get-warehouse-receipts", get(list_receipts))
        .route("/get-receipt-details", get(get_receipt_details))
        .route("/get-receipt-for-order", get(get_receipt_for_order))
        .route("/get-order-details", get(get_order_details))
}
