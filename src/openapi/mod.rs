use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dental Clinic API",
        version = "0.3.0",
        description = r#"
# Dental Clinic API

Back office of a dental clinic: patient records, visits with their service
and product lines, payments, the warehouse and supplier orders.

## Authentication

When the server is started with an API key, every request must carry it as
the `api_key` query parameter or as a top-level `api_key` field of the JSON
body. `/health` is always open.

## Error Handling

Errors share one body:

```json
{
  "error": "Bad Request",
  "message": "Validation error: services must contain at least one entry",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Server errors answer `"message": "Server error"` and carry the cause in `details`.
        "#
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development")
    ),
    tags(
        (name = "patients", description = "Patient registration and lookup"),
        (name = "visits", description = "Visits and their line items"),
        (name = "payments", description = "Visit payments and receipts"),
        (name = "warehouse", description = "Stock on hand"),
        (name = "supplier-orders", description = "Supplier orders and delivery credit"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::patients::create_patient,
        crate::handlers::patients::get_patient_full,
        crate::handlers::visits::save_visit,
        crate::handlers::visits::cleanup_duplicates,
        crate::handlers::visits::get_visit_info,
        crate::handlers::payments::process_payment,
        crate::handlers::warehouse::update_warehouse_quantity,
        crate::handlers::supplier_orders::save_supplier_order,
        crate::handlers::supplier_orders::update_stock_manually,
        crate::handlers::supplier_orders::get_receipt_details,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::models::VisitStatus,
            crate::models::VisitType,
            crate::models::SupplierOrderStatus,
            crate::models::StockStatus,
            crate::services::patients::CreatePatientCommand,
            crate::services::patients::CreatePatientResult,
            crate::services::patients::PatientRecord,
            crate::services::visits::SaveVisitCommand,
            crate::services::visits::SaveVisitResult,
            crate::services::visits::CleanupResult,
            crate::services::visits::VisitView,
            crate::services::payments::RecordPaymentCommand,
            crate::services::payments::PaymentResult,
            crate::services::warehouse::UpdateQuantityCommand,
            crate::services::warehouse::WarehouseItemView,
            crate::services::supplier_orders::SaveSupplierOrderCommand,
            crate::services::supplier_orders::SaveSupplierOrderResult,
            crate::services::supplier_orders::ApplyStockCommand,
            crate::services::supplier_orders::ApplyStockResult,
            crate::services::supplier_orders::ReceiptDetails,
            crate::handlers::visits::CleanupDuplicatesRequest,
            crate::handlers::health::HealthResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
