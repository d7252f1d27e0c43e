pub mod common;
pub mod contractors;
pub mod employees;
pub mod health;
pub mod patients;
pub mod payments;
pub mod reports;
pub mod supplier_orders;
pub mod visits;
pub mod warehouse;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        contractors::ContractorService, employees::EmployeeService, patients::PatientService,
        payments::PaymentService, reports::ReportService, supplier_orders::SupplierOrderService,
        visits::VisitService, warehouse::WarehouseService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub patients: Arc<PatientService>,
    pub employees: Arc<EmployeeService>,
    pub visits: Arc<VisitService>,
    pub payments: Arc<PaymentService>,
    pub warehouse: Arc<WarehouseService>,
    pub supplier_orders: Arc<SupplierOrderService>,
    pub contractors: Arc<ContractorService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            patients: Arc::new(PatientService::new(db_pool.clone())),
            employees: Arc::new(EmployeeService::new(db_pool.clone())),
            visits: Arc::new(VisitService::new(db_pool.clone())),
            payments: Arc::new(PaymentService::new(db_pool.clone())),
            warehouse: Arc::new(WarehouseService::new(db_pool.clone())),
            supplier_orders: Arc::new(SupplierOrderService::new(db_pool.clone())),
            contractors: Arc::new(ContractorService::new(
                db_pool.clone(),
                config.search_page_size,
            )),
            reports: Arc::new(ReportService::new(db_pool)),
        }
    }
}
