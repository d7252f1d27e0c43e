//! Database entities for the clinic schema.

pub mod completed_work_act;
pub mod contact_person;
pub mod contractor;
pub mod dental_service;
pub mod employee;
pub mod order_item;
pub mod patient;
pub mod patient_contract;
pub mod patient_document;
pub mod payment_receipt;
pub mod payment_visit;
pub mod supplier_order;
pub mod visit;
pub mod visit_product;
pub mod visit_service;
pub mod warehouse_unit;
pub mod work_schedule;

/// Joins name parts the way the front desk prints them.
pub fn full_name(last_name: &str, first_name: &str, patronymic: Option<&str>) -> String {
    match patronymic.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => format!("{} {} {}", last_name, first_name, p),
        None => format!("{} {}", last_name, first_name),
    }
}
