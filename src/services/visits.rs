//! Visit ledger: saving a visit with its service and product line items.
//!
//! Line items are never diffed. Every save deletes the stored rows for the
//! visit and inserts the submitted set, inside one transaction together with
//! the header change and the warehouse adjustments for consumed products.

use crate::{
    db::{DbPool, Transaction},
    entities::{
        dental_service, employee, payment_receipt, visit, visit_product, visit_service,
        warehouse_unit,
    },
    errors::ServiceError,
    models::{StockStatus, VisitStatus, VisitType},
    services::{
        check_amount, extended_amount, format_date, format_time, parse_date,
        parse_optional_time, sum_amounts,
        patients::{find_patient_by_name, PatientNameQuery},
    },
};
use chrono::{NaiveDate, NaiveTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

const HUNDRED: Decimal = dec!(100);

/// Service line as submitted by the visit form
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitServiceLine {
    #[serde(alias = "service_id", alias = "id")]
    pub service_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    /// Line discount, percent
    #[serde(default)]
    pub discount: Decimal,
    /// Client-computed line total; recomputed from the catalog price when absent
    #[serde(default)]
    pub total: Option<Decimal>,
}

/// Warehouse product consumed during the visit
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitProductLine {
    #[serde(alias = "product_id", alias = "id")]
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveVisitCommand {
    /// Present when editing an existing visit
    #[serde(default, alias = "visit_id")]
    pub visit_id: Option<i32>,
    #[serde(default, alias = "patient_id")]
    pub patient_id: Option<i32>,
    #[serde(default, alias = "doctor_id", alias = "employeeId", alias = "employee_id")]
    pub doctor_id: Option<i32>,
    /// `YYYY-MM-DD`
    #[serde(default, alias = "visitDate", alias = "visit_date")]
    pub date: Option<String>,
    #[serde(default, alias = "start_time")]
    pub start_time: Option<String>,
    #[serde(default, alias = "end_time")]
    pub end_time: Option<String>,
    /// Visit-level discount, percent
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    #[validate]
    pub services: Vec<VisitServiceLine>,
    #[serde(default)]
    #[validate]
    pub products: Vec<VisitProductLine>,
    #[serde(default, alias = "final_amount")]
    pub final_amount: Option<Decimal>,
    #[serde(default)]
    pub status: Option<VisitStatus>,
    #[serde(default, alias = "visit_type")]
    pub visit_type: Option<VisitType>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveVisitResult {
    pub visit_id: i32,
    pub services_count: usize,
    pub products_count: usize,
    pub final_amount: Decimal,
    /// False when an existing visit was replaced
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub visit_id: i32,
    pub removed_services: u64,
    pub removed_products: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitServiceView {
    pub service_id: i32,
    pub name: String,
    pub quantity: i32,
    pub discount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitProductView {
    pub product_id: i32,
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub receipt_id: i32,
    pub receipt_number: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitView {
    pub visit_id: i32,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub doctor_id: i32,
    pub doctor_name: String,
    pub status: VisitStatus,
    pub status_label: String,
    pub visit_type: VisitType,
    pub visit_type_label: String,
    pub discount: Decimal,
    pub final_amount: Decimal,
    pub services: Vec<VisitServiceView>,
    pub products: Vec<VisitProductView>,
    pub payment: Option<PaymentView>,
}

/// Validated visit header, ready to persist
#[derive(Debug, Clone)]
struct VisitInput {
    visit_id: Option<i32>,
    patient_id: i32,
    doctor_id: i32,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    discount: Decimal,
    services: Vec<VisitServiceLine>,
    products: Vec<VisitProductLine>,
    final_amount: Option<Decimal>,
    status: Option<VisitStatus>,
    visit_type: Option<VisitType>,
}

fn check_percent(value: Decimal, field: &str) -> Result<(), ServiceError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(ServiceError::ValidationError(format!(
            "{} must be between 0 and 100, got {}",
            field, value
        )));
    }
    Ok(())
}

impl SaveVisitCommand {
    fn into_input(self) -> Result<VisitInput, ServiceError> {
        self.validate()?;

        let patient_id = self
            .patient_id
            .ok_or_else(|| ServiceError::ValidationError("patientId is required".into()))?;
        let doctor_id = self
            .doctor_id
            .ok_or_else(|| ServiceError::ValidationError("doctorId is required".into()))?;
        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => parse_date(raw, "date")?,
            None => return Err(ServiceError::ValidationError("date is required".into())),
        };
        if self.services.is_empty() {
            return Err(ServiceError::ValidationError(
                "services must contain at least one entry".into(),
            ));
        }

        check_percent(self.discount, "discount")?;
        for line in &self.services {
            check_percent(line.discount, "services[].discount")?;
            if let Some(total) = line.total {
                check_amount(total, "services[].total")?;
            }
        }
        if let Some(amount) = self.final_amount {
            check_amount(amount, "finalAmount")?;
        }

        Ok(VisitInput {
            visit_id: self.visit_id,
            patient_id,
            doctor_id,
            date,
            start_time: parse_optional_time(self.start_time.as_deref(), "startTime")?,
            end_time: parse_optional_time(self.end_time.as_deref(), "endTime")?,
            discount: self.discount,
            services: self.services,
            products: self.products,
            final_amount: self.final_amount,
            status: self.status,
            visit_type: self.visit_type,
        })
    }
}

/// `price × quantity × (100 − discount) / 100`, rounded to cents
pub fn line_total(
    price: Decimal,
    quantity: i32,
    discount: Decimal,
) -> Result<Decimal, ServiceError> {
    discounted(extended_amount(price, quantity)?, discount)
}

/// Sum of line totals less the visit-level discount
pub fn visit_total(line_totals: &[Decimal], discount: Decimal) -> Result<Decimal, ServiceError> {
    discounted(sum_amounts(line_totals.iter().copied())?, discount)
}

fn discounted(amount: Decimal, discount: Decimal) -> Result<Decimal, ServiceError> {
    amount
        .checked_mul(HUNDRED - discount)
        .and_then(|v| v.checked_div(HUNDRED))
        .map(|v| v.round_dp(2))
        .ok_or_else(|| ServiceError::ValidationError("amount is out of range".into()))
}

/// Creates and edits visits, their line items and the stock they consume
#[derive(Clone)]
pub struct VisitService {
    db_pool: Arc<DbPool>,
}

impl VisitService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates a visit or replaces an existing one together with all of its line items.
    #[instrument(skip(self, command), fields(visit_id = ?command.visit_id))]
    pub async fn save_visit(&self, command: SaveVisitCommand) -> Result<SaveVisitResult, ServiceError> {
        let input = command.into_input()?;

        let tx = Transaction::begin(&self.db_pool, "save_visit").await?;
        let result = Self::save_visit_in(tx.conn(), input).await;
        let saved = tx.finish(result).await?;

        counter!("clinic.visits.saved", 1, "created" => if saved.created { "true" } else { "false" });
        info!(
            visit_id = saved.visit_id,
            services = saved.services_count,
            products = saved.products_count,
            final_amount = %saved.final_amount,
            created = saved.created,
            "Visit saved"
        );
        Ok(saved)
    }

    async fn save_visit_in<C: ConnectionTrait>(
        conn: &C,
        input: VisitInput,
    ) -> Result<SaveVisitResult, ServiceError> {
        if crate::entities::patient::Entity::find_by_id(input.patient_id)
            .one(conn)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "patient {} does not exist",
                input.patient_id
            )));
        }
        if employee::Entity::find_by_id(input.doctor_id)
            .one(conn)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "doctor {} does not exist",
                input.doctor_id
            )));
        }

        let now = Utc::now().naive_utc();
        let (visit_id, created) = match input.visit_id {
            Some(visit_id) => {
                let existing = visit::Entity::find_by_id(visit_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("visit {} does not exist", visit_id))
                    })?;

                let mut model: visit::ActiveModel = existing.into();
                model.patient_id = Set(input.patient_id);
                model.employee_id = Set(input.doctor_id);
                model.visit_date = Set(input.date);
                model.start_time = Set(input.start_time);
                model.end_time = Set(input.end_time);
                model.discount = Set(input.discount);
                if let Some(status) = input.status {
                    model.status = Set(status);
                }
                if let Some(visit_type) = input.visit_type {
                    model.visit_type = Set(visit_type);
                }
                model.updated_at = Set(now);
                model.update(conn).await?;

                Self::release_consumed_stock(conn, visit_id).await?;
                (visit_id, false)
            }
            None => {
                let saved = visit::ActiveModel {
                    patient_id: Set(input.patient_id),
                    employee_id: Set(input.doctor_id),
                    visit_date: Set(input.date),
                    start_time: Set(input.start_time),
                    end_time: Set(input.end_time),
                    discount: Set(input.discount),
                    final_amount: Set(Decimal::ZERO),
                    status: Set(input.status.unwrap_or_default()),
                    visit_type: Set(input.visit_type.unwrap_or_default()),
                    receipt_id: Set(None),
                    payment_amount: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                (saved.id, true)
            }
        };

        visit_service::Entity::delete_many()
            .filter(visit_service::Column::VisitId.eq(visit_id))
            .exec(conn)
            .await?;
        visit_product::Entity::delete_many()
            .filter(visit_product::Column::VisitId.eq(visit_id))
            .exec(conn)
            .await?;

        let mut line_totals = Vec::with_capacity(input.services.len());
        for line in &input.services {
            let service = dental_service::Entity::find_by_id(line.service_id)
                .one(conn)
                .await?
                .ok_or_else(|| {
                    ServiceError::MissingReference(format!(
                        "dental service {} does not exist",
                        line.service_id
                    ))
                })?;
            let total = match line.total {
                Some(total) => total.round_dp(2),
                None => line_total(service.price, line.quantity, line.discount)?,
            };

            visit_service::ActiveModel {
                visit_id: Set(visit_id),
                service_id: Set(line.service_id),
                quantity: Set(line.quantity),
                discount: Set(line.discount),
                total: Set(total),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            line_totals.push(total);
        }

        for line in &input.products {
            Self::consume_product(conn, line).await?;
            visit_product::ActiveModel {
                visit_id: Set(visit_id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }

        let final_amount = match input.final_amount {
            Some(amount) => amount.round_dp(2),
            None => visit_total(&line_totals, input.discount)?,
        };
        visit::Entity::update_many()
            .col_expr(visit::Column::FinalAmount, Expr::value(final_amount))
            .filter(visit::Column::Id.eq(visit_id))
            .exec(conn)
            .await?;

        Ok(SaveVisitResult {
            visit_id,
            services_count: input.services.len(),
            products_count: input.products.len(),
            final_amount,
            created,
        })
    }

    /// Decrements on-hand stock; the guarded update fails when stock is short.
    async fn consume_product<C: ConnectionTrait>(
        conn: &C,
        line: &VisitProductLine,
    ) -> Result<(), ServiceError> {
        let unit = warehouse_unit::Entity::find_by_id(line.product_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::MissingReference(format!(
                    "warehouse product {} does not exist",
                    line.product_id
                ))
            })?;

        let insufficient = || {
            ServiceError::InsufficientStock(format!(
                "product {} ({}): requested {}, on hand {}",
                unit.id, unit.name, line.quantity, unit.amount
            ))
        };
        if line.quantity > unit.amount {
            return Err(insufficient());
        }

        let remaining = unit.amount - line.quantity;
        let updated = warehouse_unit::Entity::update_many()
            .col_expr(
                warehouse_unit::Column::Amount,
                Expr::col(warehouse_unit::Column::Amount).sub(line.quantity),
            )
            .col_expr(
                warehouse_unit::Column::Status,
                Expr::value(StockStatus::for_amount(remaining)),
            )
            .col_expr(
                warehouse_unit::Column::UpdatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(warehouse_unit::Column::Id.eq(line.product_id))
            .filter(warehouse_unit::Column::Amount.gte(line.quantity))
            .exec(conn)
            .await?;
        if updated.rows_affected != 1 {
            return Err(insufficient());
        }

        debug!(product_id = line.product_id, quantity = line.quantity, remaining, "Stock consumed");
        Ok(())
    }

    /// Returns the products recorded on a visit to stock before they are replaced.
    async fn release_consumed_stock<C: ConnectionTrait>(
        conn: &C,
        visit_id: i32,
    ) -> Result<(), ServiceError> {
        let consumed = visit_product::Entity::find()
            .filter(visit_product::Column::VisitId.eq(visit_id))
            .all(conn)
            .await?;

        for row in consumed {
            let result = warehouse_unit::Entity::update_many()
                .col_expr(
                    warehouse_unit::Column::Amount,
                    Expr::col(warehouse_unit::Column::Amount).add(row.quantity),
                )
                .col_expr(
                    warehouse_unit::Column::Status,
                    Expr::value(StockStatus::InStock),
                )
                .col_expr(
                    warehouse_unit::Column::UpdatedAt,
                    Expr::value(Utc::now().naive_utc()),
                )
                .filter(warehouse_unit::Column::Id.eq(row.product_id))
                .exec(conn)
                .await?;
            if result.rows_affected == 0 {
                warn!(visit_id, product_id = row.product_id, "Consumed product no longer in warehouse");
            }
        }
        Ok(())
    }

    /// Removes repeated line items of a visit, keeping the lowest id of each group.
    #[instrument(skip(self))]
    pub async fn cleanup_duplicates(&self, visit_id: i32) -> Result<CleanupResult, ServiceError> {
        let tx = Transaction::begin(&self.db_pool, "cleanup_duplicates").await?;
        let result = Self::cleanup_duplicates_in(tx.conn(), visit_id).await;
        let cleaned = tx.finish(result).await?;

        info!(
            visit_id,
            removed_services = cleaned.removed_services,
            removed_products = cleaned.removed_products,
            "Duplicate line items removed"
        );
        Ok(cleaned)
    }

    async fn cleanup_duplicates_in<C: ConnectionTrait>(
        conn: &C,
        visit_id: i32,
    ) -> Result<CleanupResult, ServiceError> {
        if visit::Entity::find_by_id(visit_id).one(conn).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "visit {} does not exist",
                visit_id
            )));
        }

        let services = visit_service::Entity::find()
            .filter(visit_service::Column::VisitId.eq(visit_id))
            .order_by_asc(visit_service::Column::Id)
            .all(conn)
            .await?;
        let duplicate_services = duplicate_ids(services.iter().map(|s| {
            (
                s.id,
                (
                    s.service_id,
                    s.quantity,
                    s.discount.normalize(),
                    s.total.normalize(),
                ),
            )
        }));

        let products = visit_product::Entity::find()
            .filter(visit_product::Column::VisitId.eq(visit_id))
            .order_by_asc(visit_product::Column::Id)
            .all(conn)
            .await?;
        let duplicate_products =
            duplicate_ids(products.iter().map(|p| (p.id, (p.product_id, p.quantity))));

        let mut removed_services = 0;
        if !duplicate_services.is_empty() {
            removed_services = visit_service::Entity::delete_many()
                .filter(visit_service::Column::Id.is_in(duplicate_services))
                .exec(conn)
                .await?
                .rows_affected;
        }
        let mut removed_products = 0;
        if !duplicate_products.is_empty() {
            removed_products = visit_product::Entity::delete_many()
                .filter(visit_product::Column::Id.is_in(duplicate_products))
                .exec(conn)
                .await?
                .rows_affected;
        }

        Ok(CleanupResult {
            visit_id,
            removed_services,
            removed_products,
        })
    }

    /// Visit history of a patient, newest first, with line items and payment
    #[instrument(skip(self))]
    pub async fn visit_history(&self, query: &PatientNameQuery) -> Result<Vec<VisitView>, ServiceError> {
        let db = &*self.db_pool;
        let name = query.resolve()?;
        let patient = find_patient_by_name(db, &name).await?.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "patient {} not found",
                crate::entities::full_name(&name.last_name, &name.first_name, name.patronymic.as_deref())
            ))
        })?;

        let visits = visit::Entity::find()
            .filter(visit::Column::PatientId.eq(patient.id))
            .order_by_desc(visit::Column::VisitDate)
            .order_by_desc(visit::Column::Id)
            .find_also_related(employee::Entity)
            .all(db)
            .await?;
        if visits.is_empty() {
            return Ok(Vec::new());
        }
        let visit_ids: Vec<i32> = visits.iter().map(|(v, _)| v.id).collect();

        let mut services: HashMap<i32, Vec<VisitServiceView>> = HashMap::new();
        for (line, service) in visit_service::Entity::find()
            .filter(visit_service::Column::VisitId.is_in(visit_ids.clone()))
            .order_by_asc(visit_service::Column::Id)
            .find_also_related(dental_service::Entity)
            .all(db)
            .await?
        {
            services.entry(line.visit_id).or_default().push(VisitServiceView {
                service_id: line.service_id,
                name: service
                    .map(|s| s.name)
                    .unwrap_or_else(|| format!("Услуга #{}", line.service_id)),
                quantity: line.quantity,
                discount: line.discount,
                total: line.total,
            });
        }

        let mut products: HashMap<i32, Vec<VisitProductView>> = HashMap::new();
        for (line, unit) in visit_product::Entity::find()
            .filter(visit_product::Column::VisitId.is_in(visit_ids))
            .order_by_asc(visit_product::Column::Id)
            .find_also_related(warehouse_unit::Entity)
            .all(db)
            .await?
        {
            products.entry(line.visit_id).or_default().push(VisitProductView {
                product_id: line.product_id,
                name: unit
                    .map(|u| u.name)
                    .unwrap_or_else(|| format!("Товар #{}", line.product_id)),
                quantity: line.quantity,
            });
        }

        let receipt_ids: Vec<i32> = visits.iter().filter_map(|(v, _)| v.receipt_id).collect();
        let receipts: HashMap<i32, String> = if receipt_ids.is_empty() {
            HashMap::new()
        } else {
            payment_receipt::Entity::find()
                .filter(payment_receipt::Column::Id.is_in(receipt_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|r| (r.id, r.receipt_number))
                .collect()
        };

        Ok(visits
            .into_iter()
            .map(|(v, doctor)| VisitView {
                visit_id: v.id,
                date: format_date(v.visit_date),
                start_time: v.start_time.map(format_time),
                end_time: v.end_time.map(format_time),
                doctor_id: v.employee_id,
                doctor_name: doctor.map(|d| d.full_name()).unwrap_or_default(),
                status: v.status,
                status_label: v.status.label().to_string(),
                visit_type: v.visit_type,
                visit_type_label: v.visit_type.label().to_string(),
                discount: v.discount,
                final_amount: v.final_amount,
                services: services.remove(&v.id).unwrap_or_default(),
                products: products.remove(&v.id).unwrap_or_default(),
                payment: v.receipt_id.map(|receipt_id| PaymentView {
                    receipt_id,
                    receipt_number: receipts.get(&receipt_id).cloned(),
                    amount: v.payment_amount,
                }),
            })
            .collect())
    }
}

/// Ids of rows whose key repeats an earlier row; input must be ordered by id.
fn duplicate_ids<K: std::hash::Hash + Eq>(rows: impl Iterator<Item = (i32, K)>) -> Vec<i32> {
    let mut seen = HashSet::new();
    rows.filter_map(|(id, key)| (!seen.insert(key)).then_some(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn command() -> SaveVisitCommand {
        serde_json::from_value(serde_json::json!({
            "patientId": 1,
            "doctorId": 2,
            "date": "2024-03-07",
            "startTime": "10:00",
            "endTime": "10:45",
            "discount": 10,
            "services": [{"serviceId": 3, "quantity": 2, "total": 200}]
        }))
        .unwrap()
    }

    #[rstest]
    #[case(dec!(1500), 1, dec!(0), dec!(1500))]
    #[case(dec!(1500), 2, dec!(10), dec!(2700))]
    #[case(dec!(333.33), 3, dec!(15), dec!(849.99))]
    #[case(dec!(100), 1, dec!(100), dec!(0))]
    fn line_totals(
        #[case] price: Decimal,
        #[case] quantity: i32,
        #[case] discount: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(line_total(price, quantity, discount).unwrap(), expected);
    }

    #[test]
    fn visit_total_applies_visit_discount() {
        assert_eq!(visit_total(&[dec!(200), dec!(150)], dec!(10)).unwrap(), dec!(315));
        assert_eq!(visit_total(&[], dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn totals_out_of_decimal_range_are_errors() {
        assert_matches!(
            line_total(Decimal::MAX, 2, dec!(0)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            visit_total(&[Decimal::MAX, Decimal::MAX], dec!(0)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn oversized_client_amounts_are_rejected() {
        let mut cmd = command();
        cmd.services[0].total = Some(dec!(1000000000000000000000000000));
        assert_matches!(
            cmd.into_input(),
            Err(ServiceError::ValidationError(msg)) if msg.contains("services[].total")
        );

        let mut cmd = command();
        cmd.final_amount = Some(dec!(1000000000001));
        assert_matches!(
            cmd.into_input(),
            Err(ServiceError::ValidationError(msg)) if msg.contains("finalAmount")
        );
    }

    #[test]
    fn valid_command_is_accepted() {
        let input = command().into_input().unwrap();
        assert_eq!(input.patient_id, 1);
        assert_eq!(input.doctor_id, 2);
        assert_eq!(input.services.len(), 1);
        assert_eq!(input.start_time, NaiveTime::from_hms_opt(10, 0, 0));
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let cmd: SaveVisitCommand = serde_json::from_value(serde_json::json!({
            "patient_id": 1,
            "employee_id": 2,
            "visit_date": "07.03.2024",
            "services": [{"service_id": 3}]
        }))
        .unwrap();
        let input = cmd.into_input().unwrap();
        assert_eq!(input.doctor_id, 2);
        assert_eq!(input.services[0].quantity, 1);
    }

    #[test]
    fn empty_services_are_rejected() {
        let mut cmd = command();
        cmd.services.clear();
        assert_matches!(cmd.into_input(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn missing_patient_is_rejected() {
        let mut cmd = command();
        cmd.patient_id = None;
        assert_matches!(cmd.into_input(), Err(ServiceError::ValidationError(msg)) if msg.contains("patientId"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cmd = command();
        cmd.products.push(VisitProductLine {
            product_id: 4,
            quantity: 0,
        });
        assert_matches!(cmd.into_input(), Err(ServiceError::ValidationError(_)));
    }

    #[rstest]
    #[case(dec!(-1))]
    #[case(dec!(100.5))]
    fn out_of_range_discount_is_rejected(#[case] discount: Decimal) {
        let mut cmd = command();
        cmd.discount = discount;
        assert_matches!(cmd.into_input(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let rows = vec![(1, (3, 1)), (2, (3, 1)), (3, (4, 1)), (4, (3, 2)), (5, (4, 1))];
        assert_eq!(duplicate_ids(rows.into_iter()), vec![2, 5]);
    }
}
