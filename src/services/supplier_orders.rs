//! Supplier orders and the warehouse credit that follows a delivery.

use crate::{
    db::{DbPool, Transaction},
    entities::{contractor, order_item, supplier_order, warehouse_unit},
    errors::ServiceError,
    models::{StockStatus, SupplierOrderStatus},
    services::{
        check_amount, extended_amount, format_date, non_empty, parse_optional_date, sum_amounts,
    },
};
use chrono::{NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemLine {
    #[serde(alias = "product_id", alias = "id")]
    pub product_id: i32,
    #[serde(default, alias = "product_name", alias = "name")]
    pub product_name: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSupplierOrderCommand {
    /// Existing order to update; absent creates a new order
    #[serde(default, alias = "receipt_id", alias = "receiptId", alias = "order_id")]
    pub order_id: Option<i32>,
    #[serde(default, alias = "supplier_id", alias = "contractorId", alias = "contractor_id")]
    pub supplier_id: Option<i32>,
    #[serde(default, alias = "order_date")]
    pub order_date: Option<String>,
    #[serde(default, alias = "expected_date")]
    pub expected_date: Option<String>,
    #[serde(default, alias = "products")]
    #[validate]
    pub items: Vec<OrderItemLine>,
    /// Stored value (`in_progress`) or a display spelling; defaults to `draft`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSupplierOrderResult {
    pub order_id: i32,
    pub previous_status: Option<SupplierOrderStatus>,
    pub status: SupplierOrderStatus,
    /// True when this save credited the delivered quantities to the warehouse
    pub stock_adjusted: bool,
    pub items_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCredit {
    pub product_id: i32,
    pub quantity: i32,
    pub new_amount: i32,
    /// The warehouse had no unit for this product before the delivery
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyStockResult {
    pub order_id: i32,
    pub applied: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<StockCredit>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct OrderIdQuery {
    #[serde(default, alias = "receiptId", alias = "order_id", alias = "orderId", alias = "id")]
    pub receipt_id: Option<i32>,
}

impl OrderIdQuery {
    pub fn required(&self) -> Result<i32, ServiceError> {
        self.receipt_id
            .ok_or_else(|| ServiceError::ValidationError("receipt_id is required".into()))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplyStockCommand {
    #[serde(default, alias = "orderId", alias = "receipt_id", alias = "receiptId")]
    pub order_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub id: i32,
    pub supplier_id: i32,
    pub supplier_name: String,
    pub order_date: String,
    pub expected_date: Option<String>,
    pub delivered_date: Option<String>,
    pub status: SupplierOrderStatus,
    pub status_label: String,
    pub items_count: usize,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierView {
    pub id: i32,
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedItem {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDetails {
    pub id: i32,
    pub order_date: String,
    pub expected_date: Option<String>,
    pub delivered_date: Option<String>,
    pub status: SupplierOrderStatus,
    pub status_label: String,
    pub stock_applied: bool,
    pub notes: Option<String>,
    pub supplier: Option<SupplierView>,
    pub items: Vec<PricedItem>,
    pub total_amount: Decimal,
}

/// Order in the shape the edit form posts back to `save-supplier-order`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub order_id: i32,
    pub supplier_id: i32,
    pub order_date: String,
    pub expected_date: Option<String>,
    pub status: SupplierOrderStatus,
    pub notes: Option<String>,
    pub products: Vec<OrderItemLine>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order_id: i32,
    pub items: Vec<PricedItem>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone)]
struct OrderInput {
    order_id: Option<i32>,
    supplier_id: i32,
    order_date: Option<NaiveDate>,
    expected_date: Option<NaiveDate>,
    status: SupplierOrderStatus,
    notes: Option<String>,
    items: Vec<OrderItemLine>,
}

impl SaveSupplierOrderCommand {
    fn into_input(self) -> Result<OrderInput, ServiceError> {
        self.validate()?;

        let supplier_id = self
            .supplier_id
            .ok_or_else(|| ServiceError::ValidationError("supplierId is required".into()))?;
        if self.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "products must contain at least one entry".into(),
            ));
        }
        for item in &self.items {
            check_amount(item.price, "products[].price")?;
        }
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse().map_err(ServiceError::ValidationError)?,
            None => SupplierOrderStatus::Draft,
        };

        Ok(OrderInput {
            order_id: self.order_id,
            supplier_id,
            order_date: parse_optional_date(self.order_date.as_deref(), "orderDate")?,
            expected_date: parse_optional_date(self.expected_date.as_deref(), "expectedDate")?,
            status,
            notes: non_empty(self.notes),
            items: self.items,
        })
    }
}

/// Only an edge into `delivered` credits stock.
pub fn delivery_edge(previous: Option<SupplierOrderStatus>, next: SupplierOrderStatus) -> bool {
    next == SupplierOrderStatus::Delivered && previous != Some(SupplierOrderStatus::Delivered)
}

fn priced(
    item: order_item::Model,
    names: &HashMap<i32, String>,
) -> Result<PricedItem, ServiceError> {
    let product_name = item
        .product_name
        .clone()
        .or_else(|| names.get(&item.product_id).cloned())
        .unwrap_or_else(|| format!("Товар #{}", item.product_id));
    Ok(PricedItem {
        product_id: item.product_id,
        product_name,
        quantity: item.quantity,
        total: extended_amount(item.price, item.quantity)?.round_dp(2),
        price: item.price,
    })
}

/// Supplier orders, their items, and warehouse credit on delivery
#[derive(Clone)]
pub struct SupplierOrderService {
    db_pool: Arc<DbPool>,
}

impl SupplierOrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates or updates an order and replaces its items. Moving the order into
    /// `delivered` credits every item to the warehouse in the same transaction.
    #[instrument(skip(self, command), fields(order_id = ?command.order_id))]
    pub async fn save_order(
        &self,
        command: SaveSupplierOrderCommand,
    ) -> Result<SaveSupplierOrderResult, ServiceError> {
        let input = command.into_input()?;

        let tx = Transaction::begin(&self.db_pool, "save_supplier_order").await?;
        let result = Self::save_order_in(tx.conn(), input).await;
        let saved = tx.finish(result).await?;

        counter!("clinic.supplier_orders.saved", 1, "status" => saved.status.as_str());
        info!(
            order_id = saved.order_id,
            previous_status = ?saved.previous_status,
            status = %saved.status,
            stock_adjusted = saved.stock_adjusted,
            "Supplier order saved"
        );
        Ok(saved)
    }

    async fn save_order_in<C: ConnectionTrait>(
        conn: &C,
        input: OrderInput,
    ) -> Result<SaveSupplierOrderResult, ServiceError> {
        if contractor::Entity::find_by_id(input.supplier_id)
            .one(conn)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "supplier {} does not exist",
                input.supplier_id
            )));
        }

        let now = Utc::now().naive_utc();
        let today = now.date();
        let delivered_date = (input.status == SupplierOrderStatus::Delivered).then_some(today);

        let (order_id, previous_status) = match input.order_id {
            Some(order_id) => {
                let existing = supplier_order::Entity::find_by_id(order_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("supplier order {} does not exist", order_id))
                    })?;
                let previous = existing.status;
                if !previous.can_transition_to(input.status) {
                    return Err(ServiceError::InvalidStatus(format!(
                        "supplier order {} cannot move from {} to {}",
                        order_id, previous, input.status
                    )));
                }

                let keep_delivered_date = existing.delivered_date;
                let mut model: supplier_order::ActiveModel = existing.into();
                model.contractor_id = Set(input.supplier_id);
                model.status = Set(input.status);
                if let Some(order_date) = input.order_date {
                    model.order_date = Set(order_date);
                }
                model.expected_date = Set(input.expected_date);
                model.delivered_date = Set(keep_delivered_date.or(delivered_date));
                model.notes = Set(input.notes.clone());
                model.updated_at = Set(now);
                model.update(conn).await?;

                order_item::Entity::delete_many()
                    .filter(order_item::Column::OrderId.eq(order_id))
                    .exec(conn)
                    .await?;
                (order_id, Some(previous))
            }
            None => {
                let saved = supplier_order::ActiveModel {
                    contractor_id: Set(input.supplier_id),
                    status: Set(input.status),
                    order_date: Set(input.order_date.unwrap_or(today)),
                    expected_date: Set(input.expected_date),
                    delivered_date: Set(delivered_date),
                    stock_applied: Set(false),
                    notes: Set(input.notes.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                (saved.id, None)
            }
        };

        let rows: Vec<order_item::ActiveModel> = input
            .items
            .iter()
            .map(|item| order_item::ActiveModel {
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                product_name: Set(non_empty(item.product_name.clone())),
                quantity: Set(item.quantity),
                price: Set(item.price.round_dp(2)),
                ..Default::default()
            })
            .collect();
        order_item::Entity::insert_many(rows).exec(conn).await?;

        let mut stock_adjusted = false;
        if delivery_edge(previous_status, input.status) {
            stock_adjusted = Self::credit_delivery(conn, order_id).await?.is_some();
        }

        Ok(SaveSupplierOrderResult {
            order_id,
            previous_status,
            status: input.status,
            stock_adjusted,
            items_count: input.items.len(),
        })
    }

    /// Credits a delivered order to the warehouse at most once.
    ///
    /// The `stock_applied` flag is claimed with a conditional update; only the
    /// caller that flips it from false to true adjusts stock. Returns `None`
    /// when the order was already credited.
    async fn credit_delivery<C: ConnectionTrait>(
        conn: &C,
        order_id: i32,
    ) -> Result<Option<Vec<StockCredit>>, ServiceError> {
        let claimed = supplier_order::Entity::update_many()
            .col_expr(supplier_order::Column::StockApplied, Expr::value(true))
            .filter(supplier_order::Column::Id.eq(order_id))
            .filter(supplier_order::Column::StockApplied.eq(false))
            .exec(conn)
            .await?;
        if claimed.rows_affected == 0 {
            debug!(order_id, "Delivery already credited");
            return Ok(None);
        }

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Id)
            .all(conn)
            .await?;

        let now = Utc::now().naive_utc();
        let mut credits = Vec::with_capacity(items.len());
        for item in items {
            let credit = match warehouse_unit::Entity::find_by_id(item.product_id)
                .one(conn)
                .await?
            {
                Some(unit) => {
                    let new_amount = unit.amount.checked_add(item.quantity).ok_or_else(|| {
                        ServiceError::ValidationError(format!(
                            "stock of product {} would exceed the storable maximum",
                            item.product_id
                        ))
                    })?;
                    warehouse_unit::Entity::update_many()
                        .col_expr(
                            warehouse_unit::Column::Amount,
                            Expr::col(warehouse_unit::Column::Amount).add(item.quantity),
                        )
                        .col_expr(
                            warehouse_unit::Column::Status,
                            Expr::value(StockStatus::InStock),
                        )
                        .col_expr(warehouse_unit::Column::UpdatedAt, Expr::value(now))
                        .filter(warehouse_unit::Column::Id.eq(unit.id))
                        .exec(conn)
                        .await?;
                    StockCredit {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        new_amount,
                        created: false,
                    }
                }
                None => {
                    let name = item
                        .product_name
                        .clone()
                        .unwrap_or_else(|| format!("Товар #{}", item.product_id));
                    warehouse_unit::Entity::insert(warehouse_unit::ActiveModel {
                        id: Set(item.product_id),
                        name: Set(name),
                        specs: Set(None),
                        amount: Set(item.quantity),
                        unit: Set(None),
                        status: Set(StockStatus::for_amount(item.quantity)),
                        updated_at: Set(now),
                    })
                    .exec(conn)
                    .await?;
                    StockCredit {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        new_amount: item.quantity,
                        created: true,
                    }
                }
            };
            debug!(
                order_id,
                product_id = credit.product_id,
                quantity = credit.quantity,
                created = credit.created,
                "Stock credited"
            );
            credits.push(credit);
        }

        counter!("clinic.warehouse.deliveries_credited", 1);
        Ok(Some(credits))
    }

    /// Re-runs the delivery credit for an order that is already delivered.
    #[instrument(skip(self))]
    pub async fn apply_delivered_stock(
        &self,
        command: ApplyStockCommand,
    ) -> Result<ApplyStockResult, ServiceError> {
        let order_id = command
            .order_id
            .ok_or_else(|| ServiceError::ValidationError("order_id is required".into()))?;

        let tx = Transaction::begin(&self.db_pool, "apply_delivered_stock").await?;
        let result = Self::apply_delivered_stock_in(tx.conn(), order_id).await;
        let outcome = tx.finish(result).await?;

        info!(order_id, applied = outcome.applied, "Manual stock update processed");
        Ok(outcome)
    }

    async fn apply_delivered_stock_in<C: ConnectionTrait>(
        conn: &C,
        order_id: i32,
    ) -> Result<ApplyStockResult, ServiceError> {
        let order = supplier_order::Entity::find_by_id(order_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("supplier order {} does not exist", order_id))
            })?;
        if order.status != SupplierOrderStatus::Delivered {
            return Err(ServiceError::BadRequest(format!(
                "supplier order {} is {}, only delivered orders can be credited",
                order_id, order.status
            )));
        }

        Ok(match Self::credit_delivery(conn, order_id).await? {
            Some(items) => ApplyStockResult {
                order_id,
                applied: true,
                items,
            },
            None => ApplyStockResult {
                order_id,
                applied: false,
                items: Vec::new(),
            },
        })
    }

    #[instrument(skip(self))]
    pub async fn list_receipts(&self) -> Result<Vec<ReceiptSummary>, ServiceError> {
        let db = &*self.db_pool;
        let orders = supplier_order::Entity::find()
            .order_by_desc(supplier_order::Column::OrderDate)
            .order_by_desc(supplier_order::Column::Id)
            .find_also_related(contractor::Entity)
            .all(db)
            .await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|(o, _)| o.id).collect();
        let mut totals: HashMap<i32, (usize, Decimal)> = HashMap::new();
        for item in order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(db)
            .await?
        {
            let entry = totals.entry(item.order_id).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 = sum_amounts([entry.1, extended_amount(item.price, item.quantity)?])?;
        }

        Ok(orders
            .into_iter()
            .map(|(order, supplier)| {
                let (items_count, total) = totals.remove(&order.id).unwrap_or((0, Decimal::ZERO));
                ReceiptSummary {
                    id: order.id,
                    supplier_id: order.contractor_id,
                    supplier_name: supplier.map(|s| s.name).unwrap_or_default(),
                    order_date: format_date(order.order_date),
                    expected_date: order.expected_date.map(format_date),
                    delivered_date: order.delivered_date.map(format_date),
                    status: order.status,
                    status_label: order.status.label().to_string(),
                    items_count,
                    total_amount: total.round_dp(2),
                }
            })
            .collect())
    }

    async fn load_order(
        &self,
        order_id: i32,
    ) -> Result<(supplier_order::Model, Vec<order_item::Model>), ServiceError> {
        let db = &*self.db_pool;
        let order = supplier_order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("supplier order {} does not exist", order_id))
            })?;
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?;
        Ok((order, items))
    }

    async fn unit_names(&self, items: &[order_item::Model]) -> Result<HashMap<i32, String>, ServiceError> {
        let ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(warehouse_unit::Entity::find()
            .filter(warehouse_unit::Column::Id.is_in(ids))
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect())
    }

    /// Header, supplier and priced items
    #[instrument(skip(self))]
    pub async fn receipt_details(&self, order_id: i32) -> Result<ReceiptDetails, ServiceError> {
        let (order, items) = self.load_order(order_id).await?;
        let supplier = contractor::Entity::find_by_id(order.contractor_id)
            .one(&*self.db_pool)
            .await?
            .map(|c| SupplierView {
                id: c.id,
                name: c.name,
                legal_name: c.legal_name,
                inn: c.inn,
                phone: c.phone,
                email: c.email,
            });
        let names = self.unit_names(&items).await?;
        let items = items
            .into_iter()
            .map(|i| priced(i, &names))
            .collect::<Result<Vec<_>, _>>()?;
        let total_amount = sum_amounts(items.iter().map(|i| i.total))?;

        Ok(ReceiptDetails {
            id: order.id,
            order_date: format_date(order.order_date),
            expected_date: order.expected_date.map(format_date),
            delivered_date: order.delivered_date.map(format_date),
            status: order.status,
            status_label: order.status.label().to_string(),
            stock_applied: order.stock_applied,
            notes: order.notes,
            supplier,
            items,
            total_amount,
        })
    }

    #[instrument(skip(self))]
    pub async fn receipt_for_order(&self, order_id: i32) -> Result<OrderForm, ServiceError> {
        let (order, items) = self.load_order(order_id).await?;
        Ok(OrderForm {
            order_id: order.id,
            supplier_id: order.contractor_id,
            order_date: order.order_date.format("%Y-%m-%d").to_string(),
            expected_date: order
                .expected_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            status: order.status,
            notes: order.notes,
            products: items
                .into_iter()
                .map(|i| OrderItemLine {
                    product_id: i.product_id,
                    product_name: i.product_name,
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        })
    }

    #[instrument(skip(self))]
    pub async fn order_details(&self, order_id: i32) -> Result<OrderDetails, ServiceError> {
        let (order, items) = self.load_order(order_id).await?;
        let names = self.unit_names(&items).await?;
        let items = items
            .into_iter()
            .map(|i| priced(i, &names))
            .collect::<Result<Vec<_>, _>>()?;
        let total_amount = sum_amounts(items.iter().map(|i| i.total))?;
        Ok(OrderDetails {
            order_id: order.id,
            items,
            total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use SupplierOrderStatus::*;

    #[test]
    fn only_edges_into_delivered_credit_stock() {
        assert!(delivery_edge(None, Delivered));
        assert!(delivery_edge(Some(Shipped), Delivered));
        assert!(delivery_edge(Some(Draft), Delivered));
        assert!(!delivery_edge(Some(Delivered), Delivered));
        assert!(!delivery_edge(Some(Draft), Shipped));
        assert!(!delivery_edge(None, Cancelled));
    }

    fn command(value: serde_json::Value) -> SaveSupplierOrderCommand {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn status_defaults_to_draft() {
        let input = command(serde_json::json!({
            "supplierId": 1,
            "products": [{"productId": 5, "quantity": 2, "price": 10}]
        }))
        .into_input()
        .unwrap();
        assert_eq!(input.status, Draft);
        assert_eq!(input.items.len(), 1);
    }

    #[test]
    fn receipt_id_alias_selects_order() {
        let input = command(serde_json::json!({
            "receipt_id": 9,
            "supplier_id": 1,
            "status": "in-progress",
            "items": [{"id": 5, "name": "Composite", "quantity": 1}]
        }))
        .into_input()
        .unwrap();
        assert_eq!(input.order_id, Some(9));
        assert_eq!(input.status, InProgress);
        assert_eq!(input.items[0].product_name.as_deref(), Some("Composite"));
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let result = command(serde_json::json!({
            "supplierId": 1,
            "status": "lost",
            "products": [{"productId": 5, "quantity": 1}]
        }))
        .into_input();
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn empty_items_and_bad_quantities_are_rejected() {
        let empty = command(serde_json::json!({"supplierId": 1, "products": []})).into_input();
        assert_matches!(empty, Err(ServiceError::ValidationError(_)));

        let zero = command(serde_json::json!({
            "supplierId": 1,
            "products": [{"productId": 5, "quantity": 0}]
        }))
        .into_input();
        assert_matches!(zero, Err(ServiceError::ValidationError(_)));

        let negative_price = command(serde_json::json!({
            "supplierId": 1,
            "products": [{"productId": 5, "quantity": 1, "price": -3}]
        }))
        .into_input();
        assert_matches!(negative_price, Err(ServiceError::ValidationError(_)));

        let huge_price = command(serde_json::json!({
            "supplierId": 1,
            "products": [{"productId": 5, "quantity": 1, "price": "1000000000000000000000000000"}]
        }))
        .into_input();
        assert_matches!(huge_price, Err(ServiceError::ValidationError(msg)) if msg.contains("price"));
    }
}
