use crate::{
    db::DbPool,
    entities::{dental_service, warehouse_unit},
    errors::ServiceError,
    models::StockStatus,
    services::format_date,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DentalServiceView {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseItemView {
    pub id: i32,
    pub name: String,
    pub specs: Option<String>,
    pub amount: i32,
    pub unit: Option<String>,
    pub status: StockStatus,
    pub status_label: String,
    pub updated_at: String,
}

impl From<warehouse_unit::Model> for WarehouseItemView {
    fn from(u: warehouse_unit::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            specs: u.specs,
            amount: u.amount,
            unit: u.unit,
            status: u.status,
            status_label: u.status.label().to_string(),
            updated_at: format_date(u.updated_at.date()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateQuantityCommand {
    #[serde(default, alias = "itemId")]
    pub item_id: Option<i32>,
    #[serde(default, alias = "newQuantity")]
    pub new_quantity: Option<i32>,
}

/// Catalog reads and direct stock edits
#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_dental_services(&self) -> Result<Vec<DentalServiceView>, ServiceError> {
        let services = dental_service::Entity::find()
            .order_by_asc(dental_service::Column::Category)
            .order_by_asc(dental_service::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(services
            .into_iter()
            .map(|s| DentalServiceView {
                id: s.id,
                name: s.name,
                category: s.category,
                price: s.price,
            })
            .collect())
    }

    /// Products that can be consumed in a visit (on hand > 0)
    #[instrument(skip(self))]
    pub async fn list_available_products(&self) -> Result<Vec<WarehouseItemView>, ServiceError> {
        let units = warehouse_unit::Entity::find()
            .filter(warehouse_unit::Column::Amount.gt(0))
            .order_by_asc(warehouse_unit::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(units.into_iter().map(WarehouseItemView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<WarehouseItemView>, ServiceError> {
        let units = warehouse_unit::Entity::find()
            .order_by_asc(warehouse_unit::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(units.into_iter().map(WarehouseItemView::from).collect())
    }

    /// Overwrites the on-hand amount and recomputes the stock status.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        command: UpdateQuantityCommand,
    ) -> Result<WarehouseItemView, ServiceError> {
        let item_id = command
            .item_id
            .ok_or_else(|| ServiceError::ValidationError("item_id is required".into()))?;
        let new_quantity = command
            .new_quantity
            .ok_or_else(|| ServiceError::ValidationError("new_quantity is required".into()))?;
        if new_quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "new_quantity must not be negative, got {}",
                new_quantity
            )));
        }

        let db = &*self.db_pool;
        let unit = warehouse_unit::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("warehouse item {} does not exist", item_id))
            })?;

        let previous = unit.amount;
        let mut model: warehouse_unit::ActiveModel = unit.into();
        model.amount = Set(new_quantity);
        model.status = Set(StockStatus::for_amount(new_quantity));
        model.updated_at = Set(Utc::now().naive_utc());
        let updated = model.update(db).await?;

        info!(item_id, previous, new_quantity, "Warehouse quantity overwritten");
        Ok(updated.into())
    }
}
