use crate::models::StockStatus;
use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock-tracked item. `amount` is the on-hand quantity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouse_units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub specs: Option<String>,
    pub amount: i32,
    pub unit: Option<String>,
    pub status: StockStatus,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visit_product::Entity")]
    VisitProducts,
}

impl Related<super::visit_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VisitProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
