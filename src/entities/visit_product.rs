use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Warehouse product consumed during a visit
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visit_products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub visit_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::visit::Entity",
        from = "Column::VisitId",
        to = "super::visit::Column::Id",
        on_delete = "Cascade"
    )]
    Visit,
    #[sea_orm(
        belongs_to = "super::warehouse_unit::Entity",
        from = "Column::ProductId",
        to = "super::warehouse_unit::Column::Id"
    )]
    WarehouseUnit,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl Related<super::warehouse_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WarehouseUnit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
