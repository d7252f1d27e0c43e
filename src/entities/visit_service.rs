use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service line item of a visit. Rows are replaced wholesale on every save.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visit_services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub visit_id: i32,
    pub service_id: i32,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total: Decimal,
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
        belongs_to = "super::dental_service::Entity",
        from = "Column::ServiceId",
        to = "super::dental_service::Column::Id"
    )]
    DentalService,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl Related<super::dental_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DentalService.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
