use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only ledger row: `stock_after == stock_before - quantity_reduced`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_reductions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_item_id: i64,
    pub ingredient_id: i64,
    pub unit_id: i64,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub quantity_reduced: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub stock_before: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub stock_after: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction_item::Entity",
        from = "Column::TransactionItemId",
        to = "super::transaction_item::Column::Id"
    )]
    TransactionItem,
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id"
    )]
    Ingredient,
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
}

impl Related<super::transaction_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionItem.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
