use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        ingredient, menu_ingredient, stock_reduction,
        unit::{self, Entity as UnitEntity},
    },
    errors::ServiceError,
    services::validation::not_blank,
};

/// Body for creating or renaming a unit of measure
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UnitInput {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    #[schema(example = "Kilogram")]
    pub name: String,
    #[validate(length(min = 1, max = 20), custom = "not_blank")]
    #[schema(example = "kg")]
    pub symbol: String,
}

/// Units of measure. A unit becomes read-only once anything points at it.
#[derive(Clone)]
pub struct UnitService {
    db: Arc<DatabaseConnection>,
}

impl UnitService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<unit::Model>, ServiceError> {
        UnitEntity::find()
            .order_by_asc(unit::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list units: {}", e);
                ServiceError::db_error(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<unit::Model, ServiceError> {
        UnitEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Unit with ID {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: UnitInput) -> Result<unit::Model, ServiceError> {
        input.validate()?;
        let symbol = input.symbol.trim().to_string();

        let created = unit::ActiveModel {
            name: Set(input.name.trim().to_string()),
            symbol: Set(symbol.clone()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::from_write(e, format!("Unit symbol '{}' is already in use", symbol))
        })?;

        info!(unit_id = created.id, symbol = %created.symbol, "Unit created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, input: UnitInput) -> Result<unit::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;
        self.ensure_unreferenced(&existing).await?;

        let symbol = input.symbol.trim().to_string();
        let mut active: unit::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.symbol = Set(symbol.clone());

        let updated = active.update(&*self.db).await.map_err(|e| {
            ServiceError::from_write(e, format!("Unit symbol '{}' is already in use", symbol))
        })?;

        info!(unit_id = id, "Unit updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        self.ensure_unreferenced(&existing).await?;

        existing
            .delete(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        info!(unit_id = id, "Unit deleted");
        Ok(())
    }

    async fn ensure_unreferenced(&self, unit: &unit::Model) -> Result<(), ServiceError> {
        let db = &*self.db;

        let ingredients = ingredient::Entity::find()
            .filter(ingredient::Column::UnitId.eq(unit.id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let recipe_lines = menu_ingredient::Entity::find()
            .filter(menu_ingredient::Column::UnitId.eq(unit.id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let reductions = stock_reduction::Entity::find()
            .filter(stock_reduction::Column::UnitId.eq(unit.id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        if ingredients + recipe_lines + reductions > 0 {
            return Err(ServiceError::Conflict(format!(
                "Unit '{}' is in use and cannot be changed",
                unit.symbol
            )));
        }
        Ok(())
    }
}
