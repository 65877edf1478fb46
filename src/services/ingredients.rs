use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::run_in_transaction,
    entities::{
        ingredient::{self, Entity as IngredientEntity},
        menu_ingredient, stock_reduction,
        unit::{self, Entity as UnitEntity},
    },
    errors::ServiceError,
    services::{
        slug::slug_for,
        stock::{self, StockChange},
        validation::{non_negative, not_blank, signed_amount},
    },
};

/// Body for creating or editing an ingredient
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct IngredientInput {
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    #[schema(example = "Tepung Terigu")]
    pub name: String,
    #[validate(custom = "non_negative")]
    #[schema(value_type = String, example = "25.00")]
    pub stock: Decimal,
    #[schema(example = 1)]
    pub unit_id: i64,
}

/// Signed manual stock correction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockAdjustmentInput {
    /// Positive for deliveries, negative for spoilage or counting corrections
    #[validate(custom = "signed_amount")]
    #[schema(value_type = String, example = "-1.50")]
    pub delta: Decimal,
    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitSummary {
    pub id: i64,
    pub name: String,
    pub symbol: String,
}

impl From<unit::Model> for UnitSummary {
    fn from(unit: unit::Model) -> Self {
        Self {
            id: unit.id,
            name: unit.name,
            symbol: unit.symbol,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub stock: Decimal,
    pub unit_id: i64,
    pub unit: Option<UnitSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IngredientView {
    fn new(ingredient: ingredient::Model, unit: Option<unit::Model>) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            slug: ingredient.slug,
            stock: ingredient.stock,
            unit_id: ingredient.unit_id,
            unit: unit.map(UnitSummary::from),
            created_at: ingredient.created_at,
            updated_at: ingredient.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockAdjustmentView {
    pub ingredient_id: i64,
    #[schema(value_type = String)]
    pub stock_before: Decimal,
    #[schema(value_type = String)]
    pub stock_after: Decimal,
    pub reason: Option<String>,
}

/// Ingredient catalog. Stock writes go through `services::stock`.
#[derive(Clone)]
pub struct IngredientService {
    db: Arc<DatabaseConnection>,
}

impl IngredientService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<IngredientView>, ServiceError> {
        let rows = IngredientEntity::find()
            .find_also_related(UnitEntity)
            .order_by_asc(ingredient::Column::Name)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list ingredients: {}", e);
                ServiceError::db_error(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(ingredient, unit)| IngredientView::new(ingredient, unit))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<IngredientView, ServiceError> {
        let (ingredient, unit) = IngredientEntity::find_by_id(id)
            .find_also_related(UnitEntity)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| not_found(id))?;
        Ok(IngredientView::new(ingredient, unit))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: IngredientInput) -> Result<IngredientView, ServiceError> {
        input.validate()?;
        let slug = slug_for(&input.name)?;
        let unit = require_unit(&*self.db, input.unit_id).await?;

        let created = ingredient::ActiveModel {
            name: Set(input.name.trim().to_string()),
            slug: Set(slug.clone()),
            stock: Set(input.stock),
            unit_id: Set(input.unit_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| ServiceError::from_write(e, duplicate_slug(&slug)))?;

        info!(ingredient_id = created.id, slug = %created.slug, stock = %created.stock, "Ingredient created");
        Ok(IngredientView::new(created, Some(unit)))
    }

    /// Renames, re-units and sets the stock level in one database transaction.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        input: IngredientInput,
    ) -> Result<IngredientView, ServiceError> {
        input.validate()?;
        let slug = slug_for(&input.name)?;

        let (updated, unit) = run_in_transaction(&self.db, "ingredients.update", move |txn| {
            Box::pin(async move {
                let unit = require_unit(txn, input.unit_id).await?;
                let level = stock::set_level(txn, id, input.stock).await?;

                let mut active: ingredient::ActiveModel = level.ingredient.into();
                active.name = Set(input.name.trim().to_string());
                active.slug = Set(slug.clone());
                active.unit_id = Set(input.unit_id);
                let updated = active
                    .update(txn)
                    .await
                    .map_err(|e| ServiceError::from_write(e, duplicate_slug(&slug)))?;

                Ok((updated, unit))
            })
        })
        .await?;

        info!(ingredient_id = id, stock = %updated.stock, "Ingredient updated");
        Ok(IngredientView::new(updated, Some(unit)))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = IngredientEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| not_found(id))?;

        let recipe_lines = menu_ingredient::Entity::find()
            .filter(menu_ingredient::Column::IngredientId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        let reductions = stock_reduction::Entity::find()
            .filter(stock_reduction::Column::IngredientId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if recipe_lines + reductions > 0 {
            return Err(ServiceError::Conflict(format!(
                "Ingredient '{}' is used by menus or sales and cannot be deleted",
                existing.name
            )));
        }

        existing.delete(db).await.map_err(ServiceError::db_error)?;
        info!(ingredient_id = id, "Ingredient deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        id: i64,
        input: StockAdjustmentInput,
    ) -> Result<StockAdjustmentView, ServiceError> {
        input.validate()?;
        if input.delta.is_zero() {
            return Err(ServiceError::ValidationError(
                "delta must not be zero".to_string(),
            ));
        }

        let delta = input.delta;
        let change: StockChange = run_in_transaction(&self.db, "ingredients.adjust_stock", move |txn| {
            Box::pin(async move { stock::adjust(txn, id, delta).await })
        })
        .await?;

        info!(
            ingredient_id = id,
            delta = %change.delta(),
            stock_after = %change.stock_after,
            reason = input.reason.as_deref().unwrap_or(""),
            "Stock adjusted"
        );

        Ok(StockAdjustmentView {
            ingredient_id: id,
            stock_before: change.stock_before,
            stock_after: change.stock_after,
            reason: input.reason,
        })
    }
}

pub(crate) async fn require_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: i64,
) -> Result<unit::Model, ServiceError> {
    UnitEntity::find_by_id(unit_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Unit with ID {} not found", unit_id)))
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Ingredient with ID {} not found", id))
}

fn duplicate_slug(slug: &str) -> String {
    format!("An ingredient with slug '{}' already exists", slug)
}
