//! The only code path that writes `ingredients.stock`.
//!
//! Every function here expects to run inside an open database transaction:
//! the ingredient row is read under an exclusive lock, the new level is
//! checked against zero and written back before the lock is released at
//! commit or rollback.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QuerySelect, Set};
use tracing::{debug, warn};

use crate::entities::ingredient::{self, Entity as IngredientEntity};
use crate::errors::ServiceError;
use crate::services::validation::MAX_AMOUNT;

/// Stock level of one ingredient before and after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub ingredient: ingredient::Model,
    pub stock_before: Decimal,
    pub stock_after: Decimal,
}

impl StockChange {
    pub fn delta(&self) -> Decimal {
        self.stock_after - self.stock_before
    }
}

/// Resulting level after applying `delta`: `InsufficientStock` when it
/// would drop below zero, a validation error when it leaves the column range.
pub fn apply_delta(name: &str, current: Decimal, delta: Decimal) -> Result<Decimal, ServiceError> {
    let next = current
        .checked_add(delta)
        .filter(|next| *next <= MAX_AMOUNT)
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Stock for ingredient {} would exceed {}",
                name, MAX_AMOUNT
            ))
        })?;
    if next < Decimal::ZERO {
        return Err(ServiceError::insufficient_stock(name, current, -delta));
    }
    Ok(next)
}

/// `SELECT ... FOR UPDATE` on the ingredient row.
pub async fn lock_ingredient<C: ConnectionTrait>(
    conn: &C,
    ingredient_id: i64,
) -> Result<ingredient::Model, ServiceError> {
    IngredientEntity::find_by_id(ingredient_id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Ingredient with ID {} not found", ingredient_id))
        })
}

/// Consumes `quantity` of an ingredient.
pub async fn reduce<C: ConnectionTrait>(
    conn: &C,
    ingredient_id: i64,
    quantity: Decimal,
) -> Result<StockChange, ServiceError> {
    if quantity < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(format!(
            "quantity to reduce must not be negative, got {}",
            quantity
        )));
    }
    change(conn, ingredient_id, |current, name| {
        if current < quantity {
            warn!(ingredient_id, %current, %quantity, "Rejecting stock reduction");
            return Err(ServiceError::insufficient_stock(name, current, quantity));
        }
        Ok(current - quantity)
    })
    .await
}

/// Puts `quantity` back, as when a sale is reversed.
pub async fn restore<C: ConnectionTrait>(
    conn: &C,
    ingredient_id: i64,
    quantity: Decimal,
) -> Result<StockChange, ServiceError> {
    if quantity < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(format!(
            "quantity to restore must not be negative, got {}",
            quantity
        )));
    }
    change(conn, ingredient_id, |current, name| {
        apply_delta(name, current, quantity)
    })
    .await
}

/// Signed manual correction (deliveries, spoilage, stock takes).
pub async fn adjust<C: ConnectionTrait>(
    conn: &C,
    ingredient_id: i64,
    delta: Decimal,
) -> Result<StockChange, ServiceError> {
    change(conn, ingredient_id, |current, name| apply_delta(name, current, delta)).await
}

/// Overwrites the level, used when an ingredient is edited.
pub async fn set_level<C: ConnectionTrait>(
    conn: &C,
    ingredient_id: i64,
    level: Decimal,
) -> Result<StockChange, ServiceError> {
    change(conn, ingredient_id, |current, name| {
        let delta = level.checked_sub(current).ok_or_else(|| {
            ServiceError::ValidationError(format!("Stock level {} is out of range", level))
        })?;
        apply_delta(name, current, delta)
    })
    .await
}

async fn change<C, F>(conn: &C, ingredient_id: i64, next_level: F) -> Result<StockChange, ServiceError>
where
    C: ConnectionTrait,
    F: FnOnce(Decimal, &str) -> Result<Decimal, ServiceError>,
{
    let locked = lock_ingredient(conn, ingredient_id).await?;
    let stock_before = locked.stock;
    let stock_after = next_level(stock_before, &locked.name)?;

    let mut active: ingredient::ActiveModel = locked.into();
    active.stock = Set(stock_after);
    let updated = active.update(conn).await.map_err(ServiceError::db_error)?;

    debug!(ingredient_id, %stock_before, %stock_after, "Stock updated");

    Ok(StockChange {
        ingredient: updated,
        stock_before,
        stock_after,
    })
}
