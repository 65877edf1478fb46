//! Sale posting and reversal.
//!
//! Posting a sale writes the header, one item per requested menu, and one
//! `stock_reductions` row per recipe line while decrementing ingredient
//! stock. Deleting a sale replays those rows in reverse. Both run inside a
//! single database transaction.

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::DateWindow,
    db::run_in_transaction,
    entities::{
        ingredient,
        menu,
        stock_reduction::{self, Entity as StockReductionEntity},
        transaction::{self, Entity as TransactionEntity, TransactionStatus},
        transaction_item::{self, Entity as TransactionItemEntity},
        unit,
    },
    errors::ServiceError,
    services::{
        menus::{find_menu_with_recipe, IngredientRef, UnitRef},
        stock,
        validation::MAX_TOTAL,
    },
};

/// Produces the human-readable code stored in `transactions.transaction_code`.
pub trait TransactionCodeGenerator: Send + Sync {
    fn generate(&self, now: DateTime<Utc>) -> String;
}

/// `TRX-YYYYMMDD-XXXXXXXX`: the UTC date followed by eight uppercase hex
/// characters of a random v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatedCodeGenerator;

impl TransactionCodeGenerator for DatedCodeGenerator {
    fn generate(&self, now: DateTime<Utc>) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "TRX-{}-{}",
            now.format("%Y%m%d"),
            random[..8].to_ascii_uppercase()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TransactionItemInput {
    #[schema(example = 1)]
    pub menu_id: i64,
    #[validate(range(min = 1))]
    #[schema(example = 2)]
    pub quantity: i32,
}

/// Body for posting a sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionInput {
    #[validate(length(min = 1))]
    #[validate]
    pub items: Vec<TransactionItemInput>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedTransaction {
    pub id: i64,
    #[schema(example = "TRX-20240601-1A2B3C4D")]
    pub transaction_code: String,
    #[schema(value_type = String, example = "50000.00")]
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockReductionView {
    pub id: i64,
    pub ingredient_id: i64,
    pub unit_id: i64,
    #[schema(value_type = String)]
    pub quantity_reduced: Decimal,
    #[schema(value_type = String)]
    pub stock_before: Decimal,
    #[schema(value_type = String)]
    pub stock_after: Decimal,
    pub ingredient: Option<IngredientRef>,
    pub unit: Option<UnitRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionItemView {
    pub id: i64,
    pub menu_id: i64,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    pub menu: Option<MenuSummary>,
    pub stock_reductions: Vec<StockReductionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionView {
    pub id: i64,
    pub transaction_code: String,
    pub transaction_date: DateTime<Utc>,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub status: String,
    pub items: Vec<TransactionItemView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a reversal put back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReversalSummary {
    pub transaction_id: i64,
    pub transaction_code: String,
    pub items_removed: usize,
    pub reductions_reversed: usize,
}

#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
    codes: Arc<dyn TransactionCodeGenerator>,
}

impl fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionService").finish_non_exhaustive()
    }
}

impl TransactionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self::with_code_generator(db, Arc::new(DatedCodeGenerator))
    }

    pub fn with_code_generator(
        db: Arc<DatabaseConnection>,
        codes: Arc<dyn TransactionCodeGenerator>,
    ) -> Self {
        Self { db, codes }
    }

    /// Posts a sale and deducts the stock its menus consume.
    ///
    /// Items are processed in the order given, so a later item sees the
    /// stock already taken by an earlier one. Any failure leaves the store
    /// exactly as it was.
    #[instrument(skip(self, input), fields(items = input.items.len()))]
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> Result<CreatedTransaction, ServiceError> {
        input.validate()?;

        let now = Utc::now();
        let code = self.codes.generate(now);

        let result = run_in_transaction(&self.db, "transactions.create", move |txn| {
            Box::pin(async move {
                let header = transaction::ActiveModel {
                    transaction_code: Set(code.clone()),
                    transaction_date: Set(now),
                    total_amount: Set(Decimal::ZERO),
                    notes: Set(input.notes),
                    status: Set(TransactionStatus::Completed.to_string()),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(|e| {
                    ServiceError::from_write(
                        e,
                        format!("Transaction code {} already exists", code),
                    )
                })?;

                let mut total = Decimal::ZERO;
                for requested in &input.items {
                    let (menu, recipe) = find_menu_with_recipe(txn, requested.menu_id).await?;

                    let item = transaction_item::ActiveModel {
                        transaction_id: Set(header.id),
                        menu_id: Set(menu.id),
                        quantity: Set(requested.quantity),
                        price: Set(menu.price),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                    total = item
                        .price
                        .checked_mul(Decimal::from(item.quantity))
                        .and_then(|subtotal| total.checked_add(subtotal))
                        .filter(|total| *total <= MAX_TOTAL)
                        .ok_or_else(|| {
                            ServiceError::ValidationError(format!(
                                "Transaction total would exceed {}",
                                MAX_TOTAL
                            ))
                        })?;

                    for line in &recipe {
                        let required = line
                            .quantity
                            .checked_mul(Decimal::from(requested.quantity))
                            .ok_or_else(|| {
                                ServiceError::ValidationError(format!(
                                    "Quantity of menu {} is out of range",
                                    menu.id
                                ))
                            })?;
                        let change = stock::reduce(txn, line.ingredient_id, required).await?;

                        stock_reduction::ActiveModel {
                            transaction_item_id: Set(item.id),
                            ingredient_id: Set(line.ingredient_id),
                            unit_id: Set(line.unit_id),
                            quantity_reduced: Set(required),
                            stock_before: Set(change.stock_before),
                            stock_after: Set(change.stock_after),
                            created_at: Set(now),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }
                }

                let mut header: transaction::ActiveModel = header.into();
                header.total_amount = Set(total);
                header.update(txn).await.map_err(ServiceError::db_error)
            })
        })
        .await;

        match result {
            Ok(header) => {
                counter!("pantry.transactions.created", 1);
                info!(
                    transaction_id = header.id,
                    transaction_code = %header.transaction_code,
                    total_amount = %header.total_amount,
                    "Transaction created"
                );
                Ok(CreatedTransaction {
                    id: header.id,
                    transaction_code: header.transaction_code,
                    total_amount: header.total_amount,
                })
            }
            Err(e) => {
                counter!("pantry.transactions.rejected", 1, "reason" => e.kind());
                if e.status_code().is_server_error() {
                    error!(error = %e, "Transaction creation failed");
                } else {
                    warn!(error = %e, "Transaction rejected");
                }
                Err(e)
            }
        }
    }

    /// Deletes a sale and gives back every quantity its ledger rows took.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<ReversalSummary, ServiceError> {
        let summary = run_in_transaction(&self.db, "transactions.delete", move |txn| {
            Box::pin(async move {
                let header = TransactionEntity::find_by_id(id)
                    .lock_exclusive()
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| not_found(id))?;

                let items = TransactionItemEntity::find()
                    .filter(transaction_item::Column::TransactionId.eq(id))
                    .order_by_asc(transaction_item::Column::Id)
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                let item_ids: Vec<i64> = items.iter().map(|item| item.id).collect();

                let reductions = StockReductionEntity::find()
                    .filter(stock_reduction::Column::TransactionItemId.is_in(item_ids.clone()))
                    .order_by_asc(stock_reduction::Column::Id)
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                for reduction in &reductions {
                    stock::restore(txn, reduction.ingredient_id, reduction.quantity_reduced)
                        .await?;
                }

                StockReductionEntity::delete_many()
                    .filter(stock_reduction::Column::TransactionItemId.is_in(item_ids))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                TransactionItemEntity::delete_many()
                    .filter(transaction_item::Column::TransactionId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                let summary = ReversalSummary {
                    transaction_id: header.id,
                    transaction_code: header.transaction_code.clone(),
                    items_removed: items.len(),
                    reductions_reversed: reductions.len(),
                };
                let deleted = header.delete(txn).await.map_err(ServiceError::db_error)?;
                if deleted.rows_affected == 0 {
                    return Err(not_found(id));
                }
                Ok(summary)
            })
        })
        .await?;

        counter!("pantry.transactions.deleted", 1);
        info!(
            transaction_id = id,
            transaction_code = %summary.transaction_code,
            reductions = summary.reductions_reversed,
            "Transaction deleted and stock restored"
        );
        Ok(summary)
    }

    /// Sales whose `transaction_date` falls in `window`, newest first.
    /// Defaults to the current week.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        window: Option<DateWindow>,
    ) -> Result<Vec<TransactionView>, ServiceError> {
        let window = window.unwrap_or_else(|| DateWindow::current_week(Utc::now()));
        list_in_window(&*self.db, window).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<TransactionView, ServiceError> {
        let db = &*self.db;
        let header = TransactionEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| not_found(id))?;
        let mut views = load_views(db, vec![header]).await?;
        views.pop().ok_or_else(|| not_found(id))
    }
}

pub(crate) async fn list_in_window<C: ConnectionTrait>(
    conn: &C,
    window: DateWindow,
) -> Result<Vec<TransactionView>, ServiceError> {
    let headers = TransactionEntity::find()
        .filter(transaction::Column::TransactionDate.gte(window.start))
        .filter(transaction::Column::TransactionDate.lte(window.end))
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::Id)
        .all(conn)
        .await
        .map_err(|e| {
            error!("Failed to list transactions: {}", e);
            ServiceError::db_error(e)
        })?;
    load_views(conn, headers).await
}

async fn load_views<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<transaction::Model>,
) -> Result<Vec<TransactionView>, ServiceError> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let header_ids: Vec<i64> = headers.iter().map(|h| h.id).collect();
    let items = TransactionItemEntity::find()
        .filter(transaction_item::Column::TransactionId.is_in(header_ids))
        .order_by_asc(transaction_item::Column::Id)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let reductions = if item_ids.is_empty() {
        Vec::new()
    } else {
        StockReductionEntity::find()
            .filter(stock_reduction::Column::TransactionItemId.is_in(item_ids))
            .order_by_asc(stock_reduction::Column::Id)
            .all(conn)
            .await
            .map_err(ServiceError::db_error)?
    };

    let menu_ids: HashSet<i64> = items.iter().map(|i| i.menu_id).collect();
    let ingredient_ids: HashSet<i64> = reductions.iter().map(|r| r.ingredient_id).collect();
    let unit_ids: HashSet<i64> = reductions.iter().map(|r| r.unit_id).collect();

    let menus: HashMap<i64, menu::Model> = menu::Entity::find()
        .filter(menu::Column::Id.is_in(menu_ids))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let ingredients: HashMap<i64, ingredient::Model> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();
    let units: HashMap<i64, unit::Model> = unit::Entity::find()
        .filter(unit::Column::Id.is_in(unit_ids))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut reductions_by_item: HashMap<i64, Vec<StockReductionView>> = HashMap::new();
    for r in reductions {
        reductions_by_item
            .entry(r.transaction_item_id)
            .or_default()
            .push(StockReductionView {
                id: r.id,
                ingredient_id: r.ingredient_id,
                unit_id: r.unit_id,
                quantity_reduced: r.quantity_reduced,
                stock_before: r.stock_before,
                stock_after: r.stock_after,
                ingredient: ingredients.get(&r.ingredient_id).map(|i| IngredientRef {
                    id: i.id,
                    name: i.name.clone(),
                    slug: i.slug.clone(),
                }),
                unit: units.get(&r.unit_id).map(|u| UnitRef {
                    id: u.id,
                    name: u.name.clone(),
                }),
            });
    }

    let mut items_by_header: HashMap<i64, Vec<TransactionItemView>> = HashMap::new();
    for item in items {
        let subtotal = item.subtotal();
        items_by_header
            .entry(item.transaction_id)
            .or_default()
            .push(TransactionItemView {
                id: item.id,
                menu_id: item.menu_id,
                quantity: item.quantity,
                price: item.price,
                subtotal,
                menu: menus.get(&item.menu_id).map(|m| MenuSummary {
                    id: m.id,
                    name: m.name.clone(),
                    slug: m.slug.clone(),
                    image: m.image.clone(),
                }),
                stock_reductions: reductions_by_item.remove(&item.id).unwrap_or_default(),
            });
    }

    Ok(headers
        .into_iter()
        .map(|h| TransactionView {
            items: items_by_header.remove(&h.id).unwrap_or_default(),
            id: h.id,
            transaction_code: h.transaction_code,
            transaction_date: h.transaction_date,
            total_amount: h.total_amount,
            notes: h.notes,
            status: h.status,
            created_at: h.created_at,
            updated_at: h.updated_at,
        })
        .collect())
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Transaction with ID {} not found", id))
}
