use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::run_in_transaction,
    entities::{
        ingredient::{self, Entity as IngredientEntity},
        menu::{self, Entity as MenuEntity},
        menu_ingredient::{self, Entity as MenuIngredientEntity},
        transaction_item,
        unit::{self, Entity as UnitEntity},
    },
    errors::ServiceError,
    services::{
        ingredients::require_unit,
        slug::slug_for,
        validation::{non_negative, not_blank, positive},
    },
};

/// One recipe line in a menu body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecipeLineInput {
    #[schema(example = 3)]
    pub ingredient_id: i64,
    /// Amount consumed per portion sold
    #[validate(custom = "positive")]
    #[schema(value_type = String, example = "0.25")]
    pub quantity: Decimal,
    #[schema(example = 1)]
    pub unit_id: i64,
}

/// Body for creating or replacing a menu and its recipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MenuInput {
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    #[schema(example = "Nasi Goreng Spesial")]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "menus/nasi-goreng.jpg")]
    pub image: String,
    #[validate(custom = "non_negative")]
    #[schema(value_type = String, example = "25000.00")]
    pub price: Decimal,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    #[validate]
    pub ingredients: Vec<RecipeLineInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeLineView {
    pub id: i64,
    pub ingredient_id: i64,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    pub unit_id: i64,
    pub ingredient: Option<IngredientRef>,
    pub unit: Option<UnitRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub ingredients: Vec<RecipeLineView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menus and their recipes.
#[derive(Clone)]
pub struct MenuService {
    db: Arc<DatabaseConnection>,
}

impl MenuService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<MenuView>, ServiceError> {
        let db = &*self.db;
        let menus = MenuEntity::find()
            .order_by_asc(menu::Column::Name)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to list menus: {}", e);
                ServiceError::db_error(e)
            })?;
        load_views(db, menus).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<MenuView, ServiceError> {
        let db = &*self.db;
        let menu = find_menu(db, id).await?;
        let mut views = load_views(db, vec![menu]).await?;
        views.pop().ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: MenuInput) -> Result<MenuView, ServiceError> {
        input.validate()?;
        let slug = slug_for(&input.name)?;

        let menu = run_in_transaction(&self.db, "menus.create", move |txn| {
            Box::pin(async move {
                check_recipe_references(txn, &input.ingredients).await?;

                let menu = menu::ActiveModel {
                    name: Set(input.name.trim().to_string()),
                    slug: Set(slug.clone()),
                    description: Set(input.description),
                    image: Set(input.image),
                    price: Set(input.price),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(|e| ServiceError::from_write(e, duplicate_slug(&slug)))?;

                insert_recipe(txn, menu.id, &input.ingredients).await?;
                Ok(menu)
            })
        })
        .await?;

        info!(menu_id = menu.id, slug = %menu.slug, price = %menu.price, "Menu created");
        self.get(menu.id).await
    }

    /// Replaces the menu's fields and its whole recipe.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, input: MenuInput) -> Result<MenuView, ServiceError> {
        input.validate()?;
        let slug = slug_for(&input.name)?;

        run_in_transaction(&self.db, "menus.update", move |txn| {
            Box::pin(async move {
                let existing = find_menu(txn, id).await?;
                check_recipe_references(txn, &input.ingredients).await?;

                let mut active: menu::ActiveModel = existing.into();
                active.name = Set(input.name.trim().to_string());
                active.slug = Set(slug.clone());
                active.description = Set(input.description);
                active.image = Set(input.image);
                active.price = Set(input.price);
                active
                    .update(txn)
                    .await
                    .map_err(|e| ServiceError::from_write(e, duplicate_slug(&slug)))?;

                MenuIngredientEntity::delete_many()
                    .filter(menu_ingredient::Column::MenuId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                insert_recipe(txn, id, &input.ingredients).await
            })
        })
        .await?;

        info!(menu_id = id, "Menu updated");
        self.get(id).await
    }

    /// Removes the recipe lines and then the menu. Menus that appear on a
    /// sale are kept so the sale history stays resolvable.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        run_in_transaction(&self.db, "menus.delete", move |txn| {
            Box::pin(async move {
                let existing = find_menu(txn, id).await?;

                let sold = transaction_item::Entity::find()
                    .filter(transaction_item::Column::MenuId.eq(id))
                    .count(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                if sold > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "Menu '{}' has been sold and cannot be deleted",
                        existing.name
                    )));
                }

                MenuIngredientEntity::delete_many()
                    .filter(menu_ingredient::Column::MenuId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                existing.delete(txn).await.map_err(ServiceError::db_error)?;
                Ok(())
            })
        })
        .await?;

        info!(menu_id = id, "Menu deleted");
        Ok(())
    }
}

/// Loads a menu with its recipe lines in recipe order.
pub(crate) async fn find_menu_with_recipe<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<(menu::Model, Vec<menu_ingredient::Model>), ServiceError> {
    let menu = find_menu(conn, id).await?;
    let recipe = MenuIngredientEntity::find()
        .filter(menu_ingredient::Column::MenuId.eq(id))
        .order_by_asc(menu_ingredient::Column::Id)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;
    Ok((menu, recipe))
}

async fn find_menu<C: ConnectionTrait>(conn: &C, id: i64) -> Result<menu::Model, ServiceError> {
    MenuEntity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| not_found(id))
}

async fn check_recipe_references<C: ConnectionTrait>(
    conn: &C,
    lines: &[RecipeLineInput],
) -> Result<(), ServiceError> {
    for line in lines {
        IngredientEntity::find_by_id(line.ingredient_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Ingredient with ID {} not found",
                    line.ingredient_id
                ))
            })?;
        require_unit(conn, line.unit_id).await?;
    }
    Ok(())
}

async fn insert_recipe<C: ConnectionTrait>(
    conn: &C,
    menu_id: i64,
    lines: &[RecipeLineInput],
) -> Result<(), ServiceError> {
    for line in lines {
        menu_ingredient::ActiveModel {
            menu_id: Set(menu_id),
            ingredient_id: Set(line.ingredient_id),
            quantity: Set(line.quantity),
            unit_id: Set(line.unit_id),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(ServiceError::db_error)?;
    }
    Ok(())
}

async fn load_views<C: ConnectionTrait>(
    conn: &C,
    menus: Vec<menu::Model>,
) -> Result<Vec<MenuView>, ServiceError> {
    if menus.is_empty() {
        return Ok(Vec::new());
    }

    let menu_ids: Vec<i64> = menus.iter().map(|m| m.id).collect();
    let lines = MenuIngredientEntity::find()
        .filter(menu_ingredient::Column::MenuId.is_in(menu_ids))
        .order_by_asc(menu_ingredient::Column::Id)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let ingredient_ids: HashSet<i64> = lines.iter().map(|l| l.ingredient_id).collect();
    let unit_ids: HashSet<i64> = lines.iter().map(|l| l.unit_id).collect();

    let ingredients: HashMap<i64, ingredient::Model> = IngredientEntity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();
    let units: HashMap<i64, unit::Model> = UnitEntity::find()
        .filter(unit::Column::Id.is_in(unit_ids))
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut by_menu: HashMap<i64, Vec<RecipeLineView>> = HashMap::new();
    for line in lines {
        by_menu.entry(line.menu_id).or_default().push(RecipeLineView {
            id: line.id,
            ingredient_id: line.ingredient_id,
            quantity: line.quantity,
            unit_id: line.unit_id,
            ingredient: ingredients.get(&line.ingredient_id).map(|i| IngredientRef {
                id: i.id,
                name: i.name.clone(),
                slug: i.slug.clone(),
            }),
            unit: units.get(&line.unit_id).map(|u| UnitRef {
                id: u.id,
                name: u.name.clone(),
            }),
        });
    }

    Ok(menus
        .into_iter()
        .map(|menu| MenuView {
            ingredients: by_menu.remove(&menu.id).unwrap_or_default(),
            id: menu.id,
            name: menu.name,
            slug: menu.slug,
            description: menu.description,
            image: menu.image,
            price: menu.price,
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        })
        .collect())
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Menu with ID {} not found", id))
}

fn duplicate_slug(slug: &str) -> String {
    format!("A menu with slug '{}' already exists", slug)
}
