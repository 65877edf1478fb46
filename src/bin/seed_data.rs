//! Seed data script - populates the database with a small demo kitchen
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - the standard units of measure
//! - a few stocked ingredients
//! - one menu with its recipe
//!
//! Rows that already exist (by unit name or slug) are left alone, so the
//! script can be run repeatedly.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::info;

use pantry_api::{
    config::{load_config, init_tracing},
    db::{establish_connection_from_app_config, run_migrations},
    entities::{ingredient, menu, unit},
    services::{
        ingredients::{IngredientInput, IngredientService},
        menus::{MenuInput, MenuService, RecipeLineInput},
        seeder::seed_units,
        slug::slug_for,
    },
};

/// `(name, stock, unit symbol)`
fn demo_ingredients() -> [(&'static str, Decimal, &'static str); 3] {
    [
        ("Garam", dec!(5.00), "kg"),
        ("Gula", dec!(10.00), "kg"),
        ("Tepung Terigu", dec!(25.00), "kg"),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config()?;
    init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Pantry API Seed Data ===");
    info!("Connecting to database: {}", cfg.database_url());
    let db = Arc::new(establish_connection_from_app_config(&cfg).await?);
    run_migrations(&db).await?;

    let units = seed_units(db.as_ref()).await?;
    info!("  Inserted {} units", units);

    let ingredients = create_ingredients(&db).await?;
    info!("  Inserted {} ingredients", ingredients);

    let menus = create_menus(&db).await?;
    info!("  Inserted {} menus", menus);

    info!("Seed complete");
    Ok(())
}

async fn unit_id(db: &DatabaseConnection, symbol: &str) -> anyhow::Result<i64> {
    unit::Entity::find()
        .filter(unit::Column::Symbol.eq(symbol))
        .one(db)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| anyhow::anyhow!("unit '{}' missing after seeding", symbol))
}

async fn ingredient_id(db: &DatabaseConnection, name: &str) -> anyhow::Result<Option<i64>> {
    let slug = slug_for(name)?;
    Ok(ingredient::Entity::find()
        .filter(ingredient::Column::Slug.eq(slug))
        .one(db)
        .await?
        .map(|i| i.id))
}

async fn create_ingredients(db: &Arc<DatabaseConnection>) -> anyhow::Result<usize> {
    let service = IngredientService::new(db.clone());
    let mut inserted = 0;

    for (name, stock, symbol) in demo_ingredients() {
        if ingredient_id(db, name).await?.is_some() {
            continue;
        }
        let unit_id = unit_id(db, symbol).await?;
        service
            .create(IngredientInput {
                name: name.to_string(),
                stock,
                unit_id,
            })
            .await?;
        inserted += 1;
    }

    Ok(inserted)
}

async fn create_menus(db: &Arc<DatabaseConnection>) -> anyhow::Result<usize> {
    let name = "Nasi Goreng Spesial";
    let exists = menu::Entity::find()
        .filter(menu::Column::Slug.eq(slug_for(name)?))
        .one(db.as_ref())
        .await?
        .is_some();
    if exists {
        return Ok(0);
    }

    let kg = unit_id(db, "kg").await?;
    let mut recipe = Vec::new();
    for (ingredient, quantity) in [("Garam", dec!(0.01)), ("Gula", dec!(0.02))] {
        let ingredient_id = ingredient_id(db, ingredient)
            .await?
            .ok_or_else(|| anyhow::anyhow!("ingredient '{}' missing", ingredient))?;
        recipe.push(RecipeLineInput {
            ingredient_id,
            quantity,
            unit_id: kg,
        });
    }

    MenuService::new(db.clone())
        .create(MenuInput {
            name: name.to_string(),
            image: "menus/nasi-goreng-spesial.jpg".to_string(),
            price: dec!(25000.00),
            description: Some("Fried rice with egg and house sambal".to_string()),
            ingredients: recipe,
        })
        .await?;

    Ok(1)
}
