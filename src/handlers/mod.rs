pub mod common;
pub mod health;
pub mod ingredients;
pub mod menus;
pub mod reports;
pub mod transactions;
pub mod units;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        ingredients::IngredientService,
        menus::MenuService,
        reports::ReportService,
        transactions::{DatedCodeGenerator, TransactionCodeGenerator, TransactionService},
        units::UnitService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub units: Arc<UnitService>,
    pub ingredients: Arc<IngredientService>,
    pub menus: Arc<MenuService>,
    pub transactions: Arc<TransactionService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self::with_code_generator(db_pool, config, Arc::new(DatedCodeGenerator))
    }

    /// Same as [`AppServices::new`] with a custom transaction code source.
    pub fn with_code_generator(
        db_pool: Arc<DbPool>,
        config: &AppConfig,
        codes: Arc<dyn TransactionCodeGenerator>,
    ) -> Self {
        Self {
            units: Arc::new(UnitService::new(db_pool.clone())),
            ingredients: Arc::new(IngredientService::new(db_pool.clone())),
            menus: Arc::new(MenuService::new(db_pool.clone())),
            transactions: Arc::new(TransactionService::with_code_generator(
                db_pool.clone(),
                codes,
            )),
            reports: Arc::new(ReportService::new(db_pool, config.report_default_days)),
        }
    }
}
