//! SeaORM entities for the kitchen catalog and the sales ledger.

pub mod ingredient;
pub mod menu;
pub mod menu_ingredient;
pub mod stock_reduction;
pub mod transaction;
pub mod transaction_item;
pub mod unit;
