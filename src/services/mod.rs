// Catalog
pub mod ingredients;
pub mod menus;
pub mod units;

// Stock ledger and sales
pub mod stock;
pub mod transactions;

// Reporting
pub mod reports;

// Bootstrap data
pub mod seeder;

// Shared helpers
pub mod slug;
pub mod validation;
