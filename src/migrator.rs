use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_units_table::Migration),
            Box::new(m20240101_000002_create_ingredients_table::Migration),
            Box::new(m20240101_000003_create_menus_table::Migration),
            Box::new(m20240101_000004_create_menu_ingredients_table::Migration),
            Box::new(m20240101_000005_create_transactions_table::Migration),
            Box::new(m20240101_000006_create_transaction_items_table::Migration),
            Box::new(m20240101_000007_create_stock_reductions_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Units {
    Table,
    Id,
    Name,
    Symbol,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Ingredients {
    Table,
    Id,
    Name,
    Slug,
    Stock,
    UnitId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Menus {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Image,
    Price,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MenuIngredients {
    Table,
    Id,
    MenuId,
    IngredientId,
    Quantity,
    UnitId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    TransactionCode,
    TransactionDate,
    TotalAmount,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TransactionItems {
    Table,
    Id,
    TransactionId,
    MenuId,
    Quantity,
    Price,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StockReductions {
    Table,
    Id,
    TransactionItemId,
    IngredientId,
    UnitId,
    QuantityReduced,
    StockBefore,
    StockAfter,
    CreatedAt,
}

fn id_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .primary_key()
        .auto_increment()
        .not_null()
        .to_owned()
}

fn quantity_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(12, 2).not_null().to_owned()
}

mod m20240101_000001_create_units_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_units_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Units::Table)
                        .if_not_exists()
                        .col(id_column(Units::Id))
                        .col(ColumnDef::new(Units::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Units::Symbol).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Units::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Units::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_units_symbol")
                        .table(Units::Table)
                        .col(Units::Symbol)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Units::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_ingredients_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_ingredients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Ingredients::Table)
                        .if_not_exists()
                        .col(id_column(Ingredients::Id))
                        .col(ColumnDef::new(Ingredients::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Ingredients::Slug).string_len(120).not_null())
                        .col(
                            ColumnDef::new(Ingredients::Stock)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Ingredients::UnitId).big_integer().not_null())
                        .col(
                            ColumnDef::new(Ingredients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Ingredients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ingredients_unit_id")
                                .from(Ingredients::Table, Ingredients::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ingredients_slug")
                        .table(Ingredients::Table)
                        .col(Ingredients::Slug)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Ingredients::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_menus_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_menus_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Menus::Table)
                        .if_not_exists()
                        .col(id_column(Menus::Id))
                        .col(ColumnDef::new(Menus::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Menus::Slug).string_len(120).not_null())
                        .col(ColumnDef::new(Menus::Description).text().null())
                        .col(ColumnDef::new(Menus::Image).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Menus::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Menus::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Menus::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menus_slug")
                        .table(Menus::Table)
                        .col(Menus::Slug)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Menus::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_menu_ingredients_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_menu_ingredients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuIngredients::Table)
                        .if_not_exists()
                        .col(id_column(MenuIngredients::Id))
                        .col(
                            ColumnDef::new(MenuIngredients::MenuId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuIngredients::IngredientId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(quantity_column(MenuIngredients::Quantity))
                        .col(
                            ColumnDef::new(MenuIngredients::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MenuIngredients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_ingredients_menu_id")
                                .from(MenuIngredients::Table, MenuIngredients::MenuId)
                                .to(Menus::Table, Menus::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_ingredients_ingredient_id")
                                .from(MenuIngredients::Table, MenuIngredients::IngredientId)
                                .to(Ingredients::Table, Ingredients::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menu_ingredients_unit_id")
                                .from(MenuIngredients::Table, MenuIngredients::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menu_ingredients_menu_id")
                        .table(MenuIngredients::Table)
                        .col(MenuIngredients::MenuId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuIngredients::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000005_create_transactions_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(id_column(Transactions::Id))
                        .col(
                            ColumnDef::new(Transactions::TransactionCode)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::TransactionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Transactions::Notes).text().null())
                        .col(
                            ColumnDef::new(Transactions::Status)
                                .string_len(20)
                                .not_null()
                                .default("completed"),
                        )
                        .col(
                            ColumnDef::new(Transactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Transactions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_transaction_code")
                        .table(Transactions::Table)
                        .col(Transactions::TransactionCode)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_transaction_date")
                        .table(Transactions::Table)
                        .col(Transactions::TransactionDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000006_create_transaction_items_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_transaction_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TransactionItems::Table)
                        .if_not_exists()
                        .col(id_column(TransactionItems::Id))
                        .col(
                            ColumnDef::new(TransactionItems::TransactionId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionItems::MenuId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionItems::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transaction_items_transaction_id")
                                .from(TransactionItems::Table, TransactionItems::TransactionId)
                                .to(Transactions::Table, Transactions::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transaction_items_menu_id")
                                .from(TransactionItems::Table, TransactionItems::MenuId)
                                .to(Menus::Table, Menus::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transaction_items_transaction_id")
                        .table(TransactionItems::Table)
                        .col(TransactionItems::TransactionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransactionItems::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000007_create_stock_reductions_table {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_stock_reductions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockReductions::Table)
                        .if_not_exists()
                        .col(id_column(StockReductions::Id))
                        .col(
                            ColumnDef::new(StockReductions::TransactionItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockReductions::IngredientId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockReductions::UnitId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(quantity_column(StockReductions::QuantityReduced))
                        .col(quantity_column(StockReductions::StockBefore))
                        .col(quantity_column(StockReductions::StockAfter))
                        .col(
                            ColumnDef::new(StockReductions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_reductions_transaction_item_id")
                                .from(
                                    StockReductions::Table,
                                    StockReductions::TransactionItemId,
                                )
                                .to(TransactionItems::Table, TransactionItems::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_reductions_ingredient_id")
                                .from(StockReductions::Table, StockReductions::IngredientId)
                                .to(Ingredients::Table, Ingredients::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_reductions_unit_id")
                                .from(StockReductions::Table, StockReductions::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_reductions_ingredient_id")
                        .table(StockReductions::Table)
                        .col(StockReductions::IngredientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockReductions::Table).to_owned())
                .await
        }
    }
}
