use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActiveIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActiveIngredients::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActiveIngredients::Name)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ActiveIngredients::Description).text())
                    .col(
                        ColumnDef::new(ActiveIngredients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Products::UnitOfMeasure)
                            .string_len(20)
                            .not_null()
                            .default("L"),
                    )
                    .col(ColumnDef::new(Products::Description).text())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Products::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductActiveIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductActiveIngredients::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductActiveIngredients::ActiveIngredientId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProductActiveIngredients::ProductId)
                            .col(ProductActiveIngredients::ActiveIngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_active_ingredients_product_id")
                            .from(
                                ProductActiveIngredients::Table,
                                ProductActiveIngredients::ProductId,
                            )
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_active_ingredients_active_ingredient_id")
                            .from(
                                ProductActiveIngredients::Table,
                                ProductActiveIngredients::ActiveIngredientId,
                            )
                            .to(ActiveIngredients::Table, ActiveIngredients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ProductActiveIngredients::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ActiveIngredients::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ActiveIngredients {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    UnitOfMeasure,
    Description,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum ProductActiveIngredients {
    Table,
    ProductId,
    ActiveIngredientId,
}
