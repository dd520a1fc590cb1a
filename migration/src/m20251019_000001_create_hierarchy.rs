use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres | sea_orm::DatabaseBackend::Sqlite => {}
            _ => {
                return Err(DbErr::Custom("Unsupported database backend".to_string()));
            }
        }

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Clients::LastUpdated)
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
                    .table(Contractors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contractors::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contractors::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Contractors::Phone).string_len(50))
                    .col(ColumnDef::new(Contractors::Email).string_len(254))
                    .col(
                        ColumnDef::new(Contractors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Contractors::LastUpdated)
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
                    .table(Farms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Farms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Farms::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Farms::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Farms::ContractorId).uuid())
                    .col(
                        ColumnDef::new(Farms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Farms::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_farms_client_id")
                            .from(Farms::Table, Farms::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_farms_contractor_id")
                            .from(Farms::Table, Farms::ContractorId)
                            .to(Contractors::Table, Contractors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Parcels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parcels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Parcels::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Parcels::FarmId).uuid().not_null())
                    .col(
                        ColumnDef::new(Parcels::AreaHectares)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parcels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Parcels::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parcels_farm_id")
                            .from(Parcels::Table, Parcels::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .check(Expr::col(Parcels::AreaHectares).gt(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientContacts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientContacts::ClientId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClientContacts::Name)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientContacts::Email)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientContacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_contacts_client_id")
                            .from(ClientContacts::Table, ClientContacts::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_farms_client_id")
                    .table(Farms::Table)
                    .col(Farms::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_farms_contractor_id")
                    .table(Farms::Table)
                    .col(Farms::ContractorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parcels_farm_id")
                    .table(Parcels::Table)
                    .col(Parcels::FarmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_contacts_client_id")
                    .table(ClientContacts::Table)
                    .col(ClientContacts::ClientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientContacts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parcels::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Farms::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contractors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Name,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Contractors {
    Table,
    Id,
    Name,
    Phone,
    Email,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Farms {
    Table,
    Id,
    Name,
    ClientId,
    ContractorId,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Parcels {
    Table,
    Id,
    Name,
    FarmId,
    AreaHectares,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum ClientContacts {
    Table,
    Id,
    ClientId,
    Name,
    Email,
    CreatedAt,
}
