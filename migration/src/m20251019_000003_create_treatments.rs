use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Treatments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Treatments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Treatments::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Treatments::FarmId).uuid())
                    .col(
                        ColumnDef::new(Treatments::ScopeLevel)
                            .string_len(20)
                            .not_null()
                            .default("client"),
                    )
                    .col(
                        ColumnDef::new(Treatments::Status)
                            .string_len(20)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(Treatments::Notes).text().not_null().default(""))
                    .col(ColumnDef::new(Treatments::PlannedDate).date())
                    .col(ColumnDef::new(Treatments::CommunicatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Treatments::ExecutedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Treatments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Treatments::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatments_client_id")
                            .from(Treatments::Table, Treatments::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatments_farm_id")
                            .from(Treatments::Table, Treatments::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TreatmentParcels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TreatmentParcels::TreatmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TreatmentParcels::ParcelId).uuid().not_null())
                    .col(
                        ColumnDef::new(TreatmentParcels::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(TreatmentParcels::TreatmentId)
                            .col(TreatmentParcels::ParcelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatment_parcels_treatment_id")
                            .from(TreatmentParcels::Table, TreatmentParcels::TreatmentId)
                            .to(Treatments::Table, Treatments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatment_parcels_parcel_id")
                            .from(TreatmentParcels::Table, TreatmentParcels::ParcelId)
                            .to(Parcels::Table, Parcels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TreatmentProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TreatmentProducts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TreatmentProducts::TreatmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TreatmentProducts::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TreatmentProducts::DosagePerHectare)
                            .decimal_len(10, 3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TreatmentProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatment_products_treatment_id")
                            .from(TreatmentProducts::Table, TreatmentProducts::TreatmentId)
                            .to(Treatments::Table, Treatments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatment_products_product_id")
                            .from(TreatmentProducts::Table, TreatmentProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .check(Expr::col(TreatmentProducts::DosagePerHectare).gt(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_treatment_products_treatment_product")
                    .table(TreatmentProducts::Table)
                    .col(TreatmentProducts::TreatmentId)
                    .col(TreatmentProducts::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TreatmentCommunications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TreatmentCommunications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TreatmentCommunications::TreatmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TreatmentCommunications::SentAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TreatmentCommunications::Recipients)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TreatmentCommunications::Subject)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TreatmentCommunications::AttachmentName).string_len(255))
                    .col(
                        ColumnDef::new(TreatmentCommunications::Delivered)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TreatmentCommunications::Error).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treatment_communications_treatment_id")
                            .from(
                                TreatmentCommunications::Table,
                                TreatmentCommunications::TreatmentId,
                            )
                            .to(Treatments::Table, Treatments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_treatments_client_id", Treatments::ClientId),
            ("idx_treatments_farm_id", Treatments::FarmId),
            ("idx_treatments_status", Treatments::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Treatments::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_treatment_parcels_parcel_id")
                    .table(TreatmentParcels::Table)
                    .col(TreatmentParcels::ParcelId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(TreatmentCommunications::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(TreatmentProducts::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(TreatmentParcels::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Treatments::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Farms {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Parcels {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Treatments {
    Table,
    Id,
    ClientId,
    FarmId,
    ScopeLevel,
    Status,
    Notes,
    PlannedDate,
    CommunicatedAt,
    ExecutedAt,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum TreatmentParcels {
    Table,
    TreatmentId,
    ParcelId,
    Position,
}

#[derive(DeriveIden)]
enum TreatmentProducts {
    Table,
    Id,
    TreatmentId,
    ProductId,
    DosagePerHectare,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TreatmentCommunications {
    Table,
    Id,
    TreatmentId,
    SentAt,
    Recipients,
    Subject,
    AttachmentName,
    Delivered,
    Error,
}
