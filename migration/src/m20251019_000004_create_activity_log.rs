use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLog::ActivityType).string_len(30).not_null())
                    .col(ColumnDef::new(ActivityLog::Title).string_len(200).not_null())
                    .col(ColumnDef::new(ActivityLog::Description).text().not_null().default(""))
                    .col(ColumnDef::new(ActivityLog::RelatedObjectType).string_len(50))
                    .col(ColumnDef::new(ActivityLog::RelatedObjectId).uuid())
                    .col(ColumnDef::new(ActivityLog::RelatedObjectName).string_len(200))
                    .col(ColumnDef::new(ActivityLog::ExtraData).json().not_null())
                    .col(
                        ColumnDef::new(ActivityLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_created_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_activity_type")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::ActivityType)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_related_object")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::RelatedObjectType)
                    .col(ActivityLog::RelatedObjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ActivityLog {
    Table,
    Id,
    ActivityType,
    Title,
    Description,
    RelatedObjectType,
    RelatedObjectId,
    RelatedObjectName,
    ExtraData,
    CreatedAt,
}
