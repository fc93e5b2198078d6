use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string(Users::Name))
                    .col(string_uniq(Users::NameKey))
                    .col(string(Users::Role))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CleaningRecords::Table)
                    .if_not_exists()
                    .col(uuid(CleaningRecords::Id).primary_key())
                    .col(uuid(CleaningRecords::UserId))
                    .col(string(CleaningRecords::Ppu))
                    .col(string(CleaningRecords::BusNumber))
                    .col(string(CleaningRecords::Terminal))
                    .col(string(CleaningRecords::CleaningType))
                    .col(boolean(CleaningRecords::StickersRemoved).default(false))
                    .col(boolean(CleaningRecords::GraffitiRemoved).default(false))
                    .col(string_null(CleaningRecords::ImageFrontUrl))
                    .col(string_null(CleaningRecords::ImageBackUrl))
                    .col(timestamp_with_time_zone(CleaningRecords::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cleaning_records_user")
                            .from(CleaningRecords::Table, CleaningRecords::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cleaning_records_created_at")
                    .table(CleaningRecords::Table)
                    .if_not_exists()
                    .col(CleaningRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Per-cleaner lists and the recent plate lookup.
        manager
            .create_index(
                Index::create()
                    .name("idx_cleaning_records_user_created_at")
                    .table(CleaningRecords::Table)
                    .if_not_exists()
                    .col(CleaningRecords::UserId)
                    .col(CleaningRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CleaningRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Users {
    Table,
    Id,
    Name,
    NameKey,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(super) enum CleaningRecords {
    Table,
    Id,
    UserId,
    Ppu,
    BusNumber,
    Terminal,
    CleaningType,
    StickersRemoved,
    GraffitiRemoved,
    ImageFrontUrl,
    ImageBackUrl,
    CreatedAt,
}
