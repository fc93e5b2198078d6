use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users_and_records::{CleaningRecords, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inspections::Table)
                    .if_not_exists()
                    .col(uuid(Inspections::Id).primary_key())
                    .col(uuid(Inspections::CleaningId))
                    .col(uuid(Inspections::SupervisorId))
                    .col(boolean(Inspections::Passed))
                    .col(text_null(Inspections::Comments))
                    .col(timestamp_with_time_zone(Inspections::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_record")
                            .from(Inspections::Table, Inspections::CleaningId)
                            .to(CleaningRecords::Table, CleaningRecords::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_supervisor")
                            .from(Inspections::Table, Inspections::SupervisorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inspections_created_at")
                    .table(Inspections::Table)
                    .if_not_exists()
                    .col(Inspections::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(uuid(Tasks::Id).primary_key())
                    .col(uuid(Tasks::CleanerId))
                    .col(uuid(Tasks::SupervisorId))
                    .col(string_null(Tasks::Title))
                    .col(text(Tasks::Content))
                    .col(string(Tasks::Status).default("pending"))
                    .col(timestamp_with_time_zone(Tasks::CreatedAt))
                    .col(timestamp_with_time_zone_null(Tasks::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_cleaner")
                            .from(Tasks::Table, Tasks::CleanerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_supervisor")
                            .from(Tasks::Table, Tasks::SupervisorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Cleaner's task list filtered by status.
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_cleaner_status")
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(Tasks::CleanerId)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BreakAssignments::Table)
                    .if_not_exists()
                    .col(uuid(BreakAssignments::UserId).primary_key())
                    .col(string_null(BreakAssignments::BreakTime))
                    .col(timestamp_with_time_zone(BreakAssignments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_break_assignments_user")
                            .from(BreakAssignments::Table, BreakAssignments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BreakAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inspections::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Inspections {
    Table,
    Id,
    CleaningId,
    SupervisorId,
    Passed,
    Comments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    CleanerId,
    SupervisorId,
    Title,
    Content,
    Status,
    CreatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum BreakAssignments {
    Table,
    UserId,
    BreakTime,
    UpdatedAt,
}
