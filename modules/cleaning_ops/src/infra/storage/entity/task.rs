use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cleaner_id: Uuid,
    pub supervisor_id: Uuid,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// `pending` or `done`.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CleanerId",
        to = "super::user::Column::Id"
    )]
    Cleaner,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SupervisorId",
        to = "super::user::Column::Id"
    )]
    Supervisor,
}

impl ActiveModelBehavior for ActiveModel {}
