use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inspections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cleaning_record::Entity",
        from = "Column::CleaningId",
        to = "super::cleaning_record::Column::Id"
    )]
    CleaningRecord,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SupervisorId",
        to = "super::user::Column::Id"
    )]
    Supervisor,
}

impl Related<super::cleaning_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CleaningRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
