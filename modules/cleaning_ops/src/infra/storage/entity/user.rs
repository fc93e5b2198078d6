use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Trimmed, lowercased name; carries the uniqueness constraint.
    #[sea_orm(unique)]
    pub name_key: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cleaning_record::Entity")]
    CleaningRecord,
}

impl Related<super::cleaning_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CleaningRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
