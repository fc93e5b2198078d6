//! SeaORM-backed implementation of the domain repository ports.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction. Filters are built with `Condition` and column expressions.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::contract::model::{
    BreakAssignment, BreakAssignmentView, CleanerCount, CleaningRecord, DateRange, GroupCount,
    Inspection, InspectionFilter, InspectionView, RecentPpu, RecordFilter, Role, Task,
    TaskFilter, TaskStatus, User, UserUpsert,
};
use crate::domain::repo::{
    BreaksRepository, DashboardRepository, InspectionsRepository, RecordFlag,
    RecordsRepository, TasksRepository, UsersRepository,
};
use crate::infra::storage::entity::{break_assignment, cleaning_record, inspection, task, user};
use crate::infra::storage::mapper;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn range_condition<T: ColumnTrait>(col: T, range: &DateRange) -> Condition {
    let mut cond = Condition::all();
    if let Some(start) = range.start {
        cond = cond.add(col.gte(start));
    }
    if let Some(end) = range.end {
        cond = cond.add(col.lte(end));
    }
    cond
}

fn record_condition(f: &RecordFilter) -> Condition {
    use cleaning_record::Column;

    let mut cond = range_condition(Column::CreatedAt, &f.range);
    if let Some(user_id) = f.user_id {
        cond = cond.add(Column::UserId.eq(user_id));
    }
    if let Some(terminal) = &f.terminal {
        cond = cond.add(Column::Terminal.eq(terminal.as_str()));
    }
    if let Some(kind) = &f.cleaning_type {
        cond = cond.add(Column::CleaningType.eq(kind.as_str()));
    }
    if let Some(ppu) = &f.ppu {
        let pattern = format!("%{}%", escape_like(&ppu.to_lowercase()));
        cond = cond.add(
            Expr::expr(Func::lower(Expr::col((cleaning_record::Entity, Column::Ppu))))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }
    cond
}

fn to_i64(n: u64) -> anyhow::Result<i64> {
    i64::try_from(n).context("row count out of range")
}

#[derive(Debug, FromQueryResult)]
struct PpuRow {
    ppu: String,
    bus_number: String,
}

#[derive(Debug, FromQueryResult)]
struct InspectionRow {
    id: Uuid,
    cleaning_id: Uuid,
    supervisor_id: Uuid,
    passed: bool,
    comments: Option<String>,
    created_at: DateTime<Utc>,
    ppu: String,
    terminal: String,
    cleaner_id: Uuid,
    supervisor_name: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct BreakRow {
    user_id: Uuid,
    break_time: Option<String>,
    updated_at: DateTime<Utc>,
    name: String,
    role: String,
}

#[derive(Debug, FromQueryResult)]
struct CleanerRow {
    user_id: Uuid,
    name: String,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct GroupRow {
    key: String,
    total: i64,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    /// `SELECT col AS key, COUNT(id) AS total ... GROUP BY col`, largest first.
    async fn group_count(
        &self,
        col: cleaning_record::Column,
        cond: Condition,
    ) -> anyhow::Result<Vec<GroupCount>> {
        let rows = cleaning_record::Entity::find()
            .select_only()
            .column_as(col, "key")
            .column_as(cleaning_record::Column::Id.count(), "total")
            .filter(cond)
            .group_by(col)
            .order_by_desc(cleaning_record::Column::Id.count())
            .order_by_asc(col)
            .into_model::<GroupRow>()
            .all(&self.conn)
            .await
            .context("group_count failed")?;
        Ok(rows
            .into_iter()
            .map(|r| GroupCount {
                key: r.key,
                total: r.total,
            })
            .collect())
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_users(&self, role: Option<Role>) -> anyhow::Result<Vec<User>> {
        let mut q = user::Entity::find().order_by_asc(user::Column::Name);
        if let Some(role) = role {
            q = q.filter(user::Column::Role.eq(role.as_str()));
        }
        let rows = q.all(&self.conn).await.context("list_users failed")?;
        rows.into_iter().map(mapper::user_to_contract).collect()
    }

    async fn insert_or_get_user(&self, candidate: User) -> anyhow::Result<UserUpsert> {
        let key = user::name_key(&candidate.name);
        let am = user::ActiveModel {
            id: Set(candidate.id),
            name: Set(candidate.name.clone()),
            name_key: Set(key.clone()),
            role: Set(candidate.role.as_str().to_owned()),
            created_at: Set(candidate.created_at),
        };
        let inserted = user::Entity::insert(am)
            .on_conflict(
                OnConflict::column(user::Column::NameKey)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("insert_or_get_user insert failed")?;

        let row = user::Entity::find()
            .filter(user::Column::NameKey.eq(key))
            .one(&self.conn)
            .await
            .context("insert_or_get_user read failed")?
            .ok_or_else(|| anyhow!("user '{}' missing after insert", candidate.name))?;

        Ok(UserUpsert {
            user: mapper::user_to_contract(row)?,
            created: inserted > 0,
        })
    }
}

#[async_trait]
impl<C> RecordsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_records(
        &self,
        filter: &RecordFilter,
        limit: u64,
    ) -> anyhow::Result<Vec<CleaningRecord>> {
        let rows = cleaning_record::Entity::find()
            .filter(record_condition(filter))
            .order_by_desc(cleaning_record::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list_records failed")?;
        Ok(rows.into_iter().map(mapper::record_to_contract).collect())
    }

    async fn find_record(&self, id: Uuid) -> anyhow::Result<Option<CleaningRecord>> {
        let found = cleaning_record::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_record failed")?;
        Ok(found.map(mapper::record_to_contract))
    }

    async fn insert_record(&self, r: CleaningRecord) -> anyhow::Result<()> {
        let m = cleaning_record::ActiveModel {
            id: Set(r.id),
            user_id: Set(r.user_id),
            ppu: Set(r.ppu),
            bus_number: Set(r.bus_number),
            terminal: Set(r.terminal),
            cleaning_type: Set(r.cleaning_type),
            stickers_removed: Set(r.stickers_removed),
            graffiti_removed: Set(r.graffiti_removed),
            image_front_url: Set(r.image_front_url),
            image_back_url: Set(r.image_back_url),
            created_at: Set(r.created_at),
        };
        m.insert(&self.conn).await.context("insert_record failed")?;
        Ok(())
    }

    async fn recent_ppu(&self, user_id: Uuid, limit: u64) -> anyhow::Result<Vec<RecentPpu>> {
        use cleaning_record::Column;

        let rows = cleaning_record::Entity::find()
            .select_only()
            .column(Column::Ppu)
            .column(Column::BusNumber)
            .filter(Column::UserId.eq(user_id))
            .group_by(Column::Ppu)
            .group_by(Column::BusNumber)
            .order_by_desc(Column::CreatedAt.max())
            .limit(limit)
            .into_model::<PpuRow>()
            .all(&self.conn)
            .await
            .context("recent_ppu failed")?;
        Ok(rows
            .into_iter()
            .map(|r| RecentPpu {
                ppu: r.ppu,
                bus_number: r.bus_number,
            })
            .collect())
    }
}

#[async_trait]
impl<C> InspectionsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert_inspection(&self, i: Inspection) -> anyhow::Result<()> {
        let m = inspection::ActiveModel {
            id: Set(i.id),
            cleaning_id: Set(i.cleaning_id),
            supervisor_id: Set(i.supervisor_id),
            passed: Set(i.passed),
            comments: Set(i.comments),
            created_at: Set(i.created_at),
        };
        m.insert(&self.conn)
            .await
            .context("insert_inspection failed")?;
        Ok(())
    }

    async fn list_inspections(
        &self,
        filter: &InspectionFilter,
    ) -> anyhow::Result<Vec<InspectionView>> {
        use inspection::Column;

        let mut cond = range_condition(Column::CreatedAt, &filter.range);
        if let Some(cleaner_id) = filter.cleaner_id {
            cond = cond.add(cleaning_record::Column::UserId.eq(cleaner_id));
        }
        if let Some(passed) = filter.passed {
            cond = cond.add(Column::Passed.eq(passed));
        }

        let rows = inspection::Entity::find()
            .select_only()
            .columns([
                Column::Id,
                Column::CleaningId,
                Column::SupervisorId,
                Column::Passed,
                Column::Comments,
                Column::CreatedAt,
            ])
            .column_as(cleaning_record::Column::Ppu, "ppu")
            .column_as(cleaning_record::Column::Terminal, "terminal")
            .column_as(cleaning_record::Column::UserId, "cleaner_id")
            .column_as(user::Column::Name, "supervisor_name")
            .join(JoinType::InnerJoin, inspection::Relation::CleaningRecord.def())
            .join(JoinType::LeftJoin, inspection::Relation::Supervisor.def())
            .filter(cond)
            .order_by_desc(Column::CreatedAt)
            .into_model::<InspectionRow>()
            .all(&self.conn)
            .await
            .context("list_inspections failed")?;

        Ok(rows
            .into_iter()
            .map(|r| InspectionView {
                inspection: Inspection {
                    id: r.id,
                    cleaning_id: r.cleaning_id,
                    supervisor_id: r.supervisor_id,
                    passed: r.passed,
                    comments: r.comments,
                    created_at: r.created_at,
                },
                ppu: r.ppu,
                terminal: r.terminal,
                cleaner_id: r.cleaner_id,
                supervisor_name: r.supervisor_name,
            })
            .collect())
    }
}

#[async_trait]
impl<C> TasksRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert_task(&self, t: Task) -> anyhow::Result<()> {
        let m = task::ActiveModel {
            id: Set(t.id),
            cleaner_id: Set(t.cleaner_id),
            supervisor_id: Set(t.supervisor_id),
            title: Set(t.title),
            content: Set(t.content),
            status: Set(t.status.as_str().to_owned()),
            created_at: Set(t.created_at),
            completed_at: Set(t.completed_at),
        };
        m.insert(&self.conn).await.context("insert_task failed")?;
        Ok(())
    }

    async fn list_tasks(&self, filter: &TaskFilter, limit: u64) -> anyhow::Result<Vec<Task>> {
        let mut cond = range_condition(task::Column::CreatedAt, &filter.range);
        if let Some(cleaner_id) = filter.cleaner_id {
            cond = cond.add(task::Column::CleanerId.eq(cleaner_id));
        }
        if let Some(status) = filter.status {
            cond = cond.add(task::Column::Status.eq(status.as_str()));
        }
        let rows = task::Entity::find()
            .filter(cond)
            .order_by_desc(task::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list_tasks failed")?;
        rows.into_iter().map(mapper::task_to_contract).collect()
    }

    async fn complete_task(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<Option<Task>> {
        let res = task::Entity::update_many()
            .col_expr(task::Column::Status, Expr::value(TaskStatus::Done.as_str()))
            .col_expr(task::Column::CompletedAt, Expr::value(at))
            .filter(task::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("complete_task update failed")?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        let row = task::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("complete_task read failed")?;
        row.map(mapper::task_to_contract).transpose()
    }
}

#[async_trait]
impl<C> BreaksRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_break(&self, user_id: Uuid) -> anyhow::Result<Option<BreakAssignment>> {
        let found = break_assignment::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("find_break failed")?;
        Ok(found.map(mapper::break_to_contract))
    }

    async fn list_breaks(&self) -> anyhow::Result<Vec<BreakAssignmentView>> {
        use break_assignment::Column;

        let rows = break_assignment::Entity::find()
            .select_only()
            .columns([Column::UserId, Column::BreakTime, Column::UpdatedAt])
            .column_as(user::Column::Name, "name")
            .column_as(user::Column::Role, "role")
            .join(JoinType::InnerJoin, break_assignment::Relation::User.def())
            .order_by_asc(user::Column::Name)
            .into_model::<BreakRow>()
            .all(&self.conn)
            .await
            .context("list_breaks failed")?;

        rows.into_iter()
            .map(|r| {
                Ok(BreakAssignmentView {
                    role: mapper::parse_role(&r.role)?,
                    name: r.name,
                    assignment: BreakAssignment {
                        user_id: r.user_id,
                        break_time: r.break_time,
                        updated_at: r.updated_at,
                    },
                })
            })
            .collect()
    }

    async fn upsert_break(&self, b: BreakAssignment) -> anyhow::Result<BreakAssignment> {
        use break_assignment::Column;

        let am = break_assignment::ActiveModel {
            user_id: Set(b.user_id),
            break_time: Set(b.break_time),
            updated_at: Set(b.updated_at),
        };
        break_assignment::Entity::insert(am)
            .on_conflict(
                OnConflict::column(Column::UserId)
                    .update_columns([Column::BreakTime, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("upsert_break failed")?;

        self.find_break(b.user_id)
            .await?
            .ok_or_else(|| anyhow!("break assignment for {} missing after upsert", b.user_id))
    }
}

#[async_trait]
impl<C> DashboardRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn count_records_since(&self, since: DateTime<Utc>) -> anyhow::Result<i64> {
        let n = cleaning_record::Entity::find()
            .filter(cleaning_record::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("count_records_since failed")?;
        to_i64(n)
    }

    async fn top_cleaners(&self, limit: u64) -> anyhow::Result<Vec<CleanerCount>> {
        use cleaning_record::Column;

        let rows = cleaning_record::Entity::find()
            .select_only()
            .column(Column::UserId)
            .column_as(user::Column::Name, "name")
            .column_as(Column::Id.count(), "total")
            .join(JoinType::InnerJoin, cleaning_record::Relation::User.def())
            .group_by(Column::UserId)
            .group_by(user::Column::Name)
            .order_by_desc(Column::Id.count())
            .order_by_asc(user::Column::Name)
            .limit(limit)
            .into_model::<CleanerRow>()
            .all(&self.conn)
            .await
            .context("top_cleaners failed")?;
        Ok(rows
            .into_iter()
            .map(|r| CleanerCount {
                user_id: r.user_id,
                name: r.name,
                total: r.total,
            })
            .collect())
    }

    async fn count_by_terminal(&self) -> anyhow::Result<Vec<GroupCount>> {
        self.group_count(cleaning_record::Column::Terminal, Condition::all())
            .await
    }

    async fn count_by_type(&self, filter: &RecordFilter) -> anyhow::Result<Vec<GroupCount>> {
        self.group_count(
            cleaning_record::Column::CleaningType,
            record_condition(filter),
        )
        .await
    }

    async fn count_records(&self, filter: &RecordFilter) -> anyhow::Result<i64> {
        let n = cleaning_record::Entity::find()
            .filter(record_condition(filter))
            .count(&self.conn)
            .await
            .context("count_records failed")?;
        to_i64(n)
    }

    async fn count_flag(
        &self,
        filter: &RecordFilter,
        flag: RecordFlag,
        value: bool,
    ) -> anyhow::Result<i64> {
        let col = match flag {
            RecordFlag::StickersRemoved => cleaning_record::Column::StickersRemoved,
            RecordFlag::GraffitiRemoved => cleaning_record::Column::GraffitiRemoved,
        };
        let n = cleaning_record::Entity::find()
            .filter(record_condition(filter))
            .filter(col.eq(value))
            .count(&self.conn)
            .await
            .context("count_flag failed")?;
        to_i64(n)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("ab%c_d"), "ab\\%c\\_d");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("ABCD12"), "ABCD12");
    }
}
