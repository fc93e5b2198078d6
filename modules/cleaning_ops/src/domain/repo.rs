use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{
    BreakAssignment, BreakAssignmentView, CleanerCount, CleaningRecord, GroupCount,
    Inspection, InspectionFilter, InspectionView, RecentPpu, RecordFilter, Role, Task,
    TaskFilter, User, UserUpsert,
};

/// Persistence for accounts.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Users ordered by name, optionally restricted to one role.
    async fn list_users(&self, role: Option<Role>) -> anyhow::Result<Vec<User>>;

    /// Insert `candidate` unless a user with the same case-insensitive name exists.
    /// Either way the stored row is returned; `created` tells which happened.
    async fn insert_or_get_user(&self, candidate: User) -> anyhow::Result<UserUpsert>;
}

/// Persistence for cleaning registrations.
#[async_trait]
pub trait RecordsRepository: Send + Sync {
    /// Newest first, at most `limit` rows.
    async fn list_records(
        &self,
        filter: &RecordFilter,
        limit: u64,
    ) -> anyhow::Result<Vec<CleaningRecord>>;

    async fn find_record(&self, id: Uuid) -> anyhow::Result<Option<CleaningRecord>>;

    async fn insert_record(&self, record: CleaningRecord) -> anyhow::Result<()>;

    /// Distinct (plate, bus number) pairs of one user, most recently used first.
    async fn recent_ppu(&self, user_id: Uuid, limit: u64) -> anyhow::Result<Vec<RecentPpu>>;
}

#[async_trait]
pub trait InspectionsRepository: Send + Sync {
    async fn insert_inspection(&self, inspection: Inspection) -> anyhow::Result<()>;

    async fn list_inspections(
        &self,
        filter: &InspectionFilter,
    ) -> anyhow::Result<Vec<InspectionView>>;
}

#[async_trait]
pub trait TasksRepository: Send + Sync {
    async fn insert_task(&self, task: Task) -> anyhow::Result<()>;

    async fn list_tasks(&self, filter: &TaskFilter, limit: u64) -> anyhow::Result<Vec<Task>>;

    /// Marks the task done. `None` when no task has that id.
    async fn complete_task(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Task>>;
}

#[async_trait]
pub trait BreaksRepository: Send + Sync {
    async fn find_break(&self, user_id: Uuid) -> anyhow::Result<Option<BreakAssignment>>;

    /// Every assignment joined with its user, ordered by user name.
    async fn list_breaks(&self) -> anyhow::Result<Vec<BreakAssignmentView>>;

    /// Insert or replace the single assignment of `user_id`.
    async fn upsert_break(&self, assignment: BreakAssignment) -> anyhow::Result<BreakAssignment>;
}

/// Read-only aggregates for the supervisor views.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Records created at or after `since`.
    async fn count_records_since(&self, since: DateTime<Utc>) -> anyhow::Result<i64>;

    async fn top_cleaners(&self, limit: u64) -> anyhow::Result<Vec<CleanerCount>>;

    async fn count_by_terminal(&self) -> anyhow::Result<Vec<GroupCount>>;

    /// Per cleaning type; both filters are optional.
    async fn count_by_type(&self, filter: &RecordFilter) -> anyhow::Result<Vec<GroupCount>>;

    async fn count_records(&self, filter: &RecordFilter) -> anyhow::Result<i64>;

    /// Records matching `filter` whose stickers / graffiti flag equals `value`.
    async fn count_flag(
        &self,
        filter: &RecordFilter,
        flag: RecordFlag,
        value: bool,
    ) -> anyhow::Result<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFlag {
    StickersRemoved,
    GraffitiRemoved,
}

/// Everything the service needs from storage, behind a single handle.
pub trait CleaningRepository:
    UsersRepository
    + RecordsRepository
    + InspectionsRepository
    + TasksRepository
    + BreaksRepository
    + DashboardRepository
{
}

impl<T> CleaningRepository for T where
    T: UsersRepository
        + RecordsRepository
        + InspectionsRepository
        + TasksRepository
        + BreaksRepository
        + DashboardRepository
{
}
