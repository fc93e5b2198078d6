use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account role. Stored and transmitted as `CLEANER` / `SUPERVISOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Cleaner,
    Supervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cleaner => "CLEANER",
            Role::Supervisor => "SUPERVISOR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "CLEANER" => Some(Role::Cleaner),
            "SUPERVISOR" => Some(Role::Supervisor),
            _ => None,
        }
    }
}

/// Bus terminals where cleaning happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    ElRoble,
    LaReina,
    MariaAngelica,
    ElDescanso,
}

impl Terminal {
    pub const ALL: [Terminal; 4] = [
        Terminal::ElRoble,
        Terminal::LaReina,
        Terminal::MariaAngelica,
        Terminal::ElDescanso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Terminal::ElRoble => "EL ROBLE",
            Terminal::LaReina => "LA REINA",
            Terminal::MariaAngelica => "MARIA ANGELICA",
            Terminal::ElDescanso => "EL DESCANSO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningType {
    Barrido,
    BarridoTrapeado,
    Full,
}

impl CleaningType {
    pub const ALL: [CleaningType; 3] = [
        CleaningType::Barrido,
        CleaningType::BarridoTrapeado,
        CleaningType::Full,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningType::Barrido => "BARRIDO",
            CleaningType::BarridoTrapeado => "BARRIDO + TRAPEADO",
            CleaningType::Full => "FULL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pending" => Some(TaskStatus::Pending),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a create-or-get on users.
#[derive(Debug, Clone)]
pub struct UserUpsert {
    pub user: User,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ppu: String,
    pub bus_number: String,
    pub terminal: String,
    pub cleaning_type: String,
    pub stickers_removed: bool,
    pub graffiti_removed: bool,
    pub image_front_url: Option<String>,
    pub image_back_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct NewCleaningRecord {
    pub user_id: Uuid,
    pub ppu: String,
    pub bus_number: String,
    pub terminal: Terminal,
    pub cleaning_type: CleaningType,
    pub stickers_removed: bool,
    pub graffiti_removed: bool,
    pub image_front: Option<UploadedFile>,
    pub image_back: Option<UploadedFile>,
}

/// Inclusive creation-time window; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub user_id: Option<Uuid>,
    pub terminal: Option<String>,
    pub cleaning_type: Option<String>,
    /// Case-insensitive substring of the plate.
    pub ppu: Option<String>,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPpu {
    pub ppu: String,
    pub bus_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub id: Uuid,
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inspection joined with its record and the supervisor's name.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionView {
    pub inspection: Inspection,
    pub ppu: String,
    pub terminal: String,
    pub cleaner_id: Uuid,
    pub supervisor_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInspection {
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InspectionFilter {
    pub cleaner_id: Option<Uuid>,
    pub passed: Option<bool>,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub cleaner_id: Uuid,
    pub supervisor_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub cleaner_id: Uuid,
    pub supervisor_id: Uuid,
    pub title: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub cleaner_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakAssignment {
    pub user_id: Uuid,
    pub break_time: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakAssignmentView {
    pub assignment: BreakAssignment,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub today: i64,
    pub week: i64,
    pub month: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerCount {
    pub user_id: Uuid,
    pub name: String,
    pub total: i64,
}

/// Count of records per distinct value of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub totals: Totals,
    pub top_cleaners: Vec<CleanerCount>,
    pub by_terminal: Vec<GroupCount>,
    pub by_type: Vec<GroupCount>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagCounts {
    pub yes: i64,
    pub no: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanerReport {
    pub total: i64,
    pub by_type: Vec<GroupCount>,
    pub stickers: FlagCounts,
    pub graffiti: FlagCounts,
}
