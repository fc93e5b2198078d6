//! Wire shapes of the cleaning operations API as the client sees them.
//!
//! Rows come back in snake_case; request bodies and query strings go out in camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TERMINALS: [&str; 4] = ["EL ROBLE", "LA REINA", "MARIA ANGELICA", "EL DESCANSO"];
pub const CLEANING_TYPES: [&str; 3] = ["BARRIDO", "BARRIDO + TRAPEADO", "FULL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Cleaner,
    Supervisor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Cleaner => "CLEANER",
            Role::Supervisor => "SUPERVISOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
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

#[derive(Debug, Clone, Deserialize)]
pub struct RecentPpu {
    pub ppu: String,
    pub bus_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Inspection {
    pub id: Uuid,
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inspection joined with its record and supervisor.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionView {
    pub id: Uuid,
    pub cleaning_id: Uuid,
    pub passed: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ppu: String,
    pub terminal: String,
    pub cleaner_id: Uuid,
    pub supervisor_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub cleaner_id: Uuid,
    pub supervisor_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == "done"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakAssignment {
    pub user_id: Uuid,
    pub break_time: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakView {
    pub user_id: Uuid,
    pub break_time: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Totals {
    pub today: i64,
    pub week: i64,
    pub month: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopCleaner {
    pub name: String,
    pub user_id: Uuid,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminalCount {
    pub terminal: String,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeCount {
    pub cleaning_type: String,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub totals: Totals,
    pub top_cleaners: Vec<TopCleaner>,
    pub by_terminal: Vec<TerminalCount>,
    pub by_type: Vec<TypeCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StickerCounts {
    pub stickers_true: i64,
    pub stickers_false: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraffitiCounts {
    pub graffiti_true: i64,
    pub graffiti_false: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanerReport {
    pub total: i64,
    pub by_type: Vec<TypeCount>,
    pub stickers: StickerCounts,
    pub graffiti: GraffitiCounts,
}

// ---- requests ----

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_id: Option<Uuid>,
    /// `"true"` selects passed inspections, anything else failed ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInspection {
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub cleaner_id: Uuid,
    pub supervisor_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Photo attached to a registration.
#[derive(Debug, Clone)]
pub struct Photo {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Multipart registration as sent to `POST /api/registrations`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: Uuid,
    pub ppu: String,
    pub bus_number: String,
    pub terminal: String,
    pub cleaning_type: String,
    pub stickers_removed: bool,
    pub graffiti_removed: bool,
    pub image_front: Option<Photo>,
    pub image_back: Option<Photo>,
}
