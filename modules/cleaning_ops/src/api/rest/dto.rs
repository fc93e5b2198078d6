use axum::extract::Multipart;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    BreakAssignment, BreakAssignmentView, CleanerCount, CleanerReport, CleaningRecord,
    CleaningType, DashboardSummary, DateRange, GroupCount, Inspection, InspectionFilter,
    InspectionView, NewCleaningRecord, NewInspection, NewTask, RecentPpu, RecordFilter, Role,
    Task, TaskFilter, TaskStatus, Terminal, UploadedFile, User,
};
use crate::domain::error::DomainError;

// ---------- input parsing helpers ----------

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DomainError::validation(format!("{field} must be a valid UUID")))
}

pub fn optional_uuid(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, DomainError> {
    present(raw).map(|s| parse_uuid(field, s)).transpose()
}

pub fn required_uuid(field: &str, raw: Option<&str>) -> Result<Uuid, DomainError> {
    match present(raw) {
        Some(s) => parse_uuid(field, s),
        None => Err(DomainError::missing_fields(
            format!("{field} is required"),
            vec![field.to_owned()],
        )),
    }
}

/// RFC 3339, or a plain `YYYY-MM-DD` widened to the start or end of that day.
pub fn parse_date_bound(
    field: &str,
    raw: &str,
    end_of_day: bool,
) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        DomainError::validation(format!(
            "{field} must be an RFC 3339 timestamp or a YYYY-MM-DD date"
        ))
    })?;
    let time = if end_of_day {
        date.and_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| DomainError::validation(format!("{field} is out of range")))
}

pub fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, DomainError> {
    Ok(DateRange {
        start: present(start)
            .map(|s| parse_date_bound("startDate", s, false))
            .transpose()?,
        end: present(end)
            .map(|s| parse_date_bound("endDate", s, true))
            .transpose()?,
    })
}

fn parse_role(raw: &str) -> Result<Role, DomainError> {
    Role::parse(raw)
        .ok_or_else(|| DomainError::validation("role must be CLEANER or SUPERVISOR"))
}

fn one_of(field: &str, allowed: impl IntoIterator<Item = &'static str>) -> DomainError {
    let allowed: Vec<&str> = allowed.into_iter().collect();
    DomainError::validation(format!("{field} must be one of: {}", allowed.join(", ")))
}

// ---------- users ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    /// `CLEANER` or `SUPERVISOR`
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            role: u.role.as_str().to_owned(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub name: Option<String>,
    pub role: Option<String>,
}

impl CreateUserReq {
    pub fn parse(&self) -> Result<(String, Role), DomainError> {
        let (Some(name), Some(role)) = (present(self.name.as_deref()), present(self.role.as_deref()))
        else {
            let mut missing = Vec::new();
            if present(self.name.as_deref()).is_none() {
                missing.push("name".to_owned());
            }
            if present(self.role.as_deref()).is_none() {
                missing.push("role".to_owned());
            }
            return Err(DomainError::missing_fields("name and role are required", missing));
        };
        Ok((name.to_owned(), parse_role(role)?))
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// `CLEANER` or `SUPERVISOR`
    pub role: Option<String>,
}

impl ListUsersQuery {
    pub fn role(&self) -> Result<Option<Role>, DomainError> {
        present(self.role.as_deref()).map(parse_role).transpose()
    }
}

// ---------- registrations ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CleaningRecordDto {
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

impl From<CleaningRecord> for CleaningRecordDto {
    fn from(r: CleaningRecord) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            ppu: r.ppu,
            bus_number: r.bus_number,
            terminal: r.terminal,
            cleaning_type: r.cleaning_type,
            stickers_removed: r.stickers_removed,
            graffiti_removed: r.graffiti_removed,
            image_front_url: r.image_front_url,
            image_back_url: r.image_back_url,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRecordsQuery {
    pub user_id: Option<String>,
    pub terminal: Option<String>,
    pub cleaning_type: Option<String>,
    /// Case-insensitive partial plate match.
    pub ppu: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<ListRecordsQuery> for RecordFilter {
    type Error = DomainError;

    fn try_from(q: ListRecordsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: optional_uuid("userId", q.user_id.as_deref())?,
            terminal: present(q.terminal.as_deref()).map(str::to_owned),
            cleaning_type: present(q.cleaning_type.as_deref()).map(str::to_owned),
            ppu: present(q.ppu.as_deref()).map(str::to_owned),
            range: parse_date_range(q.start_date.as_deref(), q.end_date.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecentPpuQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentPpuDto {
    pub ppu: String,
    pub bus_number: String,
}

impl From<RecentPpu> for RecentPpuDto {
    fn from(r: RecentPpu) -> Self {
        Self {
            ppu: r.ppu,
            bus_number: r.bus_number,
        }
    }
}

/// Multipart body of `POST /api/registrations` (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct RegistrationFormSchema {
    pub user_id: String,
    pub ppu: String,
    pub bus_number: String,
    /// `EL ROBLE`, `LA REINA`, `MARIA ANGELICA` or `EL DESCANSO`
    pub terminal: String,
    /// `BARRIDO`, `BARRIDO + TRAPEADO` or `FULL`
    pub cleaning_type: String,
    /// `"true"` or anything else for false
    pub stickers_removed: Option<String>,
    pub graffiti_removed: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image_front: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image_back: Option<Vec<u8>>,
}

/// Fields collected from a registration multipart body.
#[derive(Debug, Default)]
pub struct RegistrationForm {
    pub user_id: Option<String>,
    pub ppu: Option<String>,
    pub bus_number: Option<String>,
    pub terminal: Option<String>,
    pub cleaning_type: Option<String>,
    pub stickers_removed: Option<String>,
    pub graffiti_removed: Option<String>,
    pub image_front: Option<UploadedFile>,
    pub image_back: Option<UploadedFile>,
}

fn malformed(e: impl std::fmt::Display) -> DomainError {
    DomainError::validation(format!("Malformed multipart body: {e}"))
}

impl RegistrationForm {
    /// Drain the multipart stream. Unknown fields are skipped; empty file parts count as absent.
    pub async fn read(mut multipart: Multipart) -> Result<Self, DomainError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "imageFront" | "imageBack" => {
                    let file_name = field.file_name().unwrap_or("upload").to_owned();
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    if bytes.is_empty() {
                        continue;
                    }
                    let file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                    if name == "imageFront" {
                        form.image_front = file;
                    } else {
                        form.image_back = file;
                    }
                }
                _ => {
                    let slot = match name.as_str() {
                        "userId" => &mut form.user_id,
                        "ppu" => &mut form.ppu,
                        "busNumber" => &mut form.bus_number,
                        "terminal" => &mut form.terminal,
                        "cleaningType" => &mut form.cleaning_type,
                        "stickersRemoved" => &mut form.stickers_removed,
                        "graffitiRemoved" => &mut form.graffiti_removed,
                        _ => continue,
                    };
                    *slot = Some(field.text().await.map_err(malformed)?);
                }
            }
        }
        Ok(form)
    }
}

impl TryFrom<RegistrationForm> for NewCleaningRecord {
    type Error = DomainError;

    fn try_from(f: RegistrationForm) -> Result<Self, Self::Error> {
        let required = [
            ("userId", &f.user_id),
            ("ppu", &f.ppu),
            ("busNumber", &f.bus_number),
            ("terminal", &f.terminal),
            ("cleaningType", &f.cleaning_type),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, v)| present(v.as_deref()).is_none())
            .map(|(k, _)| (*k).to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::missing_fields("Missing required fields", missing));
        }

        let user_id = required_uuid("userId", f.user_id.as_deref())?;
        let terminal = Terminal::parse(f.terminal.as_deref().unwrap_or_default())
            .ok_or_else(|| one_of("terminal", Terminal::ALL.map(|t| t.as_str())))?;
        let cleaning_type = CleaningType::parse(f.cleaning_type.as_deref().unwrap_or_default())
            .ok_or_else(|| one_of("cleaningType", CleaningType::ALL.map(|t| t.as_str())))?;

        Ok(Self {
            user_id,
            ppu: f.ppu.unwrap_or_default().trim().to_owned(),
            bus_number: f.bus_number.unwrap_or_default().trim().to_owned(),
            terminal,
            cleaning_type,
            stickers_removed: f.stickers_removed.as_deref() == Some("true"),
            graffiti_removed: f.graffiti_removed.as_deref() == Some("true"),
            image_front: f.image_front,
            image_back: f.image_back,
        })
    }
}

// ---------- inspections ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InspectionDto {
    pub id: Uuid,
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Inspection> for InspectionDto {
    fn from(i: Inspection) -> Self {
        Self {
            id: i.id,
            cleaning_id: i.cleaning_id,
            supervisor_id: i.supervisor_id,
            passed: i.passed,
            comments: i.comments,
            created_at: i.created_at,
        }
    }
}

/// Inspection row with the inspected record's plate and terminal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InspectionViewDto {
    pub id: Uuid,
    pub cleaning_id: Uuid,
    pub supervisor_id: Uuid,
    pub passed: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ppu: String,
    pub terminal: String,
    pub cleaner_id: Uuid,
    pub supervisor_name: Option<String>,
}

impl From<InspectionView> for InspectionViewDto {
    fn from(v: InspectionView) -> Self {
        let i = v.inspection;
        Self {
            id: i.id,
            cleaning_id: i.cleaning_id,
            supervisor_id: i.supervisor_id,
            passed: i.passed,
            comments: i.comments,
            created_at: i.created_at,
            ppu: v.ppu,
            terminal: v.terminal,
            cleaner_id: v.cleaner_id,
            supervisor_name: v.supervisor_name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionReq {
    pub cleaning_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub passed: Option<bool>,
    pub comments: Option<String>,
}

impl TryFrom<CreateInspectionReq> for NewInspection {
    type Error = DomainError;

    fn try_from(r: CreateInspectionReq) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        if present(r.cleaning_id.as_deref()).is_none() {
            missing.push("cleaningId".to_owned());
        }
        if present(r.supervisor_id.as_deref()).is_none() {
            missing.push("supervisorId".to_owned());
        }
        let Some(passed) = r.passed else {
            missing.push("passed".to_owned());
            return Err(DomainError::missing_fields(
                "cleaningId, supervisorId and passed are required",
                missing,
            ));
        };
        if !missing.is_empty() {
            return Err(DomainError::missing_fields(
                "cleaningId, supervisorId and passed are required",
                missing,
            ));
        }
        Ok(Self {
            cleaning_id: required_uuid("cleaningId", r.cleaning_id.as_deref())?,
            supervisor_id: required_uuid("supervisorId", r.supervisor_id.as_deref())?,
            passed,
            comments: r.comments,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListInspectionsQuery {
    pub cleaner_id: Option<String>,
    /// `true` lists passed inspections; any other value lists failed ones.
    pub result: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<ListInspectionsQuery> for InspectionFilter {
    type Error = DomainError;

    fn try_from(q: ListInspectionsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            cleaner_id: optional_uuid("cleanerId", q.cleaner_id.as_deref())?,
            passed: present(q.result.as_deref()).map(|r| r == "true"),
            range: parse_date_range(q.start_date.as_deref(), q.end_date.as_deref())?,
        })
    }
}

// ---------- tasks ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskDto {
    pub id: Uuid,
    pub cleaner_id: Uuid,
    pub supervisor_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    /// `pending` or `done`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Task> for TaskDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            cleaner_id: t.cleaner_id,
            supervisor_id: t.supervisor_id,
            title: t.title,
            content: t.content,
            status: t.status.as_str().to_owned(),
            created_at: t.created_at,
            completed_at: t.completed_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskReq {
    pub cleaner_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub content: Option<String>,
    pub title: Option<String>,
}

impl TryFrom<CreateTaskReq> for NewTask {
    type Error = DomainError;

    fn try_from(r: CreateTaskReq) -> Result<Self, Self::Error> {
        let required = [
            ("cleanerId", &r.cleaner_id),
            ("supervisorId", &r.supervisor_id),
            ("content", &r.content),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, v)| present(v.as_deref()).is_none())
            .map(|(k, _)| (*k).to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::missing_fields(
                "cleanerId, supervisorId and content are required",
                missing,
            ));
        }
        Ok(Self {
            cleaner_id: required_uuid("cleanerId", r.cleaner_id.as_deref())?,
            supervisor_id: required_uuid("supervisorId", r.supervisor_id.as_deref())?,
            content: r.content.unwrap_or_default(),
            title: r.title,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    pub cleaner_id: Option<String>,
    /// `pending` or `done`
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<ListTasksQuery> for TaskFilter {
    type Error = DomainError;

    fn try_from(q: ListTasksQuery) -> Result<Self, Self::Error> {
        let status = present(q.status.as_deref())
            .map(|s| {
                TaskStatus::parse(s)
                    .ok_or_else(|| DomainError::validation("status must be pending or done"))
            })
            .transpose()?;
        Ok(Self {
            cleaner_id: optional_uuid("cleanerId", q.cleaner_id.as_deref())?,
            status,
            range: parse_date_range(q.start_date.as_deref(), q.end_date.as_deref())?,
        })
    }
}

// ---------- breaks ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BreakDto {
    pub user_id: Uuid,
    pub break_time: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<BreakAssignment> for BreakDto {
    fn from(b: BreakAssignment) -> Self {
        Self {
            user_id: b.user_id,
            break_time: b.break_time,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BreakViewDto {
    pub user_id: Uuid,
    pub break_time: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub role: String,
}

impl From<BreakAssignmentView> for BreakViewDto {
    fn from(v: BreakAssignmentView) -> Self {
        Self {
            user_id: v.assignment.user_id,
            break_time: v.assignment.break_time,
            updated_at: v.assignment.updated_at,
            name: v.name,
            role: v.role.as_str().to_owned(),
        }
    }
}

/// One user's assignment (or `null`) when `userId` is given, every assignment otherwise.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum BreaksResponse {
    One(Option<BreakDto>),
    All(Vec<BreakViewDto>),
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BreaksQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakReq {
    pub user_id: Option<String>,
    /// Free text, e.g. `13:00-13:30`; null clears it.
    pub break_time: Option<String>,
}

// ---------- dashboard ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TotalsDto {
    pub today: i64,
    pub week: i64,
    pub month: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopCleanerDto {
    pub name: String,
    pub user_id: Uuid,
    pub total: i64,
}

impl From<CleanerCount> for TopCleanerDto {
    fn from(c: CleanerCount) -> Self {
        Self {
            name: c.name,
            user_id: c.user_id,
            total: c.total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TerminalCountDto {
    pub terminal: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TypeCountDto {
    pub cleaning_type: String,
    pub total: i64,
}

fn type_counts(groups: Vec<GroupCount>) -> Vec<TypeCountDto> {
    groups
        .into_iter()
        .map(|g| TypeCountDto {
            cleaning_type: g.key,
            total: g.total,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummaryDto {
    pub totals: TotalsDto,
    pub top_cleaners: Vec<TopCleanerDto>,
    pub by_terminal: Vec<TerminalCountDto>,
    pub by_type: Vec<TypeCountDto>,
}

impl From<DashboardSummary> for DashboardSummaryDto {
    fn from(s: DashboardSummary) -> Self {
        Self {
            totals: TotalsDto {
                today: s.totals.today,
                week: s.totals.week,
                month: s.totals.month,
            },
            top_cleaners: s.top_cleaners.into_iter().map(Into::into).collect(),
            by_terminal: s
                .by_terminal
                .into_iter()
                .map(|g| TerminalCountDto {
                    terminal: g.key,
                    total: g.total,
                })
                .collect(),
            by_type: type_counts(s.by_type),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StickersDto {
    pub stickers_true: i64,
    pub stickers_false: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GraffitiDto {
    pub graffiti_true: i64,
    pub graffiti_false: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanerReportDto {
    pub total: i64,
    pub by_type: Vec<TypeCountDto>,
    pub stickers: StickersDto,
    pub graffiti: GraffitiDto,
}

impl From<CleanerReport> for CleanerReportDto {
    fn from(r: CleanerReport) -> Self {
        Self {
            total: r.total,
            by_type: type_counts(r.by_type),
            stickers: StickersDto {
                stickers_true: r.stickers.yes,
                stickers_false: r.stickers.no,
            },
            graffiti: GraffitiDto {
                graffiti_true: r.graffiti.yes,
                graffiti_false: r.graffiti.no,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
