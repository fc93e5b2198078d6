use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query,
    },
    http::StatusCode,
    response::Json,
    Extension,
};
use modkit::{Problem, ProblemContext, ProblemResponse};
use tracing::{error, info};

use crate::api::rest::dto::{
    optional_uuid, parse_date_range, parse_uuid, required_uuid, BreakDto, BreakViewDto, BreaksQuery,
    BreaksResponse, CleanerReportDto, CleaningRecordDto, CreateInspectionReq, CreateTaskReq,
    CreateUserReq, DashboardSummaryDto, InspectionDto, InspectionViewDto, ListInspectionsQuery,
    ListRecordsQuery, ListTasksQuery, ListUsersQuery, RecentPpuDto, RecentPpuQuery,
    RegistrationForm, RegistrationFormSchema, ReportQuery, SetBreakReq, TaskDto, UserDto,
};
use crate::api::rest::error::{map_domain_error, rejection};
use crate::contract::model::{
    InspectionFilter, NewCleaningRecord, NewInspection, NewTask, RecordFilter, TaskFilter,
};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type ApiResult<T> = Result<T, ProblemResponse>;

fn fail(e: DomainError, ctx: &ProblemContext) -> ProblemResponse {
    if !matches!(e, DomainError::Database { .. } | DomainError::Storage { .. }) {
        info!(instance = %ctx.instance, "Rejected request: {}", e);
    }
    map_domain_error(&e, ctx)
}

fn body<T>(res: Result<Json<T>, JsonRejection>, ctx: &ProblemContext) -> ApiResult<T> {
    res.map(|Json(v)| v).map_err(|e| rejection(e.body_text(), ctx))
}

fn query<T>(res: Result<Query<T>, QueryRejection>, ctx: &ProblemContext) -> ApiResult<T> {
    res.map(|Query(v)| v).map_err(|e| rejection(e.body_text(), ctx))
}

// ---------- users ----------

#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users ordered by name", body = [UserDto]),
        (status = 400, description = "Unknown role", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "users",
    operation_id = "cleaning_ops.list_users"
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    q: Result<Query<ListUsersQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<UserDto>>> {
    let q = query(q, &ctx)?;
    let role = q.role().map_err(|e| fail(e, &ctx))?;
    let users = svc.list_users(role).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 200, description = "A user with that name already existed", body = UserDto),
        (status = 400, description = "Missing name or role", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "users",
    operation_id = "cleaning_ops.create_user"
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    req: Result<Json<CreateUserReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let req = body(req, &ctx)?;
    let (name, role) = req.parse().map_err(|e| fail(e, &ctx))?;
    let res = svc.create_user(&name, role).await.map_err(|e| fail(e, &ctx))?;
    let status = if res.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UserDto::from(res.user))))
}

// ---------- registrations ----------

#[utoipa::path(
    get,
    path = "/api/registrations",
    params(ListRecordsQuery),
    responses(
        (status = 200, description = "Newest first, at most 200 rows", body = [CleaningRecordDto]),
        (status = 400, description = "Invalid filter", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "registrations",
    operation_id = "cleaning_ops.list_registrations"
)]
pub async fn list_registrations(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    q: Result<Query<ListRecordsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CleaningRecordDto>>> {
    let filter = RecordFilter::try_from(query(q, &ctx)?).map_err(|e| fail(e, &ctx))?;
    let rows = svc.list_records(filter).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(rows.into_iter().map(CleaningRecordDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/registrations",
    request_body(content = RegistrationFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Registration stored", body = CleaningRecordDto),
        (status = 400, description = "Missing or invalid fields", body = Problem),
        (status = 500, description = "Upload or database failure", body = Problem)
    ),
    tag = "registrations",
    operation_id = "cleaning_ops.create_registration"
)]
pub async fn create_registration(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<CleaningRecordDto>)> {
    let multipart = multipart.map_err(|e| rejection(e.body_text(), &ctx))?;
    let form = RegistrationForm::read(multipart)
        .await
        .map_err(|e| fail(e, &ctx))?;
    let input = NewCleaningRecord::try_from(form).map_err(|e| fail(e, &ctx))?;
    match svc.create_record(input).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(CleaningRecordDto::from(record)))),
        Err(e) => {
            error!("Failed to create registration: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/registrations/recent/ppu",
    params(RecentPpuQuery),
    responses(
        (status = 200, description = "Most recently used plates of the user", body = [RecentPpuDto]),
        (status = 400, description = "userId missing", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "registrations",
    operation_id = "cleaning_ops.recent_ppu"
)]
pub async fn recent_ppu(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    q: Result<Query<RecentPpuQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RecentPpuDto>>> {
    let q = query(q, &ctx)?;
    let user_id = required_uuid("userId", q.user_id.as_deref()).map_err(|e| fail(e, &ctx))?;
    let rows = svc.recent_ppu(user_id).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(rows.into_iter().map(RecentPpuDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/registrations/{id}",
    params(("id" = String, Path, description = "Registration UUID")),
    responses(
        (status = 200, description = "Registration", body = CleaningRecordDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "Not found", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "registrations",
    operation_id = "cleaning_ops.get_registration"
)]
pub async fn get_registration(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    Path(id): Path<String>,
) -> ApiResult<Json<CleaningRecordDto>> {
    let id = parse_uuid("id", &id).map_err(|e| fail(e, &ctx))?;
    let record = svc.get_record(id).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(CleaningRecordDto::from(record)))
}

// ---------- inspections ----------

#[utoipa::path(
    post,
    path = "/api/inspections",
    request_body = CreateInspectionReq,
    responses(
        (status = 201, description = "Inspection recorded", body = InspectionDto),
        (status = 400, description = "Missing fields", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "inspections",
    operation_id = "cleaning_ops.create_inspection"
)]
pub async fn create_inspection(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    req: Result<Json<CreateInspectionReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InspectionDto>)> {
    let input = NewInspection::try_from(body(req, &ctx)?).map_err(|e| fail(e, &ctx))?;
    let inspection = svc.create_inspection(input).await.map_err(|e| fail(e, &ctx))?;
    Ok((StatusCode::CREATED, Json(InspectionDto::from(inspection))))
}

#[utoipa::path(
    get,
    path = "/api/inspections",
    params(ListInspectionsQuery),
    responses(
        (status = 200, description = "Inspections, newest first", body = [InspectionViewDto]),
        (status = 400, description = "Invalid filter", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "inspections",
    operation_id = "cleaning_ops.list_inspections"
)]
pub async fn list_inspections(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    q: Result<Query<ListInspectionsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<InspectionViewDto>>> {
    let filter = InspectionFilter::try_from(query(q, &ctx)?).map_err(|e| fail(e, &ctx))?;
    let rows = svc.list_inspections(filter).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(rows.into_iter().map(InspectionViewDto::from).collect()))
}

// ---------- tasks ----------

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskReq,
    responses(
        (status = 201, description = "Task assigned", body = TaskDto),
        (status = 400, description = "Missing fields", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "tasks",
    operation_id = "cleaning_ops.create_task"
)]
pub async fn create_task(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    req: Result<Json<CreateTaskReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskDto>)> {
    let input = NewTask::try_from(body(req, &ctx)?).map_err(|e| fail(e, &ctx))?;
    let task = svc.create_task(input).await.map_err(|e| fail(e, &ctx))?;
    Ok((StatusCode::CREATED, Json(TaskDto::from(task))))
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Tasks, newest first, at most 200 rows", body = [TaskDto]),
        (status = 400, description = "Invalid filter", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "tasks",
    operation_id = "cleaning_ops.list_tasks"
)]
pub async fn list_tasks(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    q: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskDto>>> {
    let filter = TaskFilter::try_from(query(q, &ctx)?).map_err(|e| fail(e, &ctx))?;
    let rows = svc.list_tasks(filter).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(rows.into_iter().map(TaskDto::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/complete",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Task marked done", body = TaskDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "Task not found", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "tasks",
    operation_id = "cleaning_ops.complete_task"
)]
pub async fn complete_task(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskDto>> {
    let id = parse_uuid("id", &id).map_err(|e| fail(e, &ctx))?;
    let task = svc.complete_task(id).await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(TaskDto::from(task)))
}

// ---------- breaks ----------

#[utoipa::path(
    get,
    path = "/api/breaks",
    params(BreaksQuery),
    responses(
        (status = 200, description = "The user's assignment (or null), or every assignment", body = BreaksResponse),
        (status = 400, description = "Malformed userId", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "breaks",
    operation_id = "cleaning_ops.get_breaks"
)]
pub async fn get_breaks(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    q: Result<Query<BreaksQuery>, QueryRejection>,
) -> ApiResult<Json<BreaksResponse>> {
    let q = query(q, &ctx)?;
    let user_id = optional_uuid("userId", q.user_id.as_deref())
        .map_err(|e| fail(e, &ctx))?;
    let res = match user_id {
        Some(user_id) => {
            let row = svc.get_break(user_id).await.map_err(|e| fail(e, &ctx))?;
            BreaksResponse::One(row.map(BreakDto::from))
        }
        None => {
            let rows = svc.list_breaks().await.map_err(|e| fail(e, &ctx))?;
            BreaksResponse::All(rows.into_iter().map(BreakViewDto::from).collect())
        }
    };
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/breaks",
    request_body = SetBreakReq,
    responses(
        (status = 200, description = "Assignment stored", body = BreakDto),
        (status = 400, description = "userId missing", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "breaks",
    operation_id = "cleaning_ops.set_break"
)]
pub async fn set_break(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    req: Result<Json<SetBreakReq>, JsonRejection>,
) -> ApiResult<Json<BreakDto>> {
    let req = body(req, &ctx)?;
    let user_id = required_uuid("userId", req.user_id.as_deref()).map_err(|e| fail(e, &ctx))?;
    let row = svc
        .set_break(user_id, req.break_time.as_deref())
        .await
        .map_err(|e| fail(e, &ctx))?;
    Ok(Json(BreakDto::from(row)))
}

// ---------- dashboard ----------

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Totals and rankings", body = DashboardSummaryDto),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "dashboard",
    operation_id = "cleaning_ops.dashboard_summary"
)]
pub async fn dashboard_summary(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
) -> ApiResult<Json<DashboardSummaryDto>> {
    let summary = svc.dashboard_summary().await.map_err(|e| fail(e, &ctx))?;
    Ok(Json(DashboardSummaryDto::from(summary)))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/cleaner/{id}",
    params(("id" = String, Path, description = "Cleaner UUID"), ReportQuery),
    responses(
        (status = 200, description = "Per-cleaner report", body = CleanerReportDto),
        (status = 400, description = "Malformed id or date", body = Problem),
        (status = 500, description = "Internal server error", body = Problem)
    ),
    tag = "dashboard",
    operation_id = "cleaning_ops.cleaner_report"
)]
pub async fn cleaner_report(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemContext,
    Path(id): Path<String>,
    q: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Json<CleanerReportDto>> {
    let q = query(q, &ctx)?;
    let user_id = parse_uuid("id", &id).map_err(|e| fail(e, &ctx))?;
    let range = parse_date_range(q.start_date.as_deref(), q.end_date.as_deref())
        .map_err(|e| fail(e, &ctx))?;
    let report = svc
        .cleaner_report(user_id, range)
        .await
        .map_err(|e| fail(e, &ctx))?;
    Ok(Json(CleanerReportDto::from(report)))
}
