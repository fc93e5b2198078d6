use modkit::{Problem, ValidationError};
use utoipa::OpenApi;

use crate::api::rest::dto::{
    BreakDto, BreakViewDto, BreaksResponse, CleanerReportDto, CleaningRecordDto,
    CreateInspectionReq, CreateTaskReq, CreateUserReq, DashboardSummaryDto, GraffitiDto,
    InspectionDto, InspectionViewDto, RecentPpuDto, RegistrationFormSchema, SetBreakReq,
    StickersDto, TaskDto, TerminalCountDto, TopCleanerDto, TotalsDto, TypeCountDto, UserDto,
};
use crate::api::rest::handlers;

/// OpenAPI fragment contributed by this module; the host merges it into `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_users,
        handlers::create_user,
        handlers::list_registrations,
        handlers::create_registration,
        handlers::recent_ppu,
        handlers::get_registration,
        handlers::create_inspection,
        handlers::list_inspections,
        handlers::create_task,
        handlers::list_tasks,
        handlers::complete_task,
        handlers::get_breaks,
        handlers::set_break,
        handlers::dashboard_summary,
        handlers::cleaner_report,
    ),
    components(schemas(
        UserDto,
        CreateUserReq,
        CleaningRecordDto,
        RegistrationFormSchema,
        RecentPpuDto,
        InspectionDto,
        InspectionViewDto,
        CreateInspectionReq,
        TaskDto,
        CreateTaskReq,
        BreakDto,
        BreakViewDto,
        BreaksResponse,
        SetBreakReq,
        DashboardSummaryDto,
        TotalsDto,
        TopCleanerDto,
        TerminalCountDto,
        TypeCountDto,
        CleanerReportDto,
        StickersDto,
        GraffitiDto,
        Problem,
        ValidationError,
    )),
    tags(
        (name = "users", description = "Cleaner and supervisor accounts"),
        (name = "registrations", description = "Cleaning registrations and their photos"),
        (name = "inspections", description = "Supervisor inspections of registrations"),
        (name = "tasks", description = "Tasks assigned to cleaners"),
        (name = "breaks", description = "Break assignments"),
        (name = "dashboard", description = "Aggregates for supervisors")
    )
)]
pub struct CleaningOpsApi;
