use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Extension, Router,
};
use modkit::OpenApiRegistry;
use utoipa::OpenApi;

use crate::api::rest::{handlers, openapi::CleaningOpsApi};
use crate::domain::service::Service;

/// Module routes, layered with the service handle and merged into the host router.
pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> Router {
    openapi.register_openapi(CleaningOpsApi::openapi());

    let api = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/registrations",
            get(handlers::list_registrations).post(handlers::create_registration),
        )
        .route("/api/registrations/recent/ppu", get(handlers::recent_ppu))
        .route("/api/registrations/{id}", get(handlers::get_registration))
        .route(
            "/api/inspections",
            get(handlers::list_inspections).post(handlers::create_inspection),
        )
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route("/api/tasks/{id}/complete", patch(handlers::complete_task))
        .route(
            "/api/breaks",
            get(handlers::get_breaks).post(handlers::set_break),
        )
        .route("/api/dashboard/summary", get(handlers::dashboard_summary))
        .route("/api/dashboard/cleaner/{id}", get(handlers::cleaner_report))
        .layer(Extension(service))
        // Photos are bounded by the host's request body limit.
        .layer(DefaultBodyLimit::disable());

    router.merge(api)
}
