use axum::http::StatusCode;
use modkit::{Problem, ProblemContext, ProblemResponse, ValidationError};
use tracing::error;

use crate::domain::error::DomainError;

fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    ctx: &ProblemContext,
) -> Problem {
    ctx.apply(
        Problem::new(status, title, detail)
            .with_type(format!("https://errors.example.com/{code}"))
            .with_code(code),
    )
}

/// Map a domain error to an RFC 9457 response.
pub fn map_domain_error(e: &DomainError, ctx: &ProblemContext) -> ProblemResponse {
    let problem = match e {
        DomainError::Validation { message, missing } => from_parts(
            StatusCode::BAD_REQUEST,
            "CLEANING_VALIDATION",
            "Bad Request",
            message.clone(),
            ctx,
        )
        .with_errors(missing.iter().map(|f| ValidationError::missing(f)).collect()),
        DomainError::NotFound { entity, id } => from_parts(
            StatusCode::NOT_FOUND,
            "CLEANING_NOT_FOUND",
            "Not Found",
            format!("{entity} with id {id} not found"),
            ctx,
        ),
        DomainError::Database { message } => {
            error!(instance = %ctx.instance, error = %message, "Database failure");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CLEANING_DB",
                "Internal Server Error",
                message.clone(),
                ctx,
            )
        }
        DomainError::Storage { message } => {
            error!(instance = %ctx.instance, error = %message, "Storage failure");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CLEANING_STORAGE",
                "Internal Server Error",
                message.clone(),
                ctx,
            )
        }
    };
    problem.into()
}

/// Extractor rejections (bad JSON, bad query string) become validation problems.
pub fn rejection(detail: impl std::fmt::Display, ctx: &ProblemContext) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "CLEANING_VALIDATION",
        "Bad Request",
        detail.to_string(),
        ctx,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn ctx() -> ProblemContext {
        ProblemContext {
            instance: "/api/tasks/1/complete".into(),
            request_id: Some("rid".into()),
        }
    }

    #[test]
    fn not_found_is_404_with_entity_detail() {
        let resp = map_domain_error(&DomainError::not_found("Task", "1"), &ctx());
        assert_eq!(resp.0.status, 404);
        assert_eq!(resp.0.code, "CLEANING_NOT_FOUND");
        assert_eq!(resp.0.detail, "Task with id 1 not found");
        assert_eq!(resp.0.request_id.as_deref(), Some("rid"));
        assert_eq!(resp.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_carries_missing_field_pointers() {
        let e = DomainError::missing_fields("Missing required fields", vec!["busNumber".into()]);
        let p = map_domain_error(&e, &ctx()).0;
        assert_eq!(p.status, 400);
        assert_eq!(p.detail, "Missing required fields");
        assert_eq!(p.errors.unwrap()[0].pointer, "/busNumber");
    }

    #[test]
    fn infrastructure_failures_keep_raw_message() {
        let p = map_domain_error(&DomainError::storage("bucket gone"), &ctx()).0;
        assert_eq!(p.status, 500);
        assert_eq!(p.code, "CLEANING_STORAGE");
        assert_eq!(p.detail, "bucket gone");
    }
}
