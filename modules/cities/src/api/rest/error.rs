use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.cityhub.dev/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Attach the current span id so the client can quote it back
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_trace_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Invalid { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "CITIES_VALIDATION",
            "Validation error",
            message.clone(),
            instance,
        ),
        DomainError::NotFound { message } => from_parts(
            StatusCode::NOT_FOUND,
            "CITIES_NOT_FOUND",
            "City not found",
            message.clone(),
            instance,
        ),
        DomainError::Unauthorized { message } => from_parts(
            StatusCode::UNAUTHORIZED,
            "CITIES_UNAUTHORIZED",
            "Unauthorized",
            message.clone(),
            instance,
        ),
        DomainError::Internal { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}
