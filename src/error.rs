use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Application deadline has passed for this job.")]
    DeadlinePassed,

    #[error("Too many requests, slow down.")]
    RateLimited,

    /// A required third-party step failed. `caller_input` marks failures caused by what the
    /// caller sent (an unreachable resume URL) rather than by server configuration.
    #[error("Upstream failure: {message}")]
    Upstream { message: String, caller_input: bool },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn upstream_input(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
            caller_input: true,
        }
    }

    pub fn upstream_server(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
            caller_input: false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::DeadlinePassed => (StatusCode::BAD_REQUEST, Error::DeadlinePassed.to_string()),
            Error::RateLimited => (StatusCode::TOO_MANY_REQUESTS, Error::RateLimited.to_string()),
            Error::Upstream {
                message,
                caller_input: true,
            } => (StatusCode::BAD_REQUEST, message),
            Error::Upstream { message, .. } => {
                tracing::error!(error = %message, "upstream failure");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Error::Config(msg) => {
                tracing::error!(error = %msg, "configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Server configuration error: {}", msg),
                )
            }
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Error::Reqwest(err) => {
                tracing::error!(error = %err, "outbound HTTP error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("External service error: {}", err),
                )
            }
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            Error::Io(err) => {
                tracing::error!(error = %err, "io error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Conflict("Resource already exists".to_string())
            }
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: Error) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn taxonomy_maps_to_status_codes() {
        let (status, body) = render(Error::Conflict("already applied".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "already applied");

        let (status, body) = render(Error::DeadlinePassed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("deadline"));

        let (status, _) = render(Error::upstream_input("unreachable")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = render(Error::upstream_server("model down")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = render(Error::Config("GEMINI_API_KEY missing".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn row_not_found_becomes_not_found() {
        let (status, _) = render(Error::from(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
