use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure of a repository or auth call, tagged by where it went wrong.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Rejected locally before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("request rejected ({status})")]
    BadRequest { status: u16, message: Option<String> },

    #[error("authentication failed ({status})")]
    Auth { status: u16, message: Option<String> },

    #[error("not found")]
    NotFound { message: Option<String> },

    #[error("server error ({status})")]
    Server { status: u16, message: Option<String> },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response")]
    Unknown {
        status: Option<u16>,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Auth,
    NotFound,
    Server,
    Network,
    Unknown,
}

impl ApiError {
    /// Maps a non-success HTTP status and the optional server-provided text.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 | 422 => ApiError::BadRequest { status, message },
            401 | 403 => ApiError::Auth { status, message },
            404 => ApiError::NotFound { message },
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Unknown {
                status: Some(status),
                message,
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest { .. } => ErrorCategory::Validation,
            ApiError::Auth { .. } => ErrorCategory::Auth,
            ApiError::NotFound { .. } => ErrorCategory::NotFound,
            ApiError::Server { .. } => ErrorCategory::Server,
            ApiError::Network(_) => ErrorCategory::Network,
            ApiError::Unknown { .. } => ErrorCategory::Unknown,
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { status, .. }
            | ApiError::Auth { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unknown { status, .. } => *status,
            ApiError::Validation(_) | ApiError::Network(_) => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Auth { message, .. }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. }
            | ApiError::Unknown { message, .. } => message.as_deref(),
            ApiError::Validation(_) | ApiError::Network(_) => None,
        };
        message.filter(|m| !m.trim().is_empty())
    }

    /// Text shown to the user: local validation text as-is, otherwise the server's
    /// message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(text) => text.clone(),
            other => other
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Unknown {
                status: err.status().map(|s| s.as_u16()),
                message: None,
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Errors raised by the in-process development API.
#[derive(Debug, thiserror::Error)]
pub enum DevError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),
}

impl IntoResponse for DevError {
    fn into_response(self) -> Response {
        let status = match &self {
            DevError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DevError::NotFound(_) => StatusCode::NOT_FOUND,
            DevError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            DevError::Unauthorized => StatusCode::UNAUTHORIZED,
            DevError::Conflict(_) => StatusCode::CONFLICT,
        };

        let body = serde_json::json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
