use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use handoff_core::ServiceError;
use serde::Serialize;

/// API error response body: a stable `error` string plus optional detail.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Gone(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    message: None,
                },
            ),
            ApiError::Auth(error) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error,
                    message: None,
                },
            ),
            ApiError::NotFound(error) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error,
                    message: None,
                },
            ),
            ApiError::Conflict(error) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error,
                    message: None,
                },
            ),
            ApiError::Gone(error) => (
                StatusCode::GONE,
                ErrorBody {
                    error,
                    message: None,
                },
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    error: "Method not allowed".to_string(),
                    message: None,
                },
            ),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal error".to_string(),
                        message: Some(err.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        use ServiceError as E;
        match &err {
            E::InvalidUsername | E::MissingField(_) | E::PayloadTooLarge => {
                ApiError::Validation(err.to_string())
            }
            E::AuthSecretMismatch | E::AdminRequired | E::AdminNotAllowed | E::NotSessionOwner => {
                ApiError::Auth(err.to_string())
            }
            E::UserNotFound(_)
            | E::RecipientNotFound(_)
            | E::ShareNotFound
            | E::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            E::ShareConsumed | E::SessionExpired => ApiError::Gone(err.to_string()),
            E::TokenExists | E::SessionCipherMissing => ApiError::Conflict(err.to_string()),
            E::Storage(_) => ApiError::Internal(anyhow::anyhow!("{}", err)),
        }
    }
}
