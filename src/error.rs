use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    HttpStatus,
    HttpTimeout,
    NetworkFailure,
    InvalidResponse,
    InvalidRequest,
}

impl ApiErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiErrorCode::HttpStatus => "HTTP_STATUS",
            ApiErrorCode::HttpTimeout => "HTTP_TIMEOUT",
            ApiErrorCode::NetworkFailure => "NETWORK_FAILURE",
            ApiErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ApiErrorCode::InvalidRequest => "INVALID_REQUEST",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Error talking to the productividad backend. The message is what the
    /// user sees; for non-2xx responses it is the response body verbatim.
    #[error("{message}")]
    Api {
        code: ApiErrorCode,
        message: String,
        status: Option<u16>,
        correlation_id: Option<String>,
        details: Option<JsonValue>,
    },

    #[error("validación fallida: {message}")]
    Validation { message: String },

    #[error("configuración inválida: {0}")]
    Config(String),

    #[error("error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation { message }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::config", %message, "configuration error");
        AppError::Config(message)
    }

    pub fn api(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self::api_with_details(code, message, None, None, None)
    }

    pub fn api_with_details(
        code: ApiErrorCode,
        message: impl Into<String>,
        status: Option<u16>,
        correlation_id: Option<&str>,
        details: Option<JsonValue>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match (&correlation, status) {
            (Some(id), Some(status)) => {
                warn!(
                    target: "app::api::error",
                    code = %code,
                    status,
                    correlation_id = %id,
                    %message
                );
            }
            (Some(id), None) => {
                warn!(target: "app::api::error", code = %code, correlation_id = %id, %message);
            }
            (None, Some(status)) => {
                warn!(target: "app::api::error", code = %code, status, %message);
            }
            (None, None) => {
                warn!(target: "app::api::error", code = %code, %message);
            }
        }

        AppError::Api {
            code,
            message,
            status,
            correlation_id: correlation,
            details,
        }
    }

    /// Builds the error for a non-success response. An empty body falls
    /// back to `HTTP <status>`.
    pub fn http_status(status: u16, body: &str, correlation_id: Option<&str>) -> Self {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        };
        Self::api_with_details(
            ApiErrorCode::HttpStatus,
            message,
            Some(status),
            correlation_id,
            None,
        )
    }

    pub fn api_code(&self) -> Option<ApiErrorCode> {
        match self {
            AppError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            AppError::Api { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }

    pub fn api_details(&self) -> Option<&JsonValue> {
        match self {
            AppError::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(error: serde_yaml::Error) -> Self {
        AppError::config(format!("no se pudo leer el archivo YAML: {error}"))
    }
}
