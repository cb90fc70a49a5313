use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::llm_provider::LLMError;
use crate::services::DrillError;

pub const PHRASE_NOT_FOUND_MESSAGE: &str = "Фраза не найдена";
pub const INTERNAL_ERROR_MESSAGE: &str = "Внутренняя ошибка сервера";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn upstream(code: impl Into<String>, message: impl Into<String>) -> Self {
        json_error(StatusCode::BAD_GATEWAY, code, message)
    }

    /// `message` is kept for logs only; clients see a generic text.
    pub fn internal(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<DrillError> for AppError {
    fn from(err: DrillError) -> Self {
        match err {
            DrillError::NotFound(_) => Self::not_found(PHRASE_NOT_FOUND_MESSAGE),
            DrillError::InvalidInput(message) => Self::validation(message),
            DrillError::GradingUnavailable(LLMError::Timeout(_)) => json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "GRADING_TIMEOUT",
                "Проверка ответа заняла слишком много времени",
            ),
            DrillError::GradingUnavailable(_) => {
                Self::upstream("GRADING_UNAVAILABLE", "Сервис проверки ответов недоступен")
            }
            DrillError::Store(err) => {
                tracing::error!(error = %err, "phrase store failure");
                Self::internal(StatusCode::BAD_GATEWAY, "STORE_UNAVAILABLE", err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> AppError {
    AppError {
        status,
        code: code.into(),
        message: message.into(),
        is_operational: true,
    }
}
