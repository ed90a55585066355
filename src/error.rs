use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::stats::sheets::SheetsError;

#[derive(Debug)]
pub enum AppError {
    /// The spreadsheet source could not be read.
    Upstream(String),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Upstream(_) => "upstream_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Upstream(e) => {
                tracing::error!("upstream error: {e}");
                "failed to retrieve source data".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message()
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<SheetsError> for AppError {
    fn from(e: SheetsError) -> Self {
        AppError::Upstream(e.to_string())
    }
}
