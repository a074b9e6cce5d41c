use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::forecast::ForecastError;

impl ForecastError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForecastError::UnknownMetric(_)
            | ForecastError::InvalidHorizon { .. }
            | ForecastError::UnknownModel { .. } => StatusCode::BAD_REQUEST,
            ForecastError::NoData { .. } => StatusCode::NOT_FOUND,
            ForecastError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            ForecastError::Artifact(_) | ForecastError::Fit { .. } | ForecastError::Source(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show a client. Internal failures stay generic.
    pub fn user_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("Internal forecast error: {:#}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = serde_json::json!({ "detail": self.user_message() });
        (self.status_code(), Json(body)).into_response()
    }
}
