//! API error type with distinct, actionable responses per failure kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fuelstop_core::PlanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        field: Option<&'static str>,
    },

    /// Place lookup failed. Not retried; the caller should fix the name.
    #[error("could not geocode location: {0}")]
    UnknownLocation(String),

    /// Every provider in the routing fallback chain failed.
    #[error("routing providers unavailable: {0}")]
    Provider(String),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, field: Option<&'static str>) -> Self {
        Self::BadRequest {
            message: message.into(),
            field,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::UnknownLocation(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            // Malformed provider geometry is an upstream data problem,
            // not a caller mistake.
            Self::Plan(PlanError::InvalidRoute(_)) => StatusCode::BAD_GATEWAY,
            // The request was fine; the trip is just infeasible.
            Self::Plan(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownLocation(_) => {
                Some("Use a \"City, ST\" pair or a full street address within the USA")
            }
            Self::Provider(_) => Some("All routing providers failed; try again later"),
            Self::Plan(PlanError::NoCandidates) => {
                Some("No priced stations near this route; plan fuel manually")
            }
            Self::Plan(PlanError::UnreachableDestination { .. }) => {
                Some("Increase max_range_miles or choose a route with better station coverage")
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut payload = serde_json::json!({ "error": self.to_string() });
        if let Self::BadRequest { field: Some(field), .. } = &self {
            payload["field"] = serde_json::Value::String(field.to_string());
        }
        if let Some(hint) = self.hint() {
            payload["hint"] = serde_json::Value::String(hint.to_string());
        }
        (self.status(), Json(payload)).into_response()
    }
}
