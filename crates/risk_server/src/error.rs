//! API error responses
//!
//! Every failure leaves the server as `{ "error": <kind>, "message": <text> }`
//! with a status derived from the underlying cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adapter_prices::PriceError;
use risk_metrics::RiskError;

/// Request-level error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Query parameter missing, malformed or out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failure raised by the risk pipeline
    #[error(transparent)]
    Risk(#[from] RiskError),
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind
    pub error: String,
    /// Human-readable description
    pub message: String,
}

impl ApiError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidParameter(_) | ApiError::Risk(RiskError::InvalidParameter(_)) => {
                "invalid_parameter"
            }
            ApiError::Risk(RiskError::DataUnavailable(_)) => "data_unavailable",
            ApiError::Risk(RiskError::InsufficientData { .. }) => "insufficient_data",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) | ApiError::Risk(RiskError::InvalidParameter(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Risk(RiskError::InsufficientData { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Risk(RiskError::DataUnavailable(cause)) => match cause {
                PriceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                cause if cause.is_upstream_failure() => StatusCode::BAD_GATEWAY,
                PriceError::InvalidLookback { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::NOT_FOUND,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = %status, kind = self.kind(), error = %self, "Request failed");

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn risk(e: PriceError) -> ApiError {
        ApiError::Risk(RiskError::DataUnavailable(e))
    }

    #[test]
    fn test_invalid_parameter_is_400() {
        let err = ApiError::InvalidParameter("ticker is required".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "invalid_parameter");

        let err = ApiError::from(RiskError::InvalidParameter("bad".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "invalid_parameter");
    }

    #[test]
    fn test_insufficient_data_is_422() {
        let err = ApiError::from(RiskError::InsufficientData { got: 1, need: 2 });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn test_data_unavailable_status_by_cause() {
        assert_eq!(
            risk(PriceError::UnknownTicker("ZZZZ".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            risk(PriceError::EmptySeries {
                ticker: "ZZZZ".to_string(),
                years: 3
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            risk(PriceError::Unreachable("connection refused".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            risk(PriceError::Malformed("missing timestamp".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            risk(PriceError::Timeout(Duration::from_secs(5))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            risk(PriceError::Timeout(Duration::from_secs(5))).kind(),
            "data_unavailable"
        );
        assert_eq!(
            risk(PriceError::InvalidLookback { years: 1_000_000 }).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::InvalidParameter("ticker is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error.error, "invalid_parameter");
        assert_eq!(error.message, "Invalid parameter: ticker is required");
    }
}
