// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::enrollment::EnrollmentError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// The payment-specific variants carry their own error codes so clients and
/// operators can tell "resubmit with new proof" (422), "retry the same
/// proof" (502) and "payment captured, contact support" (500) apart.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity - proof did not verify; new proof needed
    PaymentNotVerified { details: String },

    // 500 Internal Server Error
    InternalServerError(String),

    // 500, but its own code: transfer confirmed on-chain, entitlement row
    // missing. Retrying could double-pay; route the user to support.
    PaymentCapturedNotRecorded { details: String },

    // 502 Bad Gateway - verifier node unreachable, same proof is retry-safe
    VerifierUnavailable(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::PaymentNotVerified { .. } => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::PaymentCapturedNotRecorded { .. } => 500,
            ApiError::VerifierUnavailable(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::PaymentNotVerified { .. } => "payment not verified",
            ApiError::InternalServerError(msg) => msg,
            ApiError::PaymentCapturedNotRecorded { .. } => {
                "payment captured but enrollment not recorded; contact support"
            }
            ApiError::VerifierUnavailable(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PaymentNotVerified { .. } => "PAYMENT_NOT_VERIFIED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::PaymentCapturedNotRecorded { .. } => "PAYMENT_CAPTURED_NOT_RECORDED",
            ApiError::VerifierUnavailable(_) => "VERIFIER_UNAVAILABLE",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.message(),
            "code": self.error_code(),
        });

        match self {
            ApiError::PaymentNotVerified { details }
            | ApiError::PaymentCapturedNotRecorded { details } => {
                body["details"] = json!(details);
            }
            _ => {}
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Map protocol errors to the wire. Every external-call failure has already
// been folded into EnrollmentError by the coordinator; nothing rawer than
// these variants reaches a client.
impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::Validation(msg) => ApiError::bad_request(msg),
            EnrollmentError::CourseNotFound(id) => {
                ApiError::not_found(format!("course not found: {}", id))
            }
            EnrollmentError::InvalidCourseCost { course, cost } => {
                tracing::error!(%course, %cost, "course has invalid cost configuration");
                ApiError::internal_server_error("course is misconfigured")
            }
            EnrollmentError::MissingRecipient(course) => {
                tracing::error!(%course, "course has no payout recipient configured");
                ApiError::internal_server_error("course is misconfigured")
            }
            EnrollmentError::InvalidChainDecimals(decimals) => {
                tracing::error!(decimals, "chain decimals overflow the minor-unit scaling factor");
                ApiError::internal_server_error("payment configuration is invalid")
            }
            EnrollmentError::Store(msg) => {
                // Don't expose internal store errors to clients
                tracing::error!("entitlement store error: {}", msg);
                ApiError::service_unavailable("enrollment store temporarily unavailable")
            }
            EnrollmentError::VerificationRejected(details) => {
                ApiError::PaymentNotVerified { details }
            }
            EnrollmentError::VerifierUnavailable(msg) => {
                tracing::warn!("payment verifier unavailable: {}", msg);
                ApiError::VerifierUnavailable(
                    "payment verifier unavailable, retry with the same proof".to_string(),
                )
            }
            err @ EnrollmentError::EntitlementNotRecorded { .. } => {
                ApiError::PaymentCapturedNotRecorded {
                    details: err.to_string(),
                }
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_proof_maps_to_422_with_details() {
        let err: ApiError =
            EnrollmentError::VerificationRejected("no matching transfer".to_string()).into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "PAYMENT_NOT_VERIFIED");
        assert_eq!(err.to_json()["details"], "no matching transfer");
    }

    #[test]
    fn transient_verifier_failure_maps_to_502() {
        let err: ApiError = EnrollmentError::VerifierUnavailable("timeout".to_string()).into();
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.error_code(), "VERIFIER_UNAVAILABLE");
    }

    #[test]
    fn unrecorded_payment_keeps_its_distinct_code() {
        let err: ApiError = EnrollmentError::EntitlementNotRecorded {
            subject: "addrA".to_string(),
            course: "c1".to_string(),
            detail: "insert failed".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "PAYMENT_CAPTURED_NOT_RECORDED");
    }

    #[test]
    fn store_errors_are_not_exposed_verbatim() {
        let err: ApiError = EnrollmentError::Store("connection refused to 10.0.0.5".to_string()).into();
        assert_eq!(err.status_code(), 503);
        assert!(!err.message().contains("10.0.0.5"));
    }
}
