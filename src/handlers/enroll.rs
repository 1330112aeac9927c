use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::enrollment::descriptor::{headers, PaymentDescriptor};
use crate::enrollment::{EnrollmentOutcome, EnrollmentRequest, PaymentProof};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
    /// Wallet address of the learner. `walletAddress` accepted as an alias
    /// for older clients.
    #[serde(alias = "walletAddress")]
    pub subject: Option<String>,
    #[serde(alias = "paymentProof")]
    pub proof: Option<PaymentProof>,
}

/// POST /api/courses/:id/enroll - the 402 enrollment handshake.
///
/// Without proof this answers 402 plus a payment descriptor (body and
/// `x-payment-*` headers); with proof it verifies the transfer on-chain and
/// commits the enrollment.
pub async fn enroll_post(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(body): Json<EnrollBody>,
) -> Result<Response, ApiError> {
    let subject = match body.subject {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(ApiError::bad_request("subject is required")),
    };

    let request = EnrollmentRequest {
        subject,
        course: course_id.clone(),
        proof: body.proof,
    };

    match state.coordinator.enroll(&request).await? {
        EnrollmentOutcome::AlreadyEntitled => Ok(success(&course_id, "Already enrolled")),
        EnrollmentOutcome::Committed => Ok(success(&course_id, "Enrolled successfully")),
        EnrollmentOutcome::PaymentRequired(descriptor) => Ok(payment_required(descriptor)),
    }
}

fn success(course_id: &str, message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "course": course_id,
            "message": message,
        })),
    )
        .into_response()
}

fn payment_required(descriptor: PaymentDescriptor) -> Response {
    let body = json!({
        "error": "Payment Required",
        "message": "Please complete payment to enroll in this course",
        "payment": &descriptor,
    });

    let mut response = (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response();

    let mirror = [
        (headers::PAYMENT_REQUIRED, descriptor.required_header()),
        (headers::PAYMENT_NETWORK, descriptor.network.clone()),
        (headers::PAYMENT_RECIPIENT, descriptor.recipient.clone()),
        (headers::PAYMENT_AMOUNT, descriptor.amount.to_string()),
        (headers::PAYMENT_CURRENCY, descriptor.currency.clone()),
    ];
    for (name, value) in mirror {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_accepts_legacy_field_names() {
        let body: EnrollBody = serde_json::from_str(
            r#"{"walletAddress": "addrA", "paymentProof": {"transactionHash": "0xabc"}}"#,
        )
        .unwrap();
        assert_eq!(body.subject.as_deref(), Some("addrA"));
        assert_eq!(
            body.proof.unwrap().transaction_hash.as_deref(),
            Some("0xabc")
        );
    }

    #[test]
    fn payment_required_mirrors_descriptor_in_headers() {
        let descriptor = PaymentDescriptor {
            network: "paseo".into(),
            recipient: "addrX".into(),
            amount: 50_000_000_000,
            amount_human: "5".parse().unwrap(),
            currency: "PAS".into(),
            course_id: "c1".into(),
            course_title: "Intro".into(),
            instructions: String::new(),
        };

        let response = payment_required(descriptor);
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let headers = response.headers();
        assert_eq!(headers["x-payment-recipient"], "addrX");
        assert_eq!(headers["x-payment-amount"], "50000000000");
        assert_eq!(headers["x-payment-currency"], "PAS");
        assert_eq!(
            headers["x-payment-required"],
            "recipient=addrX;amount=50000000000;currency=PAS"
        );
    }
}
