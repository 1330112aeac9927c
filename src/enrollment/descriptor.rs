use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Header mirror of the 402 body, for clients that inspect headers instead.
pub mod headers {
    pub const PAYMENT_REQUIRED: &str = "x-payment-required";
    pub const PAYMENT_NETWORK: &str = "x-payment-network";
    pub const PAYMENT_RECIPIENT: &str = "x-payment-recipient";
    pub const PAYMENT_AMOUNT: &str = "x-payment-amount";
    pub const PAYMENT_CURRENCY: &str = "x-payment-currency";
}

/// The structured payment demand returned with a 402 response.
///
/// Ephemeral: built fresh for each unpaid attempt and never persisted or
/// trusted later. At verification time the expected recipient and amount are
/// recomputed from the current course row, so a stale descriptor replayed by
/// a client carries no authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDescriptor {
    pub network: String,
    pub recipient: String,
    /// Tuition in the chain's minor units (planck).
    pub amount: u64,
    /// Tuition in the human-readable unit, as configured on the course.
    pub amount_human: Decimal,
    pub currency: String,
    pub course_id: String,
    pub course_title: String,
    pub instructions: String,
}

impl PaymentDescriptor {
    /// Compact `recipient=..;amount=..;currency=..` form carried in the
    /// `X-Payment-Required` header.
    pub fn required_header(&self) -> String {
        format!(
            "recipient={};amount={};currency={}",
            self.recipient, self.amount, self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_header_is_semicolon_separated() {
        let d = PaymentDescriptor {
            network: "paseo".into(),
            recipient: "addrX".into(),
            amount: 50_000_000_000,
            amount_human: Decimal::new(5, 0),
            currency: "PAS".into(),
            course_id: "c1".into(),
            course_title: "Intro".into(),
            instructions: String::new(),
        };
        assert_eq!(
            d.required_header(),
            "recipient=addrX;amount=50000000000;currency=PAS"
        );
    }

    #[test]
    fn serializes_camel_case() {
        let d = PaymentDescriptor {
            network: "paseo".into(),
            recipient: "addrX".into(),
            amount: 0,
            amount_human: Decimal::ZERO,
            currency: "PAS".into(),
            course_id: "c1".into(),
            course_title: "Intro".into(),
            instructions: String::new(),
        };
        let v = serde_json::to_value(&d).unwrap();
        assert!(v.get("courseId").is_some());
        assert!(v.get("amountHuman").is_some());
    }
}
