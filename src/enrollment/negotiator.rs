use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::PaymentConfig;
use crate::database::models::Course;
use crate::enrollment::descriptor::PaymentDescriptor;
use crate::enrollment::EnrollmentError;

/// Builds the 402 payment demand for a course.
///
/// The human-unit tuition is scaled to minor units by `10^chain_decimals`,
/// a fixed constant for the target chain (10 decimals for PAS on Paseo).
pub struct PaymentNegotiator {
    config: PaymentConfig,
}

impl PaymentNegotiator {
    pub fn new(config: PaymentConfig) -> Self {
        Self { config }
    }

    /// Tuition in minor units: `floor(cost * 10^decimals)`.
    ///
    /// A null cost is a free course (amount 0). A negative cost is a
    /// configuration error on the course, reported, never clamped.
    pub fn tuition_minor_units(&self, course: &Course) -> Result<u64, EnrollmentError> {
        let cost = course.cost.unwrap_or(Decimal::ZERO);
        if cost.is_sign_negative() && !cost.is_zero() {
            return Err(EnrollmentError::InvalidCourseCost {
                course: course.id.clone(),
                cost: cost.to_string(),
            });
        }

        let factor = 10u64
            .checked_pow(self.config.chain_decimals)
            .map(Decimal::from)
            .ok_or(EnrollmentError::InvalidChainDecimals(self.config.chain_decimals))?;
        let minor = (cost * factor).trunc();
        minor.to_u64().ok_or_else(|| EnrollmentError::InvalidCourseCost {
            course: course.id.clone(),
            cost: cost.to_string(),
        })
    }

    /// Build a fresh descriptor from the current course row.
    pub fn build_descriptor(&self, course: &Course) -> Result<PaymentDescriptor, EnrollmentError> {
        let amount = self.tuition_minor_units(course)?;

        let recipient = course
            .wallet_address
            .clone()
            .or_else(|| self.config.default_recipient.clone())
            .ok_or_else(|| EnrollmentError::MissingRecipient(course.id.clone()))?;

        Ok(PaymentDescriptor {
            network: self.config.network.clone(),
            recipient,
            amount,
            amount_human: course.cost.unwrap_or(Decimal::ZERO),
            currency: self.config.currency.clone(),
            course_id: course.id.clone(),
            course_title: course.title.clone(),
            instructions: format!(
                "Sign and submit a transfer of {} {} to the recipient, then retry with proof.transactionHash",
                course.cost.unwrap_or(Decimal::ZERO),
                self.config.currency
            ),
        })
    }
}
