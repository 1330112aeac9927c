//! The payment-required enrollment protocol.
//!
//! A client asks to enroll in a course. If the (subject, course) pair is
//! already entitled the request is an idempotent no-op. If not, and no
//! payment proof is attached, the server answers 402 with a
//! [`PaymentDescriptor`] telling the client how much to pay whom. The client
//! transfers on-chain out-of-band and resubmits with a transaction or block
//! hash; the server verifies the transfer against a chain node and commits
//! the entitlement. The protocol is stateless between phases: everything
//! needed to resume is echoed by the client or re-read fresh from the store.

pub mod coordinator;
pub mod descriptor;
pub mod guard;
pub mod negotiator;
pub mod store;
pub mod verifier;

pub use coordinator::{EnrollmentCoordinator, EnrollmentOutcome, EnrollmentRequest};
pub use descriptor::PaymentDescriptor;
pub use negotiator::PaymentNegotiator;
pub use store::{CourseReader, EntitlementStore, InsertOutcome};
pub use verifier::{ChainVerifier, Verdict};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-supplied reference to an on-chain transfer.
///
/// At least one of the two hashes must be present; the shape of the hash is
/// not validated beyond that (the chain node is the authority on whether it
/// resolves to anything).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    pub transaction_hash: Option<String>,
    pub block_hash: Option<String>,
}

impl PaymentProof {
    /// The reference recorded on the entitlement: transaction hash when
    /// present, block hash otherwise.
    pub fn reference(&self) -> Option<&str> {
        self.transaction_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .or_else(|| self.block_hash.as_deref().filter(|h| !h.is_empty()))
    }
}

/// Everything that can go wrong inside the enrollment protocol.
///
/// Each variant maps to exactly one wire-level error; no raw transport or
/// sqlx errors leak past the coordinator boundary.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("{0}")]
    Validation(String),

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("course {course} has invalid cost: {cost}")]
    InvalidCourseCost { course: String, cost: String },

    #[error("course {0} has no payout recipient configured")]
    MissingRecipient(String),

    #[error("chain decimals {0} overflow the minor-unit scaling factor")]
    InvalidChainDecimals(u32),

    #[error("entitlement store error: {0}")]
    Store(String),

    #[error("payment not verified: {0}")]
    VerificationRejected(String),

    #[error("payment verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// The transfer was confirmed on-chain but the entitlement write failed.
    /// The learner has already paid; this must never be silently downgraded
    /// to a generic store error.
    #[error("payment captured but entitlement not recorded for {subject}/{course}: {detail}")]
    EntitlementNotRecorded {
        subject: String,
        course: String,
        detail: String,
    },
}

impl From<sqlx::Error> for EnrollmentError {
    fn from(err: sqlx::Error) -> Self {
        EnrollmentError::Store(err.to_string())
    }
}
