use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};

use crate::database::models::Course;
use crate::enrollment::descriptor::PaymentDescriptor;
use crate::enrollment::guard::EnrollmentGuard;
use crate::enrollment::negotiator::PaymentNegotiator;
use crate::enrollment::store::{CourseReader, EntitlementStore, InsertOutcome, NewEntitlement};
use crate::enrollment::verifier::{ChainVerifier, Verdict};
use crate::enrollment::{EnrollmentError, PaymentProof};

/// One enrollment attempt as received from the client.
#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
    pub subject: String,
    pub course: String,
    pub proof: Option<PaymentProof>,
}

/// Terminal outcomes of a successful protocol run. Rejections and failures
/// travel as [`EnrollmentError`].
#[derive(Debug, Clone)]
pub enum EnrollmentOutcome {
    /// The pair was already entitled; idempotent no-op.
    AlreadyEntitled,
    /// Verified (or free) and recorded.
    Committed,
    /// Unpaid attempt: the client must pay and resubmit with proof.
    PaymentRequired(PaymentDescriptor),
}

/// The enrollment protocol state machine.
///
/// One consolidated implementation behind injected collaborators, replacing
/// the per-route copies this logic tends to accrete. The run order is fixed:
/// guard, course read, negotiation, verification, conditional commit.
pub struct EnrollmentCoordinator {
    courses: Arc<dyn CourseReader>,
    store: Arc<dyn EntitlementStore>,
    verifier: Arc<dyn ChainVerifier>,
    negotiator: PaymentNegotiator,
}

impl EnrollmentCoordinator {
    pub fn new(
        courses: Arc<dyn CourseReader>,
        store: Arc<dyn EntitlementStore>,
        verifier: Arc<dyn ChainVerifier>,
        negotiator: PaymentNegotiator,
    ) -> Self {
        Self {
            courses,
            store,
            verifier,
            negotiator,
        }
    }

    pub async fn enroll(
        &self,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(EnrollmentError::Validation("subject is required".to_string()));
        }

        let course_id = request.course.trim();
        if course_id.is_empty() {
            return Err(EnrollmentError::Validation("course is required".to_string()));
        }

        let proof = match &request.proof {
            Some(p) if p.reference().is_none() => {
                return Err(EnrollmentError::Validation(
                    "proof requires transactionHash or blockHash".to_string(),
                ));
            }
            other => other.as_ref(),
        };

        // Guard first, and authoritative: a verified payment never overrides
        // an existing entitlement.
        let guard = EnrollmentGuard::new(self.store.as_ref());
        if guard.is_entitled(subject, course_id).await? {
            return Ok(EnrollmentOutcome::AlreadyEntitled);
        }

        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or_else(|| EnrollmentError::CourseNotFound(course_id.to_string()))?;

        // Free courses commit on first contact: no 402 round-trip, and no
        // payout recipient needs to exist.
        if self.negotiator.tuition_minor_units(&course)? == 0 {
            let proof_ref = proof.and_then(|p| p.reference());
            return self.commit(subject, &course, Decimal::ZERO, proof_ref, false).await;
        }

        // Expected recipient and amount come from the course row read just
        // now; nothing echoed by the client is trusted at verification time.
        let descriptor = self.negotiator.build_descriptor(&course)?;

        let Some(proof) = proof else {
            return Ok(EnrollmentOutcome::PaymentRequired(descriptor));
        };

        match self
            .verifier
            .verify(proof, &descriptor.recipient, descriptor.amount)
            .await?
        {
            Verdict::Confirmed => {
                let amount_paid = course.cost.unwrap_or(Decimal::ZERO);
                self.commit(subject, &course, amount_paid, proof.reference(), true)
                    .await
            }
            Verdict::NotConfirmed { reason } => Err(EnrollmentError::VerificationRejected(reason)),
        }
    }

    /// Conditional commit. A conflicting row means a racing request won; the
    /// loser reports already-entitled, never an error, so at most one
    /// entitlement exists per pair under concurrent resubmission.
    async fn commit(
        &self,
        subject: &str,
        course: &Course,
        amount_paid: Decimal,
        proof_ref: Option<&str>,
        payment_verified: bool,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        let row = NewEntitlement {
            course_id: &course.id,
            student_wallet: subject,
            amount_paid,
            proof_ref,
        };

        let outcome = match self.store.insert_if_absent(row).await {
            Ok(outcome) => outcome,
            Err(err) if payment_verified => {
                // The transfer is already final on-chain. Losing this write
                // silently would lose the learner's money, so it gets its own
                // error class and an operator-facing log line.
                error!(
                    subject,
                    course = %course.id,
                    proof = proof_ref.unwrap_or(""),
                    %err,
                    "payment captured on-chain but entitlement write failed; manual reconciliation needed"
                );
                return Err(EnrollmentError::EntitlementNotRecorded {
                    subject: subject.to_string(),
                    course: course.id.clone(),
                    detail: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        match outcome {
            InsertOutcome::Inserted => {
                info!(subject, course = %course.id, "enrollment committed");
                Ok(EnrollmentOutcome::Committed)
            }
            InsertOutcome::AlreadyExists => Ok(EnrollmentOutcome::AlreadyEntitled),
        }
    }
}
