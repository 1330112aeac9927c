use crate::enrollment::store::EntitlementStore;
use crate::enrollment::EnrollmentError;

/// The idempotency check: is this (subject, course) pair already entitled?
///
/// Checked first on every attempt and authoritative; a verified payment
/// never overrides an existing entitlement. A store lookup failure is
/// surfaced as an error, never collapsed into "not entitled".
pub struct EnrollmentGuard<'a> {
    store: &'a dyn EntitlementStore,
}

impl<'a> EnrollmentGuard<'a> {
    pub fn new(store: &'a dyn EntitlementStore) -> Self {
        Self { store }
    }

    pub async fn is_entitled(&self, subject: &str, course_id: &str) -> Result<bool, EnrollmentError> {
        let existing = self.store.find_one(subject, course_id).await?;
        Ok(existing.is_some())
    }
}
