use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::entitlement::STATUS_COMPLETED;
use crate::database::models::{Course, Entitlement};
use crate::enrollment::EnrollmentError;

/// Result of the conditional entitlement insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Fields for a new entitlement row.
#[derive(Debug, Clone)]
pub struct NewEntitlement<'a> {
    pub course_id: &'a str,
    pub student_wallet: &'a str,
    pub amount_paid: Decimal,
    pub proof_ref: Option<&'a str>,
}

/// Read access to courses. The coordinator reads the course row fresh on
/// every attempt; cost and recipient are never cached across protocol phases.
#[async_trait]
pub trait CourseReader: Send + Sync {
    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, EnrollmentError>;
}

/// Persistence for entitlements.
///
/// `insert_if_absent` is deliberately the only write primitive: two racing
/// verified-payment requests can both pass the guard check, and the
/// conditional insert is what guarantees at most one row per
/// (course, subject) pair. Callers treat [`InsertOutcome::AlreadyExists`] as
/// already-entitled, never as an error.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn find_one(
        &self,
        subject: &str,
        course_id: &str,
    ) -> Result<Option<Entitlement>, EnrollmentError>;

    async fn insert_if_absent(
        &self,
        entitlement: NewEntitlement<'_>,
    ) -> Result<InsertOutcome, EnrollmentError>;

    async fn list_for_subject(&self, subject: &str) -> Result<Vec<Entitlement>, EnrollmentError>;
}

pub struct PgCourseReader {
    pool: PgPool,
}

impl PgCourseReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseReader for PgCourseReader {
    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, EnrollmentError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, cost, wallet_address FROM course WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }
}

pub struct PgEntitlementStore {
    pool: PgPool,
}

impl PgEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementStore for PgEntitlementStore {
    async fn find_one(
        &self,
        subject: &str,
        course_id: &str,
    ) -> Result<Option<Entitlement>, EnrollmentError> {
        let row = sqlx::query_as::<_, Entitlement>(
            "SELECT id, course_id, student_wallet, amount_paid, tx_hash, status, created_at \
             FROM enrollment \
             WHERE course_id = $1 AND student_wallet = $2 AND status = $3",
        )
        .bind(course_id)
        .bind(subject)
        .bind(STATUS_COMPLETED)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_if_absent(
        &self,
        entitlement: NewEntitlement<'_>,
    ) -> Result<InsertOutcome, EnrollmentError> {
        // The unique (course_id, student_wallet) index plus DO NOTHING makes
        // this the atomic half of the check-then-act race fix.
        let result = sqlx::query(
            "INSERT INTO enrollment (id, course_id, student_wallet, amount_paid, tx_hash, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now()) \
             ON CONFLICT (course_id, student_wallet) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(entitlement.course_id)
        .bind(entitlement.student_wallet)
        .bind(entitlement.amount_paid)
        .bind(entitlement.proof_ref)
        .bind(STATUS_COMPLETED)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn list_for_subject(&self, subject: &str) -> Result<Vec<Entitlement>, EnrollmentError> {
        let rows = sqlx::query_as::<_, Entitlement>(
            "SELECT id, course_id, student_wallet, amount_paid, tx_hash, status, created_at \
             FROM enrollment \
             WHERE student_wallet = $1 AND status = $2 \
             ORDER BY created_at DESC",
        )
        .bind(subject)
        .bind(STATUS_COMPLETED)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
