use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Only status this flow writes; no pending/partial states are modeled.
pub const STATUS_COMPLETED: &str = "completed";

/// The durable record that a subject has paid for and may access a course.
///
/// Append-only: created exactly once per (course, subject) pair and never
/// mutated or deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entitlement {
    pub id: Uuid,
    pub course_id: String,
    pub student_wallet: String,
    pub amount_paid: Option<Decimal>,
    pub tx_hash: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
