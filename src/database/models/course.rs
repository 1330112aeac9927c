use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course as the enrollment protocol sees it.
///
/// Authored elsewhere; this subsystem only reads it, fresh at request time.
/// `cost` is in the chain's human-readable unit; `None` means free.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub cost: Option<Decimal>,
    pub wallet_address: Option<String>,
}
