use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::enrollment::EntitlementStore;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub subject: Option<String>,
    /// Legacy name for the same parameter.
    pub wallet_address: Option<String>,
}

/// GET /api/enrollments?subject=<wallet> - completed enrollments for a
/// subject, plus a flat courseIds array for quick lookup.
pub async fn enrollments_get(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let subject = query
        .subject
        .or(query.wallet_address)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("subject is required"))?;

    let enrollments = state.entitlements.list_for_subject(&subject).await?;
    let course_ids: Vec<&str> = enrollments.iter().map(|e| e.course_id.as_str()).collect();

    Ok(Json(json!({
        "enrollments": enrollments,
        "courseIds": course_ids,
    })))
}
