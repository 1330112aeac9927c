use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::pool;
use crate::enrollment::store::{PgCourseReader, PgEntitlementStore};
use crate::enrollment::verifier::HttpChainVerifier;
use crate::enrollment::{
    ChainVerifier, CourseReader, EnrollmentCoordinator, EntitlementStore, PaymentNegotiator,
};

/// Process-wide collaborator handles, built once at startup and passed to
/// handlers via axum `State`. Request handlers never construct their own
/// database or HTTP clients.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub coordinator: Arc<EnrollmentCoordinator>,
    pub entitlements: Arc<dyn EntitlementStore>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = pool::connect(&config.database).await?;

        let courses: Arc<dyn CourseReader> = Arc::new(PgCourseReader::new(pool.clone()));
        let entitlements: Arc<dyn EntitlementStore> =
            Arc::new(PgEntitlementStore::new(pool.clone()));
        let verifier: Arc<dyn ChainVerifier> = Arc::new(HttpChainVerifier::new(&config.payment)?);

        let coordinator = Arc::new(EnrollmentCoordinator::new(
            courses,
            entitlements.clone(),
            verifier,
            PaymentNegotiator::new(config.payment.clone()),
        ));

        Ok(Self {
            pool,
            coordinator,
            entitlements,
        })
    }
}
