use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use coursepay_api::config::ApiConfig;
use coursepay_api::handlers;
use coursepay_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, PAYMENT_VERIFIER_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = coursepay_api::config::config();
    tracing::info!("Starting Coursepay API in {:?} mode", config.environment);

    let state = AppState::init(config)
        .await
        .unwrap_or_else(|e| panic!("failed to initialize application state: {}", e));

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("COURSEPAY_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Coursepay API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    let routes = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Enrollment protocol
        .route("/api/courses/:id/enroll", post(handlers::enroll::enroll_post))
        .route("/api/enrollments", get(handlers::enrollments::enrollments_get))
        .with_state(state);

    apply_global_middleware(routes, &coursepay_api::config::config().api)
}

fn apply_global_middleware(router: Router, api: &ApiConfig) -> Router {
    let router = if api.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Coursepay API",
            "version": version,
            "description": "Course enrollment API with an HTTP 402 payment-required handshake",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "enroll": "POST /api/courses/:id/enroll (402 handshake)",
                "enrollments": "GET /api/enrollments?subject=<wallet>",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match coursepay_api::database::pool::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
