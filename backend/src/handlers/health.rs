//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::db::{self, DatabaseStatus};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: DatabaseStatus,
    pub version: String,
}

/// Report service and database status
pub async fn health_check(State(db_pool): State<PgPool>) -> (StatusCode, Json<HealthResponse>) {
    let database = db::database_status(&db_pool).await;
    let (status, code) = match database {
        DatabaseStatus::Connected => ("healthy", StatusCode::OK),
        DatabaseStatus::Disconnected => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
