use axum::{http::Uri, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::usecase::error::UsecaseError;

const SERVICE_MESSAGE: &str = "Bikeability Assessment API is running";
const RATING_SYSTEM: &str = "4-point scale (comfortable, safe, overall)";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub rating_system: &'static str,
}

#[tracing::instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: SERVICE_MESSAGE,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        rating_system: RATING_SYSTEM,
    })
}

pub async fn not_found(uri: Uri) -> UsecaseError {
    UsecaseError::NotFound(format!("Route {uri} not found"))
}
