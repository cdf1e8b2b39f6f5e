mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::health::{health, not_found};
use crate::delivery::http::v1::ratings::{
    get_rating, list_ratings, rating_stats, ratings_by_location, ratings_by_road, submit_rating,
};
use crate::delivery::http::v1::surveys::{get_survey, submit_survey};
use crate::repository::postgres::{create_pool, PostgresRatingRepository, PostgresSurveyRepository};
use crate::usecase::ratings::RatingsUseCase;
use crate::usecase::stats::StatsUseCase;
use crate::usecase::surveys::SurveysUseCase;

pub struct AppState {
    pub ratings_usecase: RatingsUseCase<PostgresRatingRepository>,
    pub stats_usecase: StatsUseCase<PostgresRatingRepository>,
    pub surveys_usecase: SurveysUseCase<PostgresSurveyRepository>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let tracer_provider = if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig::from(&config);
        Some(telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)?)
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter)?;
        None
    };

    tracing::info!(environment = %config.environment, "starting the bikeability service");

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let shared_state = Arc::new(AppState {
        ratings_usecase: RatingsUseCase::new(PostgresRatingRepository::new(pool.clone())),
        stats_usecase: StatsUseCase::new(PostgresRatingRepository::new(pool.clone())),
        surveys_usecase: SurveysUseCase::new(PostgresSurveyRepository::new(pool)),
        metrics_handle,
    });

    let api = Router::new()
        .route("/api/ratings", get(list_ratings).post(submit_rating))
        .route("/api/ratings/stats", get(rating_stats))
        .route("/api/ratings/location/{lat}/{lng}", get(ratings_by_location))
        .route(
            "/api/ratings/location/{lat}/{lng}/{radius}",
            get(ratings_by_location),
        )
        .route("/api/ratings/road/{road_id}", get(ratings_by_road))
        .route("/api/ratings/{id}", get(get_rating))
        .route("/api/surveys", post(submit_survey))
        .route("/api/surveys/{session_id}", get(get_survey));

    let router = Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "bikeability service running");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    if let Some(provider) = tracer_provider {
        telemetry::shutdown_telemetry(provider);
    }

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}
