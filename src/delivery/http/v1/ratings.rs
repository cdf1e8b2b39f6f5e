use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::delivery::http::v1::envelope::ApiResponse;
use crate::delivery::http::v1::validation::{rejection_error, validated};
use crate::domain::page::PageRequest;
use crate::domain::rating::{InlineSurvey, Location, Provenance, RatingCandidate, Ratings, Road};
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRatingsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn lenient_i64(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Deserialize)]
pub struct LocationPath {
    pub lat: String,
    pub lng: String,
    pub radius: Option<String>,
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct LocationRequest {
    #[validate(
        required(message = "Latitude is required"),
        range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90")
    )]
    pub lat: Option<f64>,
    #[validate(
        required(message = "Longitude is required"),
        range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180")
    )]
    pub lng: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoadRequest {
    pub id: Option<String>,
    pub index: Option<i32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub road_type: Option<String>,
}

impl From<RoadRequest> for Road {
    fn from(r: RoadRequest) -> Self {
        let defaults = Road::default();
        Road {
            id: r.id,
            index: r.index,
            name: r.name.unwrap_or(defaults.name),
            road_type: r.road_type.unwrap_or(defaults.road_type),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RatingsRequest {
    #[validate(
        required(message = "Rating 'comfortable' is required"),
        range(min = 1, max = 4, message = "Rating 'comfortable' must be between 1 and 4")
    )]
    pub comfortable: Option<i16>,
    #[validate(
        required(message = "Rating 'safe' is required"),
        range(min = 1, max = 4, message = "Rating 'safe' must be between 1 and 4")
    )]
    pub safe: Option<i16>,
    #[validate(
        required(message = "Rating 'overall' is required"),
        range(min = 1, max = 4, message = "Rating 'overall' must be between 1 and 4")
    )]
    pub overall: Option<i16>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub session_id: Option<String>,
    #[validate(required(message = "Location is required"), nested)]
    pub location: Option<LocationRequest>,
    pub road: Option<RoadRequest>,
    #[validate(
        required(message = "Missing rating data (comfortable, safe, overall)"),
        nested
    )]
    pub ratings: Option<RatingsRequest>,
    pub rating_reason: Option<String>,
    pub survey_data: Option<InlineSurvey>,
}

impl SubmitRatingRequest {
    fn into_candidate(self) -> Result<RatingCandidate, UsecaseError> {
        let missing = || UsecaseError::Validation("Missing required rating fields".to_string());

        let location = self.location.ok_or_else(missing)?;
        let ratings = self.ratings.ok_or_else(missing)?;

        Ok(RatingCandidate {
            session_id: self.session_id,
            location: Location::new(
                location.lat.ok_or_else(missing)?,
                location.lng.ok_or_else(missing)?,
            ),
            road: self.road.unwrap_or_default().into(),
            ratings: Ratings::new(
                ratings.comfortable.ok_or_else(missing)?,
                ratings.safe.ok_or_else(missing)?,
                ratings.overall.ok_or_else(missing)?,
            ),
            rating_reason: self.rating_reason,
            survey_data: self.survey_data,
        })
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListRatingsQuery>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list ratings request");

    let request = PageRequest::new(
        lenient_i64(params.page.as_deref()),
        lenient_i64(params.limit.as_deref()),
    );
    let page = state.ratings_usecase.list_ratings(request).await?;
    let pages = page.total_pages();
    let count = page.items.len();

    tracing::debug!(count, total = page.total, "ratings listed successfully");
    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::ok(page.items)
                .with_count(count)
                .with_paging(page.total, page.page, pages),
        ),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get rating request");

    let id = Uuid::parse_str(&id).map_err(|_| {
        tracing::warn!(%id, "invalid rating id");
        UsecaseError::Validation("Invalid rating id".to_string())
    })?;
    let rating = state.ratings_usecase.get_rating(id).await?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(rating))))
}

#[tracing::instrument(skip(state))]
pub async fn ratings_by_location(
    State(state): State<Arc<AppState>>,
    Path(params): Path<LocationPath>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling ratings by location request");

    let (Some(lat), Some(lng)) = (parse_number(&params.lat), parse_number(&params.lng)) else {
        tracing::warn!(lat = %params.lat, lng = %params.lng, "non-numeric coordinates");
        return Err(UsecaseError::Validation("Invalid coordinates".to_string()));
    };

    let radius = match params.radius.as_deref() {
        None => None,
        Some(raw) => Some(parse_number(raw).ok_or_else(|| {
            tracing::warn!(radius = %raw, "non-numeric radius");
            UsecaseError::Validation("Invalid radius".to_string())
        })?),
    };

    let ratings = state
        .ratings_usecase
        .ratings_near(Location::new(lat, lng), radius)
        .await?;

    let count = ratings.len();
    tracing::debug!(count, "ratings by location retrieved");
    Ok((StatusCode::OK, Json(ApiResponse::ok(ratings).with_count(count))))
}

#[tracing::instrument(skip(state))]
pub async fn ratings_by_road(
    State(state): State<Arc<AppState>>,
    Path(road_id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling ratings by road request");

    let road = state.ratings_usecase.ratings_for_road(&road_id).await?;

    let count = road.ratings.len();
    tracing::debug!(%road_id, count, "road ratings retrieved");
    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::ok(road.ratings)
                .with_count(count)
                .with_average_ratings(road.average),
        ),
    ))
}

#[tracing::instrument(skip(state, payload))]
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    provenance: Provenance,
    payload: Result<Json<SubmitRatingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling submit rating request");

    let Json(payload) = payload.map_err(rejection_error)?;
    let candidate = validated(payload)?.into_candidate()?;

    let rating = state
        .ratings_usecase
        .submit_rating(candidate, provenance)
        .await?;

    tracing::debug!(rating_id = %rating.id, "rating created successfully");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(rating).with_message("Rating submitted successfully")),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn rating_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling rating stats request");

    let stats = state.stats_usecase.get_stats().await?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(stats))))
}
