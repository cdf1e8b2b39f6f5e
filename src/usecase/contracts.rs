use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    domain::geo::BoundingBox,
    domain::rating::RatingRecord,
    domain::stats::{DailyTrend, RatingTotals},
    domain::survey::SurveyRecord,
    repository::errors::RepositoryError,
};

#[cfg_attr(test, mockall::automock)]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: &RatingRecord) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RatingRecord>, RepositoryError>;
    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<RatingRecord>, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
    /// Newest first, edges inclusive.
    async fn find_in_bounding_box(&self, bbox: BoundingBox) -> Result<Vec<RatingRecord>, RepositoryError>;
    /// Newest first, exact match on the road id.
    async fn find_by_road_id(&self, road_id: &str) -> Result<Vec<RatingRecord>, RepositoryError>;
    async fn totals(&self) -> Result<RatingTotals, RepositoryError>;
    /// `(overall, count)` pairs, one per distinct overall value.
    async fn count_by_overall(&self) -> Result<Vec<(i16, i64)>, RepositoryError>;
    /// Per UTC day since `since`, ascending by date, averages unrounded.
    async fn daily_trends(&self, since: DateTime<Utc>) -> Result<Vec<DailyTrend>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SurveyRepository: Send + Sync {
    /// Fails with `RepositoryError::Conflict` when the session already has a survey.
    async fn create(&self, survey: &SurveyRecord) -> Result<(), RepositoryError>;
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<SurveyRecord>, RepositoryError>;
}
