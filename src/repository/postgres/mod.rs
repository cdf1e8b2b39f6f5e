use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use crate::{
    domain::geo::BoundingBox,
    domain::rating::{InlineSurvey, Location, RatingRecord, Ratings, Road},
    domain::stats::{DailyTrend, RatingTotals},
    domain::survey::{SurveyData, SurveyRecord},
    repository::errors::RepositoryError,
    usecase::contracts::{RatingRepository, SurveyRepository},
};

const RATING_COLUMNS: &str = r#"
    id, session_id, lat, lng, road_id, road_index, road_name, road_type,
    comfortable, safe, overall, rating_reason, survey_data, ip_address, user_agent,
    created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    session_id: Option<String>,
    lat: f64,
    lng: f64,
    road_id: Option<String>,
    road_index: Option<i32>,
    road_name: String,
    road_type: String,
    comfortable: i16,
    safe: i16,
    overall: i16,
    rating_reason: Option<String>,
    survey_data: Option<Json<InlineSurvey>>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RatingRow> for RatingRecord {
    fn from(row: RatingRow) -> Self {
        Self {
            id: row.id,
            session_id: row.session_id,
            location: Location::new(row.lat, row.lng),
            road: Road {
                id: row.road_id,
                index: row.road_index,
                name: row.road_name,
                road_type: row.road_type,
            },
            ratings: Ratings::new(row.comfortable, row.safe, row.overall),
            rating_reason: row.rating_reason,
            survey_data: row.survey_data.map(|Json(data)| data),
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PostgresRatingRepository {
    pool: PgPool,
}

impl PostgresRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RatingRepository for PostgresRatingRepository {
    #[tracing::instrument(skip(self, rating), fields(rating_id = %rating.id, road_id = ?rating.road.id))]
    async fn create(&self, rating: &RatingRecord) -> Result<(), RepositoryError> {
        tracing::debug!("inserting rating");

        sqlx::query(
            r#"
            INSERT INTO ratings (
                id, session_id, lat, lng, road_id, road_index, road_name, road_type,
                comfortable, safe, overall, rating_reason, survey_data, ip_address, user_agent,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(rating.id)
        .bind(&rating.session_id)
        .bind(rating.location.lat)
        .bind(rating.location.lng)
        .bind(&rating.road.id)
        .bind(rating.road.index)
        .bind(&rating.road.name)
        .bind(&rating.road.road_type)
        .bind(rating.ratings.comfortable)
        .bind(rating.ratings.safe)
        .bind(rating.ratings.overall)
        .bind(&rating.rating_reason)
        .bind(rating.survey_data.as_ref().map(Json))
        .bind(&rating.ip_address)
        .bind(&rating.user_agent)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(rating_id = %rating.id, "rating inserted");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(rating_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RatingRecord>, RepositoryError> {
        tracing::debug!("finding rating by id");

        let row = sqlx::query_as::<_, RatingRow>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RatingRecord::from))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<RatingRecord>, RepositoryError> {
        tracing::debug!("listing ratings");

        let rows = sqlx::query_as::<_, RatingRow>(&format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM ratings
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "listed ratings");
        Ok(rows.into_iter().map(RatingRecord::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(?bbox))]
    async fn find_in_bounding_box(&self, bbox: BoundingBox) -> Result<Vec<RatingRecord>, RepositoryError> {
        tracing::debug!("finding ratings in bounding box");

        let rows = sqlx::query_as::<_, RatingRow>(&format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM ratings
            WHERE lat >= $1 AND lat <= $2
              AND lng >= $3 AND lng <= $4
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lng)
        .bind(bbox.max_lng)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "found ratings in bounding box");
        Ok(rows.into_iter().map(RatingRecord::from).collect())
    }

    #[tracing::instrument(skip(self), fields(%road_id))]
    async fn find_by_road_id(&self, road_id: &str) -> Result<Vec<RatingRecord>, RepositoryError> {
        tracing::debug!("finding ratings by road");

        let rows = sqlx::query_as::<_, RatingRow>(&format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM ratings
            WHERE road_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(road_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(%road_id, count = rows.len(), "found ratings for road");
        Ok(rows.into_iter().map(RatingRecord::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn totals(&self) -> Result<RatingTotals, RepositoryError> {
        tracing::debug!("aggregating rating totals");

        let totals = sqlx::query_as::<_, RatingTotals>(
            r#"
            SELECT COUNT(*) AS count,
                   AVG(comfortable::float8) AS mean_comfortable,
                   AVG(safe::float8) AS mean_safe,
                   AVG(overall::float8) AS mean_overall
            FROM ratings
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    #[tracing::instrument(skip(self))]
    async fn count_by_overall(&self) -> Result<Vec<(i16, i64)>, RepositoryError> {
        let counts = sqlx::query_as::<_, (i16, i64)>(
            r#"
            SELECT overall, COUNT(*)
            FROM ratings
            GROUP BY overall
            ORDER BY overall
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    #[tracing::instrument(skip(self), fields(%since))]
    async fn daily_trends(&self, since: DateTime<Utc>) -> Result<Vec<DailyTrend>, RepositoryError> {
        tracing::debug!("aggregating daily trends");

        let trends = sqlx::query_as::<_, DailyTrend>(
            r#"
            SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS date,
                   COUNT(*) AS count,
                   AVG(overall::float8) AS avg_overall
            FROM ratings
            WHERE created_at >= $1
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(days = trends.len(), "daily trends aggregated");
        Ok(trends)
    }
}

pub struct PostgresSurveyRepository {
    pool: PgPool,
}

impl PostgresSurveyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SurveyRow {
    id: Uuid,
    session_id: String,
    survey_data: Json<SurveyData>,
    created_at: DateTime<Utc>,
}

impl From<SurveyRow> for SurveyRecord {
    fn from(row: SurveyRow) -> Self {
        Self {
            id: row.id,
            session_id: row.session_id,
            survey_data: row.survey_data.0,
            created_at: row.created_at,
        }
    }
}

impl SurveyRepository for PostgresSurveyRepository {
    #[tracing::instrument(skip(self, survey), fields(survey_id = %survey.id, session_id = %survey.session_id))]
    async fn create(&self, survey: &SurveyRecord) -> Result<(), RepositoryError> {
        tracing::debug!("inserting survey");

        sqlx::query(
            r#"
            INSERT INTO surveys (id, session_id, survey_data, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(survey.id)
        .bind(&survey.session_id)
        .bind(Json(&survey.survey_data))
        .bind(survey.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(survey_id = %survey.id, "survey inserted");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(%session_id))]
    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<SurveyRecord>, RepositoryError> {
        tracing::debug!("finding survey by session");

        let row = sqlx::query_as::<_, SurveyRow>(
            r#"
            SELECT id, session_id, survey_data, created_at
            FROM surveys
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SurveyRecord::from))
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
