use uuid::Uuid;

use crate::domain::geo::{BoundingBox, DEFAULT_RADIUS};
use crate::domain::page::{Page, PageRequest};
use crate::domain::rating::{Location, Provenance, RatingCandidate, RatingRecord};
use crate::domain::stats::AverageRatings;
use crate::usecase::contracts::RatingRepository;
use crate::usecase::error::UsecaseError;

/// Ratings recorded for one road, with their per-dimension means.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadRatings {
    pub ratings: Vec<RatingRecord>,
    pub average: AverageRatings,
}

pub struct RatingsUseCase<R>
where
    R: RatingRepository,
{
    rating_repository: R,
}

impl<R> RatingsUseCase<R>
where
    R: RatingRepository,
{
    pub fn new(rating_repository: R) -> Self {
        Self { rating_repository }
    }

    #[tracing::instrument(skip(self, candidate, provenance), fields(session_id = ?candidate.session_id, road_id = ?candidate.road.id))]
    pub async fn submit_rating(
        &self,
        candidate: RatingCandidate,
        provenance: Provenance,
    ) -> Result<RatingRecord, UsecaseError> {
        tracing::debug!("submitting rating");

        if let Err(problems) = candidate.check() {
            metrics::counter!("ratings_rejected_total").increment(1);
            tracing::warn!(?problems, "rating rejected");
            return Err(UsecaseError::Validation(problems.join(", ")));
        }

        let rating = RatingRecord::new(candidate, provenance);
        self.rating_repository.create(&rating).await?;

        metrics::counter!("ratings_submitted_total").increment(1);
        tracing::info!(rating_id = %rating.id, "rating submitted successfully");
        Ok(rating)
    }

    #[tracing::instrument(skip(self), fields(rating_id = %id))]
    pub async fn get_rating(&self, id: Uuid) -> Result<RatingRecord, UsecaseError> {
        tracing::debug!("getting rating");

        self.rating_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Rating not found".to_string()))
    }

    #[tracing::instrument(skip(self), fields(page = request.page, limit = request.limit))]
    pub async fn list_ratings(&self, request: PageRequest) -> Result<Page<RatingRecord>, UsecaseError> {
        tracing::debug!("listing ratings");

        let items = self
            .rating_repository
            .list(request.limit, request.offset())
            .await?;
        let total = self.rating_repository.count().await?;

        tracing::debug!(count = items.len(), total, "ratings listed");
        Ok(Page {
            items,
            total,
            page: request.page,
            limit: request.limit,
        })
    }

    #[tracing::instrument(skip(self), fields(lat = center.lat, lng = center.lng, ?radius))]
    pub async fn ratings_near(
        &self,
        center: Location,
        radius: Option<f64>,
    ) -> Result<Vec<RatingRecord>, UsecaseError> {
        tracing::debug!("finding ratings near location");

        if !center.lat.is_finite() || !center.lng.is_finite() {
            return Err(UsecaseError::Validation("Invalid coordinates".to_string()));
        }

        let radius = radius.unwrap_or(DEFAULT_RADIUS);
        if !radius.is_finite() || radius < 0.0 {
            return Err(UsecaseError::Validation(
                "Radius must be a non-negative number".to_string(),
            ));
        }

        let bbox = BoundingBox::around(center, radius);
        let ratings = self.rating_repository.find_in_bounding_box(bbox).await?;
        debug_assert!(ratings.iter().all(|r| bbox.contains(&r.location)));

        tracing::debug!(count = ratings.len(), "ratings found near location");
        Ok(ratings)
    }

    #[tracing::instrument(skip(self), fields(%road_id))]
    pub async fn ratings_for_road(&self, road_id: &str) -> Result<RoadRatings, UsecaseError> {
        tracing::debug!("finding ratings for road");

        let ratings = self.rating_repository.find_by_road_id(road_id).await?;
        let average = AverageRatings::of_records(&ratings);

        tracing::debug!(%road_id, count = ratings.len(), ?average, "road ratings retrieved");
        Ok(RoadRatings { ratings, average })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rating::fixtures::{candidate, record};
    use crate::domain::rating::Ratings;
    use crate::repository::errors::RepositoryError;
    use crate::usecase::contracts::MockRatingRepository;

    #[tokio::test]
    async fn test_submit_rating_success() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo.expect_create().times(1).returning(|_| Ok(()));

        let usecase = RatingsUseCase::new(mock_repo);
        let provenance = Provenance {
            ip_address: Some("192.168.1.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        let result = usecase
            .submit_rating(candidate(Ratings::new(3, 4, 2)), provenance)
            .await;

        let rating = result.unwrap();
        assert_eq!(rating.ratings, Ratings::new(3, 4, 2));
        assert_eq!(rating.ip_address.as_deref(), Some("192.168.1.7"));
    }

    #[tokio::test]
    async fn test_submit_rating_out_of_range_persists_nothing() {
        for ratings in [
            Ratings::new(0, 2, 2),
            Ratings::new(2, 5, 2),
            Ratings::new(2, 2, -1),
            Ratings::new(2, 2, 10),
        ] {
            let mut mock_repo = MockRatingRepository::new();
            mock_repo.expect_create().times(0);

            let usecase = RatingsUseCase::new(mock_repo);
            let result = usecase
                .submit_rating(candidate(ratings), Provenance::default())
                .await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_submit_rating_invalid_coordinates_persists_nothing() {
        for (lat, lng) in [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.01), (0.0, -200.0)] {
            let mut mock_repo = MockRatingRepository::new();
            mock_repo.expect_create().times(0);

            let mut bad = candidate(Ratings::new(2, 2, 2));
            bad.location = Location::new(lat, lng);

            let usecase = RatingsUseCase::new(mock_repo);
            let result = usecase.submit_rating(bad, Provenance::default()).await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_submit_rating_joins_field_messages() {
        let mock_repo = MockRatingRepository::new();
        let usecase = RatingsUseCase::new(mock_repo);

        let mut bad = candidate(Ratings::new(0, 2, 9));
        bad.location = Location::new(100.0, 0.0);

        let err = usecase
            .submit_rating(bad, Provenance::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Latitude must be between -90 and 90, \
             Rating 'comfortable' must be between 1 and 4, \
             Rating 'overall' must be between 1 and 4"
        );
    }

    #[tokio::test]
    async fn test_submit_rating_store_failure() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("pool timed out".to_string())));

        let usecase = RatingsUseCase::new(mock_repo);
        let result = usecase
            .submit_rating(candidate(Ratings::new(1, 1, 1)), Provenance::default())
            .await;

        assert!(matches!(result, Err(UsecaseError::Internal(_))));
    }

    #[tokio::test]
    async fn test_get_rating_is_stable() {
        let stored = record(Ratings::new(2, 3, 4));
        let id = stored.id;
        let stored_clone = stored.clone();

        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq(id))
            .times(1)
            .returning(move |_| Ok(Some(stored_clone.clone())));

        let usecase = RatingsUseCase::new(mock_repo);
        let fetched = usecase.get_rating(id).await.unwrap();

        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_get_rating_not_found() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo.expect_find_by_id().times(1).returning(|_| Ok(None));

        let usecase = RatingsUseCase::new(mock_repo);
        let result = usecase.get_rating(Uuid::new_v4()).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_ratings_second_page() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_list()
            .with(mockall::predicate::eq(10), mockall::predicate::eq(10))
            .times(1)
            .returning(|limit, _| {
                Ok((0..limit).map(|_| record(Ratings::new(2, 2, 2))).collect())
            });
        mock_repo.expect_count().times(1).returning(|| Ok(25));

        let usecase = RatingsUseCase::new(mock_repo);
        let page = usecase
            .list_ratings(PageRequest::new(Some(2), Some(10)))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_list_ratings_empty_store() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_list()
            .with(mockall::predicate::eq(50), mockall::predicate::eq(0))
            .times(1)
            .returning(|_, _| Ok(vec![]));
        mock_repo.expect_count().times(1).returning(|| Ok(0));

        let usecase = RatingsUseCase::new(mock_repo);
        let page = usecase.list_ratings(PageRequest::default()).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages(), 0);
    }

    #[tokio::test]
    async fn test_ratings_near_uses_default_radius() {
        let center = Location::new(40.0, -74.0);
        let expected = BoundingBox::around(center, DEFAULT_RADIUS);

        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_find_in_bounding_box()
            .with(mockall::predicate::eq(expected))
            .times(1)
            .returning(|_| Ok(vec![]));

        let usecase = RatingsUseCase::new(mock_repo);
        let result = usecase.ratings_near(center, None).await;

        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ratings_near_rejects_bad_radius() {
        for radius in [-0.1, f64::NAN, f64::INFINITY] {
            let mut mock_repo = MockRatingRepository::new();
            mock_repo.expect_find_in_bounding_box().times(0);

            let usecase = RatingsUseCase::new(mock_repo);
            let result = usecase
                .ratings_near(Location::new(40.0, -74.0), Some(radius))
                .await;

            assert!(matches!(result, Err(UsecaseError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_ratings_near_rejects_non_finite_center() {
        let mock_repo = MockRatingRepository::new();
        let usecase = RatingsUseCase::new(mock_repo);

        let result = usecase
            .ratings_near(Location::new(f64::NAN, 10.0), None)
            .await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ratings_for_road_average() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_find_by_road_id()
            .times(1)
            .returning(|_| {
                Ok(vec![
                    record(Ratings::new(3, 4, 2)),
                    record(Ratings::new(1, 2, 4)),
                ])
            });

        let usecase = RatingsUseCase::new(mock_repo);
        let road = usecase.ratings_for_road("R1").await.unwrap();

        assert_eq!(road.ratings.len(), 2);
        assert_eq!(
            road.average,
            AverageRatings {
                comfortable: 2.0,
                safe: 3.0,
                overall: 3.0
            }
        );
    }

    #[tokio::test]
    async fn test_ratings_for_unknown_road() {
        let mut mock_repo = MockRatingRepository::new();
        mock_repo
            .expect_find_by_road_id()
            .times(1)
            .returning(|_| Ok(vec![]));

        let usecase = RatingsUseCase::new(mock_repo);
        let road = usecase.ratings_for_road("nope").await.unwrap();

        assert!(road.ratings.is_empty());
        assert_eq!(road.average, AverageRatings::default());
    }
}
