use chrono::{DateTime, Duration, Utc};

use crate::domain::stats::{
    bucket_distribution, round_one_decimal, AverageRatings, DailyTrend, RatingStats,
    TREND_WINDOW_DAYS,
};
use crate::usecase::contracts::RatingRepository;
use crate::usecase::error::UsecaseError;

/// Recomputes every statistic from the store on each call.
pub struct StatsUseCase<R>
where
    R: RatingRepository,
{
    rating_repository: R,
}

impl<R> StatsUseCase<R>
where
    R: RatingRepository,
{
    pub fn new(rating_repository: R) -> Self {
        Self { rating_repository }
    }

    pub async fn get_stats(&self) -> Result<RatingStats, UsecaseError> {
        self.stats_at(Utc::now()).await
    }

    #[tracing::instrument(skip(self), fields(%now))]
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<RatingStats, UsecaseError> {
        tracing::debug!("computing rating stats");

        let totals = self.rating_repository.totals().await?;
        let average_ratings = if totals.count == 0 {
            AverageRatings::default()
        } else {
            AverageRatings::from_means(totals.mean_comfortable, totals.mean_safe, totals.mean_overall)
        };

        let counts = self.rating_repository.count_by_overall().await?;
        let rating_distribution = bucket_distribution(&counts);

        let since = now - Duration::days(TREND_WINDOW_DAYS);
        let recent_trends = self
            .rating_repository
            .daily_trends(since)
            .await?
            .into_iter()
            .map(|day| DailyTrend {
                avg_overall: round_one_decimal(day.avg_overall),
                ..day
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            total = totals.count,
            buckets = rating_distribution.len(),
            days = recent_trends.len(),
            "rating stats computed"
        );
        Ok(RatingStats {
            total_ratings: totals.count,
            average_ratings,
            rating_distribution,
            recent_trends,
        })
    }
}
