use serde::{Serialize, Serializer};

use crate::domain::rating::{RatingRecord, RATING_MAX, RATING_MIN};

/// Number of trailing days covered by the trend series.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Rounds half-up to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AverageRatings {
    pub comfortable: f64,
    pub safe: f64,
    pub overall: f64,
}

impl AverageRatings {
    /// Missing means (empty input) report 0.
    pub fn from_means(comfortable: Option<f64>, safe: Option<f64>, overall: Option<f64>) -> Self {
        Self {
            comfortable: round_one_decimal(comfortable.unwrap_or(0.0)),
            safe: round_one_decimal(safe.unwrap_or(0.0)),
            overall: round_one_decimal(overall.unwrap_or(0.0)),
        }
    }

    pub fn of_records(records: &[RatingRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let (comfortable, safe, overall) = records.iter().fold((0i64, 0i64, 0i64), |acc, r| {
            (
                acc.0 + i64::from(r.ratings.comfortable),
                acc.1 + i64::from(r.ratings.safe),
                acc.2 + i64::from(r.ratings.overall),
            )
        });
        let n = records.len() as f64;

        Self::from_means(
            Some(comfortable as f64 / n),
            Some(safe as f64 / n),
            Some(overall as f64 / n),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKey {
    Rating(i16),
    Other,
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BucketKey::Rating(value) => serializer.serialize_i16(*value),
            BucketKey::Other => serializer.serialize_str("other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub bucket: BucketKey,
    pub count: i64,
}

/// Buckets `(overall, count)` pairs on the integer edges `RATING_MIN..=RATING_MAX`.
/// Anything outside lands in `other`; empty buckets are omitted.
pub fn bucket_distribution(counts: &[(i16, i64)]) -> Vec<DistributionBucket> {
    let width = (RATING_MAX - RATING_MIN + 1) as usize;
    let mut buckets = vec![0i64; width];
    let mut other = 0i64;

    for &(value, count) in counts {
        if (RATING_MIN..=RATING_MAX).contains(&value) {
            buckets[(value - RATING_MIN) as usize] += count;
        } else {
            other += count;
        }
    }

    let mut distribution: Vec<DistributionBucket> = buckets
        .into_iter()
        .zip(RATING_MIN..=RATING_MAX)
        .filter(|(count, _)| *count > 0)
        .map(|(count, value)| DistributionBucket {
            bucket: BucketKey::Rating(value),
            count,
        })
        .collect();

    if other > 0 {
        distribution.push(DistributionBucket {
            bucket: BucketKey::Other,
            count: other,
        });
    }

    distribution
}

/// Store-side count and per-dimension means; means are `None` on an empty store.
#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub struct RatingTotals {
    pub count: i64,
    pub mean_comfortable: Option<f64>,
    pub mean_safe: Option<f64>,
    pub mean_overall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    pub date: String,
    pub count: i64,
    pub avg_overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub total_ratings: i64,
    pub average_ratings: AverageRatings,
    pub rating_distribution: Vec<DistributionBucket>,
    pub recent_trends: Vec<DailyTrend>,
}
