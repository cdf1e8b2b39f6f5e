use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 4;

pub const DEFAULT_ROAD_NAME: &str = "Unnamed road";
pub const DEFAULT_ROAD_TYPE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: Option<String>,
    pub index: Option<i32>,
    pub name: String,
    #[serde(rename = "type")]
    pub road_type: String,
}

impl Default for Road {
    fn default() -> Self {
        Self {
            id: None,
            index: None,
            name: DEFAULT_ROAD_NAME.to_string(),
            road_type: DEFAULT_ROAD_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub comfortable: i16,
    pub safe: i16,
    pub overall: i16,
}

impl Ratings {
    pub fn new(comfortable: i16, safe: i16, overall: i16) -> Self {
        Self {
            comfortable,
            safe,
            overall,
        }
    }
}

fn in_rating_range(value: i16) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&value)
}

/// Survey answers a client may attach to its first rating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineSurvey {
    pub influencing_factors: Vec<String>,
    pub additional_comments: String,
}

/// Request metadata captured by the transport, stored opaquely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A rating as submitted, before it is stamped and persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingCandidate {
    pub session_id: Option<String>,
    pub location: Location,
    pub road: Road,
    pub ratings: Ratings,
    pub rating_reason: Option<String>,
    pub survey_data: Option<InlineSurvey>,
}

impl RatingCandidate {
    /// Returns one message per violated invariant.
    pub fn check(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !(-90.0..=90.0).contains(&self.location.lat) {
            problems.push("Latitude must be between -90 and 90".to_string());
        }
        if !(-180.0..=180.0).contains(&self.location.lng) {
            problems.push("Longitude must be between -180 and 180".to_string());
        }

        for (name, value) in [
            ("comfortable", self.ratings.comfortable),
            ("safe", self.ratings.safe),
            ("overall", self.ratings.overall),
        ] {
            if !in_rating_range(value) {
                problems.push(format!(
                    "Rating '{name}' must be between {RATING_MIN} and {RATING_MAX}"
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub id: Uuid,
    pub session_id: Option<String>,
    pub location: Location,
    pub road: Road,
    pub ratings: Ratings,
    pub rating_reason: Option<String>,
    pub survey_data: Option<InlineSurvey>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RatingRecord {
    pub fn new(candidate: RatingCandidate, provenance: Provenance) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session_id: candidate.session_id,
            location: candidate.location,
            road: candidate.road,
            ratings: candidate.ratings,
            rating_reason: candidate.rating_reason,
            survey_data: candidate.survey_data,
            ip_address: provenance.ip_address,
            user_agent: provenance.user_agent,
            created_at: now,
            updated_at: now,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::candidate;
    use super::*;

    #[test]
    fn test_rating_record_creation() {
        let provenance = Provenance {
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: Some("curl/8.0".to_string()),
        };
        let record = RatingRecord::new(candidate(Ratings::new(3, 4, 2)), provenance);

        assert_eq!(record.ratings, Ratings::new(3, 4, 2));
        assert_eq!(record.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(record.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = RatingRecord::new(candidate(Ratings::new(1, 1, 1)), Provenance::default());
        let b = RatingRecord::new(candidate(Ratings::new(1, 1, 1)), Provenance::default());

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_check_accepts_bounds() {
        assert!(candidate(Ratings::new(1, 4, 1)).check().is_ok());
        assert!(candidate(Ratings::new(4, 1, 4)).check().is_ok());

        let mut edge = candidate(Ratings::new(2, 2, 2));
        edge.location = Location::new(-90.0, 180.0);
        assert!(edge.check().is_ok());
    }

    #[test]
    fn test_check_rejects_out_of_range_ratings() {
        let problems = candidate(Ratings::new(0, 5, 2)).check().unwrap_err();

        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("comfortable"));
        assert!(problems[1].contains("safe"));
    }

    #[test]
    fn test_check_rejects_out_of_range_coordinates() {
        let mut bad = candidate(Ratings::new(2, 2, 2));
        bad.location = Location::new(90.0001, -180.5);

        let problems = bad.check().unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("Latitude"));
        assert!(problems[1].contains("Longitude"));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let mut c = candidate(Ratings::new(3, 4, 2));
        c.rating_reason = Some("narrow shoulder".to_string());
        c.survey_data = Some(InlineSurvey {
            influencing_factors: vec!["traffic".to_string()],
            additional_comments: String::new(),
        });
        let record = RatingRecord::new(c, Provenance::default());

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["sessionId"], "session-1");
        assert_eq!(json["ratingReason"], "narrow shoulder");
        assert_eq!(json["road"]["type"], "Unknown");
        assert_eq!(json["road"]["name"], "Unnamed road");
        assert_eq!(json["surveyData"]["influencingFactors"][0], "traffic");
        assert!(json.get("createdAt").is_some());
    }
}
