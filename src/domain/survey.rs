use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form answers; the question set changes independently of the code.
pub type SurveyData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub id: Uuid,
    pub session_id: String,
    pub survey_data: SurveyData,
    pub created_at: DateTime<Utc>,
}

impl SurveyRecord {
    pub fn new(session_id: String, survey_data: SurveyData) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            survey_data,
            created_at: Utc::now(),
        }
    }
}
