use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::delivery::http::v1::envelope::ApiResponse;
use crate::delivery::http::v1::validation::{rejection_error, validated};
use crate::domain::survey::SurveyData;
use crate::usecase::error::UsecaseError;
use crate::AppState;

const MISSING_FIELDS_MESSAGE: &str = "Missing session ID or survey data";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSurveyRequest {
    #[validate(
        required(message = "Missing session ID or survey data"),
        length(min = 1, message = "Missing session ID or survey data")
    )]
    pub session_id: Option<String>,
    #[validate(required(message = "Missing session ID or survey data"))]
    pub survey_data: Option<Value>,
}

impl SubmitSurveyRequest {
    fn into_parts(self) -> Result<(String, SurveyData), UsecaseError> {
        let missing = || UsecaseError::Validation(MISSING_FIELDS_MESSAGE.to_string());

        let session_id = self.session_id.ok_or_else(missing)?;
        match self.survey_data.ok_or_else(missing)? {
            Value::Object(answers) => Ok((session_id, answers)),
            Value::Null => Err(missing()),
            _ => Err(UsecaseError::Validation(
                "Survey data must be an object".to_string(),
            )),
        }
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn submit_survey(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitSurveyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling submit survey request");

    let Json(payload) = payload.map_err(rejection_error)?;
    let (session_id, answers) = validated(payload)?.into_parts()?;

    let survey = state
        .surveys_usecase
        .submit_survey(session_id, answers)
        .await?;

    tracing::debug!(survey_id = %survey.id, "survey created successfully");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(survey))))
}

#[tracing::instrument(skip(state))]
pub async fn get_survey(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get survey request");

    let survey = state.surveys_usecase.get_survey(&session_id).await?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(survey))))
}
