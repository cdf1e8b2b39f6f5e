use crate::domain::survey::{SurveyData, SurveyRecord};
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::SurveyRepository;
use crate::usecase::error::UsecaseError;

const DUPLICATE_SURVEY_MESSAGE: &str = "A survey has already been submitted for this session";

pub struct SurveysUseCase<S>
where
    S: SurveyRepository,
{
    survey_repository: S,
}

impl<S> SurveysUseCase<S>
where
    S: SurveyRepository,
{
    pub fn new(survey_repository: S) -> Self {
        Self { survey_repository }
    }

    #[tracing::instrument(skip(self, survey_data), fields(%session_id, answers = survey_data.len()))]
    pub async fn submit_survey(
        &self,
        session_id: String,
        survey_data: SurveyData,
    ) -> Result<SurveyRecord, UsecaseError> {
        tracing::debug!("submitting survey");

        if session_id.trim().is_empty() {
            return Err(UsecaseError::Validation(
                "Missing session ID or survey data".to_string(),
            ));
        }

        if self
            .survey_repository
            .find_by_session_id(&session_id)
            .await?
            .is_some()
        {
            metrics::counter!("surveys_conflict_total").increment(1);
            tracing::warn!(%session_id, "survey already submitted for session");
            return Err(UsecaseError::Conflict(DUPLICATE_SURVEY_MESSAGE.to_string()));
        }

        let survey = SurveyRecord::new(session_id, survey_data);
        // the unique index still catches a concurrent submission for the same session
        match self.survey_repository.create(&survey).await {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                metrics::counter!("surveys_conflict_total").increment(1);
                tracing::warn!(session_id = %survey.session_id, "concurrent survey submission rejected");
                return Err(UsecaseError::Conflict(DUPLICATE_SURVEY_MESSAGE.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        metrics::counter!("surveys_submitted_total").increment(1);
        tracing::info!(survey_id = %survey.id, session_id = %survey.session_id, "survey submitted successfully");
        Ok(survey)
    }

    #[tracing::instrument(skip(self), fields(%session_id))]
    pub async fn get_survey(&self, session_id: &str) -> Result<SurveyRecord, UsecaseError> {
        tracing::debug!("getting survey");

        self.survey_repository
            .find_by_session_id(session_id)
            .await?
            .ok_or_else(|| {
                UsecaseError::NotFound("No survey found for this session".to_string())
            })
    }
}
