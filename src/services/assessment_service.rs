use tracing::info;
use uuid::Uuid;

use crate::dto::assessment_dto::{SaveAssessmentPayload, SubmitResponsePayload};
use crate::error::{Error, Result};
use crate::models::assessment::Assessment;
use crate::models::assessment_response::AssessmentResponse;
use crate::store::{Collection, LocalStore};
use crate::utils::time::now;

#[derive(Clone)]
pub struct AssessmentService {
    assessments: Collection<Assessment>,
    responses: Collection<AssessmentResponse>,
}

impl AssessmentService {
    pub fn new(store: &LocalStore) -> Self {
        Self {
            assessments: store.assessments.clone(),
            responses: store.responses.clone(),
        }
    }

    pub async fn get(&self, job_id: &str) -> Result<Option<Assessment>> {
        self.assessments.get(job_id).await
    }

    /// Replaces the whole document stored under `job_id`.
    pub async fn save(&self, job_id: &str, payload: SaveAssessmentPayload) -> Result<Assessment> {
        let assessment = Assessment {
            id: job_id.to_string(),
            sections: payload.sections,
            questions: payload.questions,
            updated_at: now(),
        };
        assessment
            .check_structure()
            .map_err(|err| Error::BadRequest(err.to_string()))?;
        self.assessments.put(&assessment).await?;

        info!(
            job_id = %job_id,
            sections = assessment.sections.len(),
            questions = assessment.questions.len(),
            "Assessment saved"
        );
        Ok(assessment)
    }

    /// Appends a response as submitted. Answers are not checked against the
    /// question constraints here; see `Assessment::validate_answers`.
    pub async fn submit(
        &self,
        job_id: &str,
        payload: SubmitResponsePayload,
    ) -> Result<AssessmentResponse> {
        let response = AssessmentResponse {
            id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            candidate_id: payload.candidate_id,
            answers: payload.answers,
            created_at: now(),
        };
        self.responses.add(&response).await?;

        info!(
            job_id = %job_id,
            candidate_id = %response.candidate_id,
            answers = response.answers.len(),
            "Assessment response submitted"
        );
        Ok(response)
    }
}
