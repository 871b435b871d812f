use http::Method;

use super::{ApiClient, ApiError, ApiRequest, QueryKey, Transport};
use crate::dto::assessment_dto::{SaveAssessmentPayload, SubmitResponsePayload};
use crate::dto::common_dto::OkResponse;
use crate::models::assessment::Assessment;

impl<T> ApiClient<T>
where
    T: Transport + Send + Sync + 'static,
{
    /// `None` when the job has no assessment yet.
    pub async fn get_assessment(&self, job_id: &str) -> Result<Option<Assessment>, ApiError> {
        let request = ApiRequest::get(format!("/assessments/{}", job_id));
        self.fetch(QueryKey::new(QueryKey::ASSESSMENT, job_id), request)
            .await
    }

    pub async fn save_assessment(
        &self,
        job_id: &str,
        payload: &SaveAssessmentPayload,
    ) -> Result<(), ApiError> {
        let request =
            ApiRequest::with_body(Method::PUT, format!("/assessments/{}", job_id), payload)?;
        let _: OkResponse = self.send_once(request).await?;
        self.cache()
            .invalidate(&QueryKey::new(QueryKey::ASSESSMENT, job_id));
        Ok(())
    }

    pub async fn submit_assessment(
        &self,
        job_id: &str,
        payload: &SubmitResponsePayload,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::with_body(
            Method::POST,
            format!("/assessments/{}/submit", job_id),
            payload,
        )?;
        let _: OkResponse = self.send_once(request).await?;
        Ok(())
    }
}
