use async_trait::async_trait;
use http::Method;
use serde_json::Value as JsonValue;

use super::{
    query_string, run_optimistic, with_query, ApiClient, ApiError, ApiRequest, OptimisticMutation,
    QueryCache, QueryKey, Transport,
};
use crate::dto::candidate_dto::{CandidateListQuery, CandidatePatch, NotePayload};
use crate::dto::common_dto::{ItemsResponse, Page};
use crate::models::candidate::{Candidate, Stage};
use crate::models::timeline::CandidateTimelineItem;

impl<T> ApiClient<T>
where
    T: Transport + Send + Sync + 'static,
{
    pub async fn list_candidates(
        &self,
        query: &CandidateListQuery,
    ) -> Result<Page<Candidate>, ApiError> {
        let qs = query_string(query);
        let request = ApiRequest::get(with_query("/candidates", &qs));
        self.fetch(QueryKey::new(QueryKey::CANDIDATES, qs), request).await
    }

    pub async fn candidate_timeline(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<CandidateTimelineItem>, ApiError> {
        let request = ApiRequest::get(format!("/candidates/{}/timeline", candidate_id));
        let response: ItemsResponse<CandidateTimelineItem> = self
            .fetch(QueryKey::new(QueryKey::CANDIDATE_TIMELINE, candidate_id), request)
            .await?;
        Ok(response.items)
    }

    pub async fn add_note(
        &self,
        candidate_id: &str,
        message: &str,
    ) -> Result<CandidateTimelineItem, ApiError> {
        let request = ApiRequest::with_body(
            Method::POST,
            format!("/candidates/{}/notes", candidate_id),
            &NotePayload {
                message: Some(message.to_string()),
            },
        )?;
        let note: CandidateTimelineItem = self.send_once(request).await?;
        self.cache()
            .invalidate(&QueryKey::new(QueryKey::CANDIDATE_TIMELINE, candidate_id));
        Ok(note)
    }

    pub async fn update_candidate(
        &self,
        candidate_id: &str,
        patch: &CandidatePatch,
    ) -> Result<Candidate, ApiError> {
        let candidate = self.patch_candidate(candidate_id, patch).await?;
        self.cache().invalidate_resource(QueryKey::CANDIDATES);
        Ok(candidate)
    }

    /// Kanban move: the candidate shows up in its new stage in every cached
    /// page right away and moves back if the server refuses.
    pub async fn move_candidate_stage(
        &self,
        candidate_id: &str,
        stage: Stage,
    ) -> Result<Candidate, ApiError> {
        let mutation = MoveCandidateStage {
            client: self,
            candidate_id: candidate_id.to_string(),
            stage,
        };
        let candidate = run_optimistic(self.cache(), &mutation).await?;
        self.cache().invalidate_resource(QueryKey::CANDIDATES);
        Ok(candidate)
    }

    async fn patch_candidate(
        &self,
        candidate_id: &str,
        patch: &CandidatePatch,
    ) -> Result<Candidate, ApiError> {
        let request =
            ApiRequest::with_body(Method::PATCH, format!("/candidates/{}", candidate_id), patch)?;
        self.send_once(request).await
    }
}

pub struct MoveCandidateStage<'a, T> {
    client: &'a ApiClient<T>,
    candidate_id: String,
    stage: Stage,
}

#[async_trait]
impl<'a, T> OptimisticMutation for MoveCandidateStage<'a, T>
where
    T: Transport + Send + Sync + 'static,
{
    type Snapshot = Vec<(QueryKey, JsonValue)>;
    type Output = Candidate;

    fn apply_locally(&self, cache: &QueryCache) -> Self::Snapshot {
        let snapshot = cache.snapshot(QueryKey::CANDIDATES);
        cache.update_resource(QueryKey::CANDIDATES, |page| {
            let Some(items) = page.get_mut("items").and_then(JsonValue::as_array_mut) else {
                return;
            };
            for item in items.iter_mut() {
                if item.get("id").and_then(JsonValue::as_str) == Some(self.candidate_id.as_str()) {
                    item["stage"] = JsonValue::from(self.stage.as_str());
                }
            }
        });
        snapshot
    }

    fn revert_locally(&self, cache: &QueryCache, snapshot: Self::Snapshot) {
        cache.restore(snapshot);
    }

    async fn remote_call(&self) -> Result<Candidate, ApiError> {
        let patch = CandidatePatch {
            stage: Some(self.stage),
            ..CandidatePatch::default()
        };
        self.client.patch_candidate(&self.candidate_id, &patch).await
    }
}
