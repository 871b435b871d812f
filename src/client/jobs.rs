use async_trait::async_trait;
use http::Method;
use serde_json::Value as JsonValue;

use super::{
    query_string, run_optimistic, with_query, ApiClient, ApiError, ApiRequest, OptimisticMutation,
    QueryCache, QueryKey, Transport,
};
use crate::dto::common_dto::{OkResponse, Page};
use crate::dto::job_dto::{CreateJobPayload, JobListQuery, JobPatch, ReorderPayload};
use crate::models::job::Job;

impl<T> ApiClient<T>
where
    T: Transport + Send + Sync + 'static,
{
    pub async fn list_jobs(&self, query: &JobListQuery) -> Result<Page<Job>, ApiError> {
        let qs = query_string(query);
        let request = ApiRequest::get(with_query("/jobs", &qs));
        self.fetch(QueryKey::new(QueryKey::JOBS, qs), request).await
    }

    /// `None` when the server answers 404.
    pub async fn get_job(&self, id: &str) -> Result<Option<Job>, ApiError> {
        let request = ApiRequest::get(format!("/jobs/{}", id));
        match self.fetch(QueryKey::new(QueryKey::JOB, id), request).await {
            Ok(job) => Ok(Some(job)),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn create_job(&self, payload: &CreateJobPayload) -> Result<Job, ApiError> {
        let request = ApiRequest::with_body(Method::POST, "/jobs", payload)?;
        let job: Job = self.send_once(request).await?;
        self.cache().invalidate_resource(QueryKey::JOBS);
        Ok(job)
    }

    pub async fn update_job(&self, id: &str, patch: &JobPatch) -> Result<Job, ApiError> {
        let request = ApiRequest::with_body(Method::PATCH, format!("/jobs/{}", id), patch)?;
        let job: Job = self.send_once(request).await?;
        self.cache().invalidate_resource(QueryKey::JOBS);
        self.cache().set(QueryKey::new(QueryKey::JOB, id), &job);
        Ok(job)
    }

    /// Re-ranks cached job pages at once and rolls them back if the server
    /// rejects the new order.
    pub async fn reorder_jobs(&self, ordered_ids: Vec<String>) -> Result<(), ApiError> {
        let mutation = ReorderJobs {
            client: self,
            ordered_ids,
        };
        run_optimistic(self.cache(), &mutation).await?;
        self.cache().invalidate_resource(QueryKey::JOBS);
        Ok(())
    }
}

pub struct ReorderJobs<'a, T> {
    client: &'a ApiClient<T>,
    ordered_ids: Vec<String>,
}

impl<T> ReorderJobs<'_, T> {
    fn rank(&self, id: &str) -> Option<i64> {
        self.ordered_ids
            .iter()
            .position(|candidate| candidate == id)
            .map(|position| position as i64 + 1)
    }
}

#[async_trait]
impl<'a, T> OptimisticMutation for ReorderJobs<'a, T>
where
    T: Transport + Send + Sync + 'static,
{
    type Snapshot = Vec<(QueryKey, JsonValue)>;
    type Output = ();

    fn apply_locally(&self, cache: &QueryCache) -> Self::Snapshot {
        let snapshot = cache.snapshot(QueryKey::JOBS);
        cache.update_resource(QueryKey::JOBS, |page| {
            let Some(items) = page.get_mut("items").and_then(JsonValue::as_array_mut) else {
                return;
            };
            for item in items.iter_mut() {
                let rank = item
                    .get("id")
                    .and_then(JsonValue::as_str)
                    .and_then(|id| self.rank(id));
                if let Some(rank) = rank {
                    item["order"] = JsonValue::from(rank);
                }
            }
            items.sort_by_key(|item| item.get("order").and_then(JsonValue::as_i64));
        });
        snapshot
    }

    fn revert_locally(&self, cache: &QueryCache, snapshot: Self::Snapshot) {
        cache.restore(snapshot);
    }

    async fn remote_call(&self) -> Result<(), ApiError> {
        // The path id is not interpreted by the server.
        let anchor = self.ordered_ids.first().map(String::as_str).unwrap_or("all");
        let request = ApiRequest::with_body(
            Method::PATCH,
            format!("/jobs/{}/reorder", anchor),
            &ReorderPayload {
                ordered_ids: self.ordered_ids.clone(),
            },
        )?;
        let _: OkResponse = self.client.send_once(request).await?;
        Ok(())
    }
}
