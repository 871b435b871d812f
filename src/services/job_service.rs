use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::common_dto::{paginate, Page};
use crate::dto::job_dto::{CreateJobPayload, JobListQuery, JobPatch};
use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::store::{Collection, LocalStore, Scan};
use crate::utils::{slug::job_slug, time::now, validation::require_non_blank};

#[derive(Clone)]
pub struct JobService {
    jobs: Collection<Job>,
}

impl JobService {
    pub fn new(store: &LocalStore) -> Self {
        Self {
            jobs: store.jobs.clone(),
        }
    }

    /// Filters, sorts newest first, then paginates.
    pub async fn list(&self, query: JobListQuery) -> Result<Page<Job>> {
        let page = query.page.unwrap_or(1);
        let page_size = query.page_size.unwrap_or(JobListQuery::DEFAULT_PAGE_SIZE);
        let title = query
            .title
            .as_deref()
            .map(str::to_lowercase)
            .filter(|t| !t.is_empty());
        let tags = query.tag_list();

        let scan = match query.status.as_deref().filter(|s| !s.is_empty()) {
            Some(status) => Scan::all().where_eq("status", status),
            None => Scan::all(),
        };
        let mut items = self.jobs.scan(scan).await?;
        items.retain(|job| {
            title
                .as_deref()
                .map_or(true, |needle| job.title.to_lowercase().contains(needle))
                && job.has_all_tags(&tags)
        });
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(items, page, page_size))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Job> {
        self.jobs
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Not found".to_string()))
    }

    pub async fn create(&self, payload: CreateJobPayload) -> Result<Job> {
        let title = require_non_blank(payload.title.as_deref(), "Title")?.to_string();
        let id = Uuid::new_v4().to_string();
        let slug_base = payload
            .slug
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&title);
        let slug = job_slug(slug_base, &id);
        let tags = distinct_tags(payload.tags.unwrap_or_default());
        let status = payload.status.unwrap_or_default();

        let ts = now();
        let job = self
            .jobs
            .add_counted(move |count| Job {
                id,
                title,
                slug,
                status,
                tags,
                order: count + 1,
                created_at: ts,
                updated_at: ts,
            })
            .await?;

        info!(job_id = %job.id, slug = %job.slug, order = job.order, "Job created");
        Ok(job)
    }

    /// Shallow-merges the provided fields and refreshes `updated_at`.
    pub async fn update(&self, id: &str, patch: JobPatch) -> Result<Job> {
        let ts = now();
        let job = self
            .jobs
            .update(id, move |job| {
                if let Some(title) = patch.title {
                    job.title = title;
                }
                if let Some(status) = patch.status {
                    job.status = status;
                }
                if let Some(tags) = patch.tags {
                    job.tags = distinct_tags(tags);
                }
                if let Some(order) = patch.order {
                    job.order = order;
                }
                job.updated_at = ts;
            })
            .await?
            .ok_or_else(|| Error::NotFound("Not found".to_string()))?;

        info!(job_id = %job.id, "Job updated");
        Ok(job)
    }

    /// Assigns 1-based positions from `ordered_ids`. Unknown ids are skipped.
    /// Returns how many jobs were re-ranked.
    pub async fn reorder(&self, ordered_ids: &[String]) -> Result<usize> {
        let ts = now();
        let mut updated = 0;
        for (position, id) in ordered_ids.iter().enumerate() {
            let order = position as i64 + 1;
            let result = self
                .jobs
                .update(id, move |job| {
                    job.order = order;
                    job.updated_at = ts;
                })
                .await?;
            match result {
                Some(_) => updated += 1,
                None => debug!(job_id = %id, "Ignoring unknown job id in reorder"),
            }
        }

        info!(requested = ordered_ids.len(), updated, "Jobs reordered");
        Ok(updated)
    }
}

/// Tags are a set; keeps the first occurrence of each.
fn distinct_tags(tags: Vec<String>) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !distinct.contains(&tag) {
            distinct.push(tag);
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_tags_keeps_first_occurrence_order() {
        let tags = ["remote", "contract", "remote", "onsite", "contract"]
            .map(String::from)
            .to_vec();
        assert_eq!(distinct_tags(tags), vec!["remote", "contract", "onsite"]);
    }
}
