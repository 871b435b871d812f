use tracing::info;
use uuid::Uuid;

use crate::dto::candidate_dto::{CandidateListQuery, CandidatePatch, NotePayload};
use crate::dto::common_dto::{paginate, Page};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::timeline::{CandidateTimelineItem, TimelineKind};
use crate::store::{Collection, LocalStore, Scan, SortOrder};
use crate::utils::{time::now, validation::require_non_blank};

#[derive(Clone)]
pub struct CandidateService {
    candidates: Collection<Candidate>,
    timeline: Collection<CandidateTimelineItem>,
}

impl CandidateService {
    pub fn new(store: &LocalStore) -> Self {
        Self {
            candidates: store.candidates.clone(),
            timeline: store.timeline.clone(),
        }
    }

    /// Store iteration order; no secondary sort.
    pub async fn list(&self, query: CandidateListQuery) -> Result<Page<Candidate>> {
        let page = query.page.unwrap_or(1);
        let page_size = query
            .page_size
            .unwrap_or(CandidateListQuery::DEFAULT_PAGE_SIZE);
        let needle = query
            .q
            .as_deref()
            .map(str::to_lowercase)
            .filter(|q| !q.is_empty());

        let scan = match query.stage.as_deref().filter(|s| !s.is_empty()) {
            Some(stage) => Scan::all().where_eq("stage", stage),
            None => Scan::all(),
        };
        let mut items = self.candidates.scan(scan).await?;
        if let Some(needle) = needle.as_deref() {
            items.retain(|candidate| candidate.matches_search(needle));
        }

        Ok(paginate(items, page, page_size))
    }

    pub async fn timeline(&self, candidate_id: &str) -> Result<Vec<CandidateTimelineItem>> {
        self.timeline
            .scan(
                Scan::all()
                    .where_eq("candidateId", candidate_id)
                    .order_by("createdAt", SortOrder::Asc),
            )
            .await
    }

    pub async fn add_note(
        &self,
        candidate_id: &str,
        payload: NotePayload,
    ) -> Result<CandidateTimelineItem> {
        require_non_blank(payload.message.as_deref(), "Message")?;
        let message = payload.message.unwrap_or_default();

        let note = CandidateTimelineItem {
            id: Uuid::new_v4().to_string(),
            candidate_id: candidate_id.to_string(),
            kind: TimelineKind::Note,
            message,
            created_at: now(),
        };
        self.timeline.add(&note).await?;

        info!(
            candidate_id = %candidate_id,
            mentions = ?note.mentions(),
            "Note added to candidate timeline"
        );
        Ok(note)
    }

    /// Shallow-merges the provided fields and refreshes `updated_at`.
    /// `job_id` is not re-validated against the jobs collection.
    pub async fn update(&self, id: &str, patch: CandidatePatch) -> Result<Candidate> {
        let ts = now();
        let candidate = self
            .candidates
            .update(id, move |candidate| {
                if let Some(job_id) = patch.job_id {
                    candidate.job_id = job_id;
                }
                if let Some(name) = patch.name {
                    candidate.name = name;
                }
                if let Some(email) = patch.email {
                    candidate.email = email;
                }
                if let Some(stage) = patch.stage {
                    candidate.stage = stage;
                }
                candidate.updated_at = ts;
            })
            .await?
            .ok_or_else(|| Error::NotFound("Not found".to_string()))?;

        info!(candidate_id = %candidate.id, stage = candidate.stage.as_str(), "Candidate updated");
        Ok(candidate)
    }
}
