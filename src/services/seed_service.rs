use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::models::assessment::{Assessment, AssessmentQuestion, AssessmentSection, QuestionType};
use crate::models::candidate::{Candidate, Stage};
use crate::models::job::{Job, JobStatus};
use crate::models::timeline::{CandidateTimelineItem, TimelineKind};
use crate::store::LocalStore;
use crate::utils::{slug::job_slug, time};

const JOB_COUNT: usize = 25;
const ASSESSMENT_COUNT: usize = 3;
const QUESTIONS_PER_ASSESSMENT: usize = 12;

const JOB_TITLES: &[&str] = &[
    "Backend Engineer",
    "Frontend Engineer",
    "Site Reliability Engineer",
    "Data Analyst",
    "Product Manager",
    "Product Designer",
    "QA Engineer",
    "Technical Writer",
    "Engineering Manager",
    "Security Engineer",
    "Customer Success Lead",
    "Recruiter",
];
const TAGS: &[&str] = &["remote", "onsite", "full-time", "part-time", "contract"];
const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Linus", "Margaret", "Ken", "Barbara", "Dennis", "Frances", "Edsger",
    "Radia", "Tim", "Hedy", "John", "Katherine", "Donald",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Torvalds", "Hamilton", "Thompson", "Liskov", "Ritchie",
    "Allen", "Dijkstra", "Perlman", "Berners-Lee", "Lamarr", "Backus", "Johnson", "Knuth",
];
const SECTION_TITLES: [&str; 3] = ["Basics", "Experience", "Skills"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already held this many jobs; nothing was written.
    AlreadySeeded(i64),
    Seeded {
        jobs: usize,
        candidates: usize,
        assessments: usize,
    },
}

struct Fixtures {
    jobs: Vec<Job>,
    candidates: Vec<Candidate>,
    timeline: Vec<CandidateTimelineItem>,
    assessments: Vec<Assessment>,
}

/// Populates an empty store with fixture data. It is the only producer of
/// candidates; no route creates them.
#[derive(Clone)]
pub struct SeedService {
    store: LocalStore,
    candidate_count: usize,
    seed: Option<u64>,
}

impl SeedService {
    pub fn new(store: LocalStore, candidate_count: usize, seed: Option<u64>) -> Self {
        Self {
            store,
            candidate_count,
            seed,
        }
    }

    /// Seeds once: does nothing when any job already exists.
    pub async fn ensure_seeded(&self) -> Result<SeedOutcome> {
        let existing = self.store.jobs.count().await?;
        if existing > 0 {
            info!(jobs = existing, "Local store already seeded, skipping");
            return Ok(SeedOutcome::AlreadySeeded(existing));
        }

        let fixtures = self.build_fixtures(time::now());
        self.store.jobs.bulk_add(&fixtures.jobs).await?;
        self.store.candidates.bulk_add(&fixtures.candidates).await?;
        self.store.timeline.bulk_add(&fixtures.timeline).await?;
        for assessment in &fixtures.assessments {
            self.store.assessments.put(assessment).await?;
        }

        let outcome = SeedOutcome::Seeded {
            jobs: fixtures.jobs.len(),
            candidates: fixtures.candidates.len(),
            assessments: fixtures.assessments.len(),
        };
        info!(?outcome, "Local store seeded");
        Ok(outcome)
    }

    fn build_fixtures(&self, now: DateTime<Utc>) -> Fixtures {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let jobs: Vec<Job> = (0..JOB_COUNT)
            .map(|i| {
                let id = Uuid::new_v4().to_string();
                let title = JOB_TITLES.choose(&mut rng).copied().unwrap_or("Engineer");
                let tag_count = rng.gen_range(0..=3);
                let tags = TAGS
                    .choose_multiple(&mut rng, tag_count)
                    .map(|t| t.to_string())
                    .collect();
                Job {
                    slug: job_slug(title, &id),
                    id,
                    title: title.to_string(),
                    status: if i % 5 == 0 {
                        JobStatus::Archived
                    } else {
                        JobStatus::Active
                    },
                    tags,
                    order: i as i64 + 1,
                    created_at: time::days_ago(now, rng.gen_range(0..=1000)),
                    updated_at: now,
                }
            })
            .collect();

        let mut candidates = Vec::with_capacity(self.candidate_count);
        let mut timeline = Vec::with_capacity(self.candidate_count);
        for i in 0..self.candidate_count {
            let Some(job) = jobs.choose(&mut rng) else {
                break;
            };
            let stage = Stage::ALL.choose(&mut rng).copied().unwrap_or(Stage::Applied);
            let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Sam");
            let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Doe");
            let created_at = time::days_ago(now, rng.gen_range(0..=180));
            let updated_at = created_at + Duration::days(rng.gen_range(0..=30));
            let id = Uuid::new_v4().to_string();

            timeline.push(CandidateTimelineItem {
                id: Uuid::new_v4().to_string(),
                candidate_id: id.clone(),
                kind: TimelineKind::StatusChange,
                message: format!("Moved to {}", stage.as_str()),
                created_at: created_at + Duration::hours(1),
            });
            candidates.push(Candidate {
                id,
                job_id: job.id.clone(),
                name: format!("{} {}", first, last),
                email: format!("{}.{}{}@example.com", first, last, i).to_lowercase(),
                stage,
                created_at,
                updated_at,
            });
        }

        let assessed: Vec<String> = jobs
            .choose_multiple(&mut rng, ASSESSMENT_COUNT)
            .map(|job| job.id.clone())
            .collect();
        let assessments = assessed
            .iter()
            .map(|job_id| sample_assessment(&mut rng, job_id, now))
            .collect();

        Fixtures {
            jobs,
            candidates,
            timeline,
            assessments,
        }
    }
}

fn sample_assessment(rng: &mut StdRng, job_id: &str, now: DateTime<Utc>) -> Assessment {
    const TYPES: [QuestionType; 4] = [
        QuestionType::Single,
        QuestionType::Multi,
        QuestionType::Text,
        QuestionType::Number,
    ];

    let mut questions = BTreeMap::new();
    let mut ids = Vec::with_capacity(QUESTIONS_PER_ASSESSMENT);
    for n in 1..=QUESTIONS_PER_ASSESSMENT {
        let id = format!("q{}", n);
        let question_type = TYPES.choose(rng).copied().unwrap_or(QuestionType::Text);
        let is_choice = matches!(question_type, QuestionType::Single | QuestionType::Multi);
        let is_number = question_type == QuestionType::Number;
        questions.insert(
            id.clone(),
            AssessmentQuestion {
                id: id.clone(),
                question_type,
                label: format!("Question {}", n),
                required: rng.gen_bool(0.5),
                options: is_choice.then(|| ["A", "B", "C", "D"].map(String::from).to_vec()),
                min: is_number.then_some(0.0),
                max: is_number.then_some(100.0),
                max_length: (question_type == QuestionType::Text).then_some(200),
                show_if: None,
            },
        );
        ids.push(id);
    }

    let per_section = QUESTIONS_PER_ASSESSMENT / SECTION_TITLES.len();
    let sections = SECTION_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| AssessmentSection {
            id: format!("s{}", i + 1),
            title: title.to_string(),
            question_ids: ids[i * per_section..(i + 1) * per_section].to_vec(),
        })
        .collect();

    Assessment {
        id: job_id.to_string(),
        sections,
        questions,
        updated_at: now,
    }
}
