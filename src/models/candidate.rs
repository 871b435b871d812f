use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Pipeline stage a candidate occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Screening,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Screening => "screening",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Hired => "hired",
            Stage::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub job_id: String,
    pub name: String,
    pub email: String,
    pub stage: Stage,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    /// Case-insensitive substring match on name or email; `needle` must
    /// already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}

impl Record for Candidate {
    const COLLECTION: &'static str = "candidates";
    const INDEXES: &'static [&'static str] =
        &["jobId", "email", "stage", "createdAt", "updatedAt"];

    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_round_trip_through_their_wire_names() {
        for stage in Stage::ALL {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, stage.as_str());
        }
        assert!(serde_json::from_str::<Stage>("\"promoted\"").is_err());
    }

    #[test]
    fn search_matches_name_or_email() {
        let ts = chrono::Utc::now();
        let candidate = Candidate {
            id: "c1".into(),
            job_id: "j1".into(),
            name: "Ada Lovelace".into(),
            email: "ada@analytical.engine".into(),
            stage: Stage::Applied,
            created_at: ts,
            updated_at: ts,
        };
        assert!(candidate.matches_search("lovelace"));
        assert!(candidate.matches_search("analytical"));
        assert!(!candidate.matches_search("babbage"));
    }
}
