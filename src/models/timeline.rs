use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    StatusChange,
    Note,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTimelineItem {
    pub id: String,
    pub candidate_id: String,
    #[serde(rename = "type")]
    pub kind: TimelineKind,
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl CandidateTimelineItem {
    /// `@name` tokens in the message, without the leading `@`.
    pub fn mentions(&self) -> Vec<&str> {
        let mut found = Vec::new();
        let bytes = self.message.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'@' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                if end > start {
                    found.push(&self.message[start..end]);
                }
                i = end.max(start);
            } else {
                i += 1;
            }
        }
        found
    }
}

impl Record for CandidateTimelineItem {
    const COLLECTION: &'static str = "candidate_timeline";
    const INDEXES: &'static [&'static str] = &["candidateId", "createdAt"];

    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(message: &str) -> CandidateTimelineItem {
        CandidateTimelineItem {
            id: "n1".into(),
            candidate_id: "c1".into(),
            kind: TimelineKind::Note,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn extracts_mention_tokens() {
        let item = note("Ping @alice and @bob_smith, cc @ nobody@");
        assert_eq!(item.mentions(), vec!["alice", "bob_smith"]);
    }

    #[test]
    fn kind_serializes_under_type() {
        let json = serde_json::to_value(note("hello")).unwrap();
        assert_eq!(json["type"], "note");
        assert!(json["createdAt"].is_i64());
    }
}
