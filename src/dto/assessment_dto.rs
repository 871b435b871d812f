use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::models::assessment::{AssessmentQuestion, AssessmentSection};

/// Full assessment document as sent on save. Any `id` or `updatedAt` in the
/// body is ignored; the path job id and the server clock win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAssessmentPayload {
    pub sections: Vec<AssessmentSection>,
    #[serde(default)]
    pub questions: BTreeMap<String, AssessmentQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponsePayload {
    pub candidate_id: String,
    pub answers: Map<String, JsonValue>,
}
