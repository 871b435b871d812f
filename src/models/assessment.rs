use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Single,
    Multi,
    Text,
    Number,
    File,
}

/// Show the owning question only while another question's answer equals
/// `equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowIf {
    pub question_id: String,
    pub equals: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub question_ids: Vec<String>,
}

/// One assessment per job; `id` is the job id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub sections: Vec<AssessmentSection>,
    pub questions: BTreeMap<String, AssessmentQuestion>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    #[error("section {section} references unknown question {question}")]
    UnknownQuestion { section: String, question: String },
    #[error("section {section} lists question {question} more than once")]
    DuplicateQuestion { section: String, question: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnswerProblem {
    #[error("an answer is required")]
    Required,
    #[error("must be a number")]
    NotANumber,
    #[error("must be at least {0}")]
    BelowMin(f64),
    #[error("must be at most {0}")]
    AboveMax(f64),
    #[error("must be at most {0} characters")]
    TooLong(usize),
    #[error("must be text")]
    NotText,
    #[error("{0} is not one of the options")]
    UnknownOption(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerIssue {
    pub question_id: String,
    pub problem: AnswerProblem,
}

impl Assessment {
    /// Every section question must exist, and no section may list one twice.
    pub fn check_structure(&self) -> Result<(), StructureError> {
        for section in &self.sections {
            let mut seen = HashSet::new();
            for qid in &section.question_ids {
                if !seen.insert(qid.as_str()) {
                    return Err(StructureError::DuplicateQuestion {
                        section: section.id.clone(),
                        question: qid.clone(),
                    });
                }
                if !self.questions.contains_key(qid) {
                    return Err(StructureError::UnknownQuestion {
                        section: section.id.clone(),
                        question: qid.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether a question is visible given the answers collected so far.
    pub fn is_visible(&self, question: &AssessmentQuestion, answers: &Map<String, JsonValue>) -> bool {
        match &question.show_if {
            None => true,
            Some(rule) => answers.get(&rule.question_id) == Some(&rule.equals),
        }
    }

    /// Client-side checks run by the live preview before a submission.
    /// The submit route stores answers without running these.
    pub fn validate_answers(&self, answers: &Map<String, JsonValue>) -> Vec<AnswerIssue> {
        let mut issues = Vec::new();
        for section in &self.sections {
            for qid in &section.question_ids {
                let Some(question) = self.questions.get(qid) else {
                    continue;
                };
                if !self.is_visible(question, answers) {
                    continue;
                }
                let answer = answers.get(qid).filter(|value| !is_blank(value));
                let problem = match answer {
                    None if question.required => Some(AnswerProblem::Required),
                    None => None,
                    Some(value) => check_answer(question, value),
                };
                if let Some(problem) = problem {
                    issues.push(AnswerIssue {
                        question_id: qid.clone(),
                        problem,
                    });
                }
            }
        }
        issues
    }
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn check_answer(question: &AssessmentQuestion, value: &JsonValue) -> Option<AnswerProblem> {
    match question.question_type {
        QuestionType::Number => {
            let number = match value {
                JsonValue::Number(n) => n.as_f64(),
                JsonValue::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            let Some(number) = number else {
                return Some(AnswerProblem::NotANumber);
            };
            if let Some(min) = question.min.filter(|min| number < *min) {
                return Some(AnswerProblem::BelowMin(min));
            }
            question
                .max
                .filter(|max| number > *max)
                .map(AnswerProblem::AboveMax)
        }
        QuestionType::Text => {
            let Some(text) = value.as_str() else {
                return Some(AnswerProblem::NotText);
            };
            question
                .max_length
                .filter(|limit| text.chars().count() > *limit)
                .map(AnswerProblem::TooLong)
        }
        QuestionType::Single => match value.as_str() {
            Some(choice) => unknown_option(question, choice),
            None => Some(AnswerProblem::NotText),
        },
        QuestionType::Multi => match value.as_array() {
            Some(choices) => choices.iter().find_map(|choice| match choice.as_str() {
                Some(choice) => unknown_option(question, choice),
                None => Some(AnswerProblem::NotText),
            }),
            None => Some(AnswerProblem::NotText),
        },
        QuestionType::File => None,
    }
}

fn unknown_option(question: &AssessmentQuestion, choice: &str) -> Option<AnswerProblem> {
    let options = question.options.as_deref().unwrap_or_default();
    if options.iter().any(|option| option == choice) {
        None
    } else {
        Some(AnswerProblem::UnknownOption(choice.to_string()))
    }
}

impl Record for Assessment {
    const COLLECTION: &'static str = "assessments";
    const INDEXES: &'static [&'static str] = &["updatedAt"];

    fn key(&self) -> &str {
        &self.id
    }
}
